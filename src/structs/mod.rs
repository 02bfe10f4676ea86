mod bitmap;
mod dirent;
mod inode;
mod superblock;

use bytemuck::{Pod, Zeroable};

use crate::Error;

pub const BLOCK_SIZE: usize = 4096;
pub const INODE_SIZE: usize = 128;
pub const DIRENT_SIZE: usize = 64;
pub const DIRENTS_PER_BLOCK: usize = BLOCK_SIZE / DIRENT_SIZE;
pub const MAGIC_SIGNATURE: u32 = 0x4D56_5346;
pub const FORMAT_VERSION: u32 = 1;
pub const ROOT_INODE: u64 = 1;
pub const DIRECT_MAX: usize = 12;
pub const NAME_MAX: usize = 58;

pub const MODE_DIRECTORY: u16 = 0o040000;
pub const MODE_REGULAR: u16 = 0o100000;
pub const DIRENT_TYPE_REGULAR: u8 = 1;
pub const DIRENT_TYPE_DIRECTORY: u8 = 2;

/// Fixed-size record with a byte-exact on-disk layout.
/// Decoding and encoding always go through a bounds-checked byte range.
pub(crate) trait DiskRecord: Pod {
    /// Decode a record from the beginning of `bytes`
    fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let raw = bytes
            .get(..std::mem::size_of::<Self>())
            .ok_or(Error::OutOfBounds)?;
        Ok(bytemuck::pod_read_unaligned(raw))
    }

    /// Encode the record into the beginning of `bytes`
    fn encode(&self, bytes: &mut [u8]) -> Result<(), Error> {
        let out = bytes
            .get_mut(..std::mem::size_of::<Self>())
            .ok_or(Error::OutOfBounds)?;
        out.copy_from_slice(bytemuck::bytes_of(self));
        Ok(())
    }
}

impl DiskRecord for Superblock {}
impl DiskRecord for Inode {}
impl DiskRecord for DirectoryEntry {}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Superblock {
    /// Magic signature
    pub(crate) magic: u32,
    /// Format version
    pub(crate) version: u32,
    /// Block size in bytes
    pub(crate) block_size: u32,
    /// Total count of blocks in the filesystem
    pub(crate) total_blocks: u64,
    /// Total count of inodes in the filesystem
    pub(crate) inode_count: u64,
    /// First block of the inode bitmap
    pub(crate) inode_bitmap_start: u64,
    pub(crate) inode_bitmap_blocks: u64,
    /// First block of the data bitmap
    pub(crate) data_bitmap_start: u64,
    pub(crate) data_bitmap_blocks: u64,
    /// First block of the inode table
    pub(crate) inode_table_start: u64,
    pub(crate) inode_table_blocks: u64,
    /// First block of the data region
    pub(crate) data_region_start: u64,
    pub(crate) data_region_blocks: u64,
    /// On-disk inode number of the root directory, always 1
    pub(crate) root_inode: u64,
    /// Last modification timestamp in seconds
    pub(crate) mtime_epoch: u64,
    pub(crate) flags: u32,
    /// CRC32 of bytes `[0, 4092)` of block 0, computed with this field zeroed
    pub(crate) checksum: u32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
pub struct Inode {
    /// File mode (type and permissions)
    pub(crate) mode: u16,
    /// Hard link count
    pub(crate) links: u16,
    /// Owner UID
    pub(crate) uid: u32,
    /// Owner GID
    pub(crate) gid: u32,
    /// File size in bytes
    pub(crate) size_bytes: u64,
    /// Last access timestamp in seconds
    pub(crate) atime: u64,
    /// Last data modification timestamp in seconds
    pub(crate) mtime: u64,
    /// Last metadata modification timestamp in seconds
    pub(crate) ctime: u64,
    /// Absolute block numbers of the file's data, zero for unused slots
    pub(crate) direct: [u32; DIRECT_MAX],
    pub(crate) reserved_0: u32,
    pub(crate) reserved_1: u32,
    pub(crate) reserved_2: u32,
    pub(crate) proj_id: u32,
    /// Legacy combined 16-bit UID/GID field
    pub(crate) uid16_gid16: u32,
    /// Extended attribute block, unused
    pub(crate) xattr_ptr: u64,
    /// Low 4 bytes hold CRC32 of bytes `[0, 120)`, high 4 bytes are zero
    pub(crate) inode_crc: u64,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C, packed)]
pub struct DirectoryEntry {
    /// On-disk inode number, zero marks a free slot
    pub(crate) inode_no: u32,
    /// Entry kind, 1 for regular files and 2 for directories
    pub(crate) kind: u8,
    /// Entry name, NUL-padded but not necessarily NUL-terminated
    pub(crate) name: [u8; NAME_MAX],
    /// XOR of bytes `[0, 63)`
    pub(crate) checksum: u8,
}

/// One-block occupancy map, bit `i` set means resource `i` is allocated
#[derive(Debug, Clone)]
pub struct Bitmap {
    bytes: Vec<u8>,
}

const _: () = assert!(std::mem::size_of::<Superblock>() == 116);
const _: () = assert!(std::mem::size_of::<Inode>() == INODE_SIZE);
const _: () = assert!(std::mem::size_of::<DirectoryEntry>() == DIRENT_SIZE);
