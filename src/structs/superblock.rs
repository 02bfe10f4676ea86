use super::*;
use crate::checksum::crc32;

impl Superblock {
    /// Compute geometry for a fresh filesystem and return a finalized
    /// superblock. Parameters are validated before anything is built
    pub fn new(size_kib: u64, inode_count: u64, now: u64) -> Result<Self, Error> {
        if !(180..=4096).contains(&size_kib) {
            return Err(Error::InvalidGeometry("size-kib must be within 180..=4096"));
        }
        if size_kib % 4 != 0 {
            return Err(Error::InvalidGeometry("size-kib must be a multiple of 4"));
        }
        if !(128..=512).contains(&inode_count) {
            return Err(Error::InvalidGeometry("inodes must be within 128..=512"));
        }
        let total_blocks = size_kib * 1024 / BLOCK_SIZE as u64;
        let inode_table_start = 3;
        let inode_table_blocks = (inode_count * INODE_SIZE as u64).div_ceil(BLOCK_SIZE as u64);
        let data_region_start = inode_table_start + inode_table_blocks;
        if data_region_start >= total_blocks {
            return Err(Error::InvalidGeometry("no room left for the root directory block"));
        }
        let mut superblock = Self {
            magic: MAGIC_SIGNATURE,
            version: FORMAT_VERSION,
            block_size: BLOCK_SIZE as u32,
            total_blocks,
            inode_count,
            inode_bitmap_start: 1,
            inode_bitmap_blocks: 1,
            data_bitmap_start: 2,
            data_bitmap_blocks: 1,
            inode_table_start,
            inode_table_blocks,
            data_region_start,
            data_region_blocks: total_blocks - data_region_start,
            root_inode: ROOT_INODE,
            mtime_epoch: now,
            flags: 0,
            checksum: 0,
        };
        superblock.finalize_checksum();
        Ok(superblock)
    }

    /// Check magic signature and block size of a loaded superblock
    pub fn validate(&self) -> Result<(), Error> {
        if self.magic != MAGIC_SIGNATURE || self.block_size != BLOCK_SIZE as u32 {
            return Err(Error::CorruptSuperblock);
        }
        Ok(())
    }

    /// Compute and store the checksum.
    /// Call only after every other field has been set; any later
    /// mutation requires re-finalization
    pub fn finalize_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = self.compute_checksum();
    }

    /// Checksum over the superblock's whole block with the stored field zeroed
    pub(crate) fn compute_checksum(&self) -> u32 {
        let mut block = [0u8; BLOCK_SIZE];
        let mut copy = *self;
        copy.checksum = 0;
        block[..std::mem::size_of::<Self>()].copy_from_slice(bytemuck::bytes_of(&copy));
        crc32(&block[..BLOCK_SIZE - 4])
    }

    pub(crate) fn verify_checksum(&self) -> bool {
        let stored = self.checksum;
        self.compute_checksum() == stored
    }
}
