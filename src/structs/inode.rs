use bytemuck::Zeroable;

use super::*;
use crate::checksum::crc32;

const CRC_RANGE: usize = 120;

impl Inode {
    /// Root directory inode holding one data block with "." and ".."
    pub fn new_root(superblock: &Superblock) -> Self {
        let mut inode = Self::zeroed();
        inode.mode = MODE_DIRECTORY;
        inode.links = 2;
        inode.size_bytes = 2 * DIRENT_SIZE as u64;
        inode.atime = superblock.mtime_epoch;
        inode.mtime = superblock.mtime_epoch;
        inode.ctime = superblock.mtime_epoch;
        let mut direct = [0u32; DIRECT_MAX];
        direct[0] = superblock.data_region_start as u32;
        inode.direct = direct;
        inode.finalize_checksum();
        inode
    }

    /// Regular file inode without any data blocks assigned yet.
    /// Not finalized, the caller fills `direct` first
    pub fn new_file(size_bytes: u64, now: u64) -> Self {
        let mut inode = Self::zeroed();
        inode.mode = MODE_REGULAR;
        inode.links = 1;
        inode.size_bytes = size_bytes;
        inode.atime = now;
        inode.mtime = now;
        inode.ctime = now;
        inode
    }

    /// Compute and store the checksum in the low 4 bytes of `inode_crc`.
    /// Call only after every other field has been set, including all
    /// direct block assignments
    pub fn finalize_checksum(&mut self) {
        self.inode_crc = 0;
        self.inode_crc = self.compute_checksum() as u64;
    }

    /// Checksum over bytes `[0, 120)` with the crc field zeroed
    pub(crate) fn compute_checksum(&self) -> u32 {
        let mut copy = *self;
        copy.inode_crc = 0;
        crc32(&bytemuck::bytes_of(&copy)[..CRC_RANGE])
    }

    pub(crate) fn verify_checksum(&self) -> bool {
        let stored = self.inode_crc;
        self.compute_checksum() as u64 == stored
    }
}
