use bytemuck::Zeroable;

use super::*;
use crate::checksum::xor8;

impl DirectoryEntry {
    /// Build a finalized entry with a NUL-padded name
    pub fn new(inode_no: u32, kind: u8, name: &str) -> Result<Self, Error> {
        let raw = name.as_bytes();
        if raw.len() > NAME_MAX {
            return Err(Error::NameTooLong);
        }
        let mut entry = Self::zeroed();
        entry.inode_no = inode_no;
        entry.kind = kind;
        entry.name[..raw.len()].copy_from_slice(raw);
        entry.finalize_checksum();
        Ok(entry)
    }

    /// A slot with inode number zero is unused
    pub fn is_free(&self) -> bool {
        self.inode_no == 0
    }

    /// Entry name with NUL padding trimmed
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_MAX);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Compute and store the checksum.
    /// Call only after every other field has been set
    pub fn finalize_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = xor8(&bytemuck::bytes_of(&*self)[..DIRENT_SIZE - 1]);
    }

    pub(crate) fn verify_checksum(&self) -> bool {
        xor8(&bytemuck::bytes_of(self)[..DIRENT_SIZE - 1]) == self.checksum
    }
}
