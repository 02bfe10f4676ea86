use std::io::Write;
use std::path::Path;

use log::debug;

use crate::structs::*;
use crate::Error;

mod format;
mod inject;

/// Whole disk image held in memory.
///
/// Created by the formatter, or loaded, mutated and fully rewritten by the
/// injector. The buffer is never aliased across operations and never updated
/// partially on disk; concurrent runs against the same image or output path
/// are unsupported.
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) superblock: Superblock,
    pub(crate) data: Vec<u8>,
}

/// Current time as seconds since the Unix epoch
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

impl Image {
    /// Load an image from raw bytes, validating its superblock
    pub fn load(data: Vec<u8>) -> Result<Self, Error> {
        let superblock = Superblock::decode(&data)?;
        superblock.validate()?;
        let total_blocks = superblock.total_blocks;
        let expected = (total_blocks as usize)
            .checked_mul(BLOCK_SIZE)
            .ok_or(Error::CorruptSuperblock)?;
        if data.len() != expected {
            return Err(Error::CorruptSuperblock);
        }
        debug!("Loaded image with {total_blocks} blocks");
        Ok(Self { superblock, data })
    }

    /// Load an image from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::load(std::fs::read(path)?)
    }

    /// Serialize the image verbatim
    pub fn flush<W: Write>(&self, target: &mut W) -> Result<(), Error> {
        target.write_all(&self.data)?;
        Ok(())
    }

    /// Write the image to a file, replacing any previous contents
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut file = std::fs::File::create(path)?;
        self.flush(&mut file)?;
        Ok(())
    }

    pub(crate) fn block(&self, block: u64) -> Result<&[u8], Error> {
        if block >= self.superblock.total_blocks {
            return Err(Error::OutOfBounds);
        }
        let start = block as usize * BLOCK_SIZE;
        Ok(&self.data[start..start + BLOCK_SIZE])
    }

    pub(crate) fn block_mut(&mut self, block: u64) -> Result<&mut [u8], Error> {
        if block >= self.superblock.total_blocks {
            return Err(Error::OutOfBounds);
        }
        let start = block as usize * BLOCK_SIZE;
        Ok(&mut self.data[start..start + BLOCK_SIZE])
    }

    pub(crate) fn inode_bitmap(&self) -> Result<Bitmap, Error> {
        Bitmap::decode(self.block(self.superblock.inode_bitmap_start)?)
    }

    pub(crate) fn data_bitmap(&self) -> Result<Bitmap, Error> {
        Bitmap::decode(self.block(self.superblock.data_bitmap_start)?)
    }

    /// Mark the first free inode used and return its table index.
    /// The on-disk inode number is the index plus one
    pub(crate) fn acquire_inode(&mut self) -> Result<u64, Error> {
        let mut bitmap = self.inode_bitmap()?;
        let Some(index) = bitmap.next_free(self.superblock.inode_count) else {
            return Err(Error::NoFreeInodes);
        };
        bitmap.set(index);
        let start = self.superblock.inode_bitmap_start;
        bitmap.encode(self.block_mut(start)?)?;
        debug!("Acquire inode {index}");
        Ok(index)
    }

    /// Mark the first free data block used and return its absolute number
    pub(crate) fn acquire_data_block(&mut self) -> Result<u64, Error> {
        let mut bitmap = self.data_bitmap()?;
        let Some(relative) = bitmap.next_free(self.superblock.data_region_blocks) else {
            return Err(Error::NoFreeBlocks);
        };
        bitmap.set(relative);
        let start = self.superblock.data_bitmap_start;
        bitmap.encode(self.block_mut(start)?)?;
        let absolute = self.superblock.data_region_start + relative;
        debug!("Acquire data block {absolute}");
        Ok(absolute)
    }

    fn inode_offset(&self, index: u64) -> Result<usize, Error> {
        if index >= self.superblock.inode_count {
            return Err(Error::OutOfBounds);
        }
        Ok(self.superblock.inode_table_start as usize * BLOCK_SIZE
            + index as usize * INODE_SIZE)
    }

    /// Load inode at table index
    pub(crate) fn load_inode(&self, index: u64) -> Result<Inode, Error> {
        let offset = self.inode_offset(index)?;
        Inode::decode(&self.data[offset..])
    }

    /// Flush inode to table index
    pub(crate) fn flush_inode(&mut self, index: u64, inode: &Inode) -> Result<(), Error> {
        let offset = self.inode_offset(index)?;
        inode.encode(&mut self.data[offset..])
    }

    /// Flush the superblock into block 0
    pub(crate) fn flush_superblock(&mut self) -> Result<(), Error> {
        let superblock = self.superblock;
        superblock.encode(self.block_mut(0)?)
    }
}
