use log::info;

use super::Image;
use crate::structs::*;
use crate::Error;

impl Image {
    /// Build a complete, self-consistent image from its two parameters.
    ///
    /// Capacity must be a multiple of 4 within 180..=4096 KiB and the inode
    /// count within 128..=512; nothing is built when validation fails
    pub fn format(size_kib: u64, inode_count: u64, now: u64) -> Result<Self, Error> {
        let superblock = Superblock::new(size_kib, inode_count, now)?;
        let total_blocks = superblock.total_blocks;
        let mut image = Self {
            superblock,
            data: vec![0u8; total_blocks as usize * BLOCK_SIZE],
        };
        image.flush_superblock()?;

        // Root directory claims inode index 0 and the first data region block
        let mut inode_bitmap = Bitmap::new();
        inode_bitmap.set(0);
        inode_bitmap.encode(image.block_mut(superblock.inode_bitmap_start)?)?;
        let mut data_bitmap = Bitmap::new();
        data_bitmap.set(0);
        data_bitmap.encode(image.block_mut(superblock.data_bitmap_start)?)?;

        let root = Inode::new_root(&superblock);
        image.flush_inode(0, &root)?;

        let root_no = superblock.root_inode as u32;
        let dot = DirectoryEntry::new(root_no, DIRENT_TYPE_DIRECTORY, ".")?;
        let dotdot = DirectoryEntry::new(root_no, DIRENT_TYPE_DIRECTORY, "..")?;
        let root_block = image.block_mut(superblock.data_region_start)?;
        dot.encode(root_block)?;
        dotdot.encode(&mut root_block[DIRENT_SIZE..])?;

        let table_blocks = superblock.inode_table_blocks;
        info!("Formatted image: {total_blocks} blocks, {inode_count} inodes, inode table {table_blocks} blocks");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::DiskRecord;

    #[test]
    fn concrete_scenario_geometry() {
        let image = Image::format(180, 128, 0).unwrap();
        let sb = image.superblock;
        assert_eq![{ sb.total_blocks }, 45];
        assert_eq![image.data.len(), 45 * BLOCK_SIZE];
        assert![sb.verify_checksum()];
        assert![Image::load(image.data.clone()).is_ok()];
    }

    #[test]
    fn root_directory_layout() {
        let image = Image::format(180, 128, 9).unwrap();
        let root = image.load_inode(0).unwrap();
        assert_eq![{ root.mode }, MODE_DIRECTORY];
        assert_eq![{ root.size_bytes }, 128];
        assert![root.verify_checksum()];
        let block = image
            .block(image.superblock.data_region_start)
            .unwrap();
        let dot = DirectoryEntry::decode(block).unwrap();
        let dotdot = DirectoryEntry::decode(&block[DIRENT_SIZE..]).unwrap();
        assert_eq![dot.name(), "."];
        assert_eq![dotdot.name(), ".."];
        assert_eq![{ dot.inode_no }, 1];
        assert_eq![{ dotdot.inode_no }, 1];
        assert![dot.verify_checksum()];
        assert![dotdot.verify_checksum()];
        for slot in 2..DIRENTS_PER_BLOCK {
            let entry = DirectoryEntry::decode(&block[slot * DIRENT_SIZE..]).unwrap();
            assert![entry.is_free()];
        }
    }

    #[test]
    fn bitmaps_mark_only_root() {
        let image = Image::format(180, 128, 0).unwrap();
        let inode_bitmap = image.inode_bitmap().unwrap();
        let data_bitmap = image.data_bitmap().unwrap();
        assert![inode_bitmap.get(0)];
        assert![data_bitmap.get(0)];
        for index in 1..128 {
            assert![!inode_bitmap.get(index)];
        }
        let free_blocks = image.superblock.data_region_blocks;
        for index in 1..free_blocks {
            assert![!data_bitmap.get(index)];
        }
    }

    #[test]
    fn formatting_is_idempotent_for_fixed_time() {
        let first = Image::format(360, 256, 1234).unwrap();
        let second = Image::format(360, 256, 1234).unwrap();
        assert_eq![first.data, second.data];
        // Same parameters at another time differ only in timestamps
        let third = Image::format(360, 256, 5678).unwrap();
        assert_eq![first.data.len(), third.data.len()];
        assert_ne![first.data, third.data];
    }

    #[test]
    fn rejects_invalid_parameters_without_building() {
        assert![Image::format(100, 128, 0).is_err()];
        assert![Image::format(180, 64, 0).is_err()];
        assert![Image::format(181, 128, 0).is_err()];
    }
}
