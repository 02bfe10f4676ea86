use log::{info, warn};

use super::Image;
use crate::structs::*;
use crate::Error;

impl Image {
    /// Register one regular file in the root directory and return its
    /// on-disk inode number.
    ///
    /// Any failure leaves the in-memory image inconsistent; the caller must
    /// discard it and write no output
    pub fn add_file(&mut self, name: &str, contents: &[u8], now: u64) -> Result<u32, Error> {
        if name == "." || name == ".." {
            return Err(Error::ReservedName);
        }
        if name.len() > NAME_MAX {
            return Err(Error::NameTooLong);
        }
        if contents.len() > DIRECT_MAX * BLOCK_SIZE {
            return Err(Error::FileTooLarge);
        }

        let inode_index = self.acquire_inode()?;
        let mut inode = Inode::new_file(contents.len() as u64, now);

        // Lowest-free-first block assignment, in file order
        let needed_blocks = contents.len().div_ceil(BLOCK_SIZE);
        let mut direct = [0u32; DIRECT_MAX];
        for (slot, chunk) in contents.chunks(BLOCK_SIZE).enumerate() {
            let absolute = self.acquire_data_block()?;
            direct[slot] = absolute as u32;
            let block = self.block_mut(absolute)?;
            block[..chunk.len()].copy_from_slice(chunk);
            block[chunk.len()..].fill(0);
        }
        inode.direct = direct;
        inode.finalize_checksum();
        self.flush_inode(inode_index, &inode)?;

        self.insert_root_entry(inode_index as u32 + 1, name)?;

        self.superblock.mtime_epoch = now;
        self.superblock.finalize_checksum();
        self.flush_superblock()?;

        let inode_no = inode_index as u32 + 1;
        info!("Added '{name}' as inode {inode_no} using {needed_blocks} data blocks");
        Ok(inode_no)
    }

    /// Place a new entry in the first free slot of the root directory's
    /// single data block and grow the root inode by one entry
    fn insert_root_entry(&mut self, inode_no: u32, name: &str) -> Result<(), Error> {
        let root_index = self.superblock.root_inode - 1;
        let mut root = self.load_inode(root_index)?;
        let root_block = { root.direct }[0] as u64;

        let entry = DirectoryEntry::new(inode_no, DIRENT_TYPE_REGULAR, name)?;
        let block = self.block_mut(root_block)?;
        let mut free_slot = None;
        for slot in 0..DIRENTS_PER_BLOCK {
            let existing = DirectoryEntry::decode(&block[slot * DIRENT_SIZE..])?;
            if existing.is_free() {
                free_slot.get_or_insert(slot);
            } else if existing.name() == name {
                // the format permits duplicate names
                warn!("root directory already contains an entry named '{name}'");
            }
        }
        let Some(slot) = free_slot else {
            return Err(Error::DirectoryFull);
        };
        entry.encode(&mut block[slot * DIRENT_SIZE..])?;

        root.size_bytes += DIRENT_SIZE as u64;
        root.finalize_checksum();
        self.flush_inode(root_index, &root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::DiskRecord;

    fn fresh_image() -> Image {
        Image::format(180, 128, 100).unwrap()
    }

    fn count_set(bitmap: &Bitmap, limit: u64) -> u64 {
        (0..limit).filter(|&index| bitmap.get(index)).count() as u64
    }

    #[test]
    fn concrete_scenario() {
        let mut image = fresh_image();
        let inode_no = image.add_file("a.txt", b"hello disk", 200).unwrap();
        assert_eq![inode_no, 2];
        let sb = image.superblock;
        assert![sb.verify_checksum()];
        assert_eq![{ sb.mtime_epoch }, 200];
        assert_eq![count_set(&image.data_bitmap().unwrap(), sb.data_region_blocks), 2];
        assert_eq![count_set(&image.inode_bitmap().unwrap(), sb.inode_count), 2];
        let root = image.load_inode(0).unwrap();
        assert_eq![{ root.size_bytes }, 192];
        assert![root.verify_checksum()];
        let inode = image.load_inode(1).unwrap();
        assert_eq![{ inode.mode }, MODE_REGULAR];
        assert_eq![{ inode.links }, 1];
        assert_eq![{ inode.size_bytes }, 10];
        assert![inode.verify_checksum()];
        let first_block = { inode.direct }[0] as u64;
        assert_eq![first_block, { sb.data_region_start } + 1];
        assert_eq![&image.block(first_block).unwrap()[..10], b"hello disk"];
    }

    #[test]
    fn new_entry_lands_in_first_free_slot() {
        let mut image = fresh_image();
        image.add_file("a.txt", b"a", 0).unwrap();
        image.add_file("b.txt", b"b", 0).unwrap();
        let block = image
            .block(image.superblock.data_region_start)
            .unwrap()
            .to_vec();
        let first = DirectoryEntry::decode(&block[2 * DIRENT_SIZE..]).unwrap();
        let second = DirectoryEntry::decode(&block[3 * DIRENT_SIZE..]).unwrap();
        assert_eq![first.name(), "a.txt"];
        assert_eq![{ first.inode_no }, 2];
        assert_eq![first.kind, DIRENT_TYPE_REGULAR];
        assert![first.verify_checksum()];
        assert_eq![second.name(), "b.txt"];
        assert_eq![{ second.inode_no }, 3];
    }

    #[test]
    fn multi_block_file_zero_pads_the_tail() {
        let mut image = fresh_image();
        let contents = vec![0xABu8; BLOCK_SIZE + 10];
        image.add_file("two.bin", &contents, 0).unwrap();
        let inode = image.load_inode(1).unwrap();
        let direct = { inode.direct };
        let sb = image.superblock;
        assert_eq![direct[0] as u64, { sb.data_region_start } + 1];
        assert_eq![direct[1] as u64, { sb.data_region_start } + 2];
        assert_eq![direct[2], 0];
        let tail = image.block(direct[1] as u64).unwrap();
        assert_eq![&tail[..10], &contents[BLOCK_SIZE..]];
        assert![tail[10..].iter().all(|&byte| byte == 0)];
    }

    #[test]
    fn direct_block_limit() {
        let mut image = Image::format(360, 128, 0).unwrap();
        let exact = vec![7u8; DIRECT_MAX * BLOCK_SIZE];
        assert![image.add_file("exact.bin", &exact, 0).is_ok()];
        let oversized = vec![7u8; DIRECT_MAX * BLOCK_SIZE + 1];
        let mut image = Image::format(360, 128, 0).unwrap();
        assert![matches!(
            image.add_file("big.bin", &oversized, 0),
            Err(Error::FileTooLarge)
        )];
    }

    #[test]
    fn reserved_and_overlong_names() {
        let mut image = fresh_image();
        assert![matches!(image.add_file(".", b"", 0), Err(Error::ReservedName))];
        assert![matches!(image.add_file("..", b"", 0), Err(Error::ReservedName))];
        let long = "x".repeat(NAME_MAX + 1);
        assert![matches!(
            image.add_file(&long, b"", 0),
            Err(Error::NameTooLong)
        )];
    }

    #[test]
    fn directory_fills_after_62_files() {
        let mut image = fresh_image();
        for index in 0..62 {
            let name = format!("f{index}");
            assert![image.add_file(&name, b"", 0).is_ok()];
        }
        assert![matches!(
            image.add_file("overflow", b"", 0),
            Err(Error::DirectoryFull)
        )];
    }

    #[test]
    fn data_region_exhaustion() {
        // 180 KiB leaves 37 free data blocks after the root directory
        let mut image = fresh_image();
        for index in 0..3 {
            let name = format!("chunk{index}");
            let contents = vec![1u8; DIRECT_MAX * BLOCK_SIZE];
            assert![image.add_file(&name, &contents, 0).is_ok()];
        }
        let contents = vec![1u8; 2 * BLOCK_SIZE];
        assert![matches!(
            image.add_file("straw", &contents, 0),
            Err(Error::NoFreeBlocks)
        )];
    }

    #[test]
    fn duplicate_names_are_permitted() {
        let mut image = fresh_image();
        let first = image.add_file("same.txt", b"one", 0).unwrap();
        let second = image.add_file("same.txt", b"two", 0).unwrap();
        assert_ne![first, second];
        let root = image.load_inode(0).unwrap();
        assert_eq![{ root.size_bytes }, 256];
    }

    #[test]
    fn zero_byte_file_takes_no_data_blocks() {
        let mut image = fresh_image();
        image.add_file("empty", b"", 0).unwrap();
        let sb = image.superblock;
        assert_eq![count_set(&image.data_bitmap().unwrap(), sb.data_region_blocks), 1];
        let inode = image.load_inode(1).unwrap();
        assert_eq![{ inode.size_bytes }, 0];
        assert![{ inode.direct }.iter().all(|&block| block == 0)];
    }
}
