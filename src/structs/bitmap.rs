use super::*;

const BITS_IN_BYTE: u64 = 8;

impl Bitmap {
    /// Create a bitmap with all bits clear
    pub fn new() -> Self {
        Self {
            bytes: vec![0; BLOCK_SIZE],
        }
    }

    /// Decode a bitmap from one block of the image
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let raw = bytes.get(..BLOCK_SIZE).ok_or(Error::OutOfBounds)?;
        Ok(Self {
            bytes: raw.to_vec(),
        })
    }

    /// Encode the bitmap into one block of the image
    pub fn encode(&self, bytes: &mut [u8]) -> Result<(), Error> {
        let out = bytes.get_mut(..BLOCK_SIZE).ok_or(Error::OutOfBounds)?;
        out.copy_from_slice(&self.bytes);
        Ok(())
    }

    /// Get occupancy
    pub fn get(&self, index: u64) -> bool {
        let row = (index / BITS_IN_BYTE) as usize;
        let col = index % BITS_IN_BYTE;
        (self.bytes[row] >> col) & 1 == 1
    }

    /// Mark index as occupied. Setting an already-set bit is a no-op
    pub fn set(&mut self, index: u64) {
        let row = (index / BITS_IN_BYTE) as usize;
        let col = index % BITS_IN_BYTE;
        self.bytes[row] |= 1 << col;
    }

    /// Index of the first clear bit in `[0, limit)`, scanning in ascending
    /// order. Lowest-free-index-first ordering keeps allocation reproducible.
    /// The scan never leaves the bitmap, whatever limit a caller supplies
    pub fn next_free(&self, limit: u64) -> Option<u64> {
        let capacity = self.bytes.len() as u64 * BITS_IN_BYTE;
        (0..limit.min(capacity)).find(|&index| !self.get(index))
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new()
    }
}
