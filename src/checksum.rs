use std::sync::OnceLock;

const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

static CRC32_TABLE: OnceLock<Crc32> = OnceLock::new();

/// Table-driven reflected CRC32 (initial and final XOR `0xFFFFFFFF`)
#[derive(Debug)]
struct Crc32 {
    table: [u32; 256],
}

impl Crc32 {
    fn new() -> Self {
        let mut table = [0u32; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut c = i as u32;
            for _ in 0..8 {
                c = if c & 1 == 1 {
                    CRC32_POLYNOMIAL ^ (c >> 1)
                } else {
                    c >> 1
                };
            }
            *entry = c;
        }
        Self { table }
    }

    fn compute(&self, data: &[u8]) -> u32 {
        let mut c = 0xFFFF_FFFFu32;
        for &byte in data {
            c = self.table[((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
        }
        c ^ 0xFFFF_FFFF
    }
}

/// CRC32 of a byte range, with the lookup table built on first use
pub fn crc32(data: &[u8]) -> u32 {
    CRC32_TABLE.get_or_init(Crc32::new).compute(data)
}

/// XOR-reduce a byte range into a single byte
pub fn xor8(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, byte| acc ^ byte)
}
