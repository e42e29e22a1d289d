// Both checksums cover the nibbles from the first sensor id nibble (the one
// right after sync) up to the end of the sensor data. The base station checks
// both and drops the frame silently if either is wrong.

use crate::nibble::{self, bit_is_set, swap_nibbles};

/// First nibble covered by the checksums: the sensor id nibble after sync.
pub const CHECKSUM_START: usize = 7;

/// Additive checksum: the sum of every covered nibble, truncated to 8 bits.
///
/// The range begins with the low nibble of the sync byte, continues over whole
/// bytes and, when it ends mid-byte, picks up the high nibble of the last one.
pub fn oregon_sum(frame: &[u8], count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    // CHECKSUM_START is odd, so the first nibble is a low nibble.
    let first = CHECKSUM_START / 2;
    let mut sum = frame[first] & 0x0f;

    let rest = count - 1;
    let whole = rest / 2;
    for byte in &frame[first + 1..first + 1 + whole] {
        sum = sum.wrapping_add(byte >> 4).wrapping_add(byte & 0x0f);
    }
    if rest % 2 == 1 {
        sum = sum.wrapping_add(frame[first + 1 + whole] >> 4);
    }
    sum
}

#[rustfmt::skip]
const CRC8_TABLE: [u8; 256] = [
    0x00, 0x07, 0x0E, 0x09, 0x1C, 0x1B, 0x12, 0x15, 0x38, 0x3F, 0x36, 0x31, 0x24, 0x23, 0x2A, 0x2D,
    0x70, 0x77, 0x7E, 0x79, 0x6C, 0x6B, 0x62, 0x65, 0x48, 0x4F, 0x46, 0x41, 0x54, 0x53, 0x5A, 0x5D,
    0xE0, 0xE7, 0xEE, 0xE9, 0xFC, 0xFB, 0xF2, 0xF5, 0xD8, 0xDF, 0xD6, 0xD1, 0xC4, 0xC3, 0xCA, 0xCD,
    0x90, 0x97, 0x9E, 0x99, 0x8C, 0x8B, 0x82, 0x85, 0xA8, 0xAF, 0xA6, 0xA1, 0xB4, 0xB3, 0xBA, 0xBD,
    0xC7, 0xC0, 0xC9, 0xCE, 0xDB, 0xDC, 0xD5, 0xD2, 0xFF, 0xF8, 0xF1, 0xF6, 0xE3, 0xE4, 0xED, 0xEA,
    0xB7, 0xB0, 0xB9, 0xBE, 0xAB, 0xAC, 0xA5, 0xA2, 0x8F, 0x88, 0x81, 0x86, 0x93, 0x94, 0x9D, 0x9A,
    0x27, 0x20, 0x29, 0x2E, 0x3B, 0x3C, 0x35, 0x32, 0x1F, 0x18, 0x11, 0x16, 0x03, 0x04, 0x0D, 0x0A,
    0x57, 0x50, 0x59, 0x5E, 0x4B, 0x4C, 0x45, 0x42, 0x6F, 0x68, 0x61, 0x66, 0x73, 0x74, 0x7D, 0x7A,
    0x89, 0x8E, 0x87, 0x80, 0x95, 0x92, 0x9B, 0x9C, 0xB1, 0xB6, 0xBF, 0xB8, 0xAD, 0xAA, 0xA3, 0xA4,
    0xF9, 0xFE, 0xF7, 0xF0, 0xE5, 0xE2, 0xEB, 0xEC, 0xC1, 0xC6, 0xCF, 0xC8, 0xDD, 0xDA, 0xD3, 0xD4,
    0x69, 0x6E, 0x67, 0x60, 0x75, 0x72, 0x7B, 0x7C, 0x51, 0x56, 0x5F, 0x58, 0x4D, 0x4A, 0x43, 0x44,
    0x19, 0x1E, 0x17, 0x10, 0x05, 0x02, 0x0B, 0x0C, 0x21, 0x26, 0x2F, 0x28, 0x3D, 0x3A, 0x33, 0x34,
    0x4E, 0x49, 0x40, 0x47, 0x52, 0x55, 0x5C, 0x5B, 0x76, 0x71, 0x78, 0x7F, 0x6A, 0x6D, 0x64, 0x63,
    0x3E, 0x39, 0x30, 0x37, 0x22, 0x25, 0x2C, 0x2B, 0x06, 0x01, 0x08, 0x0F, 0x1A, 0x1D, 0x14, 0x13,
    0xAE, 0xA9, 0xA0, 0xA7, 0xB2, 0xB5, 0xBC, 0xBB, 0x96, 0x91, 0x98, 0x9F, 0x8A, 0x8D, 0x84, 0x83,
    0xDE, 0xD9, 0xD0, 0xD7, 0xC2, 0xC5, 0xCC, 0xCB, 0xE6, 0xE1, 0xE8, 0xEF, 0xFA, 0xFD, 0xF4, 0xF3,
];

/// CRC-8, polynomial 0x07, initial value 0x00.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Crc8(u8);

impl Crc8 {
    const POLYNOMIAL: u8 = 0x07;

    pub fn value(self) -> u8 {
        self.0
    }

    /// Feeds one nibble: it enters the top of the register, then four
    /// shift rounds.
    pub fn update_nibble(&mut self, nibble: u8) {
        let mut crc = self.0 ^ (nibble << 4);
        for _ in 0..4 {
            if bit_is_set(crc, 7) {
                crc = (crc << 1) ^ Self::POLYNOMIAL;
            } else {
                crc <<= 1;
            }
        }
        self.0 = crc;
    }

    /// Feeds a whole byte through the lookup table. Same result as feeding
    /// its high then low nibble.
    pub fn update_byte(&mut self, byte: u8) {
        self.0 = CRC8_TABLE[(self.0 ^ byte) as usize];
    }
}

/// Nibble-wise CRC over the checksum range.
pub fn crc8(frame: &[u8], count: usize) -> u8 {
    let mut crc = Crc8::default();
    for value in nibble::range(frame, CHECKSUM_START, count) {
        crc.update_nibble(value);
    }
    crc.value()
}

/// Table-driven CRC over the checksum range. Nibble pairs are fed as bytes;
/// an odd trailing nibble goes through the bitwise step.
pub fn crc8_table(frame: &[u8], count: usize) -> u8 {
    let mut crc = Crc8::default();
    let mut index = CHECKSUM_START;
    let end = CHECKSUM_START + count;
    while index + 1 < end {
        crc.update_byte((nibble::get(frame, index) << 4) | nibble::get(frame, index + 1));
        index += 2;
    }
    if index < end {
        crc.update_nibble(nibble::get(frame, index));
    }
    crc.value()
}

/// Writes both checksums right after the covered range: additive checksum
/// then CRC, each nibble-swapped so its low nibble goes out first.
pub fn append(frame: &mut [u8], count: usize) {
    let end = CHECKSUM_START + count;
    let sum = swap_nibbles(oregon_sum(frame, count));
    let crc = swap_nibbles(crc8(frame, count));
    nibble::set_byte(frame, end, sum);
    nibble::set_byte(frame, end + 2, crc);
}

/// The two checksum bytes as stored in the frame (still nibble-swapped).
pub fn stored(frame: &[u8], count: usize) -> (u8, u8) {
    let end = CHECKSUM_START + count;
    let read = |index| (nibble::get(frame, index) << 4) | nibble::get(frame, index + 1);
    (read(end), read(end + 2))
}

/// True when both stored checksums match the covered nibbles.
pub fn verify(frame: &[u8], count: usize) -> bool {
    let (sum, crc) = stored(frame, count);
    swap_nibbles(sum) == oregon_sum(frame, count) && swap_nibbles(crc) == crc8(frame, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crc_of_byte(byte: u8) -> (u8, u8) {
        let mut bitwise = Crc8::default();
        bitwise.update_nibble(byte >> 4);
        bitwise.update_nibble(byte & 0x0f);
        let mut table = Crc8::default();
        table.update_byte(byte);
        (bitwise.value(), table.value())
    }

    #[test]
    fn crc_reference_values() {
        assert_eq!(crc_of_byte(0x00), (0x00, 0x00));
        assert_eq!(crc_of_byte(0x01), (0x07, 0x07));
        // CRC-8/SMBUS check value over "123456789"
        let mut crc = Crc8::default();
        for byte in b"123456789" {
            crc.update_byte(*byte);
        }
        assert_eq!(crc.value(), 0xf4);
    }

    #[test]
    fn crc_table_matches_bitwise_for_every_byte() {
        for byte in 0..=255u8 {
            let (bitwise, table) = crc_of_byte(byte);
            assert_eq!(bitwise, table, "byte {:#04x}", byte);
        }
    }

    #[test]
    fn crc_forms_agree_over_odd_and_even_ranges() {
        let frame = [0xff, 0xff, 0xff, 0xad, 0x87, 0x41, 0x12, 0x01, 0x93, 0x5c, 0x77, 0x00, 0x00];
        for count in 1..=15 {
            assert_eq!(crc8(&frame, count), crc8_table(&frame, count), "count {}", count);
        }
    }

    #[test]
    fn sum_matches_plain_nibble_sum() {
        let frame = [0xff, 0xff, 0xff, 0xad, 0x87, 0x41, 0x12, 0x01, 0x93, 0x5c, 0x77, 0xe0, 0x00];
        for count in 0..=16 {
            let expected = nibble::range(&frame, CHECKSUM_START, count)
                .fold(0u8, |sum, value| sum.wrapping_add(value));
            assert_eq!(oregon_sum(&frame, count), expected, "count {}", count);
        }
        // d + 8 + 7 + 4 + 1 + 1 + 2 + 0 + 1
        assert_eq!(oregon_sum(&frame, 9), 0x25);
    }

    #[test]
    fn append_splits_across_bytes_when_range_ends_mid_byte() {
        // 8 covered nibbles end on nibble 14, the high half of byte 7
        let mut frame = [0xff, 0xff, 0xff, 0xad, 0x87, 0x41, 0x12, 0x00, 0x00, 0x00];
        append(&mut frame, 8);
        let sum = oregon_sum(&frame, 8);
        let crc = crc8(&frame, 8);
        assert_eq!(frame[7], sum & 0x0f);
        assert_eq!(frame[8], (sum & 0xf0) | (crc & 0x0f));
        assert_eq!(frame[9], crc & 0xf0);
        assert!(verify(&frame, 8));
    }

    #[test]
    fn append_aligned_writes_last_two_bytes() {
        let mut frame = [0xff, 0xff, 0xff, 0xad, 0x87, 0x41, 0x12, 0x01, 0x00, 0x00];
        append(&mut frame, 9);
        assert_eq!(frame[8], swap_nibbles(oregon_sum(&frame, 9)));
        assert_eq!(frame[9], swap_nibbles(crc8(&frame, 9)));
        assert!(verify(&frame, 9));

        frame[5] ^= 0x01;
        assert!(!verify(&frame, 9));
    }
}
