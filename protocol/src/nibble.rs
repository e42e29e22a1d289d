// Nibble addressing. Nibble `n` lives in byte `n / 2`; even nibbles are the
// high half of their byte.

pub fn swap_nibbles(byte: u8) -> u8 {
    (byte << 4) | (byte >> 4)
}

pub fn bit_is_set(byte: u8, bit: u8) -> bool {
    byte & (1 << bit) != 0
}

pub fn get(buf: &[u8], index: usize) -> u8 {
    let byte = buf[index / 2];
    if index % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0f
    }
}

pub fn set(buf: &mut [u8], index: usize, value: u8) {
    let byte = &mut buf[index / 2];
    if index % 2 == 0 {
        *byte = (*byte & 0x0f) | (value << 4);
    } else {
        *byte = (*byte & 0xf0) | (value & 0x0f);
    }
}

/// Writes `byte` as two consecutive nibbles starting at `index`, high nibble
/// first. When `index` is odd the byte straddles two buffer bytes.
pub fn set_byte(buf: &mut [u8], index: usize, byte: u8) {
    set(buf, index, byte >> 4);
    set(buf, index + 1, byte & 0x0f);
}

/// The nibbles `[start, start + count)` of `buf`, in transmission order.
pub fn range(buf: &[u8], start: usize, count: usize) -> impl Iterator<Item = u8> + '_ {
    (start..start + count).map(move |index| get(buf, index))
}
