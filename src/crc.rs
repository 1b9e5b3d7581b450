//! CRC-8 checksum used for the link-layer frame trailer.
//!
//! Polynomial `0xAB`, initial register value `0xCD`, computed MSB-first over
//! `src | dst | payload` before bit stuffing is applied.

use crate::consts::{VLC_CRC_INIT, VLC_CRC_POLY};

/// Folds one byte into a running CRC-8 register.
pub(crate) fn crc8_update(crc: u8, byte: u8) -> u8 {
    let mut reg = crc ^ byte;
    for _ in 0..8 {
        reg = if reg & 0x80 != 0 {
            (reg << 1) ^ VLC_CRC_POLY
        } else {
            reg << 1
        };
    }
    reg
}

/// Computes the CRC-8 trailer over a full byte slice, starting from
/// [`VLC_CRC_INIT`].
pub(crate) fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(VLC_CRC_INIT, |crc, &b| crc8_update(crc, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_init_value() {
        assert_eq!(crc8(&[]), VLC_CRC_INIT);
    }

    #[test]
    fn single_bit_flip_changes_the_checksum() {
        let a = crc8(&[0x00, 0x11, 0x22]);
        let b = crc8(&[0x00, 0x11, 0x26]); // bit 3 of the third byte flipped
        assert_ne!(a, b);
    }

    #[test]
    fn crc_is_order_sensitive() {
        let a = crc8(&[0x01, 0x02]);
        let b = crc8(&[0x02, 0x01]);
        assert_ne!(a, b);
    }

    #[test]
    fn crc_is_deterministic() {
        let data = [1, 2, 3, 4, 5];
        assert_eq!(crc8(&data), crc8(&data));
    }
}
