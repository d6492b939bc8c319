//! Result block decoding.

use nom::number::complete::le_u16;
use nom::IResult;

use crate::error::{Error, Result};
use crate::flags::StatusFlags;

/// One captured measurement. Immutable once decoded; lives only until the
/// ranging loop judges it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub uva: u16,
    pub uvb: u16,
    /// Present only when the session reads the 6-byte block.
    pub uvc: Option<u16>,
    pub status: StatusFlags,
}

impl RawSample {
    /// Channel maximum, the reference count the ranging policy judges.
    pub fn reference_count(&self) -> u16 {
        self.uva.max(self.uvb).max(self.uvc.unwrap_or(0))
    }
}

fn channels(input: &[u8], with_uvc: bool) -> IResult<&[u8], (u16, u16, Option<u16>)> {
    let (input, uva) = le_u16(input)?;
    let (input, uvb) = le_u16(input)?;
    if with_uvc {
        let (input, uvc) = le_u16(input)?;
        Ok((input, (uva, uvb, Some(uvc))))
    } else {
        Ok((input, (uva, uvb, None)))
    }
}

/// Decodes a 4- or 6-byte MRES block, least significant byte first per
/// channel, as read starting at the first result register.
pub fn decode_sample(block: &[u8], with_uvc: bool, status: StatusFlags) -> Result<RawSample> {
    let expected = if with_uvc { 6 } else { 4 };
    match channels(block, with_uvc) {
        Ok((_, (uva, uvb, uvc))) => Ok(RawSample {
            uva,
            uvb,
            uvc,
            status,
        }),
        Err(_) => Err(Error::MalformedBlock {
            expected,
            got: block.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_matches, assert_ok_eq};

    #[test]
    fn four_byte_block_is_two_little_endian_words() {
        assert_ok_eq!(
            decode_sample(&[0x34, 0x12, 0x78, 0x56], false, StatusFlags::default()),
            RawSample {
                uva: 0x1234,
                uvb: 0x5678,
                uvc: None,
                status: StatusFlags::default(),
            }
        );
    }

    #[test]
    fn six_byte_block_includes_third_channel() {
        let sample =
            decode_sample(&[0x01, 0x00, 0x02, 0x00, 0x03, 0x00], true, StatusFlags::default())
                .unwrap();
        assert_eq!(sample.uvc, Some(3));
    }

    #[test]
    fn short_block_is_malformed() {
        assert_matches!(
            decode_sample(&[0xAA, 0xBB, 0xCC], false, StatusFlags::default()),
            Err(Error::MalformedBlock {
                expected: 4,
                got: 3
            })
        );
        assert_matches!(
            decode_sample(&[0xAA, 0xBB, 0xCC, 0xDD], true, StatusFlags::default()),
            Err(Error::MalformedBlock {
                expected: 6,
                got: 4
            })
        );
    }

    #[test]
    fn reference_count_is_channel_maximum() {
        let sample = RawSample {
            uva: 120,
            uvb: 450,
            uvc: None,
            status: StatusFlags::default(),
        };
        assert_eq!(sample.reference_count(), 450);

        let sample = RawSample {
            uvc: Some(9000),
            ..sample
        };
        assert_eq!(sample.reference_count(), 9000);
    }
}
