//! Header Chunk Enum and Struct Definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header chunk data, including format, ntrks and division as 3 16 bit unsigned integers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderChunk {
    /// The MIDI format
    format: Format,
    /// Number of tracks
    ntrks: u16,
    /// Time signature/division
    division: Division,
}

impl HeaderChunk {
    /// The overall organization of the file
    pub fn format(&self) -> Format {
        self.format
    }

    /// Number of track chunks the header announces
    pub fn track_count(&self) -> u16 {
        self.ntrks
    }

    /// Meaning of the delta-times in every track
    pub fn division(&self) -> Division {
        self.division
    }
}

impl TryFrom<(u16, u16, u16)> for HeaderChunk {
    type Error = InvalidFormat;
    fn try_from(value: (u16, u16, u16)) -> Result<Self, Self::Error> {
        let (format, ntrks, division) = value;

        Ok(Self {
            format: format.try_into()?,
            ntrks,
            division: division.into(),
        })
    }
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One,
    /// The file contains one or more sequentially independent single-track patterns
    Two,
}

/// Error struct representing an invalid format specifier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid header format {0}")]
pub struct InvalidFormat(pub u16);

impl TryFrom<u16> for Format {
    type Error = InvalidFormat;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            other => Err(InvalidFormat(other)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence,
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1, bits 14-8 represent the negative SMPTE format,
    /// and bits 7-0 represent ticks per frame
    TimeCodeBased(SmpteTicks),
}

impl Default for Division {
    fn default() -> Self {
        Division::Metrical(96)
    }
}

/// Division defined by time-code-based time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteTicks {
    /// Negated frames per second, the whole high byte read as two's complement
    smpte: i8,
    /// 8 bits of ticks per frame
    tpf: u8,
}

impl SmpteTicks {
    /// Creates a time code division from the negated frame rate and ticks per frame
    pub fn new(smpte: i8, tpf: u8) -> Self {
        Self { smpte, tpf }
    }

    /// Frames per second. -29 stands for 29.97 drop-frame time code, any other value is used
    /// as its magnitude
    pub fn frames_per_second(&self) -> f64 {
        match self.smpte {
            -24 => 24.0,
            -25 => 25.0,
            -29 => 29.97,
            -30 => 30.0,
            other => f64::from(other.unsigned_abs()),
        }
    }

    /// Ticks per frame
    pub fn ticks_per_frame(&self) -> u8 {
        self.tpf
    }
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        const MASK: u16 = 0x7FFF;

        if value & !MASK == 0 {
            Division::Metrical(value)
        } else {
            let [high, low] = value.to_be_bytes();
            Division::TimeCodeBased(SmpteTicks {
                smpte: high as i8,
                tpf: low,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Division, Format, HeaderChunk, InvalidFormat, SmpteTicks};

    #[test]
    fn parsing_division_to_metrical_works() {
        let test: Division = (0x000au16).into();
        let expected = Division::Metrical(10);

        assert_eq!(test, expected)
    }

    #[test]
    fn parsing_division_to_timecode_works() {
        let test: Division = (0xE728u16).into();
        let expected = Division::TimeCodeBased(SmpteTicks { smpte: -25, tpf: 40 });

        assert_eq!(test, expected);

        let test: Division = (0xFFE8u16).into();
        let expected = Division::TimeCodeBased(SmpteTicks {
            smpte: -1,
            tpf: 232,
        });

        assert_eq!(test, expected);

        let test: Division = (0x8bFFu16).into();
        let expected = Division::TimeCodeBased(SmpteTicks {
            smpte: -117,
            tpf: 255,
        });

        assert_eq!(test, expected)
    }

    #[test]
    fn smpte_frame_rates_resolve() {
        assert_eq!(SmpteTicks::new(-24, 4).frames_per_second(), 24.0);
        assert_eq!(SmpteTicks::new(-29, 4).frames_per_second(), 29.97);
        assert_eq!(SmpteTicks::new(-30, 4).frames_per_second(), 30.0);
        assert_eq!(SmpteTicks::new(-12, 4).frames_per_second(), 12.0);
    }

    #[test]
    fn header_chunk_reads_properly() {
        let header_chunk =
            HeaderChunk::try_from((1, 10, 384)).expect("Parse header chunk from payload packets");
        let expected = HeaderChunk {
            format: Format::One,
            ntrks: 10,
            division: Division::Metrical(384),
        };

        assert_eq!(expected, header_chunk);
        assert_eq!(header_chunk.track_count(), 10);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = HeaderChunk::try_from((3, 1, 96));

        assert_eq!(result, Err(InvalidFormat(3)));
    }
}
