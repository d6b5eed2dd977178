//! Byte level reading primitives. Big-endian integers, MIDI variable length quantities and the
//! [`MidiReadable`] trait that turns paths or buffers into the bytes of a MIDI file

use std::{convert::Infallible, path::Path};

use thiserror::Error;

use crate::{chunk::chunk_types::CHUNK_PREAMBLE_LENGTH, Chunk};

/// The longest variable length quantity the Standard MIDI File format allows
pub const MAX_VLQ_BYTES: usize = 4;

/// Failure while decoding a variable length quantity
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VlqError {
    /// The source ran out before a byte with a clear continuation bit was seen
    #[error("Source exhausted while reading variable length quantity (partial value {partial})")]
    Exhausted {
        /// Whatever had been accumulated before the source ran dry
        partial: u32,
    },
    /// More than [`MAX_VLQ_BYTES`] bytes had their continuation bit set
    #[error("Variable length quantity longer than {MAX_VLQ_BYTES} bytes")]
    TooLong,
}

/// Cursor over a borrowed byte window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteReader<'a> {
    /// The window being read
    bytes: &'a [u8],
    /// Offset of the next unread byte
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Offset of the next unread byte from the start of the window
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// True once every byte of the window has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Looks at the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    /// Reads a single byte
    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Some(byte)
    }

    /// Reads a big-endian `u16`. Nothing is consumed if fewer than 2 bytes remain
    pub fn read_u16_be(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a big-endian `u32`. Nothing is consumed if fewer than 4 bytes remain
    pub fn read_u32_be(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads an 8 byte chunk preamble, the 4 character tag followed by the data length
    pub fn read_chunk(&mut self) -> Option<Chunk> {
        let bytes = self.take(CHUNK_PREAMBLE_LENGTH)?;
        let mut raw = [0u8; CHUNK_PREAMBLE_LENGTH];
        raw.copy_from_slice(bytes);

        Some(u64::from_be_bytes(raw).into())
    }

    /// Takes exactly `n` bytes, or nothing at all if the window is too short
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            return None;
        }

        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        Some(slice)
    }

    /// Takes up to `n` bytes, stopping early at the end of the window
    pub fn take_up_to(&mut self, n: usize) -> &'a [u8] {
        let n = n.min(self.remaining());
        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        slice
    }

    /// Decodes a MIDI variable length quantity, 7 bits per byte, most significant group first.
    /// Decoding continues while a byte's high bit is set
    pub fn read_vlq(&mut self) -> Result<u32, VlqError> {
        let mut value: u32 = 0;

        for _ in 0..MAX_VLQ_BYTES {
            let Some(byte) = self.read_u8() else {
                return Err(VlqError::Exhausted { partial: value });
            };

            value = (value << 7) | u32::from(byte & 0x7F);

            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }

        Err(VlqError::TooLong)
    }
}

/// Trait that allows for different types to be translated to a MIDI parseable format
pub trait MidiReadable {
    /// Error type that may be returned while loading
    type Error;
    /// Loads every byte of the MIDI file
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error>;
}

/// Wrapper struct to allow passing `Vec<u8>` to [`MidiReadable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiData(pub Vec<u8>);

impl MidiReadable for MidiData {
    type Error = Infallible;
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.0)
    }
}

impl<PATH> MidiReadable for PATH
where
    PATH: AsRef<Path>,
{
    type Error = std::io::Error;
    fn get_midi_bytes(self) -> Result<Vec<u8>, Self::Error> {
        std::fs::read(self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteReader, MidiData, MidiReadable, VlqError};
    use crate::{chunk::chunk_types::TRACK_DATA_CHUNK, Chunk};

    /// Encodes `value` as a MIDI variable length quantity
    fn to_midi_vlq(mut value: u32) -> Vec<u8> {
        let mut bytes = Vec::new();

        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;

            if !bytes.is_empty() {
                byte |= 0x80;
            }

            bytes.push(byte);

            if value == 0 {
                break;
            }
        }

        bytes.reverse();
        bytes
    }

    #[test]
    fn delta_time_parsed() {
        let bytes = [0x81, 0x40];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_vlq(), Ok(192));
        assert!(reader.is_empty());
    }

    #[test]
    fn vlq_survives_encoding_across_byte_boundaries() {
        let boundaries = [
            0,
            1,
            0x7F,
            0x80,
            0x2000,
            0x3FFF,
            0x4000,
            0x1F_FFFF,
            0x20_0000,
            0x0FFF_FFFF,
        ];

        for value in boundaries {
            let encoded = to_midi_vlq(value);
            assert!(encoded.len() <= 4);

            let mut reader = ByteReader::new(&encoded);
            assert_eq!(reader.read_vlq(), Ok(value), "value {value:#x}");
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn vlq_stops_on_clear_high_bit() {
        let bytes = [0x00, 0x90];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_vlq(), Ok(0));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn vlq_exhaustion_keeps_partial_value() {
        let bytes = [0x81, 0x81];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_vlq(), Err(VlqError::Exhausted { partial: 0x81 }));

        let mut empty = ByteReader::new(&[]);
        assert_eq!(empty.read_vlq(), Err(VlqError::Exhausted { partial: 0 }));
    }

    #[test]
    fn vlq_longer_than_four_bytes_is_rejected() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_vlq(), Err(VlqError::TooLong));
    }

    #[test]
    fn big_endian_reads_do_not_consume_on_short_input() {
        let bytes = [0x12, 0x34, 0x56];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_u32_be(), None);
        assert_eq!(reader.read_u16_be(), Some(0x1234));
        assert_eq!(reader.read_u16_be(), None);
        assert_eq!(reader.read_u8(), Some(0x56));
        assert_eq!(reader.read_u8(), None);
    }

    #[test]
    fn chunk_preamble_reads_tag_and_length() {
        let bytes = [b'M', b'T', b'r', b'k', 0, 0, 1, 2, 0xAA];
        let mut reader = ByteReader::new(&bytes);
        let chunk = reader.read_chunk().expect("Read chunk preamble");

        assert_eq!(chunk.chunk_type, TRACK_DATA_CHUNK);
        assert_eq!(chunk.len(), 0x102);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn take_up_to_clamps_to_window() {
        let bytes = [1, 2, 3];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.take(4), None);
        assert_eq!(reader.take_up_to(10), &[1, 2, 3]);
        assert!(reader.is_empty());
    }

    #[test]
    fn midi_data_streams_owned_bytes() {
        let data = MidiData(vec![1, 2, 3]);
        let bytes = data.get_midi_bytes();

        assert_eq!(bytes, Ok(vec![1, 2, 3]));
    }

    #[test]
    fn missing_path_reports_io_error() {
        let result = "this/file/does/not/exist.mid".get_midi_bytes();

        assert!(result.is_err());
    }

    #[test]
    fn chunk_type_is_copied_from_reader() {
        let chunk: Chunk = 0x4D54726B_00000000u64.into();
        assert_eq!(chunk.chunk_type, TRACK_DATA_CHUNK);
        assert!(chunk.is_empty());
    }
}
