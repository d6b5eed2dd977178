//! # smfplay
//!
//! A Standard MIDI File decoder paired with a multi-track scheduler that turns every track of
//! a file into one chronologically ordered stream of musical messages.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. A file
//! opens with one `MThd` header chunk followed by `MTrk` track chunks, each holding a sequence
//! of delta-timed events.
//!
//! - **Streaming decoding**: [`chunk::track::RawEventStream`] decodes one event at a time,
//!   following the running status rule, straight out of the borrowed file bytes.
//! - **Tempo aware merging**: [`play::TrackCombiner`] keeps every track in a min-heap ordered
//!   by the absolute time of its next event and rebuilds it whenever a tempo change shifts the
//!   tick to seconds mapping of every pending track.
//! - **Fail closed**: structural problems are handed once to an [`error::ErrorReporter`] and
//!   the parser carries on producing nothing, rather than aborting.
//!
//! ## Example Usage
//!
//! ```rust
//! use smfplay::{
//!     error::ErrorLog,
//!     file::FileParser,
//!     play::{Device, NoteOn, TrackCombiner},
//! };
//!
//! struct Printer;
//!
//! impl Device for Printer {
//!     fn on_note_on(&mut self, time: f64, note: NoteOn) {
//!         println!("{time:.3}s: note {} at {:.1}Hz", note.key, note.frequency());
//!     }
//! }
//!
//! let bytes = [
//!     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96, // header, 96 ticks per quarter
//!     b'M', b'T', b'r', b'k', 0, 0, 0, 8, // one track of 8 bytes
//!     0x00, 0x90, 60, 100, // note on, middle C
//!     0x00, 0xFF, 0x2F, 0x00, // end of track
//! ];
//!
//! let mut errors = ErrorLog::new();
//! let mut file = FileParser::new(&bytes, &mut errors);
//! let mut combiner = TrackCombiner::from_file(&mut file);
//! combiner.process_all_events(&mut Printer);
//!
//! assert!(errors.is_empty());
//! ```
//!
//! ## Library Structure
//!
//! - **[`reader`]**: byte cursor, big-endian integers, variable length quantities and the
//!   [`reader::MidiReadable`] loading trait.
//! - **[`chunk`]**: chunk tags, the header chunk and the per-track event decoder.
//! - **[`file`]**: [`file::FileParser`], walking the container and handing out tracks.
//! - **[`play`]**: performance state, high level messages, the [`play::Device`] callback
//!   interface, per-track timing and the multi-track combiner.
//! - **[`error`]**: error taxonomy and reporting.

pub mod chunk;
pub mod error;
pub mod file;
pub mod play;
pub mod reader;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a raw MIDI Chunk preamble.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [u8; 4],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The chunk type as text, with non ASCII bytes escaped
    pub fn type_name(&self) -> String {
        self.chunk_type.escape_ascii().to_string()
    }
}

impl From<u64> for Chunk {
    fn from(value: u64) -> Self {
        let high = (value >> 32) as u32;
        let low = value as u32;

        Self {
            chunk_type: high.to_be_bytes(),
            length: low,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Chunk;

    #[test]
    fn chunk_from_raw_u64_behaves_normally() {
        let message = 0x74657374_0000000au64;
        let expected = Chunk {
            chunk_type: *b"test",
            length: 10,
        };

        assert_eq!(expected, message.into())
    }

    #[test]
    fn chunk_type_name_escapes_binary_tags() {
        let chunk: Chunk = 0x4D54_00FF_0000_0000u64.into();

        assert_eq!(chunk.type_name(), "MT\\x00\\xff");
    }
}
