//! Chunk type tags and fixed sizes of the Standard MIDI File container

/// Tag opening the header chunk
pub const HEADER_CHUNK: [u8; 4] = *b"MThd";

/// Tag opening every track chunk
pub const TRACK_DATA_CHUNK: [u8; 4] = *b"MTrk";

/// Length every well formed header chunk declares
pub const HEADER_LENGTH: usize = 6;

/// Bytes taken by a chunk preamble, tag plus big-endian length
pub const CHUNK_PREAMBLE_LENGTH: usize = 8;
