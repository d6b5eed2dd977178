//! Chunk level definitions: tags, the header chunk and the track event decoder

pub mod chunk_types;
pub mod header;
pub mod track;

use crate::Chunk;
use chunk_types::{HEADER_CHUNK, TRACK_DATA_CHUNK};

impl Chunk {
    /// True if this is an `MThd` header chunk
    pub fn is_header(&self) -> bool {
        self.chunk_type == HEADER_CHUNK
    }

    /// True if this is an `MTrk` track chunk
    pub fn is_track(&self) -> bool {
        self.chunk_type == TRACK_DATA_CHUNK
    }
}
