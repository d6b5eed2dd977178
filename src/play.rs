//! Playback of decoded tracks: the shared [`DeviceState`], the [`Message`]s handed to a
//! [`Device`], per-track timing in [`TrackParser`] and the chronological merge of all tracks in
//! [`TrackCombiner`]

pub mod combiner;
pub mod device;
pub mod message;
pub mod state;
pub mod track;

pub use combiner::TrackCombiner;
pub use device::{Device, MessageLog};
pub use message::{Message, NoteOff, NoteOn, PitchBend};
pub use state::DeviceState;
pub use track::TrackParser;
