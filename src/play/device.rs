//! The [`Device`] decoded messages are played on

use super::message::{Message, NoteOff, NoteOn, PitchBend};

/// Receiver of decoded messages, one method per message kind. Every method defaults to doing
/// nothing, so implementors only override what they play.
///
/// `time` is the absolute time of the event in seconds from the start of the performance.
/// Callbacks run synchronously while the combiner is borrowed and cannot reach back into it.
#[allow(unused_variables)]
pub trait Device {
    /// A key was pressed
    fn on_note_on(&mut self, time: f64, note: NoteOn) {}

    /// A key was released
    fn on_note_off(&mut self, time: f64, note: NoteOff) {}

    /// The pitch wheel moved
    fn on_pitch_bend(&mut self, time: f64, bend: PitchBend) {}

    /// Every note on `channel` should stop
    fn on_all_notes_off(&mut self, time: f64, channel: u8) {}

    /// Pan of `channel` changed
    fn on_channel_pan_change(&mut self, time: f64, channel: u8, pan: u8) {}

    /// Volume of `channel` changed
    fn on_channel_volume_change(&mut self, time: f64, channel: u8, volume: u8) {}

    /// Reverb send of `channel` changed
    fn on_channel_reverb_change(&mut self, time: f64, channel: u8, reverb: u8) {}

    /// Program of `channel` changed
    fn on_channel_program_change(&mut self, time: f64, channel: u8, program: u8) {}
}

/// A device that records every message it receives along with its time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLog {
    /// Received messages, in arrival order
    messages: Vec<(f64, Message)>,
}

impl MessageLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Received messages with their times, in arrival order
    pub fn messages(&self) -> &[(f64, Message)] {
        &self.messages
    }

    /// Times of the received messages, in arrival order
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.messages.iter().map(|(time, _)| *time)
    }

    /// Consumes the log, returning what it recorded
    pub fn into_messages(self) -> Vec<(f64, Message)> {
        self.messages
    }
}

impl Device for MessageLog {
    fn on_note_on(&mut self, time: f64, note: NoteOn) {
        self.messages.push((time, Message::NoteOn(note)));
    }

    fn on_note_off(&mut self, time: f64, note: NoteOff) {
        self.messages.push((time, Message::NoteOff(note)));
    }

    fn on_pitch_bend(&mut self, time: f64, bend: PitchBend) {
        self.messages.push((time, Message::PitchBend(bend)));
    }

    fn on_all_notes_off(&mut self, time: f64, channel: u8) {
        self.messages.push((time, Message::AllNotesOff { channel }));
    }

    fn on_channel_pan_change(&mut self, time: f64, channel: u8, pan: u8) {
        self.messages
            .push((time, Message::ChannelPanChange { channel, pan }));
    }

    fn on_channel_volume_change(&mut self, time: f64, channel: u8, volume: u8) {
        self.messages
            .push((time, Message::ChannelVolumeChange { channel, volume }));
    }

    fn on_channel_reverb_change(&mut self, time: f64, channel: u8, reverb: u8) {
        self.messages
            .push((time, Message::ChannelReverbChange { channel, reverb }));
    }

    fn on_channel_program_change(&mut self, time: f64, channel: u8, program: u8) {
        self.messages
            .push((time, Message::ChannelProgramChange { channel, program }));
    }
}
