//! High level messages decoded from raw track events

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{device::Device, state::DeviceState};
use crate::chunk::track::{
    status::{
        StatusKind, CONTROLLER_ALL_NOTES_OFF, CONTROLLER_PAN, CONTROLLER_REVERB,
        CONTROLLER_VOLUME,
    },
    RawEvent,
};

/// Key number of the A above middle C
const A4_KEY: f32 = 69.0;
/// Frequency of the A above middle C
const A4_FREQUENCY: f32 = 440.0;

/// A key being pressed
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoteOn {
    /// Channel the note plays on
    pub channel: u8,
    /// Key number, 60 is middle C
    pub key: u8,
    /// Strike velocity, never 0
    pub velocity: u8,
    /// Program selected on the channel when the note started
    pub instrument: u8,
    /// Channel volume when the note started
    pub volume: u8,
}

impl NoteOn {
    /// Equal tempered frequency in Hz, tuned to A4 = 440Hz
    pub fn frequency(&self) -> f32 {
        A4_FREQUENCY * ((f32::from(self.key) - A4_KEY) / 12.0).exp2()
    }

    /// Octave of the key, middle C starts octave 4
    pub fn octave(&self) -> i8 {
        (self.key / 12) as i8 - 1
    }

    /// Semitone within the octave, C is 0
    pub fn pitch_class(&self) -> u8 {
        self.key % 12
    }
}

/// A key being released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoteOff {
    /// Channel the note played on
    pub channel: u8,
    /// Key number
    pub key: u8,
    /// Release velocity
    pub velocity: u8,
}

/// Pitch wheel position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PitchBend {
    /// Channel being bent
    pub channel: u8,
    /// 14 bit wheel position, 0x2000 is centered
    pub value: u16,
}

impl PitchBend {
    /// Wheel position centered value
    pub const CENTER: u16 = 0x2000;

    /// Builds the 14 bit value from the least and most significant data bytes
    pub fn from_data(channel: u8, lsb: u8, msb: u8) -> Self {
        Self {
            channel,
            value: (u16::from(msb & 0x7F) << 7) | u16::from(lsb & 0x7F),
        }
    }

    /// Wheel position scaled to `[-1, 1)`
    pub fn bend(&self) -> f32 {
        (f32::from(self.value) - f32::from(Self::CENTER)) / f32::from(Self::CENTER)
    }
}

/// Every message a [`Device`] can receive
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Message {
    /// A key being pressed
    NoteOn(NoteOn),
    /// A key being released
    NoteOff(NoteOff),
    /// Pitch wheel movement
    PitchBend(PitchBend),
    /// Every sounding note on a channel should stop
    AllNotesOff {
        /// Channel to silence
        channel: u8,
    },
    /// Channel pan changed
    ChannelPanChange {
        /// Channel affected
        channel: u8,
        /// New pan, 64 is centered
        pan: u8,
    },
    /// Channel volume changed
    ChannelVolumeChange {
        /// Channel affected
        channel: u8,
        /// New volume
        volume: u8,
    },
    /// Channel reverb send changed
    ChannelReverbChange {
        /// Channel affected
        channel: u8,
        /// New reverb send level
        reverb: u8,
    },
    /// Channel program changed
    ChannelProgramChange {
        /// Channel affected
        channel: u8,
        /// New program number
        program: u8,
    },
}

impl Message {
    /// Translates a raw event into the message a device should receive, if any. Note on
    /// events pick up the channel's current instrument and volume from `state`
    pub fn decode(event: &RawEvent<'_>, state: &DeviceState) -> Option<Self> {
        let channel = event.channel();
        let (data0, data1) = (event.data0(), event.data1());

        let note_off = Message::NoteOff(NoteOff {
            channel,
            key: data0,
            velocity: data1,
        });

        let message = match event.kind() {
            StatusKind::NoteOff => note_off,
            // Velocity 0 is the running status friendly way of writing a note off
            StatusKind::NoteOn if data1 == 0 => note_off,
            StatusKind::NoteOn => Message::NoteOn(NoteOn {
                channel,
                key: data0,
                velocity: data1,
                instrument: state.instrument(channel),
                volume: state.volume(channel),
            }),
            StatusKind::PitchWheelChange => {
                Message::PitchBend(PitchBend::from_data(channel, data0, data1))
            }
            StatusKind::ProgramChange => Message::ChannelProgramChange {
                channel,
                program: data0,
            },
            StatusKind::ControlChange => match data0 {
                CONTROLLER_VOLUME => Message::ChannelVolumeChange {
                    channel,
                    volume: data1,
                },
                CONTROLLER_PAN => Message::ChannelPanChange { channel, pan: data1 },
                CONTROLLER_REVERB => Message::ChannelReverbChange {
                    channel,
                    reverb: data1,
                },
                CONTROLLER_ALL_NOTES_OFF => Message::AllNotesOff { channel },
                _ => return None,
            },
            _ => return None,
        };

        Some(message)
    }

    /// Hands the message to the matching device callback
    pub fn dispatch<D>(self, time: f64, device: &mut D)
    where
        D: Device + ?Sized,
    {
        match self {
            Message::NoteOn(note) => device.on_note_on(time, note),
            Message::NoteOff(note) => device.on_note_off(time, note),
            Message::PitchBend(bend) => device.on_pitch_bend(time, bend),
            Message::AllNotesOff { channel } => device.on_all_notes_off(time, channel),
            Message::ChannelPanChange { channel, pan } => {
                device.on_channel_pan_change(time, channel, pan)
            }
            Message::ChannelVolumeChange { channel, volume } => {
                device.on_channel_volume_change(time, channel, volume)
            }
            Message::ChannelReverbChange { channel, reverb } => {
                device.on_channel_reverb_change(time, channel, reverb)
            }
            Message::ChannelProgramChange { channel, program } => {
                device.on_channel_program_change(time, channel, program)
            }
        }
    }
}
