//! Status byte classification

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controller number of the channel volume control change
pub const CONTROLLER_VOLUME: u8 = 7;
/// Controller number of the channel pan control change
pub const CONTROLLER_PAN: u8 = 10;
/// Controller number of the reverb send level control change
pub const CONTROLLER_REVERB: u8 = 91;
/// Controller number of the all notes off channel mode message
pub const CONTROLLER_ALL_NOTES_OFF: u8 = 123;

/// Status byte opening a meta event
pub const META_STATUS: u8 = 0xFF;
/// Status byte opening a system exclusive event
pub const SYSEX_STATUS: u8 = 0xF0;
/// Status byte opening a system exclusive continuation or escape
pub const SYSEX_ESCAPE_STATUS: u8 = 0xF7;

/// The family a status byte belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StatusKind {
    /// Turn Off event, `0x8n`
    NoteOff,
    /// Turn On event, `0x9n`
    NoteOn,
    /// Polyphonic Key Pressure, `0xAn`
    PolyphonicKeyPressure,
    /// Control change, `0xBn`
    ControlChange,
    /// Program change, `0xCn`
    ProgramChange,
    /// Channel Pressure, `0xDn`
    ChannelPressure,
    /// Pitch Wheel Change, `0xEn`
    PitchWheelChange,
    /// `0xF0` or `0xF7`, followed by a length prefixed payload
    SystemExclusive,
    /// `0xF1` to `0xFE`, carrying the status byte itself
    SystemCommon(u8),
    /// `0xFF`, followed by a type byte and a length prefixed payload
    Meta,
}

impl StatusKind {
    /// Classifies a status byte. Returns `None` for data bytes (high bit clear)
    pub fn of(status: u8) -> Option<Self> {
        if status & 0x80 == 0 {
            return None;
        }

        let kind = match status >> 4 {
            0x8 => Self::NoteOff,
            0x9 => Self::NoteOn,
            0xA => Self::PolyphonicKeyPressure,
            0xB => Self::ControlChange,
            0xC => Self::ProgramChange,
            0xD => Self::ChannelPressure,
            0xE => Self::PitchWheelChange,
            _ => match status {
                SYSEX_STATUS | SYSEX_ESCAPE_STATUS => Self::SystemExclusive,
                META_STATUS => Self::Meta,
                other => Self::SystemCommon(other),
            },
        };

        Some(kind)
    }

    /// Number of data bytes following the status. Length prefixed events report 0, their
    /// payload is read separately
    pub fn data_len(&self) -> usize {
        match self {
            Self::ProgramChange | Self::ChannelPressure => 1,
            Self::NoteOff
            | Self::NoteOn
            | Self::PolyphonicKeyPressure
            | Self::ControlChange
            | Self::PitchWheelChange => 2,
            Self::SystemCommon(0xF1 | 0xF3) => 1,
            Self::SystemCommon(0xF2) => 2,
            Self::SystemCommon(_) | Self::SystemExclusive | Self::Meta => 0,
        }
    }

    /// True for the families addressed to one of the 16 channels
    pub fn is_channel_message(&self) -> bool {
        !matches!(
            self,
            Self::SystemExclusive | Self::SystemCommon(_) | Self::Meta
        )
    }
}
