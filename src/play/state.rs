//! Performance state shared by every track of a file

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chunk::{
    header::Division,
    track::{
        meta::META_SET_TEMPO,
        status::{StatusKind, CONTROLLER_PAN, CONTROLLER_REVERB, CONTROLLER_VOLUME},
        RawEvent,
    },
};

/// Number of MIDI channels
pub const CHANNEL_COUNT: usize = 16;

/// Tempo every file starts at, 120 beats per minute
pub const DEFAULT_MICROS_PER_QUARTER_NOTE: u32 = 500_000;

/// Channel volume before any volume control change
pub const DEFAULT_VOLUME: u8 = 100;
/// Channel pan before any pan control change, centered
pub const DEFAULT_PAN: u8 = 64;
/// Channel reverb send before any reverb control change
pub const DEFAULT_REVERB: u8 = 40;

/// Mutable state of one performance. Tempo is global, so a single instance is shared by
/// every track being played together
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceState {
    /// Seconds per tick under the current tempo
    tick_duration: f64,
    /// Time division from the file header
    division: Division,
    /// Program selected on each channel
    instruments: [u8; CHANNEL_COUNT],
    /// Volume of each channel
    volumes: [u8; CHANNEL_COUNT],
    /// Pan of each channel
    pans: [u8; CHANNEL_COUNT],
    /// Reverb send of each channel
    reverbs: [u8; CHANNEL_COUNT],
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(Division::default())
    }
}

impl DeviceState {
    /// Creates the state a file with the given time division starts from
    pub fn new(division: Division) -> Self {
        let tick_duration = match division {
            Division::Metrical(ticks_per_quarter) => {
                1.0 / (2.0 * f64::from(ticks_per_quarter.max(1)))
            }
            Division::TimeCodeBased(smpte) => {
                let frames_per_second = smpte.frames_per_second().max(1.0);
                let ticks_per_frame = f64::from(smpte.ticks_per_frame().max(1));
                1.0 / (frames_per_second * ticks_per_frame)
            }
        };

        Self {
            tick_duration,
            division,
            instruments: [0; CHANNEL_COUNT],
            volumes: [DEFAULT_VOLUME; CHANNEL_COUNT],
            pans: [DEFAULT_PAN; CHANNEL_COUNT],
            reverbs: [DEFAULT_REVERB; CHANNEL_COUNT],
        }
    }

    /// Seconds per tick under the current tempo
    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }

    /// Time division the state was created with
    pub fn division(&self) -> Division {
        self.division
    }

    /// Recomputes the tick duration for a new tempo, keeping ticks per quarter note fixed.
    /// Time code divisions measure absolute time and ignore tempo
    pub fn set_tempo(&mut self, micros_per_quarter_note: u32) {
        match self.division {
            Division::Metrical(ticks_per_quarter) => {
                let seconds_per_quarter = f64::from(micros_per_quarter_note.max(1)) / 1_000_000.0;
                self.tick_duration = seconds_per_quarter / f64::from(ticks_per_quarter.max(1));
                log::debug!(
                    "Tempo set to {micros_per_quarter_note}us per quarter note, {}s per tick",
                    self.tick_duration
                );
            }
            Division::TimeCodeBased(_) => {
                log::debug!("Ignoring tempo change under a time code division");
            }
        }
    }

    /// Program selected on a channel
    pub fn instrument(&self, channel: u8) -> u8 {
        self.instruments[Self::index(channel)]
    }

    /// Volume of a channel
    pub fn volume(&self, channel: u8) -> u8 {
        self.volumes[Self::index(channel)]
    }

    /// Pan of a channel
    pub fn pan(&self, channel: u8) -> u8 {
        self.pans[Self::index(channel)]
    }

    /// Reverb send of a channel
    pub fn reverb(&self, channel: u8) -> u8 {
        self.reverbs[Self::index(channel)]
    }

    /// Selects the program of a channel
    pub fn set_instrument(&mut self, channel: u8, program: u8) {
        self.instruments[Self::index(channel)] = program;
    }

    /// Sets the volume of a channel
    pub fn set_volume(&mut self, channel: u8, volume: u8) {
        self.volumes[Self::index(channel)] = volume;
    }

    /// Sets the pan of a channel
    pub fn set_pan(&mut self, channel: u8, pan: u8) {
        self.pans[Self::index(channel)] = pan;
    }

    /// Sets the reverb send of a channel
    pub fn set_reverb(&mut self, channel: u8, reverb: u8) {
        self.reverbs[Self::index(channel)] = reverb;
    }

    /// Applies whatever part of the state an event changes: tempo, program, volume, pan or
    /// reverb. Other events leave the state untouched
    pub fn apply(&mut self, event: &RawEvent<'_>) {
        let channel = event.channel();

        match event.kind() {
            StatusKind::ProgramChange => self.set_instrument(channel, event.data0()),
            StatusKind::ControlChange => match event.data0() {
                CONTROLLER_VOLUME => self.set_volume(channel, event.data1()),
                CONTROLLER_PAN => self.set_pan(channel, event.data1()),
                CONTROLLER_REVERB => self.set_reverb(channel, event.data1()),
                _ => {}
            },
            StatusKind::Meta if event.data0() == META_SET_TEMPO => {
                if let &[a, b, c] = event.metadata() {
                    self.set_tempo(u32::from_be_bytes([0, a, b, c]));
                } else {
                    log::warn!(
                        "Ignoring tempo event with {} bytes of data",
                        event.metadata().len()
                    );
                }
            }
            _ => {}
        }
    }

    /// Array index of a channel, ignoring the status nibble
    fn index(channel: u8) -> usize {
        usize::from(channel & 0x0F)
    }
}
