//! Meta Event interpretation

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Meta type of the end of track marker
pub const META_END_OF_TRACK: u8 = 0x2F;
/// Meta type of a tempo change
pub const META_SET_TEMPO: u8 = 0x51;

/// A meta level event, borrowing its payload from the track bytes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaEvent<'a> {
    /// Sequence Number, tag 0x00
    SequenceNumber(u16),
    /// Text metadata, tag 0x01
    Text(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Copyright, tag 0x02
    Copyright(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Track name, tag 0x03
    TrackName(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Instrument name, tag 0x04
    InstrumentName(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Lyric, tag 0x05
    Lyric(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Marker, tag 0x06
    Marker(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Cue Point, tag 0x07
    CuePoint(#[cfg_attr(feature = "serde", serde(borrow))] Cow<'a, str>),
    /// Midi Channel Prefix, tag 0x20
    MidiChannelPrefix(u8),
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Microseconds per quarter note, tag 0x51
    Tempo(u32),
    /// Time signature, tag 0x58
    TimeSignature(TimeSignature),
    /// Key Signature, tag 0x59
    KeySignature(KeySignature),
    /// Sequencer Specific, tag 0x7f
    SequencerSpecific(#[cfg_attr(feature = "serde", serde(borrow))] &'a [u8]),
    /// Any other meta event
    Unknown(u8, #[cfg_attr(feature = "serde", serde(borrow))] &'a [u8]),
}

/// A meta event whose payload does not have the length its type requires
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Meta event {tag:#04x} expects {expected} bytes of data, found {found}")]
pub struct InvalidMetaEvent {
    /// Meta type byte
    pub tag: u8,
    /// Payload length the type requires
    pub expected: usize,
    /// Payload length present
    pub found: usize,
}

/// A Time Signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSignature {
    /// The time signature's numerator
    pub numerator: u8,
    /// The time signature's denominator
    pub denominator: u32,
    /// MIDI clocks per metronome click
    pub clocks_per_click: u8,
    /// Thirty second notes per quarter
    pub thirty_second_notes_per_quarter: u8,
}

/// A key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeySignature {
    /// Sharps when positive, flats when negative
    pub sharps_flats: i8,
    /// True for a minor key
    pub minor: bool,
}

impl<'a> MetaEvent<'a> {
    /// Interprets the payload of a meta event of type `tag`. Text is decoded lossily
    pub fn parse(tag: u8, data: &'a [u8]) -> Result<Self, InvalidMetaEvent> {
        let expect = |expected: usize| {
            if data.len() == expected {
                Ok(())
            } else {
                Err(InvalidMetaEvent {
                    tag,
                    expected,
                    found: data.len(),
                })
            }
        };
        let text = || String::from_utf8_lossy(data);

        let event = match tag {
            0x00 => {
                expect(2)?;
                MetaEvent::SequenceNumber(u16::from_be_bytes([data[0], data[1]]))
            }
            0x01 => MetaEvent::Text(text()),
            0x02 => MetaEvent::Copyright(text()),
            0x03 => MetaEvent::TrackName(text()),
            0x04 => MetaEvent::InstrumentName(text()),
            0x05 => MetaEvent::Lyric(text()),
            0x06 => MetaEvent::Marker(text()),
            0x07 => MetaEvent::CuePoint(text()),
            0x20 => {
                expect(1)?;
                MetaEvent::MidiChannelPrefix(data[0])
            }
            META_END_OF_TRACK => MetaEvent::EndOfTrack,
            META_SET_TEMPO => {
                expect(3)?;
                MetaEvent::Tempo(u32::from_be_bytes([0, data[0], data[1], data[2]]))
            }
            0x58 => {
                expect(4)?;
                MetaEvent::TimeSignature(TimeSignature {
                    numerator: data[0],
                    denominator: 1u32.checked_shl(u32::from(data[1])).unwrap_or(0),
                    clocks_per_click: data[2],
                    thirty_second_notes_per_quarter: data[3],
                })
            }
            0x59 => {
                expect(2)?;
                MetaEvent::KeySignature(KeySignature {
                    sharps_flats: data[0] as i8,
                    minor: data[1] != 0,
                })
            }
            0x7F => MetaEvent::SequencerSpecific(data),
            other => MetaEvent::Unknown(other, data),
        };

        Ok(event)
    }
}
