//! Builders for Standard MIDI File fixtures
#![allow(dead_code)]

/// Encodes `value` as a MIDI variable length quantity
pub fn vlq(mut value: u32) -> Vec<u8> {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    bytes
}

/// Event by event builder of a track chunk's data
#[derive(Debug, Default, Clone)]
pub struct TrackBuilder {
    bytes: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a delta time and raw event bytes
    pub fn event(mut self, delay: u32, event: &[u8]) -> Self {
        self.bytes.extend(vlq(delay));
        self.bytes.extend(event);
        self
    }

    pub fn note_on(self, delay: u32, channel: u8, key: u8, velocity: u8) -> Self {
        self.event(delay, &[0x90 | channel, key, velocity])
    }

    pub fn note_off(self, delay: u32, channel: u8, key: u8) -> Self {
        self.event(delay, &[0x80 | channel, key, 0])
    }

    pub fn tempo(self, delay: u32, micros_per_quarter: u32) -> Self {
        let [_, a, b, c] = micros_per_quarter.to_be_bytes();
        self.event(delay, &[0xFF, 0x51, 0x03, a, b, c])
    }

    pub fn end(self, delay: u32) -> Self {
        self.event(delay, &[0xFF, 0x2F, 0x00])
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A header chunk
pub fn header(format: u16, track_count: u16, division: u16) -> Vec<u8> {
    let mut bytes = b"MThd".to_vec();
    bytes.extend(6u32.to_be_bytes());
    bytes.extend(format.to_be_bytes());
    bytes.extend(track_count.to_be_bytes());
    bytes.extend(division.to_be_bytes());
    bytes
}

/// A track chunk wrapping `data`
pub fn track_chunk(data: &[u8]) -> Vec<u8> {
    let mut bytes = b"MTrk".to_vec();
    bytes.extend((data.len() as u32).to_be_bytes());
    bytes.extend(data);
    bytes
}

/// A complete format 1 file whose header announces exactly the tracks given
pub fn smf(division: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = header(1, tracks.len() as u16, division);
    for track in tracks {
        bytes.extend(track_chunk(track));
    }
    bytes
}
