//! Track chunk decoding. A [`RawEventStream`] turns the bytes of one `MTrk` chunk into
//! [`RawEvent`]s, one at a time.
//!
//! Every event is a variable length delta time followed by a status byte and its data. When a
//! channel message repeats the status of the one before it, the status may be left out
//! ("running status") and the first byte read is already data.
//!
//! Malformed input never panics and never raises: the stream ends at the last complete event
//! and remembers that it was cut short, see [`RawEventStream::is_truncated`].

use meta::{InvalidMetaEvent, MetaEvent, META_END_OF_TRACK};
use status::{StatusKind, META_STATUS};

use crate::reader::ByteReader;

pub mod meta;
pub mod status;

/// One decoded track event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent<'a> {
    /// Ticks to wait after the previous event of the same track
    delay_ticks: u32,
    /// Status byte, always with its high bit set
    status: u8,
    /// Up to two data bytes. For meta events the first holds the meta type
    data: [u8; 2],
    /// Length prefixed payload of meta and system exclusive events
    metadata: &'a [u8],
}

impl<'a> RawEvent<'a> {
    /// Creates an event from its decoded parts
    pub fn new(delay_ticks: u32, status: u8, data0: u8, data1: u8, metadata: &'a [u8]) -> Self {
        Self {
            delay_ticks,
            status,
            data: [data0, data1],
            metadata,
        }
    }

    /// Ticks to wait after the previous event of the same track
    pub fn delay_ticks(&self) -> u32 {
        self.delay_ticks
    }

    /// The status byte, also when it was omitted in the file under running status
    pub fn status(&self) -> u8 {
        self.status
    }

    /// First data byte
    pub fn data0(&self) -> u8 {
        self.data[0]
    }

    /// Second data byte
    pub fn data1(&self) -> u8 {
        self.data[1]
    }

    /// Payload of meta and system exclusive events, empty otherwise
    pub fn metadata(&self) -> &'a [u8] {
        self.metadata
    }

    /// The status family
    pub fn kind(&self) -> StatusKind {
        StatusKind::of(self.status).unwrap_or(StatusKind::SystemCommon(self.status))
    }

    /// Channel addressed by a channel message
    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    /// Meta type byte, if this is a meta event
    pub fn meta_type(&self) -> Option<u8> {
        (self.status == META_STATUS).then_some(self.data[0])
    }

    /// True for the end of track meta event
    pub fn is_end_of_track(&self) -> bool {
        self.meta_type() == Some(META_END_OF_TRACK)
    }

    /// Interprets the payload of a meta event
    pub fn meta(&self) -> Option<Result<MetaEvent<'a>, InvalidMetaEvent>> {
        self.meta_type().map(|tag| MetaEvent::parse(tag, self.metadata))
    }
}

/// Stateful decoder over the bytes of one track chunk
#[derive(Debug, Clone)]
pub struct RawEventStream<'a> {
    /// Unread track bytes
    reader: ByteReader<'a>,
    /// Last channel status seen, reused when a data byte shows up where a status was expected
    running_status: Option<(u8, StatusKind)>,
    /// The decoded event waiting to be consumed
    current: Option<RawEvent<'a>>,
    /// Set once the stream ended on malformed or incomplete input
    truncated: bool,
}

impl<'a> RawEventStream<'a> {
    /// Creates a stream over a track chunk's data and decodes its first event
    pub fn new(bytes: &'a [u8]) -> Self {
        let mut stream = Self {
            reader: ByteReader::new(bytes),
            running_status: None,
            current: None,
            truncated: false,
        };
        stream.current = stream.decode_next();

        stream
    }

    /// True if no further event exists
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// The pending event, without consuming it
    pub fn first(&self) -> Option<&RawEvent<'a>> {
        self.current.as_ref()
    }

    /// Drops the pending event and decodes the next one. An end of track event exhausts the
    /// stream for good, whatever bytes follow it
    pub fn advance(&mut self) {
        debug_assert!(!self.is_empty(), "advance called on an exhausted stream");

        self.current = match self.current {
            Some(event) if !event.is_end_of_track() => self.decode_next(),
            _ => None,
        };
    }

    /// True if the stream ended because its input was malformed or cut short
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Marks the stream as truncated and ends it
    fn truncate<T>(&mut self, reason: &str) -> Option<T> {
        log::warn!(
            "Track data truncated at byte {}: {reason}",
            self.reader.position()
        );
        self.truncated = true;

        None
    }

    /// Decodes the event at the reader's position
    fn decode_next(&mut self) -> Option<RawEvent<'a>> {
        if self.reader.is_empty() {
            return None;
        }

        let delay = match self.reader.read_vlq() {
            Ok(delay) => delay,
            Err(e) => return self.truncate(&e.to_string()),
        };

        let Some(byte) = self.reader.read_u8() else {
            return self.truncate("delta time without an event");
        };

        let (status, kind, data0) = match StatusKind::of(byte) {
            Some(kind) => {
                if kind.is_channel_message() {
                    self.running_status = Some((byte, kind));
                }
                (byte, kind, None)
            }
            None => match self.running_status {
                Some((status, kind)) => (status, kind, Some(byte)),
                None => return self.truncate("data byte without a running status"),
            },
        };

        match kind {
            StatusKind::Meta => {
                let Some(meta_type) = self.reader.read_u8() else {
                    return self.truncate("meta event without a type");
                };
                let metadata = self.read_metadata()?;

                Some(RawEvent::new(delay, status, meta_type, 0, metadata))
            }
            StatusKind::SystemExclusive => {
                let metadata = self.read_metadata()?;

                Some(RawEvent::new(delay, status, 0, 0, metadata))
            }
            kind => {
                let mut data = [0u8; 2];
                let mut filled = 0;

                if let Some(byte) = data0 {
                    data[0] = byte;
                    filled = 1;
                }

                while filled < kind.data_len() {
                    let Some(byte) = self.reader.read_u8() else {
                        return self.truncate("event data cut short");
                    };
                    data[filled] = byte;
                    filled += 1;
                }

                Some(RawEvent::new(delay, status, data[0], data[1], &[]))
            }
        }
    }

    /// Reads a length prefixed payload
    fn read_metadata(&mut self) -> Option<&'a [u8]> {
        let length = match self.reader.read_vlq() {
            Ok(length) => length,
            Err(e) => return self.truncate(&e.to_string()),
        };

        match self.reader.take(length as usize) {
            Some(metadata) => Some(metadata),
            None => self.truncate("payload runs past the end of the track"),
        }
    }
}

impl<'a> Iterator for RawEventStream<'a> {
    type Item = RawEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.current?;
        self.advance();

        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{status::StatusKind, RawEvent, RawEventStream};

    #[test]
    fn running_status_reuses_previous_status() {
        let bytes = [0x00, 0x90, 60, 100, 0x00, 62, 100];
        let events: Vec<_> = RawEventStream::new(&bytes).collect();

        assert_eq!(
            events,
            vec![
                RawEvent::new(0, 0x90, 60, 100, &[]),
                RawEvent::new(0, 0x90, 62, 100, &[]),
            ]
        );
    }

    #[test]
    fn running_status_applies_to_one_byte_messages() {
        let bytes = [0x00, 0xC3, 5, 0x10, 7];
        let mut stream = RawEventStream::new(&bytes);

        assert_eq!(stream.next(), Some(RawEvent::new(0, 0xC3, 5, 0, &[])));
        assert_eq!(stream.next(), Some(RawEvent::new(0x10, 0xC3, 7, 0, &[])));
        assert!(stream.is_empty());
        assert!(!stream.is_truncated());
    }

    #[test]
    fn meta_events_do_not_replace_running_status() {
        let bytes = [
            0x00, 0x90, 60, 100, // note on
            0x00, 0xFF, 0x01, 0x02, b'h', b'i', // text
            0x05, 60, 0, // running status note on
        ];
        let events: Vec<_> = RawEventStream::new(&bytes).collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[1].meta_type(), Some(0x01));
        assert_eq!(events[1].metadata(), b"hi");
        assert_eq!(events[2], RawEvent::new(5, 0x90, 60, 0, &[]));
    }

    #[test]
    fn end_of_track_exhausts_despite_trailing_bytes() {
        let bytes = [0x00, 0xFF, 0x2F, 0x00, 0x00, 0x90, 60, 100];
        let mut stream = RawEventStream::new(&bytes);

        assert!(!stream.is_empty());
        assert!(stream.first().is_some_and(RawEvent::is_end_of_track));

        stream.advance();

        assert!(stream.is_empty());
        assert!(!stream.is_truncated());
    }

    #[test]
    fn repeated_empty_checks_do_not_advance() {
        let bytes = [0x00, 0x90, 60, 100];
        let stream = RawEventStream::new(&bytes);

        for _ in 0..3 {
            assert!(!stream.is_empty());
            assert_eq!(stream.first(), Some(&RawEvent::new(0, 0x90, 60, 100, &[])));
        }
    }

    #[test]
    fn sysex_payload_is_copied_opaquely() {
        let bytes = [0x83, 0x00, 0xF0, 0x03, 0x7E, 0x09, 0xF7];
        let event = RawEventStream::new(&bytes).next().expect("Decode sysex");

        assert_eq!(event.delay_ticks(), 384);
        assert_eq!(event.kind(), StatusKind::SystemExclusive);
        assert_eq!(event.metadata(), &[0x7E, 0x09, 0xF7]);
    }

    #[test]
    fn system_common_events_take_fixed_data_lengths() {
        let bytes = [
            0x00, 0xF2, 0x10, 0x20, // song position
            0x00, 0xF3, 0x05, // song select
            0x00, 0xF1, 0x07, // time code quarter frame
            0x00, 0xF6, // tune request
            0x00, 0x90, 60, 100,
        ];
        let events: Vec<_> = RawEventStream::new(&bytes).collect();

        assert_eq!(
            events,
            vec![
                RawEvent::new(0, 0xF2, 0x10, 0x20, &[]),
                RawEvent::new(0, 0xF3, 0x05, 0, &[]),
                RawEvent::new(0, 0xF1, 0x07, 0, &[]),
                RawEvent::new(0, 0xF6, 0, 0, &[]),
                RawEvent::new(0, 0x90, 60, 100, &[]),
            ]
        );
    }

    #[test]
    fn pitch_bend_carries_two_data_bytes() {
        let bytes = [0x00, 0xE1, 0x00, 0x40];
        let event = RawEventStream::new(&bytes).next().expect("Decode pitch bend");

        assert_eq!(event.channel(), 1);
        assert_eq!((event.data0(), event.data1()), (0x00, 0x40));
    }

    #[test]
    fn empty_track_has_no_events() {
        let stream = RawEventStream::new(&[]);

        assert!(stream.is_empty());
        assert!(!stream.is_truncated());
    }

    #[test]
    fn vlq_cut_short_ends_track() {
        let bytes = [0x00, 0x90, 60, 100, 0x81];
        let events: Vec<_> = {
            let mut stream = RawEventStream::new(&bytes);
            let events = stream.by_ref().collect::<Vec<_>>();
            assert!(stream.is_truncated());
            events
        };

        assert_eq!(events.len(), 1);
    }

    #[test]
    fn truncated_metadata_ends_track() {
        let bytes = [0x00, 0xFF, 0x03, 0x05, b'a', b'b'];
        let stream = RawEventStream::new(&bytes);

        assert!(stream.is_empty());
        assert!(stream.is_truncated());
    }

    #[test]
    fn data_byte_without_running_status_ends_track() {
        let bytes = [0x00, 0x40, 0x40];
        let stream = RawEventStream::new(&bytes);

        assert!(stream.is_empty());
        assert!(stream.is_truncated());
    }

    #[test]
    fn missing_data_byte_ends_track() {
        let bytes = [0x00, 0x90, 60];
        let stream = RawEventStream::new(&bytes);

        assert!(stream.is_empty());
        assert!(stream.is_truncated());
    }

    #[test]
    fn tempo_meta_is_interpreted() {
        let bytes = [0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20];
        let event = RawEventStream::new(&bytes).next().expect("Decode tempo");

        assert_eq!(event.meta(), Some(Ok(super::MetaEvent::Tempo(500_000))));
    }
}
