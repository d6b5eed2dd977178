//! Container level parsing. [`FileParser`] validates the `MThd` header and hands out the data of
//! one `MTrk` chunk at a time.
//!
//! Structural problems are reported once to the parser's [`ErrorReporter`]. From then on the
//! parser fails closed and hands out nothing more.

use crate::{
    chunk::{
        chunk_types::HEADER_LENGTH,
        header::{Division, HeaderChunk},
        track::RawEventStream,
    },
    error::{ErrorKind, ErrorReporter, LogReporter, MidiError},
    play::TrackParser,
    reader::ByteReader,
};

/// A header error, located at the caller
#[track_caller]
fn malformed_header(message: impl Into<String>) -> MidiError {
    MidiError::new(ErrorKind::MalformedHeader, message, 0)
}

/// Where the parser is in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Header read, track chunks may follow
    EmittingTracks,
    /// Every available track has been handed out
    Exhausted,
    /// A structural error stopped parsing
    Errored,
}

/// Walks the chunks of a Standard MIDI File held in memory
#[derive(Debug)]
pub struct FileParser<'a, R = LogReporter>
where
    R: ErrorReporter,
{
    /// Unread file bytes
    reader: ByteReader<'a>,
    /// The parsed header, if it was valid
    header: Option<HeaderChunk>,
    /// Tracks the header announced, lowered to what was found once the file runs out
    track_count: u16,
    /// Tracks handed out so far
    tracks_emitted: u16,
    /// Where the parser is in the file
    state: ParserState,
    /// Receiver of structural errors
    reporter: R,
}

impl<'a> FileParser<'a, LogReporter> {
    /// Creates a parser that logs structural errors
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::new(bytes, LogReporter)
    }
}

impl<'a, R> FileParser<'a, R>
where
    R: ErrorReporter,
{
    /// Reads and validates the header chunk. A malformed header is reported and leaves a
    /// parser that hands out no tracks
    pub fn new(bytes: &'a [u8], reporter: R) -> Self {
        let mut parser = Self {
            reader: ByteReader::new(bytes),
            header: None,
            track_count: 0,
            tracks_emitted: 0,
            state: ParserState::EmittingTracks,
            reporter,
        };

        match parser.read_header() {
            Ok(header) => {
                log::debug!(
                    "Read header: {:?}, {} tracks, {:?}",
                    header.format(),
                    header.track_count(),
                    header.division()
                );
                parser.track_count = header.track_count();
                parser.header = Some(header);
            }
            Err(error) => parser.fail(error),
        }

        parser
    }

    /// Parses the header chunk
    fn read_header(&mut self) -> Result<HeaderChunk, MidiError> {
        let chunk = self
            .reader
            .read_chunk()
            .ok_or_else(|| malformed_header("file too short for a header chunk"))?;

        if !chunk.is_header() {
            return Err(malformed_header(format!(
                "expected an MThd chunk, found `{}`",
                chunk.type_name()
            )));
        }
        if chunk.len() != HEADER_LENGTH {
            return Err(malformed_header(format!(
                "header declares {} bytes of data instead of {HEADER_LENGTH}",
                chunk.len()
            )));
        }

        let fields = (
            self.reader.read_u16_be(),
            self.reader.read_u16_be(),
            self.reader.read_u16_be(),
        );
        let (Some(format), Some(ntrks), Some(division)) = fields else {
            return Err(malformed_header("header chunk cut short"));
        };

        match HeaderChunk::try_from((format, ntrks, division)) {
            Ok(header) => Ok(header),
            Err(e) => Err(malformed_header(e.to_string())),
        }
    }

    /// Reports an error and stops handing out tracks
    fn fail(&mut self, error: MidiError) {
        self.state = ParserState::Errored;
        self.track_count = self.tracks_emitted;
        self.reporter.report(error);
    }

    /// Stops handing out tracks, lowering the track count to what was found
    fn finish(&mut self) {
        self.state = ParserState::Exhausted;
        self.track_count = self.tracks_emitted;
    }

    /// The header, if it was valid
    pub fn header(&self) -> Option<HeaderChunk> {
        self.header
    }

    /// Time division from the header, or the default for a file without a valid one
    pub fn division(&self) -> Division {
        self.header
            .map(|header| header.division())
            .unwrap_or_default()
    }

    /// Number of tracks the file still announces. Drops to 0 as soon as the parser finds out
    /// no more tracks are available
    pub fn tracks_left(&self) -> u16 {
        self.track_count - self.tracks_emitted
    }

    /// True if a structural error stopped parsing
    pub fn is_errored(&self) -> bool {
        self.state == ParserState::Errored
    }

    /// True once every available track was handed out
    pub fn is_exhausted(&self) -> bool {
        self.state == ParserState::Exhausted
    }

    /// The error reporter
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consumes the parser, returning its error reporter
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// The data of the next track chunk. Returns `None` once no tracks remain, the input runs
    /// out, or a chunk other than `MTrk` shows up
    pub fn next_track_bytes(&mut self) -> Option<&'a [u8]> {
        if self.state != ParserState::EmittingTracks {
            return None;
        }

        if self.tracks_left() == 0 {
            self.finish();
            return None;
        }

        let offset = self.reader.position();

        if self.reader.is_empty() {
            self.report_truncation(
                offset,
                format!(
                    "header announced {} tracks, file ends after {}",
                    self.track_count, self.tracks_emitted
                ),
            );
            return None;
        }

        let Some(chunk) = self.reader.read_chunk() else {
            self.report_truncation(offset, "incomplete chunk preamble".into());
            return None;
        };

        if !chunk.is_track() {
            self.fail(MidiError::new(
                ErrorKind::UnexpectedChunkType,
                format!("expected an MTrk chunk, found `{}`", chunk.type_name()),
                offset,
            ));
            return None;
        }

        let data = self.reader.take_up_to(chunk.len());
        self.tracks_emitted += 1;
        log::debug!(
            "Track {} spans {} bytes at offset {offset}",
            self.tracks_emitted - 1,
            data.len()
        );

        if data.len() < chunk.len() {
            self.report_truncation(
                offset,
                format!(
                    "track declares {} bytes, only {} remain",
                    chunk.len(),
                    data.len()
                ),
            );
        }

        Some(data)
    }

    /// Reports a truncated file and stops handing out tracks
    #[track_caller]
    fn report_truncation(&mut self, offset: usize, message: String) {
        self.finish();
        self.reporter.report(MidiError::new(
            ErrorKind::TruncatedStream,
            message,
            offset,
        ));
    }

    /// The next track chunk, as a stream of raw events
    pub fn next_track_raw_event_stream(&mut self) -> Option<RawEventStream<'a>> {
        self.next_track_bytes().map(RawEventStream::new)
    }

    /// The next track chunk, ready to be played
    pub fn next_track_parser(&mut self) -> Option<TrackParser<'a>> {
        self.next_track_raw_event_stream().map(TrackParser::new)
    }
}

impl<'a, R> Iterator for FileParser<'a, R>
where
    R: ErrorReporter,
{
    type Item = TrackParser<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_track_parser()
    }
}
