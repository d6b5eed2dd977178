//! Structural errors found while reading a MIDI file, and the [`ErrorReporter`] that receives
//! them.
//!
//! Errors are never returned up the call chain. A parser reports a problem once and then
//! degrades to producing no more data, so one corrupt file never takes down a process working
//! through a batch of them.

use core::panic::Location;

use thiserror::Error;

/// Category of a structural failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad `MThd` magic, header length or format id
    #[error("Malformed header")]
    MalformedHeader,
    /// A chunk other than `MTrk` where a track chunk was expected
    #[error("Unexpected chunk type")]
    UnexpectedChunkType,
    /// The input ended before a declared structure was complete
    #[error("Truncated stream")]
    TruncatedStream,
}

/// A reported structural failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at byte {offset}: {message}")]
pub struct MidiError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Human readable detail
    pub message: String,
    /// Byte offset into the file input where the problem was detected
    pub offset: usize,
    /// Code location that detected the problem
    pub location: &'static Location<'static>,
}

impl MidiError {
    /// Creates an error stamped with the caller's source location
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            offset,
            location: Location::caller(),
        }
    }
}

/// Receiver of structural errors
pub trait ErrorReporter {
    /// Called exactly once per detected failure
    fn report(&mut self, error: MidiError);
}

impl<R> ErrorReporter for &mut R
where
    R: ErrorReporter + ?Sized,
{
    fn report(&mut self, error: MidiError) {
        (**self).report(error)
    }
}

/// Forwards every error to the `log` facade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&mut self, error: MidiError) {
        log::error!("{error} (detected at {})", error.location);
    }
}

/// Collects every reported error, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
    /// Errors reported so far
    errors: Vec<MidiError>,
}

impl ErrorLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far
    pub fn errors(&self) -> &[MidiError] {
        &self.errors
    }

    /// Number of errors reported so far
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if nothing has been reported
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ErrorReporter for ErrorLog {
    fn report(&mut self, error: MidiError) {
        log::debug!("{error}");
        self.errors.push(error);
    }
}
