//! Per-track timing

use super::{device::Device, message::Message, state::DeviceState};
use crate::chunk::track::{RawEvent, RawEventStream};

/// Plays one track: converts its tick delays to absolute seconds under the shared
/// [`DeviceState`] and dispatches its messages.
///
/// The track never caches the time of its pending event. The tick duration can be changed by
/// any other track, so [`TrackParser::next_event_time`] is always computed against the state
/// passed in.
#[derive(Debug, Clone)]
pub struct TrackParser<'a> {
    /// Decoded events of the track
    events: RawEventStream<'a>,
    /// Absolute time in seconds of the last fully processed event
    time: f64,
    /// Ticks of the pending event's delay already accounted for in `time`
    delay_ticks_passed: u32,
}

impl<'a> From<RawEventStream<'a>> for TrackParser<'a> {
    fn from(events: RawEventStream<'a>) -> Self {
        Self::new(events)
    }
}

impl<'a> TrackParser<'a> {
    /// Starts playing a track at time 0
    pub fn new(events: RawEventStream<'a>) -> Self {
        Self {
            events,
            time: 0.0,
            delay_ticks_passed: 0,
        }
    }

    /// Absolute time in seconds of the last processed event, or of the last tempo rebase
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks of the pending event's delay already accounted for in [`TrackParser::time`]
    pub fn delay_ticks_passed(&self) -> u32 {
        self.delay_ticks_passed
    }

    /// True once every event of the track has been processed
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True if the track's data was malformed or cut short
    pub fn is_truncated(&self) -> bool {
        self.events.is_truncated()
    }

    /// The event that will be processed next
    pub fn pending_event(&self) -> Option<&RawEvent<'a>> {
        self.events.first()
    }

    /// Delay ticks of the pending event not yet accounted for
    fn remaining_ticks(&self) -> u32 {
        self.events
            .first()
            .map_or(0, |event| event.delay_ticks().saturating_sub(self.delay_ticks_passed))
    }

    /// Absolute time in seconds of the pending event under the current tempo. An exhausted
    /// track has no next event and reports infinity
    pub fn next_event_time(&self, state: &DeviceState) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }

        self.time + f64::from(self.remaining_ticks()) * state.tick_duration()
    }

    /// Consumes the pending event. Its delay is charged at the tick duration in effect before
    /// the event, then the event updates `state` and its message, if any, goes to `device`
    pub fn process_event<D>(&mut self, state: &mut DeviceState, device: &mut D)
    where
        D: Device + ?Sized,
    {
        let Some(event) = self.events.first().copied() else {
            debug_assert!(false, "process_event called on an exhausted track");
            return;
        };

        self.time += f64::from(self.remaining_ticks()) * state.tick_duration();

        let message = Message::decode(&event, state);
        state.apply(&event);

        if let Some(message) = message {
            log::trace!("{:.6}s {message:?}", self.time);
            message.dispatch(self.time, device);
        }

        self.events.advance();
        self.delay_ticks_passed = 0;
    }

    /// Rebases the track after another track changed the tempo at `time`. The part of the
    /// pending delay that elapsed under `prev_tick_duration` is charged now, so the rest can be
    /// measured under the new tempo
    pub fn on_tempo_change(&mut self, time: f64, prev_tick_duration: f64) {
        let remaining = self.remaining_ticks();
        let elapsed = ((time - self.time) / prev_tick_duration).round();

        let ticks_passed = if elapsed.is_nan() || elapsed <= 0.0 {
            0
        } else {
            (elapsed as u32).min(remaining)
        };

        self.delay_ticks_passed += ticks_passed;
        self.time += f64::from(ticks_passed) * prev_tick_duration;
    }
}
