//! Chronological merge of every track of a performance.
//!
//! Tracks sit in an array backed binary min-heap keyed by the absolute time of their pending
//! event. The key is not stored: it depends on the shared tick duration, so every comparison
//! asks the tracks again. That rules out [`std::collections::BinaryHeap`], whose ordering
//! cannot see outside state.
//!
//! A tempo change moves the next event time of every pending track at once. After one, all
//! other tracks are rebased and the heap is rebuilt from scratch, as a sift on a single node
//! cannot restore an ordering that changed everywhere.

use super::{device::Device, state::DeviceState, track::TrackParser};
use crate::{chunk::header::Format, error::ErrorReporter, file::FileParser};

/// A track in the heap, with its insertion order to break ties between equal times
#[derive(Debug, Clone)]
struct Slot<'a> {
    /// Position of the track among all tracks added, ties go to the earlier one
    order: usize,
    /// The track itself
    track: TrackParser<'a>,
}

/// Owns every track of a performance along with the state they share, and plays their events
/// in global time order
#[derive(Debug, Clone)]
pub struct TrackCombiner<'a> {
    /// Min-heap of non-empty tracks, earliest pending event at the root
    heap: Vec<Slot<'a>>,
    /// Performance state every track reads and writes
    state: DeviceState,
    /// Order handed to the next added track
    next_order: usize,
}

impl Default for TrackCombiner<'_> {
    fn default() -> Self {
        Self::new(DeviceState::default())
    }
}

impl<'a> TrackCombiner<'a> {
    /// Creates a combiner with no tracks
    pub fn new(state: DeviceState) -> Self {
        Self {
            heap: Vec::new(),
            state,
            next_order: 0,
        }
    }

    /// Creates a combiner holding every remaining track of a file, with a state built from the
    /// file's time division
    pub fn from_file<R>(file: &mut FileParser<'a, R>) -> Self
    where
        R: ErrorReporter,
    {
        if file.header().map(|header| header.format()) == Some(Format::Two) {
            log::warn!("Format 2 file: independent patterns will be played simultaneously");
        }

        let mut combiner = Self::new(DeviceState::new(file.division()));
        while let Some(track) = file.next_track_parser() {
            combiner.add_track(track);
        }

        combiner
    }

    /// The shared performance state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Tracks still holding events, in heap order. The first one is the earliest
    pub fn tracks(&self) -> impl Iterator<Item = &TrackParser<'a>> + '_ {
        self.heap.iter().map(|slot| &slot.track)
    }

    /// Number of tracks still holding events
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True once every track has been played out
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Takes ownership of a track. A track with no events is dropped right away, it has no
    /// next event time to be ordered by
    pub fn add_track(&mut self, track: TrackParser<'a>) {
        let order = self.next_order;
        self.next_order += 1;

        if track.is_empty() {
            log::debug!("Dropping track {order}, it has no events");
            return;
        }

        self.push(Slot { order, track });
    }

    /// Absolute time of the next event across all tracks
    pub fn next_event_time(&self) -> Option<f64> {
        self.heap
            .first()
            .map(|slot| slot.track.next_event_time(&self.state))
    }

    /// Plays the chronologically next event of all tracks
    pub fn process_event<D>(&mut self, device: &mut D)
    where
        D: Device + ?Sized,
    {
        let Some(mut slot) = self.pop() else {
            return;
        };

        let order = slot.order;
        let prev_tick_duration = self.state.tick_duration();
        slot.track.process_event(&mut self.state, device);
        let last_event_time = slot.track.time();

        if slot.track.is_empty() {
            log::debug!("Track {order} finished at {last_event_time:.6}s");
        } else {
            self.push(slot);
        }

        if self.state.tick_duration() != prev_tick_duration {
            self.retime(order, last_event_time, prev_tick_duration);
        }
    }

    /// Plays every remaining event
    pub fn process_all_events<D>(&mut self, device: &mut D)
    where
        D: Device + ?Sized,
    {
        while !self.is_empty() {
            self.process_event(device);
        }
    }

    /// Plays every event due at or before `time`, returning how many were processed
    pub fn process_events_until<D>(&mut self, time: f64, device: &mut D) -> usize
    where
        D: Device + ?Sized,
    {
        let mut processed = 0;

        while self.next_event_time().is_some_and(|next| next <= time) {
            self.process_event(device);
            processed += 1;
        }

        processed
    }

    /// Rebases every track but the one that changed the tempo at `time`, then rebuilds the
    /// heap
    fn retime(&mut self, changed_by: usize, time: f64, prev_tick_duration: f64) {
        for slot in self.heap.iter_mut().filter(|slot| slot.order != changed_by) {
            slot.track.on_tempo_change(time, prev_tick_duration);
        }

        self.rebuild();
    }

    /// True if the track at `a` must be played before the one at `b`
    fn precedes(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.heap[a], &self.heap[b]);
        let a_time = a.track.next_event_time(&self.state);
        let b_time = b.track.next_event_time(&self.state);

        a_time.total_cmp(&b_time).then(a.order.cmp(&b.order)).is_lt()
    }

    /// Adds a slot and restores the heap
    fn push(&mut self, slot: Slot<'a>) {
        self.heap.push(slot);
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes the root and restores the heap
    fn pop(&mut self) -> Option<Slot<'a>> {
        if self.heap.is_empty() {
            return None;
        }

        let slot = self.heap.swap_remove(0);
        self.sift_down(0);

        Some(slot)
    }

    /// Moves the slot at `index` towards the root until its parent precedes it
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.precedes(index, parent) {
                break;
            }

            self.heap.swap(index, parent);
            index = parent;
        }
    }

    /// Moves the slot at `index` towards the leaves until it precedes both children
    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();

        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut earliest = index;

            if left < len && self.precedes(left, earliest) {
                earliest = left;
            }
            if right < len && self.precedes(right, earliest) {
                earliest = right;
            }
            if earliest == index {
                break;
            }

            self.heap.swap(index, earliest);
            index = earliest;
        }
    }

    /// Restores the heap ordering of the whole array
    fn rebuild(&mut self) {
        for index in (0..self.heap.len() / 2).rev() {
            self.sift_down(index);
        }
    }
}
