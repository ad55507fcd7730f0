//! Authoritative timeline model.
//!
//! Holds `(duration, range_start, range_end, position, is_playing)` and keeps
//! `0 <= range_start <= range_end <= duration` and `0 <= position <= duration`
//! at every commit. Setters clamp their input, do nothing when the clamped
//! value equals the current one, and otherwise commit and notify every live
//! subscriber exactly once before returning.
//!
//! The model is owned by one context and is not `Send`; subscribers are held
//! weakly so a dropped control never receives a notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

// ── Fields & snapshots ─────────────────────────────────────────

/// One field of the timeline model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineField {
    Duration,
    RangeStart,
    RangeEnd,
    Position,
    Playing,
}

impl TimelineField {
    /// Fields holding a time value a control can display and drag.
    pub const SCRUBBABLE: [TimelineField; 3] = [
        TimelineField::RangeStart,
        TimelineField::RangeEnd,
        TimelineField::Position,
    ];

    /// Whether a value control may be bound to this field.
    pub fn is_scrubbable(self) -> bool {
        Self::SCRUBBABLE.contains(&self)
    }
}

impl fmt::Display for TimelineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Duration => "duration",
            Self::RangeStart => "range_start",
            Self::RangeEnd => "range_end",
            Self::Position => "position",
            Self::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// A self-consistent copy of the model, handed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    pub duration: f64,
    pub range_start: f64,
    pub range_end: f64,
    pub position: f64,
    pub is_playing: bool,
    /// Incremented on every commit.
    pub revision: u64,
}

impl TimelineSnapshot {
    /// Numeric value of a field. `Playing` reads as 1.0 / 0.0.
    pub fn value(&self, field: TimelineField) -> f64 {
        match field {
            TimelineField::Duration => self.duration,
            TimelineField::RangeStart => self.range_start,
            TimelineField::RangeEnd => self.range_end,
            TimelineField::Position => self.position,
            TimelineField::Playing => {
                if self.is_playing {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Whether every ordering invariant holds.
    pub fn is_consistent(&self) -> bool {
        0.0 <= self.range_start
            && self.range_start <= self.range_end
            && self.range_end <= self.duration
            && 0.0 <= self.position
            && self.position <= self.duration
    }
}

// ── Subscribers ────────────────────────────────────────────────

/// Receives every committed change, synchronously with the commit.
pub trait TimelineSubscriber {
    fn timeline_changed(&mut self, snapshot: &TimelineSnapshot, changed: TimelineField);
}

/// Handle returned by [`TimelineState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    handle: Weak<RefCell<dyn TimelineSubscriber>>,
}

// ── State ──────────────────────────────────────────────────────

/// The timeline model. Starts empty (duration 0).
pub struct TimelineState {
    snapshot: TimelineSnapshot,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl TimelineState {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self {
            snapshot: TimelineSnapshot::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        self.snapshot
    }

    pub fn duration(&self) -> f64 {
        self.snapshot.duration
    }

    pub fn range_start(&self) -> f64 {
        self.snapshot.range_start
    }

    pub fn range_end(&self) -> f64 {
        self.snapshot.range_end
    }

    pub fn position(&self) -> f64 {
        self.snapshot.position
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot.is_playing
    }

    pub fn revision(&self) -> u64 {
        self.snapshot.revision
    }

    /// Register a subscriber. It is held weakly: dropping the last strong
    /// reference ends the subscription without an explicit unsubscribe.
    pub fn subscribe<S>(&mut self, subscriber: &Rc<RefCell<S>>) -> SubscriptionId
    where
        S: TimelineSubscriber + 'static,
    {
        let handle: Rc<RefCell<dyn TimelineSubscriber>> = subscriber.clone();
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push(Subscriber {
            id,
            handle: Rc::downgrade(&handle),
        });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of subscribers that are still alive.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|s| s.handle.strong_count() > 0)
            .count()
    }

    /// Load state for a new source: `[0, duration]` range, position 0, paused.
    /// Commits once, reported as a duration change.
    pub fn reset(&mut self, duration: f64) -> bool {
        let duration = sanitize_duration(duration);
        let next = TimelineSnapshot {
            duration,
            range_start: 0.0,
            range_end: duration,
            position: 0.0,
            is_playing: false,
            revision: self.snapshot.revision,
        };
        if next == self.snapshot {
            return false;
        }
        self.snapshot = next;
        self.commit(TimelineField::Duration);
        true
    }

    /// Change the duration, pulling the range and position inside it.
    pub fn set_duration(&mut self, duration: f64) -> bool {
        let duration = sanitize_duration(duration);
        if duration == self.snapshot.duration {
            return false;
        }
        let s = &mut self.snapshot;
        s.duration = duration;
        s.range_end = s.range_end.min(duration);
        s.range_start = s.range_start.min(s.range_end);
        s.position = s.position.min(duration);
        self.commit(TimelineField::Duration);
        true
    }

    /// Move the start of the trim range, clamped to `[0, range_end]`.
    pub fn set_range_start(&mut self, value: f64) -> bool {
        let Some(value) = clamp_finite(value, 0.0, self.snapshot.range_end) else {
            return false;
        };
        if value == self.snapshot.range_start {
            return false;
        }
        self.snapshot.range_start = value;
        self.commit(TimelineField::RangeStart);
        true
    }

    /// Move the end of the trim range, clamped to `[range_start, duration]`.
    pub fn set_range_end(&mut self, value: f64) -> bool {
        let Some(value) = clamp_finite(value, self.snapshot.range_start, self.snapshot.duration)
        else {
            return false;
        };
        if value == self.snapshot.range_end {
            return false;
        }
        self.snapshot.range_end = value;
        self.commit(TimelineField::RangeEnd);
        true
    }

    /// Move the playback position, clamped to `[0, duration]`.
    pub fn set_position(&mut self, value: f64) -> bool {
        let Some(value) = clamp_finite(value, 0.0, self.snapshot.duration) else {
            return false;
        };
        if value == self.snapshot.position {
            return false;
        }
        self.snapshot.position = value;
        self.commit(TimelineField::Position);
        true
    }

    pub fn set_playing(&mut self, playing: bool) -> bool {
        if playing == self.snapshot.is_playing {
            return false;
        }
        self.snapshot.is_playing = playing;
        self.commit(TimelineField::Playing);
        true
    }

    /// Re-deliver the current snapshot to every subscriber, reported as a
    /// change of `field`. The revision is left untouched.
    ///
    /// Used when an edit was rejected or clamped to the value already held,
    /// so controls that displayed the rejected value snap back.
    pub fn renotify(&mut self, field: TimelineField) {
        trace!(%field, revision = self.snapshot.revision, "Timeline resync");
        self.notify(field);
    }

    fn commit(&mut self, changed: TimelineField) {
        debug_assert!(self.snapshot.is_consistent(), "{:?}", self.snapshot);
        self.snapshot.revision += 1;
        trace!(%changed, revision = self.snapshot.revision, "Timeline commit");
        self.notify(changed);
    }

    fn notify(&mut self, changed: TimelineField) {
        let snapshot = self.snapshot;
        self.subscribers.retain(|s| s.handle.strong_count() > 0);
        for subscriber in &self.subscribers {
            let Some(handle) = subscriber.handle.upgrade() else {
                continue;
            };
            let Ok(mut target) = handle.try_borrow_mut() else {
                warn!(id = ?subscriber.id, %changed, "Subscriber busy, skipping reentrant notification");
                continue;
            };
            target.timeline_changed(&snapshot, changed);
        }
    }
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineState")
            .field("snapshot", &self.snapshot)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() {
        duration.max(0.0)
    } else {
        0.0
    }
}

/// Clamp `value` into `[lo, hi]`; non-finite input is rejected.
fn clamp_finite(value: f64, lo: f64, hi: f64) -> Option<f64> {
    value.is_finite().then(|| value.max(lo).min(hi))
}
