//! Playback backend boundary.
//!
//! Backends run on their own threads. Everything they report (seek
//! completions, clock ticks, end of media) and every user edit emitted by a
//! control is posted into one channel and applied later by the owning
//! [`crate::PlayerSession`] on its own context. Nothing on the other side of
//! the channel touches timeline state directly.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use trimkit_core::{MediaSource, RationalTime};
use tracing::trace;

use crate::seek::{SeekOutcome, SeekTicket};
use crate::state::TimelineField;

/// An input for the session owner, produced on any thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The backend finished (or gave up on) a seek.
    SeekFinished {
        ticket: SeekTicket,
        outcome: SeekOutcome,
    },
    /// Periodic playback clock, in seconds.
    Tick(f64),
    /// Playback ran into the end of the source.
    ReachedEnd,
    /// A control was moved by the user.
    UserEdit { field: TimelineField, value: f64 },
}

/// Cloneable sending half of a session inbox.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: Sender<SessionEvent>,
}

/// Create a session inbox.
pub fn session_channel() -> (SessionEvents, Receiver<SessionEvent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (SessionEvents { tx }, rx)
}

impl SessionEvents {
    /// Post an event. Returns false once the session is gone.
    pub fn send(&self, event: SessionEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(err) => {
                trace!(event = ?err.into_inner(), "Session inbox closed, event dropped");
                false
            }
        }
    }

    /// Report the playback clock.
    pub fn tick(&self, seconds: f64) -> bool {
        self.send(SessionEvent::Tick(seconds))
    }

    /// Report that playback hit the end of the source.
    pub fn reached_end(&self) -> bool {
        self.send(SessionEvent::ReachedEnd)
    }

    /// Report a user-originated control change.
    pub fn user_edit(&self, field: TimelineField, value: f64) -> bool {
        self.send(SessionEvent::UserEdit { field, value })
    }
}

/// One-shot completion handle for a single backend seek.
///
/// Consumed by [`finish`](Self::finish) or [`fail`](Self::fail). Dropping it
/// unresolved reports [`SeekOutcome::Cancelled`], so every issued seek is
/// completed exactly once.
#[derive(Debug)]
pub struct SeekCompletion {
    ticket: SeekTicket,
    events: SessionEvents,
    resolved: bool,
}

impl SeekCompletion {
    pub(crate) fn new(ticket: SeekTicket, events: SessionEvents) -> Self {
        Self {
            ticket,
            events,
            resolved: false,
        }
    }

    /// The seek this handle completes.
    pub fn ticket(&self) -> SeekTicket {
        self.ticket
    }

    /// The backend reached the target.
    pub fn finish(mut self) {
        self.resolve(SeekOutcome::Finished);
    }

    /// The backend could not reach the target.
    pub fn fail(mut self, reason: impl Into<String>) {
        self.resolve(SeekOutcome::Failed(reason.into()));
    }

    fn resolve(&mut self, outcome: SeekOutcome) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        self.events.send(SessionEvent::SeekFinished {
            ticket: self.ticket,
            outcome,
        });
    }
}

impl Drop for SeekCompletion {
    fn drop(&mut self) {
        self.resolve(SeekOutcome::Cancelled);
    }
}

/// A player that can service one seek at a time.
pub trait PlaybackBackend {
    /// Replace the current source. `None` unloads.
    fn load(&mut self, source: Option<Arc<dyn MediaSource>>);

    /// Start seeking to `target`. Must return without waiting; the outcome is
    /// reported through `completion` from any thread.
    fn seek(&mut self, target: RationalTime, completion: SeekCompletion);

    fn play(&mut self);

    fn pause(&mut self);

    /// The source currently loaded, if any.
    fn current_source(&self) -> Option<Arc<dyn MediaSource>>;
}

impl<B: PlaybackBackend + ?Sized> PlaybackBackend for Box<B> {
    fn load(&mut self, source: Option<Arc<dyn MediaSource>>) {
        (**self).load(source)
    }

    fn seek(&mut self, target: RationalTime, completion: SeekCompletion) {
        (**self).seek(target, completion)
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn current_source(&self) -> Option<Arc<dyn MediaSource>> {
        (**self).current_source()
    }
}
