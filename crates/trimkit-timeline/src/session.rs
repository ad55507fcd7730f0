//! The session owner.
//!
//! `PlayerSession` owns the timeline model, the seek coordinator and the
//! playback backend, and is the only place where asynchronous inputs are
//! applied to the model. It is meant to live on one context (typically the
//! UI thread) and to be pumped from there.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use trimkit_core::{MediaSource, RationalTime, Result, TrimError};
use tracing::{debug, info, trace};

use crate::binding::RangeControlBinding;
use crate::composition::{Composition, CompositionBuilder};
use crate::config::SessionConfig;
use crate::playback::{session_channel, PlaybackBackend, SeekCompletion, SessionEvent, SessionEvents};
use crate::seek::{SeekCoordinator, SeekSink, SeekStats, SeekTicket};
use crate::state::{SubscriptionId, TimelineField, TimelineSnapshot, TimelineState, TimelineSubscriber};

/// Hands coordinator-issued seeks to the backend with a completion handle.
struct BackendSink<'a, B: PlaybackBackend> {
    backend: &'a mut B,
    events: &'a SessionEvents,
}

impl<B: PlaybackBackend> SeekSink for BackendSink<'_, B> {
    fn issue_seek(&mut self, ticket: SeekTicket, target: RationalTime) {
        let completion = SeekCompletion::new(ticket, self.events.clone());
        self.backend.seek(target, completion);
    }
}

/// Single owner of timeline state, seek coordination and the backend.
pub struct PlayerSession<B: PlaybackBackend> {
    config: SessionConfig,
    state: TimelineState,
    seeks: SeekCoordinator,
    builder: CompositionBuilder,
    backend: B,
    events: SessionEvents,
    inbox: Receiver<SessionEvent>,
}

impl<B: PlaybackBackend> PlayerSession<B> {
    /// Create a session. `make_backend` receives the sender the backend must
    /// use for ticks and end-of-media reports.
    pub fn with_backend(config: SessionConfig, make_backend: impl FnOnce(SessionEvents) -> B) -> Self {
        let (events, inbox) = session_channel();
        let backend = make_backend(events.clone());
        Self {
            seeks: SeekCoordinator::new(config.seek_timescale),
            builder: CompositionBuilder::new(config.seek_timescale),
            config,
            state: TimelineState::new(),
            backend,
            events,
            inbox,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        self.state.snapshot()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn seeks(&self) -> &SeekCoordinator {
        &self.seeks
    }

    pub fn seek_stats(&self) -> SeekStats {
        self.seeks.stats()
    }

    /// Sender for controls that report user edits.
    pub fn events(&self) -> SessionEvents {
        self.events.clone()
    }

    /// The source currently loaded in the backend.
    pub fn current_source(&self) -> Option<Arc<dyn MediaSource>> {
        self.backend.current_source()
    }

    // ── Subscriptions ──────────────────────────────────────────

    pub fn subscribe<S>(&mut self, subscriber: &Rc<RefCell<S>>) -> SubscriptionId
    where
        S: TimelineSubscriber + 'static,
    {
        self.state.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    /// Subscribe a binding and bring its controls in line with the model.
    /// The binding stays subscribed for as long as the returned handle lives.
    pub fn bind_controls(&mut self, binding: RangeControlBinding) -> Rc<RefCell<RangeControlBinding>> {
        let binding = Rc::new(RefCell::new(binding));
        self.state.subscribe(&binding);
        let snapshot = self.state.snapshot();
        binding.borrow_mut().sync(&snapshot);
        binding
    }

    // ── Loading & trimming ─────────────────────────────────────

    /// Make `source` the current media: full range, position zero, paused.
    pub fn load_source(&mut self, source: Arc<dyn MediaSource>) {
        info!(id = %source.id(), name = source.name(), duration = source.duration(), "Loading source");
        self.set_playing(false);
        let duration = source.duration();
        self.backend.load(Some(source));
        self.state.reset(duration);
        self.seek(0.0);
    }

    /// Cut the committed range out of the current source and load the result.
    pub fn trim(&mut self) -> Result<Arc<Composition>> {
        let source = self.backend.current_source().ok_or(TrimError::NoSource)?;
        self.set_playing(false);

        let snapshot = self.state.snapshot();
        let composition = Arc::new(self.builder.build(
            source.as_ref(),
            snapshot.range_start,
            snapshot.range_end,
        )?);
        info!(
            from = source.name(),
            to = composition.name(),
            "Trim committed, loading composition"
        );
        self.load_source(composition.clone());
        Ok(composition)
    }

    // ── Edits ──────────────────────────────────────────────────

    /// Move the trim start and preview that edge.
    pub fn set_range_start(&mut self, value: f64) -> bool {
        if !self.state.set_range_start(value) {
            return false;
        }
        self.preview_edge(self.state.range_start());
        true
    }

    /// Move the trim end and preview that edge.
    pub fn set_range_end(&mut self, value: f64) -> bool {
        if !self.state.set_range_end(value) {
            return false;
        }
        self.preview_edge(self.state.range_end());
        true
    }

    /// Scrub the playhead to `value`.
    pub fn set_position(&mut self, value: f64) -> bool {
        if !self.state.set_position(value) {
            return false;
        }
        self.seek(self.state.position());
        true
    }

    /// Start or stop playback.
    pub fn set_playing(&mut self, playing: bool) -> bool {
        if !self.state.set_playing(playing) {
            return false;
        }
        if playing {
            info!(position = self.state.position(), "Playback started");
            self.backend.play();
        } else {
            info!(position = self.state.position(), "Playback stopped");
            self.backend.pause();
        }
        true
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.set_playing(!self.state.is_playing())
    }

    /// Apply an edit that originated from a control.
    ///
    /// An edit that leaves the model unchanged (clamped back to the current
    /// value) resyncs the controls so none keeps showing the rejected value.
    pub fn apply_user_edit(&mut self, field: TimelineField, value: f64) -> bool {
        let changed = match field {
            TimelineField::RangeStart => self.set_range_start(value),
            TimelineField::RangeEnd => self.set_range_end(value),
            TimelineField::Position => self.set_position(value),
            TimelineField::Duration | TimelineField::Playing => {
                debug!(%field, "Ignoring user edit of a non-editable field");
                return false;
            }
        };
        if !changed {
            debug!(%field, value, "User edit rejected, resyncing controls");
            self.state.renotify(field);
        }
        changed
    }

    fn preview_edge(&mut self, edge: f64) {
        self.set_playing(false);
        self.state.set_position(edge);
        self.seek(edge);
    }

    fn seek(&mut self, target: f64) {
        let mut sink = BackendSink {
            backend: &mut self.backend,
            events: &self.events,
        };
        self.seeks.request_seek(target, &mut sink);
    }

    // ── Event pump ─────────────────────────────────────────────

    /// Apply every queued event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one event and apply it, then drain the rest.
    /// Returns false if nothing arrived.
    pub fn wait_event(&mut self, timeout: Duration) -> bool {
        match self.inbox.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                self.pump();
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            // The session holds a sender itself, so the inbox never disconnects.
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Wait until no seek is outstanding, or `timeout` passes with no event.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        self.pump();
        while self.seeks.is_seeking() {
            if !self.wait_event(timeout) {
                return false;
            }
        }
        true
    }

    /// Apply one event on the owner context.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SeekFinished { ticket, outcome } => {
                let mut sink = BackendSink {
                    backend: &mut self.backend,
                    events: &self.events,
                };
                self.seeks.complete(ticket, &outcome, &mut sink);
            }
            SessionEvent::Tick(seconds) => {
                if self.config.drop_ticks_while_seeking && self.seeks.is_seeking() {
                    trace!(seconds, "Dropping clock tick during seek");
                    return;
                }
                self.state.set_position(seconds);
            }
            SessionEvent::ReachedEnd => {
                debug!("Playback reached end of source");
                self.set_playing(false);
            }
            SessionEvent::UserEdit { field, value } => {
                self.apply_user_edit(field, value);
            }
        }
    }
}
