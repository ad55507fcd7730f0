//! Seek coordination against a backend that services one seek at a time.
//!
//! Requests that arrive while a seek is outstanding overwrite a single
//! pending slot. When the outstanding seek completes, successfully or not,
//! the pending target (if any) is issued next. Intermediate targets of a
//! burst are dropped; the last one always reaches the backend.

use std::fmt;

use trimkit_core::{RationalTime, DEFAULT_TIMESCALE};
use tracing::{debug, warn};

/// Identifies one seek issued to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeekTicket(u64);

impl SeekTicket {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
impl SeekTicket {
    pub(crate) fn from_raw(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for SeekTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seek#{}", self.0)
    }
}

/// How the backend finished a seek. The coordinator treats every outcome the
/// same for bookkeeping; the distinction only feeds logs and stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekOutcome {
    /// The backend reached the target.
    Finished,
    /// The seek was interrupted (superseded internally, source replaced, ...).
    Cancelled,
    /// The backend reported an error.
    Failed(String),
}

/// Where seeks go once the coordinator decides to issue them.
pub trait SeekSink {
    /// Start a seek. The sink must eventually report completion for `ticket`
    /// exactly once via [`SeekCoordinator::complete`].
    fn issue_seek(&mut self, ticket: SeekTicket, target: RationalTime);
}

/// What happened to a call to [`SeekCoordinator::request_seek`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekDisposition {
    /// Sent to the backend immediately.
    Issued(SeekTicket),
    /// Parked in the pending slot; `replaced` is the target it overwrote.
    Coalesced { replaced: Option<f64> },
    /// Non-finite target, nothing done.
    Ignored,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeekStats {
    /// Seeks handed to the backend.
    pub issued: u64,
    /// Pending targets overwritten before they were issued.
    pub superseded: u64,
    /// Completions reported as failed.
    pub failed: u64,
    /// Completions reported as cancelled.
    pub cancelled: u64,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: SeekTicket,
    target: f64,
}

/// At-most-one-in-flight, latest-wins seek serializer.
#[derive(Debug)]
pub struct SeekCoordinator {
    timescale: i64,
    in_flight: Option<InFlight>,
    pending: Option<f64>,
    next_ticket: u64,
    stats: SeekStats,
}

impl SeekCoordinator {
    /// Create an idle coordinator quantizing targets to `timescale` ticks per second.
    pub fn new(timescale: i64) -> Self {
        Self {
            timescale: timescale.max(1),
            in_flight: None,
            pending: None,
            next_ticket: 0,
            stats: SeekStats::default(),
        }
    }

    /// Ask for the backend to end up at `target` seconds. Never blocks.
    pub fn request_seek<S>(&mut self, target: f64, sink: &mut S) -> SeekDisposition
    where
        S: SeekSink + ?Sized,
    {
        if !target.is_finite() {
            warn!(seconds = target, "Ignoring non-finite seek target");
            return SeekDisposition::Ignored;
        }

        if self.in_flight.is_some() {
            let replaced = self.pending.replace(target);
            if replaced.is_some() {
                self.stats.superseded += 1;
            }
            debug!(seconds = target, ?replaced, "Seek coalesced behind in-flight request");
            return SeekDisposition::Coalesced { replaced };
        }

        self.next_ticket += 1;
        let ticket = SeekTicket(self.next_ticket);
        self.in_flight = Some(InFlight { ticket, target });
        self.stats.issued += 1;

        let quantized = RationalTime::from_seconds_f64(target, self.timescale);
        debug!(%ticket, %quantized, "Issuing seek");
        sink.issue_seek(ticket, quantized);
        SeekDisposition::Issued(ticket)
    }

    /// Record the completion of `ticket` and flush the pending target.
    ///
    /// Returns the ticket of the follow-up seek, if one was issued. A
    /// completion for a ticket that is not in flight is logged and ignored.
    pub fn complete<S>(
        &mut self,
        ticket: SeekTicket,
        outcome: &SeekOutcome,
        sink: &mut S,
    ) -> Option<SeekTicket>
    where
        S: SeekSink + ?Sized,
    {
        match self.in_flight {
            Some(current) if current.ticket == ticket => {}
            other => {
                warn!(%ticket, in_flight = ?other.map(|s| s.ticket), "Stale seek completion ignored");
                return None;
            }
        }
        self.in_flight = None;

        match outcome {
            SeekOutcome::Finished => debug!(%ticket, "Seek finished"),
            SeekOutcome::Cancelled => {
                self.stats.cancelled += 1;
                debug!(%ticket, "Seek cancelled by backend");
            }
            SeekOutcome::Failed(reason) => {
                self.stats.failed += 1;
                warn!(%ticket, %reason, "Seek failed; continuing with pending target");
            }
        }

        let target = self.pending.take()?;
        match self.request_seek(target, sink) {
            SeekDisposition::Issued(next) => Some(next),
            _ => None,
        }
    }

    /// True while a seek is outstanding with the backend.
    pub fn is_seeking(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Target of the outstanding seek, in seconds.
    pub fn in_flight_target(&self) -> Option<f64> {
        self.in_flight.map(|s| s.target)
    }

    /// Target waiting for the outstanding seek to finish.
    pub fn pending_target(&self) -> Option<f64> {
        self.pending
    }

    pub fn stats(&self) -> SeekStats {
        self.stats
    }
}

impl Default for SeekCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESCALE)
    }
}
