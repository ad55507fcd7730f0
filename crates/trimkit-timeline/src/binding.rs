//! Two-way binding between value controls and the timeline model.
//!
//! Model → control: on every commit the binding compares each control's
//! current value with the model and writes only the ones that differ, tagged
//! [`UpdateReason::ModelSync`] so the control does not report the write back.
//!
//! Control → model: a user gesture is written with [`UpdateReason::UserEdit`];
//! the control forwards it to the session inbox, the session runs the setter,
//! and the resulting commit comes back here. The originating control already
//! holds the committed value, so the comparison skips it.
//!
//! Each external event therefore costs at most one hop in each direction:
//! `idle → model-driven → idle` or `idle → control-driven → model-driven → idle`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use trimkit_core::{Result, TrimError};
use tracing::{debug, warn};

use crate::playback::SessionEvents;
use crate::state::{TimelineField, TimelineSnapshot, TimelineSubscriber};

/// Why a control is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// The user moved the control; the model must hear about it.
    UserEdit,
    /// The model changed; the control only redraws.
    ModelSync,
}

/// A user-drivable value widget, bounded to `[0, upper_bound]`.
pub trait BoundControl {
    fn read(&self) -> f64;

    fn write(&mut self, value: f64, reason: UpdateReason);

    fn upper_bound(&self) -> f64;

    fn set_upper_bound(&mut self, max: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncPhase {
    Idle,
    ModelDriven,
}

struct Slot {
    field: TimelineField,
    control: Box<dyn BoundControl>,
}

/// Keeps any number of controls in step with the timeline model.
pub struct RangeControlBinding {
    slots: Vec<Slot>,
    phase: SyncPhase,
    writes: u64,
}

impl RangeControlBinding {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            phase: SyncPhase::Idle,
            writes: 0,
        }
    }

    /// The usual trio: range start, range end and playhead sliders.
    pub fn for_sliders(start: &SliderControl, end: &SliderControl, position: &SliderControl) -> Self {
        let mut binding = Self::new();
        binding.slots = vec![
            Slot {
                field: TimelineField::RangeStart,
                control: Box::new(start.clone()),
            },
            Slot {
                field: TimelineField::RangeEnd,
                control: Box::new(end.clone()),
            },
            Slot {
                field: TimelineField::Position,
                control: Box::new(position.clone()),
            },
        ];
        binding
    }

    /// Bind another control to a time field.
    pub fn bind(&mut self, field: TimelineField, control: Box<dyn BoundControl>) -> Result<()> {
        if !field.is_scrubbable() {
            return Err(TrimError::InvalidParameter(format!(
                "cannot bind a value control to {}",
                field
            )));
        }
        self.slots.push(Slot { field, control });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total control writes issued by model syncs.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Bring every control in line with `snapshot`. Returns the number of
    /// value writes performed.
    pub fn sync(&mut self, snapshot: &TimelineSnapshot) -> usize {
        if self.phase != SyncPhase::Idle {
            warn!(
                revision = snapshot.revision,
                "Reentrant control sync rejected"
            );
            return 0;
        }
        self.phase = SyncPhase::ModelDriven;

        let mut writes = 0;
        for slot in &mut self.slots {
            if slot.control.upper_bound() != snapshot.duration {
                slot.control.set_upper_bound(snapshot.duration);
            }
            let value = snapshot.value(slot.field);
            if slot.control.read() != value {
                slot.control.write(value, UpdateReason::ModelSync);
                writes += 1;
            }
        }

        self.writes += writes as u64;
        self.phase = SyncPhase::Idle;
        if writes > 0 {
            debug!(writes, revision = snapshot.revision, "Controls synced to model");
        }
        writes
    }
}

impl Default for RangeControlBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RangeControlBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeControlBinding")
            .field("fields", &self.slots.iter().map(|s| s.field).collect::<Vec<_>>())
            .field("writes", &self.writes)
            .finish()
    }
}

impl TimelineSubscriber for RangeControlBinding {
    fn timeline_changed(&mut self, snapshot: &TimelineSnapshot, _changed: TimelineField) {
        self.sync(snapshot);
    }
}

// ── Slider ─────────────────────────────────────────────────────

struct SliderModel {
    value: f64,
    maximum: f64,
    model_writes: usize,
    user_edits: usize,
    sink: Option<(TimelineField, SessionEvents)>,
}

/// Headless slider: a clamped value plus an edit sink.
///
/// Clones share the same slider, so the presentation layer and the binding
/// can each hold one.
#[derive(Clone)]
pub struct SliderControl {
    inner: Rc<RefCell<SliderModel>>,
}

impl SliderControl {
    /// A slider whose user edits are posted to `events` as edits of `field`.
    pub fn new(field: TimelineField, events: SessionEvents) -> Self {
        Self::with_sink(Some((field, events)))
    }

    /// A slider that reports user edits nowhere.
    pub fn detached() -> Self {
        Self::with_sink(None)
    }

    fn with_sink(sink: Option<(TimelineField, SessionEvents)>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SliderModel {
                value: 0.0,
                maximum: 0.0,
                model_writes: 0,
                user_edits: 0,
                sink,
            })),
        }
    }

    pub fn value(&self) -> f64 {
        self.inner.borrow().value
    }

    pub fn maximum(&self) -> f64 {
        self.inner.borrow().maximum
    }

    /// The user dragged the thumb to `value`.
    pub fn drag_to(&self, value: f64) {
        self.apply(value, UpdateReason::UserEdit);
    }

    /// Writes that came from the model.
    pub fn model_writes(&self) -> usize {
        self.inner.borrow().model_writes
    }

    /// Edits forwarded to the model.
    pub fn user_edits(&self) -> usize {
        self.inner.borrow().user_edits
    }

    fn apply(&self, value: f64, reason: UpdateReason) {
        let mut slider = self.inner.borrow_mut();
        if !value.is_finite() {
            return;
        }
        let value = value.max(0.0).min(slider.maximum);
        if value == slider.value {
            return;
        }
        slider.value = value;
        match reason {
            UpdateReason::ModelSync => slider.model_writes += 1,
            UpdateReason::UserEdit => {
                slider.user_edits += 1;
                if let Some((field, events)) = &slider.sink {
                    events.user_edit(*field, value);
                }
            }
        }
    }
}

impl BoundControl for SliderControl {
    fn read(&self) -> f64 {
        self.value()
    }

    fn write(&mut self, value: f64, reason: UpdateReason) {
        self.apply(value, reason);
    }

    fn upper_bound(&self) -> f64 {
        self.maximum()
    }

    fn set_upper_bound(&mut self, max: f64) {
        let mut slider = self.inner.borrow_mut();
        slider.maximum = max.max(0.0);
        slider.value = slider.value.min(slider.maximum);
    }
}

impl fmt::Debug for SliderControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slider = self.inner.borrow();
        f.debug_struct("SliderControl")
            .field("value", &slider.value)
            .field("maximum", &slider.maximum)
            .finish()
    }
}
