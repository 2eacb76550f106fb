//! Cooldown scheduler: named timed actions advanced by elapsed time.
//!
//! Each action carries an independent delay. The scheduler keeps its own
//! monotonic clock and stores every action under its due time, so advancing
//! is O(1) and the ready set is always a prefix of the ordered map. An
//! action's remaining delay is `due - now`, clamped at zero.
//!
//! Nothing fires on its own: the owner calls [`CooldownScheduler::pop_ready`]
//! and decides what to do, then re-arms with [`CooldownScheduler::repeat`].
//! A popped action that is not re-armed is gone.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use praetor_core::types::GroupId;

use crate::error::ScheduleError;

/// Inclusive range a delay is drawn from. `min == max` is an exact delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DelaySpec", into = "DelaySpec")]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Range for compile-time constants. Panics (at compile time, in a
    /// `const` item) when `min > max`.
    pub const fn between(min: Duration, max: Duration) -> Self {
        assert!(min.as_nanos() <= max.as_nanos(), "inverted delay range");
        Self { min, max }
    }

    /// Range for runtime values.
    pub fn try_new(min: Duration, max: Duration) -> Result<Self, ScheduleError> {
        if min > max {
            return Err(ScheduleError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Draw a delay uniformly from the range. Exact ranges consume no randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_fixed() {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Human-editable form of a [`DelayRange`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DelaySpec {
    min_secs: f64,
    max_secs: f64,
}

impl TryFrom<DelaySpec> for DelayRange {
    type Error = ScheduleError;

    fn try_from(spec: DelaySpec) -> Result<Self, Self::Error> {
        let to_duration = |secs: f64| {
            Duration::try_from_secs_f64(secs).map_err(|_| ScheduleError::InvalidDuration { secs })
        };
        DelayRange::try_new(to_duration(spec.min_secs)?, to_duration(spec.max_secs)?)
    }
}

impl From<DelayRange> for DelaySpec {
    fn from(range: DelayRange) -> Self {
        Self {
            min_secs: range.min.as_secs_f64(),
            max_secs: range.max.as_secs_f64(),
        }
    }
}

/// One pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAction<K> {
    pub kind: K,
    /// Scheduler clock value at which the action becomes ready.
    pub due: Duration,
    pub group: Option<GroupId>,
}

/// Ordered multiset of timed actions owned by one actor.
#[derive(Debug, Clone)]
pub struct CooldownScheduler<K> {
    now: Duration,
    next_seq: u64,
    /// Keyed by (due, insertion sequence): iteration order is pop order.
    pending: BTreeMap<(Duration, u64), ScheduledAction<K>>,
    last_popped: Option<(K, Option<GroupId>)>,
}

impl<K> Default for CooldownScheduler<K> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: BTreeMap::new(),
            last_popped: None,
        }
    }
}

impl<K: Copy + Debug> CooldownScheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an action with a delay drawn from `range`. Duplicate kinds are
    /// independent entries. Returns the drawn delay.
    pub fn schedule<R: Rng + ?Sized>(
        &mut self,
        kind: K,
        range: DelayRange,
        group: Option<GroupId>,
        rng: &mut R,
    ) -> Duration {
        let delay = range.sample(rng);
        let action = ScheduledAction {
            kind,
            due: self.now + delay,
            group,
        };
        self.pending.insert((action.due, self.next_seq), action);
        self.next_seq += 1;
        delay
    }

    /// Count every pending delay down by `elapsed`. Fires nothing.
    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    /// Remove and return the ready action with the smallest remaining delay
    /// (earliest insertion on ties), or `None` when nothing is ready.
    pub fn pop_ready(&mut self) -> Option<K> {
        let (&(due, _), _) = self.pending.first_key_value()?;
        if due > self.now {
            return None;
        }
        let (_, action) = self.pending.pop_first()?;
        trace!(kind = ?action.kind, overdue = ?(self.now - action.due), "scheduled action ready");
        self.last_popped = Some((action.kind, action.group));
        Some(action.kind)
    }

    /// Re-arm the action returned by the last [`pop_ready`](Self::pop_ready),
    /// keeping its kind and group. Returns the re-armed kind, or `None` when
    /// nothing has been popped since the last cancel.
    pub fn repeat<R: Rng + ?Sized>(&mut self, range: DelayRange, rng: &mut R) -> Option<K> {
        let (kind, group) = self.last_popped?;
        self.schedule(kind, range, group, rng);
        Some(kind)
    }

    /// Drop every pending action.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.last_popped = None;
    }

    /// Drop every pending action tagged with `group`. Returns how many were dropped.
    pub fn cancel_group(&mut self, group: GroupId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, action| action.group != Some(group));
        if matches!(self.last_popped, Some((_, Some(g))) if g == group) {
            self.last_popped = None;
        }
        before - self.pending.len()
    }

    /// Remaining delay of the soonest pending action matching `kind`.
    pub fn remaining(&self, kind: K) -> Option<Duration>
    where
        K: PartialEq,
    {
        self.pending
            .values()
            .find(|action| action.kind == kind)
            .map(|action| action.due.saturating_sub(self.now))
    }

    /// Pending actions in pop order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledAction<K>> {
        self.pending.values()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
