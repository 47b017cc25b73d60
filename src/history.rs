//! Frame-keyed snapshot history for backward/forward stepping
//!
//! A fixed-capacity ring buffer indexed by `frame % capacity`. Saving frame
//! F structurally evicts whatever occupied its slot, so the retained window
//! is always the most recent `capacity` frames — eviction is O(1), restore
//! is O(1), only the explicit closest-frame query scans.
//!
//! History exclusively owns its snapshots: saving deep-copies the simulation
//! state in, restoring hands a fresh copy back out. Live state is never
//! aliased into the buffer.

use std::time::Instant;

use crate::consts::HISTORY_CAPACITY;
use crate::settings::SettingsError;
use crate::sim::SimState;

/// A deep copy of simulation state captured just before a frame's tick
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub frame: u64,
    pub state: SimState,
    /// Wall-clock capture time, diagnostic only
    pub captured_at: Instant,
}

/// Summary of what the buffer currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    /// Number of frames currently stored
    pub total_frames: usize,
    /// Oldest and newest stored frame, if any
    pub frame_range: Option<(u64, u64)>,
    /// Highest frame ever saved since the last clear
    pub max_saved_frame: Option<u64>,
}

/// Bounded snapshot store
#[derive(Debug)]
pub struct History {
    slots: Vec<Option<Snapshot>>,
    capacity: usize,
    max_saved: Option<u64>,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY).expect("default capacity is valid")
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, SettingsError> {
        if capacity == 0 {
            return Err(SettingsError::HistoryCapacity);
        }
        Ok(Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            capacity,
            max_saved: None,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn slot_index(&self, frame: u64) -> usize {
        (frame % self.capacity as u64) as usize
    }

    /// Deep-copy the state into the slot for `frame`, evicting whatever
    /// frame occupied it. Saving the same frame twice overwrites.
    pub fn save(&mut self, frame: u64, state: &SimState) {
        let idx = self.slot_index(frame);
        if let Some(old) = &self.slots[idx] {
            if old.frame != frame {
                log::debug!("evicting frame {} for frame {}", old.frame, frame);
            }
        }
        self.slots[idx] = Some(Snapshot {
            frame,
            state: state.clone(),
            captured_at: Instant::now(),
        });
        self.max_saved = Some(self.max_saved.map_or(frame, |m| m.max(frame)));
    }

    /// Exact-match restore. A miss is a miss; the closest-frame fallback is
    /// a separate, explicit query.
    pub fn restore(&self, frame: u64) -> Option<SimState> {
        let snap = self.slots[self.slot_index(frame)].as_ref()?;
        (snap.frame == frame).then(|| snap.state.clone())
    }

    pub fn contains(&self, frame: u64) -> bool {
        self.slots[self.slot_index(frame)]
            .as_ref()
            .is_some_and(|s| s.frame == frame)
    }

    /// Stored frame with minimum absolute distance to `frame` (lower frame
    /// wins ties). Callers decide whether to act on the substitution.
    pub fn closest_available(&self, frame: u64) -> Option<u64> {
        self.slots
            .iter()
            .flatten()
            .map(|s| s.frame)
            .min_by_key(|&f| (f.abs_diff(frame), f))
    }

    /// Empty the store and reset frame bookkeeping
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.max_saved = None;
    }

    pub fn stats(&self) -> HistoryStats {
        let mut range: Option<(u64, u64)> = None;
        let mut total = 0;
        for snap in self.slots.iter().flatten() {
            total += 1;
            range = Some(match range {
                None => (snap.frame, snap.frame),
                Some((lo, hi)) => (lo.min(snap.frame), hi.max(snap.frame)),
            });
        }
        HistoryStats {
            total_frames: total,
            frame_range: range,
            max_saved_frame: self.max_saved,
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EngineKind;

    fn state(seed: u64) -> SimState {
        SimState::new(seed, EngineKind::Arcade)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(History::with_capacity(0).is_err());
    }

    #[test]
    fn test_save_restore_round_trip() {
        let mut history = History::with_capacity(16).unwrap();
        let mut s = state(42);
        s.score = 7;
        s.time = 1.25;
        history.save(3, &s);

        let restored = history.restore(3).unwrap();
        assert_eq!(restored.score, 7);
        assert_eq!(restored.time, 1.25);
        assert_eq!(restored.seed, 42);
        // Exact round trip, counters included
        assert_eq!(
            serde_json::to_string(&restored).unwrap(),
            serde_json::to_string(&s).unwrap()
        );
    }

    #[test]
    fn test_restore_miss() {
        let mut history = History::with_capacity(16).unwrap();
        history.save(3, &state(1));
        assert!(history.restore(4).is_none());
        assert!(history.restore(19).is_none()); // same slot, wrong frame
    }

    #[test]
    fn test_restored_state_is_a_copy() {
        let mut history = History::with_capacity(16).unwrap();
        let s = state(1);
        history.save(0, &s);
        let mut restored = history.restore(0).unwrap();
        restored.score = 999;
        // The stored snapshot is untouched
        assert_eq!(history.restore(0).unwrap().score, 0);
    }

    #[test]
    fn test_eviction_window() {
        let capacity = 8;
        let mut history = History::with_capacity(capacity).unwrap();
        let s = state(1);
        let last = 19u64;
        for frame in 0..=last {
            history.save(frame, &s);
        }
        // Oldest retained frame is last - capacity + 1
        let oldest = last - capacity as u64 + 1;
        assert!(history.restore(0).is_none());
        assert!(history.restore(oldest - 1).is_none());
        assert!(history.restore(oldest).is_some());
        assert!(history.restore(last).is_some());
        assert_eq!(history.stats().total_frames, capacity);
    }

    #[test]
    fn test_overwrite_same_frame_keeps_second() {
        let mut history = History::with_capacity(16).unwrap();
        let mut s = state(1);
        s.score = 1;
        history.save(5, &s);
        s.score = 2;
        history.save(5, &s);
        assert_eq!(history.restore(5).unwrap().score, 2);
        assert_eq!(history.stats().total_frames, 1);
    }

    #[test]
    fn test_closest_available() {
        let mut history = History::with_capacity(16).unwrap();
        let s = state(1);
        history.save(2, &s);
        history.save(10, &s);
        assert_eq!(history.closest_available(3), Some(2));
        assert_eq!(history.closest_available(9), Some(10));
        assert_eq!(history.closest_available(10), Some(10));
        assert_eq!(history.closest_available(100), Some(10));
        // Equidistant: lower frame wins
        assert_eq!(history.closest_available(6), Some(2));
    }

    #[test]
    fn test_closest_available_empty() {
        let history = History::with_capacity(16).unwrap();
        assert_eq!(history.closest_available(0), None);
    }

    #[test]
    fn test_clear_resets_bookkeeping() {
        let mut history = History::with_capacity(16).unwrap();
        history.save(4, &state(1));
        history.clear();
        assert!(history.restore(4).is_none());
        let stats = history.stats();
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.frame_range, None);
        assert_eq!(stats.max_saved_frame, None);
    }

    #[test]
    fn test_stats_range() {
        let mut history = History::with_capacity(8).unwrap();
        let s = state(1);
        for frame in 10..14 {
            history.save(frame, &s);
        }
        let stats = history.stats();
        assert_eq!(stats.total_frames, 4);
        assert_eq!(stats.frame_range, Some((10, 13)));
        assert_eq!(stats.max_saved_frame, Some(13));
    }
}
