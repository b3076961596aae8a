//! Per-entity one-shot countdown timers.

use crate::api::types::Key;

/// A set of independent countdowns keyed by caller-chosen identifiers.
///
/// Entries keep insertion order so alarms that go off on the same frame
/// fire in the order they were first armed. Re-arming an existing alarm
/// keeps its place.
#[derive(Debug, Clone, Default)]
pub struct Alarms {
    entries: Vec<(Key, f32)>,
}

impl Alarms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` with `ticks` frames remaining, or clear it with `None`.
    pub fn set(&mut self, id: Key, ticks: Option<f32>) {
        let slot = self.entries.iter().position(|(k, _)| *k == id);
        match (slot, ticks) {
            (Some(i), Some(t)) => self.entries[i].1 = t,
            (None, Some(t)) => self.entries.push((id, t)),
            (Some(i), None) => {
                self.entries.remove(i);
            }
            (None, None) => {}
        }
    }

    /// Remaining frames on `id`, or `None` if it is not set.
    pub fn get(&self, id: &Key) -> Option<f32> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, t)| *t)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Count every alarm down by `amount`. Alarms reaching zero are removed
    /// and returned in firing order.
    pub fn tick(&mut self, amount: f32) -> Vec<Key> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let mut fired = Vec::new();
        self.entries.retain_mut(|(key, remaining)| {
            *remaining -= amount;
            if *remaining <= 0.0 {
                fired.push(key.clone());
                false
            } else {
                true
            }
        });
        fired
    }
}
