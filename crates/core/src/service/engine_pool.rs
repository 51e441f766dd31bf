use std::path::Path;

use crate::engine::domain::inference_engine::{EngineFactory, InferenceEngine};

use super::error::InitError;

/// Fixed-capacity pool of loaded engine instances addressed by 1-based
/// handles (0 is never a valid handle).
///
/// Occupancy is the only validity signal: each slot independently holds
/// either one live engine or nothing. The pool itself carries no lock;
/// the service serializes all access against the background task by
/// joining it before any mutation.
pub struct EnginePool {
    slots: Vec<Option<Box<dyn InferenceEngine>>>,
}

impl EnginePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Load an engine into the first empty slot and return its handle.
    ///
    /// A full pool fails before construction is attempted; a construction
    /// failure leaves the chosen slot empty. Neither case is retried.
    pub fn acquire(
        &mut self,
        factory: &dyn EngineFactory,
        model_path: &Path,
    ) -> Result<usize, InitError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(InitError::PoolExhausted)?;

        let engine = factory.create(model_path)?;
        self.slots[index] = Some(engine);
        Ok(index + 1)
    }

    /// Drop the engine at `handle` and mark the slot empty.
    ///
    /// A no-op for out-of-range handles and for already-empty slots.
    pub fn release(&mut self, handle: usize) {
        if let Some(slot) = handle.checked_sub(1).and_then(|i| self.slots.get_mut(i)) {
            *slot = None;
        }
    }

    /// Whether `handle` addresses a slot at all, occupied or not.
    pub fn contains(&self, handle: usize) -> bool {
        (1..=self.slots.len()).contains(&handle)
    }

    pub fn is_occupied(&self, handle: usize) -> bool {
        handle
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .is_some_and(|slot| slot.is_some())
    }

    /// Move the engine out of `handle`'s slot for exclusive use by a job.
    /// The slot reads as empty until `restore` puts the engine back.
    pub(crate) fn take_engine(&mut self, handle: usize) -> Option<Box<dyn InferenceEngine>> {
        self.slots.get_mut(handle.checked_sub(1)?)?.take()
    }

    pub(crate) fn restore(&mut self, slot_index: usize, engine: Box<dyn InferenceEngine>) {
        if let Some(slot) = self.slots.get_mut(slot_index) {
            *slot = Some(engine);
        }
    }
}
