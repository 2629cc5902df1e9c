use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::ConversationKey;

#[derive(Debug, Default)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    /// Holders plus waiters. The slot goes away when it drops to zero.
    users: usize,
}

/// Per-key async locks used to serialize dispatch for one key.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    slots: Mutex<HashMap<ConversationKey, Slot>>,
}

/// Registered before waiting, so a cancelled `acquire` still releases its slot.
pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: ConversationKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub(crate) async fn acquire(&self, key: &ConversationKey) -> KeyGuard<'_> {
        let lock = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(key.clone()).or_default();
            slot.users += 1;
            slot.lock.clone()
        };

        let mut guard = KeyGuard {
            locks: self,
            key: key.clone(),
            guard: None,
        };
        guard.guard = Some(lock.lock_owned().await);
        guard
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut slots = self.locks.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Entry::Occupied(mut slot) = slots.entry(self.key.clone()) {
            slot.get_mut().users -= 1;
            if slot.get().users == 0 {
                slot.remove();
            }
        }
    }
}
