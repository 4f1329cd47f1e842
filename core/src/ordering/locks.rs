// core/src/ordering/locks.rs

use crate::ordering::model::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{event, Level};

type Slots = Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>;

/// One async mutex per user, created on first use and dropped again once
/// nobody holds or waits for it.
#[derive(Debug, Default, Clone)]
pub struct UserLocks {
  slots: Slots,
}

impl UserLocks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Waits until no other holder of `user_id`'s lock remains.
  pub async fn acquire(&self, user_id: UserId) -> UserLockGuard {
    let slot = {
      let mut slots = self.slots.lock();
      Arc::clone(slots.entry(user_id).or_default())
    };
    let guard = slot.lock_owned().await;
    event!(Level::TRACE, user_id, "User lock acquired.");
    UserLockGuard {
      user_id,
      slots: Arc::clone(&self.slots),
      guard: Some(guard),
    }
  }

  /// Number of users that currently have a lock entry.
  pub fn active_users(&self) -> usize {
    self.slots.lock().len()
  }
}

/// Holds a user's lock until dropped.
#[derive(Debug)]
pub struct UserLockGuard {
  user_id: UserId,
  slots: Slots,
  guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard {
  fn drop(&mut self) {
    drop(self.guard.take());
    let mut slots = self.slots.lock();
    // Only the map itself still references the mutex: no holder, no waiter.
    if slots.get(&self.user_id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
      slots.remove(&self.user_id);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn entry_is_removed_after_last_release() {
    let locks = UserLocks::new();
    let guard = locks.acquire(7).await;
    assert_eq!(locks.active_users(), 1);
    drop(guard);
    assert_eq!(locks.active_users(), 0);
  }

  #[tokio::test]
  async fn same_user_waits_for_holder() {
    let locks = UserLocks::new();
    let first = locks.acquire(1).await;

    let contender = {
      let locks = locks.clone();
      tokio::spawn(async move {
        let _guard = locks.acquire(1).await;
      })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!contender.is_finished());

    drop(first);
    tokio::time::timeout(Duration::from_secs(1), contender)
      .await
      .expect("contender should get the lock")
      .unwrap();
    assert_eq!(locks.active_users(), 0);
  }

  #[tokio::test]
  async fn different_users_do_not_contend() {
    let locks = UserLocks::new();
    let _a = locks.acquire(1).await;
    let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
    assert!(b.is_ok());
    assert_eq!(locks.active_users(), 2);
  }
}
