//! Per-session storage with single-writer discipline.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::SessionId;
use domain::{OrderSession, OrderState};
use tokio::sync::{Mutex, RwLock};

/// A session plus the time of its last inbound event.
#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    pub session: OrderSession,
    pub touched_at: DateTime<Utc>,
}

impl SessionSlot {
    /// Records activity at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.touched_at = now;
    }

    /// Returns true if the slot holds an order in progress that has been
    /// quiet since before `cutoff`.
    pub fn is_abandoned(&self, cutoff: DateTime<Utc>) -> bool {
        self.session.is_active() && self.touched_at < cutoff
    }

    /// Returns true if the slot holds no order and has not been touched
    /// after `cutoff`. Such a slot carries nothing worth keeping.
    pub fn is_stale_idle(&self, cutoff: DateTime<Utc>) -> bool {
        self.session.state() == OrderState::Idle && self.touched_at <= cutoff
    }
}

/// Maps session identity to its order session.
///
/// Each slot sits behind its own async mutex. Whoever holds the guard is the
/// only writer for that session until it is dropped, which serializes
/// inputs per session while distinct sessions proceed in parallel.
#[derive(Debug, Clone, Default)]
pub struct SessionRepository {
    slots: Arc<RwLock<HashMap<SessionId, Arc<Mutex<SessionSlot>>>>>,
}

impl SessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `id`, creating an idle one if needed.
    pub async fn slot(&self, id: SessionId, now: DateTime<Utc>) -> Arc<Mutex<SessionSlot>> {
        if let Some(slot) = self.slots.read().await.get(&id) {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(id).or_insert_with(|| {
            Arc::new(Mutex::new(SessionSlot {
                session: OrderSession::default(),
                touched_at: now,
            }))
        }))
    }

    /// Returns the existing slot for `id` without creating one.
    pub async fn find(&self, id: SessionId) -> Option<Arc<Mutex<SessionSlot>>> {
        self.slots.read().await.get(&id).cloned()
    }

    /// Returns a snapshot of the session, if one was ever created.
    pub async fn get(&self, id: SessionId) -> Option<OrderSession> {
        let slot = self.slots.read().await.get(&id).cloned()?;
        let slot = slot.lock().await;
        Some(slot.session.clone())
    }

    /// Resets the session to `Idle`, dropping every collected field.
    pub async fn clear(&self, id: SessionId) {
        let slot = self.slots.read().await.get(&id).cloned();
        if let Some(slot) = slot {
            slot.lock().await.session = OrderSession::default();
        }
    }

    /// Drops idle slots not touched after `cutoff`.
    ///
    /// A slot still referenced outside the map (a handler holds or waits on
    /// its lock) is kept, so no writer is ever left on an orphaned slot.
    /// Returns the number of slots dropped.
    pub async fn evict_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => !guard.is_stale_idle(cutoff),
                Err(_) => true,
            }
        });
        before - slots.len()
    }

    /// All known slots.
    pub async fn slots(&self) -> Vec<(SessionId, Arc<Mutex<SessionSlot>>)> {
        self.slots
            .read()
            .await
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect()
    }

    /// Returns the number of known sessions.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use domain::Aggregate;

    use super::*;

    fn now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[tokio::test]
    async fn test_slot_created_idle() {
        let repo = SessionRepository::new();
        assert!(repo.is_empty().await);
        assert!(repo.get(SessionId::new(1)).await.is_none());

        let slot = repo.slot(SessionId::new(1), now()).await;

        assert_eq!(slot.lock().await.session.state(), OrderState::Idle);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_same_slot_returned() {
        let repo = SessionRepository::new();
        let a = repo.slot(SessionId::new(1), now()).await;
        let b = repo.slot(SessionId::new(1), now()).await;

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_clear_resets_session() {
        let repo = SessionRepository::new();
        let id = SessionId::new(5);
        {
            let slot = repo.slot(id, now()).await;
            let mut slot = slot.lock().await;
            let events = slot.session.start(None).unwrap();
            slot.session.apply_events(events);
        }
        assert_eq!(
            repo.get(id).await.map(|s| s.state()),
            Some(OrderState::ChoosingCakeKind)
        );

        repo.clear(id).await;

        assert_eq!(repo.get(id).await, Some(OrderSession::default()));
    }

    #[tokio::test]
    async fn test_abandoned_only_when_active_and_stale() {
        let mut slot = SessionSlot {
            session: OrderSession::default(),
            touched_at: now(),
        };
        let cutoff = now() + TimeDelta::minutes(1);
        assert!(!slot.is_abandoned(cutoff));

        let events = slot.session.start(None).unwrap();
        slot.session.apply_events(events);
        assert!(slot.is_abandoned(cutoff));

        slot.touch(cutoff);
        assert!(!slot.is_abandoned(cutoff));
    }

    #[tokio::test]
    async fn test_find_does_not_create() {
        let repo = SessionRepository::new();
        assert!(repo.find(SessionId::new(9)).await.is_none());
        assert!(repo.is_empty().await);

        repo.slot(SessionId::new(9), now()).await;
        assert!(repo.find(SessionId::new(9)).await.is_some());
    }

    #[tokio::test]
    async fn test_evict_idle_drops_only_stale_idle_slots() {
        let repo = SessionRepository::new();
        let cutoff = now() + TimeDelta::minutes(1);

        for id in 1..=100 {
            repo.slot(SessionId::new(id), now()).await;
        }
        {
            let active = repo.slot(SessionId::new(200), now()).await;
            let mut active = active.lock().await;
            let events = active.session.start(None).unwrap();
            active.session.apply_events(events);
        }
        repo.slot(SessionId::new(300), cutoff + TimeDelta::minutes(1)).await;

        assert_eq!(repo.evict_idle(cutoff).await, 100);
        assert_eq!(repo.len().await, 2);
        assert!(repo.find(SessionId::new(200)).await.is_some());
        assert!(repo.find(SessionId::new(300)).await.is_some());
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_slots_in_use() {
        let repo = SessionRepository::new();
        let cutoff = now() + TimeDelta::minutes(1);
        let held = repo.slot(SessionId::new(1), now()).await;

        assert_eq!(repo.evict_idle(cutoff).await, 0);

        drop(held);
        assert_eq!(repo.evict_idle(cutoff).await, 1);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_distinct_sessions_do_not_block() {
        let repo = SessionRepository::new();
        let first = repo.slot(SessionId::new(1), now()).await;
        let _held = first.lock().await;

        let second = repo.slot(SessionId::new(2), now()).await;
        assert!(second.try_lock().is_ok());
        assert!(first.try_lock().is_err());
    }
}
