//! Timer registry.
//!
//! Process-wide store of active timers, keyed by chat identity. All
//! mutations of a chat's sequence go through the registry's methods; a
//! single mutex domain serializes them, which is plenty for chat-scale
//! volume. Instantiated once at startup and passed into the request-handling
//! path and into each timer's completion callback, never reached as ambient
//! global state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::models::{ChatId, TimerId};
use crate::timer::{self, CancelHandle};

/// Remaining and total time of one scheduled timer, as reported by
/// [`TimerRegistry::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStatus {
    pub remaining: Duration,
    pub total: Duration,
}

/// One scheduled entry in a chat's sequence.
///
/// The entry exists only while the timer is in the Scheduled state; firing
/// and cancellation both remove it (lazily in the fired case).
struct TimerEntry {
    id: TimerId,
    started_at: Instant,
    total: Duration,
    cancel: CancelHandle,
}

impl TimerEntry {
    fn settled(&self, now: Instant) -> bool {
        now.duration_since(self.started_at) > self.total
    }

    fn remaining(&self, now: Instant) -> Duration {
        self.total.saturating_sub(now.duration_since(self.started_at))
    }
}

#[derive(Default)]
struct ChatTimers {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

/// Concurrency-safe registry of all active timers.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone, Default)]
pub struct TimerRegistry {
    chats: Arc<Mutex<HashMap<ChatId, ChatTimers>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer for `chat`, start its countdown and append it to the
    /// chat's sequence. When the deadline elapses uncancelled, `on_fire`
    /// runs once and the entry removes itself.
    ///
    /// Safe to call concurrently for the same or different chats.
    pub async fn schedule<F, Fut>(&self, chat: ChatId, total: Duration, on_fire: F) -> TimerId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let mut chats = self.chats.lock().await;
        let slot = chats.entry(chat).or_default();

        let id = TimerId(slot.next_id);
        slot.next_id += 1;

        let registry = self.clone();
        let cancel = timer::start(total, move || async move {
            on_fire().await;
            registry.remove(chat, id).await;
        });

        slot.entries.push(TimerEntry {
            id,
            started_at: Instant::now(),
            total,
            cancel,
        });
        debug!(%chat, %id, total_secs = total.as_secs(), "timer scheduled");

        id
    }

    /// Pending timers for `chat`, sorted ascending by remaining time
    /// (soonest-firing first, stable by insertion for ties).
    ///
    /// Settled entries that have fired but not yet removed themselves are
    /// pruned here rather than reported with negative remaining time.
    pub async fn list(&self, chat: ChatId) -> Vec<TimerStatus> {
        let mut chats = self.chats.lock().await;
        let Some(slot) = chats.get_mut(&chat) else {
            return Vec::new();
        };

        let now = Instant::now();
        slot.entries.retain(|e| !e.settled(now));

        let mut statuses: Vec<TimerStatus> = slot
            .entries
            .iter()
            .map(|e| TimerStatus {
                remaining: e.remaining(now),
                total: e.total,
            })
            .collect();
        statuses.sort_by_key(|s| s.remaining);

        statuses
    }

    /// Cancel every scheduled timer for `chat` and empty its sequence.
    ///
    /// A timer whose deadline races the signal may still fire; the signal
    /// is then simply discarded. Calling this on a chat with no timers is a
    /// no-op.
    pub async fn clear_all(&self, chat: ChatId) {
        let entries = {
            let mut chats = self.chats.lock().await;
            match chats.get_mut(&chat) {
                Some(slot) => std::mem::take(&mut slot.entries),
                None => return,
            }
        };

        let count = entries.len();
        for entry in entries {
            entry.cancel.cancel();
        }
        debug!(%chat, count, "cleared all timers");
    }

    /// Drop one entry from a chat's sequence. Called by the timer itself
    /// after firing; already-gone ids are ignored.
    pub(crate) async fn remove(&self, chat: ChatId, id: TimerId) {
        let mut chats = self.chats.lock().await;
        if let Some(slot) = chats.get_mut(&chat) {
            slot.entries.retain(|e| e.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const CHAT: ChatId = ChatId(42);

    async fn noop() {}

    #[tokio::test(start_paused = true)]
    async fn test_schedule_appends_entry() {
        let registry = TimerRegistry::new();
        registry
            .schedule(CHAT, Duration::from_secs(60), noop)
            .await;

        let timers = registry.list(CHAT).await;
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].total, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ids_are_creation_ordered() {
        let registry = TimerRegistry::new();
        let a = registry.schedule(CHAT, Duration::from_secs(10), noop).await;
        let b = registry.schedule(CHAT, Duration::from_secs(20), noop).await;
        assert_eq!(a, TimerId(0));
        assert_eq!(b, TimerId(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_sorted_by_remaining_ascending() {
        let registry = TimerRegistry::new();
        registry.schedule(CHAT, Duration::from_secs(30), noop).await;
        registry.schedule(CHAT, Duration::from_secs(10), noop).await;
        registry.schedule(CHAT, Duration::from_secs(20), noop).await;

        let timers = registry.list(CHAT).await;
        let totals: Vec<u64> = timers.iter().map(|t| t.total.as_secs()).collect();
        assert_eq!(totals, vec![10, 20, 30]);
        assert!(timers.windows(2).all(|w| w[0].remaining <= w[1].remaining));
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_remaining_shrinks_over_time() {
        let registry = TimerRegistry::new();
        registry.schedule(CHAT, Duration::from_secs(100), noop).await;

        tokio::time::sleep(Duration::from_secs(40)).await;

        let timers = registry.list(CHAT).await;
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].remaining, Duration::from_secs(60));
        assert_eq!(timers[0].total, Duration::from_secs(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_unknown_chat_is_empty() {
        let registry = TimerRegistry::new();
        assert!(registry.list(ChatId(999)).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_timer_is_pruned_from_list() {
        let registry = TimerRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .schedule(CHAT, Duration::from_secs(5), move || async move {
                let _ = tx.send(());
            })
            .await;
        registry.schedule(CHAT, Duration::from_secs(3600), noop).await;

        timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("first timer should fire")
            .expect("fired signal");
        tokio::time::sleep(Duration::from_secs(1)).await;

        let timers = registry.list(CHAT).await;
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].total, Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_cancels_everything() {
        let registry = TimerRegistry::new();
        let fired = Arc::new(AtomicU32::new(0));
        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            registry
                .schedule(CHAT, Duration::from_secs(10), move || async move {
                    fired.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }

        registry.clear_all(CHAT).await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(registry.list(CHAT).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_on_empty_chat_is_noop() {
        let registry = TimerRegistry::new();
        registry.clear_all(CHAT).await;
        registry.clear_all(CHAT).await;
        assert!(registry.list(CHAT).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_all_after_fire_discards_stale_signal() {
        let registry = TimerRegistry::new();
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = Arc::clone(&fired);
        registry
            .schedule(CHAT, Duration::from_secs(1), move || async move {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        // The timer has already fired and removed itself; clearing now must
        // neither double-fire nor block.
        registry.clear_all(CHAT).await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_one_outcome_per_timer() {
        let registry = TimerRegistry::new();
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = Arc::clone(&fired);
        registry
            .schedule(CHAT, Duration::from_secs(10), move || async move {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        registry.clear_all(CHAT).await;
        tokio::time::sleep(Duration::from_secs(3600)).await;

        // Cancelled before the deadline: zero notifications, never both
        // outcomes.
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(registry.list(CHAT).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_schedules_lose_no_updates() {
        let registry = TimerRegistry::new();
        let mut handles = Vec::new();
        for i in 0..32u64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .schedule(CHAT, Duration::from_secs(1000 + i), noop)
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("schedule task");
        }

        assert_eq!(registry.list(CHAT).await.len(), 32);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chats_are_independent() {
        let registry = TimerRegistry::new();
        let other = ChatId(7);
        registry.schedule(CHAT, Duration::from_secs(10), noop).await;
        registry.schedule(other, Duration::from_secs(20), noop).await;

        registry.clear_all(CHAT).await;

        assert!(registry.list(CHAT).await.is_empty());
        assert_eq!(registry.list(other).await.len(), 1);
    }
}
