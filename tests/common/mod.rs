#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use taskdag::Task;

/// Task over a unit context that sleeps for `delay_ms` and returns it.
pub fn sleepy_task(id: &str, deps: &[&str], delay_ms: u64) -> Task<(), u64> {
    Task::new(id, deps.iter().copied(), move |_| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(delay_ms)
    })
}

/// Tracks how many task bodies are inside their critical section at once.
#[derive(Clone, Default)]
pub struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl InFlight {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Like [`sleepy_task`], but counted while sleeping.
    pub fn task(&self, id: &str, deps: &[&str], delay_ms: u64) -> Task<(), u64> {
        let counter = self.clone();
        Task::new(id, deps.iter().copied(), move |_| {
            let counter = counter.clone();
            async move {
                let now = counter.current.fetch_add(1, Ordering::SeqCst) + 1;
                counter.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                counter.current.fetch_sub(1, Ordering::SeqCst);
                Ok(delay_ms)
            }
        })
    }
}
