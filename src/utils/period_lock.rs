use std::sync::Arc;
use std::time::Duration;

use futures::lock::{Mutex, OwnedMutexGuard};
use moka::future::Cache;

use crate::model::payslip::Period;

/// Serializes payroll generation and approval per period.
///
/// One async mutex per period, held in a moka cache. Idle time counts cache
/// reads only, so a run held past the idle window can lose its entry and a
/// later caller then gets a fresh mutex. The transactional re-checks in the
/// payslip store still reject a conflicting write in that case.
#[derive(Clone)]
pub struct PeriodLocks {
    locks: Cache<Period, Arc<Mutex<()>>>,
}

impl PeriodLocks {
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(Duration::from_secs(3600))
                .build(),
        }
    }

    /// Waits for the period's lock. Other periods are not blocked.
    pub async fn acquire(&self, period: Period) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .get_with(period, async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}

impl Default for PeriodLocks {
    fn default() -> Self {
        Self::new()
    }
}
