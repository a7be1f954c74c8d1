pub mod period_lock;
