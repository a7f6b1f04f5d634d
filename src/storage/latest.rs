//! Latest-state register
//!
//! Single slot holding the most recently ingested reading. The whole reading
//! is swapped under one lock, so a reader never sees new axes with an old
//! timestamp.

use crate::storage::types::Reading;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct LatestRegister {
    slot: RwLock<Option<Reading>>,
}

impl LatestRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current reading
    pub fn set(&self, reading: Reading) {
        // The slot only ever holds a complete value, so a poisoned lock is still usable
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(reading);
    }

    /// Snapshot of the current reading, `None` before the first ingestion
    pub fn get(&self) -> Option<Reading> {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn reading(v: f64) -> Reading {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Reading::new(v, v, v, ts + chrono::Duration::milliseconds(v as i64))
    }

    #[test]
    fn test_absent_until_first_set() {
        let register = LatestRegister::new();
        assert!(register.is_empty());
        assert_eq!(register.get(), None);

        register.set(reading(1.0));
        assert_eq!(register.get(), Some(reading(1.0)));

        register.set(reading(2.0));
        assert_eq!(register.get(), Some(reading(2.0)));
    }

    #[test]
    fn test_readers_never_see_torn_values() {
        let register = Arc::new(LatestRegister::new());
        register.set(reading(0.0));

        let writer = {
            let register = Arc::clone(&register);
            std::thread::spawn(move || {
                for i in 1..2000 {
                    register.set(reading(i as f64));
                }
            })
        };

        for _ in 0..2000 {
            let r = register.get().unwrap();
            assert_eq!(r.ax, r.ay);
            assert_eq!(r.ay, r.az);
            assert_eq!(r.timestamp, reading(r.ax).timestamp);
        }

        writer.join().unwrap();
    }
}
