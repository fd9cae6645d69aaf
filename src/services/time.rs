//! Time basis: all slot arithmetic runs in the cafe's fixed civil timezone
//!
//! Proration must be deterministic across deployment environments, so no
//! component reads the host's local clock directly; everything goes
//! through [`TimeBasis`].

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{AppError, AppResult};

/// Source of the current instant. Seam for deterministic tests.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct TimeBasis {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl TimeBasis {
    pub fn new(clock: Arc<dyn Clock>, utc_offset_minutes: i32) -> AppResult<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid UTC offset: {} minutes",
                utc_offset_minutes
            ))
        })?;
        Ok(Self { clock, offset })
    }

    /// Current instant in the cafe's civil timezone
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now_utc().with_timezone(&self.offset)
    }

    /// Combine a calendar date (YYYY-MM-DD) and a wall time (HH:MM or
    /// HH:MM:SS) into an instant in the cafe's timezone. Malformed input
    /// fails with [`AppError::InvalidTimeInput`]; pricing callers skip the
    /// entry rather than abort.
    pub fn to_instant(&self, date: &str, time: &str) -> AppResult<DateTime<FixedOffset>> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| AppError::InvalidTimeInput(format!("bad date {:?}: {}", date, e)))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .map_err(|e| AppError::InvalidTimeInput(format!("bad time {:?}: {}", time, e)))?;
        let naive = NaiveDateTime::new(date, time);
        naive
            .and_local_timezone(self.offset)
            .single()
            .ok_or_else(|| AppError::InvalidTimeInput(format!("unmappable local time {}", naive)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ist_basis(now_utc: DateTime<Utc>) -> TimeBasis {
        TimeBasis::new(Arc::new(FixedClock(now_utc)), 330).unwrap()
    }

    #[test]
    fn now_is_expressed_in_fixed_offset() {
        let utc = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
        let basis = ist_basis(utc);
        let now = basis.now();
        assert_eq!(now.offset().local_minus_utc(), 330 * 60);
        // 09:00 UTC is 14:30 IST
        assert_eq!(now.format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn to_instant_accepts_both_time_formats() {
        let basis = ist_basis(Utc::now());
        let a = basis.to_instant("2025-01-10", "14:00").unwrap();
        let b = basis.to_instant("2025-01-10", "14:00:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn to_instant_rejects_malformed_input() {
        let basis = ist_basis(Utc::now());
        assert!(matches!(
            basis.to_instant("10/01/2025", "14:00"),
            Err(AppError::InvalidTimeInput(_))
        ));
        assert!(matches!(
            basis.to_instant("2025-01-10", "2pm"),
            Err(AppError::InvalidTimeInput(_))
        ));
    }

    #[test]
    fn instants_are_comparable_across_dates() {
        let basis = ist_basis(Utc::now());
        let evening = basis.to_instant("2025-01-10", "23:30").unwrap();
        let next_morning = basis.to_instant("2025-01-11", "00:15").unwrap();
        assert!(evening < next_morning);
    }
}
