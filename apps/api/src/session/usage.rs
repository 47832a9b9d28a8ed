//! Daily usage cap and cooldown bookkeeping for a single session.
//!
//! Every function takes `now` explicitly so the rules can be checked against
//! fixed clocks in tests. The counter belongs to one local calendar day and is
//! reset the first time it is observed on a later day.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Configured caps, taken from `Config` at startup.
#[derive(Debug, Clone, Copy)]
pub struct UsageLimits {
    pub daily_limit: u32,
    pub cooldown_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UsageDenied {
    DailyLimit { minutes_left: i64 },
    Cooldown { wait_seconds: u64 },
}

impl From<UsageDenied> for AppError {
    fn from(denied: UsageDenied) -> Self {
        match denied {
            UsageDenied::DailyLimit { minutes_left } => AppError::DailyLimitReached { minutes_left },
            UsageDenied::Cooldown { wait_seconds } => AppError::Cooldown { wait_seconds },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageCounter {
    /// Local calendar day the count belongs to.
    pub date: NaiveDate,
    pub count: u32,
    pub last_ts: Option<DateTime<Utc>>,
    /// Set when the session was unlocked with the admin override.
    pub bypass: bool,
}

impl UsageCounter {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
            last_ts: None,
            bypass: false,
        }
    }

    /// Resets the counter when `today` is a different day. Returns true if it rolled over.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == today {
            return false;
        }
        self.date = today;
        self.count = 0;
        self.last_ts = None;
        true
    }

    pub fn remaining(&self, limits: &UsageLimits) -> u32 {
        limits.daily_limit.saturating_sub(self.count)
    }

    /// Checks the daily cap, then the cooldown. The admin bypass skips both.
    pub fn check<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        limits: &UsageLimits,
    ) -> Result<(), UsageDenied> {
        if self.bypass {
            return Ok(());
        }

        if self.count >= limits.daily_limit {
            return Err(UsageDenied::DailyLimit {
                minutes_left: minutes_until_midnight(now),
            });
        }

        if let Some(last) = self.last_ts {
            let since = (now.with_timezone(&Utc) - last).num_milliseconds() as f64 / 1000.0;
            let cooldown = limits.cooldown_seconds as f64;
            if since < cooldown {
                return Err(UsageDenied::Cooldown {
                    wait_seconds: (cooldown - since + 1.0).floor() as u64,
                });
            }
        }

        Ok(())
    }

    /// Counts one successful generation. Admin sessions are not counted.
    pub fn record<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        if self.bypass {
            return;
        }
        self.count += 1;
        self.last_ts = Some(now.with_timezone(&Utc));
    }
}

/// Whole minutes from `now` until the next midnight in `now`'s own timezone.
fn minutes_until_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let local = now.naive_local();
    let reset_at = local
        .date()
        .checked_add_days(Days::new(1))
        .unwrap_or(local.date())
        .and_time(NaiveTime::MIN);
    (reset_at - local).num_seconds().div_euclid(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    const LIMITS: UsageLimits = UsageLimits {
        daily_limit: 3,
        cooldown_seconds: 5,
    };

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_fresh_counter_allows_generation() {
        let counter = UsageCounter::new(day(14));
        assert_eq!(counter.check(&at(10, 0, 0), &LIMITS), Ok(()));
        assert_eq!(counter.remaining(&LIMITS), 3);
    }

    #[test]
    fn test_record_increments_and_stamps() {
        let mut counter = UsageCounter::new(day(14));
        counter.record(&at(10, 0, 0));
        assert_eq!(counter.count, 1);
        assert_eq!(counter.last_ts, Some(at(10, 0, 0)));
        assert_eq!(counter.remaining(&LIMITS), 2);
    }

    #[test]
    fn test_cooldown_blocks_then_elapses() {
        let mut counter = UsageCounter::new(day(14));
        counter.record(&at(10, 0, 0));

        // 2s later: 5 - 2 + 1 = 4
        assert_eq!(
            counter.check(&at(10, 0, 2), &LIMITS),
            Err(UsageDenied::Cooldown { wait_seconds: 4 })
        );
        // exactly at the cooldown boundary the request is allowed
        assert_eq!(counter.check(&at(10, 0, 5), &LIMITS), Ok(()));
    }

    #[test]
    fn test_cooldown_wait_floors_fractional_seconds() {
        let mut counter = UsageCounter::new(day(14));
        counter.record(&at(10, 0, 0));
        let now = at(10, 0, 1) + Duration::milliseconds(500);
        // 5 - 1.5 + 1 = 4.5 -> 4
        assert_eq!(
            counter.check(&now, &LIMITS),
            Err(UsageDenied::Cooldown { wait_seconds: 4 })
        );
    }

    #[test]
    fn test_daily_limit_reports_minutes_to_midnight() {
        let mut counter = UsageCounter::new(day(14));
        counter.count = 3;
        assert_eq!(
            counter.check(&at(22, 30, 30), &LIMITS),
            Err(UsageDenied::DailyLimit { minutes_left: 89 })
        );
    }

    #[test]
    fn test_daily_limit_uses_local_midnight() {
        let mut counter = UsageCounter::new(day(14));
        counter.count = 3;
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 21:00 UTC is 23:00 at +02:00, one hour before local midnight
        let now = at(21, 0, 0).with_timezone(&plus_two);
        assert_eq!(
            counter.check(&now, &LIMITS),
            Err(UsageDenied::DailyLimit { minutes_left: 60 })
        );
    }

    #[test]
    fn test_daily_limit_checked_before_cooldown() {
        let mut counter = UsageCounter::new(day(14));
        counter.count = 3;
        counter.last_ts = Some(at(23, 59, 58));
        assert!(matches!(
            counter.check(&at(23, 59, 59), &LIMITS),
            Err(UsageDenied::DailyLimit { minutes_left: 0 })
        ));
    }

    #[test]
    fn test_roll_over_resets_on_new_day() {
        let mut counter = UsageCounter::new(day(14));
        counter.count = 3;
        counter.last_ts = Some(at(23, 59, 0));

        assert!(!counter.roll_over(day(14)));
        assert_eq!(counter.count, 3);

        assert!(counter.roll_over(day(15)));
        assert_eq!(counter.date, day(15));
        assert_eq!(counter.count, 0);
        assert_eq!(counter.last_ts, None);
    }

    #[test]
    fn test_bypass_skips_caps_and_counting() {
        let mut counter = UsageCounter::new(day(14));
        counter.bypass = true;
        counter.count = 99;
        counter.last_ts = Some(at(10, 0, 0));

        assert_eq!(counter.check(&at(10, 0, 1), &LIMITS), Ok(()));
        counter.record(&at(10, 0, 1));
        assert_eq!(counter.count, 99);
        assert_eq!(counter.last_ts, Some(at(10, 0, 0)));
    }

    #[test]
    fn test_remaining_never_negative() {
        let mut counter = UsageCounter::new(day(14));
        counter.count = 10;
        assert_eq!(counter.remaining(&LIMITS), 0);
    }
}
