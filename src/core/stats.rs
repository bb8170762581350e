//! Signup statistics for the admin dashboard.
//!
//! Day boundaries are taken in the time zone of the `now` passed in, so the
//! same users can bucket differently for an operator in another zone.

use crate::models::User;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::Serialize;

/// Signup counts over the usual dashboard windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupStats {
    /// Created today
    pub today: usize,
    /// Created yesterday
    pub yesterday: usize,
    /// Today and the six days before it
    pub last7: usize,
    /// Current calendar month
    pub month: usize,
    /// Every user, including future-dated ones
    pub total: usize,
}

/// Buckets `users` by the local date of `created_at`. Users created after
/// `now` only count toward `total`.
#[must_use]
pub fn signup_stats<Tz: TimeZone>(users: &[User], now: &DateTime<Tz>) -> SignupStats {
    let today = now.date_naive();
    let yesterday = today.pred_opt();
    let week_start = today.checked_sub_days(Days::new(6));

    let mut stats = SignupStats {
        total: users.len(),
        ..SignupStats::default()
    };
    for day in users
        .iter()
        .map(|u| u.created_at.with_timezone(&now.timezone()).date_naive())
        .filter(|day| *day <= today)
    {
        if day == today {
            stats.today += 1;
        }
        if Some(day) == yesterday {
            stats.yesterday += 1;
        }
        if week_start.is_none_or(|start| day >= start) {
            stats.last7 += 1;
        }
        if day.year() == today.year() && day.month() == today.month() {
            stats.month += 1;
        }
    }
    stats
}

/// Signups per local day for the `days` days ending today, oldest first.
#[must_use]
pub fn daily_signups<Tz: TimeZone>(users: &[User], now: &DateTime<Tz>, days: u32) -> Vec<(NaiveDate, usize)> {
    let today = now.date_naive();
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|day| {
            let count = users
                .iter()
                .filter(|u| u.created_at.with_timezone(&now.timezone()).date_naive() == day)
                .count();
            (day, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn users_at(offsets_in_hours: &[i64]) -> Vec<User> {
        offsets_in_hours
            .iter()
            .enumerate()
            .map(|(i, hours)| user_fixture(&i.to_string(), jan_first() + Duration::hours(*hours)))
            .collect()
    }

    #[test]
    fn test_signup_buckets() {
        // now = 2024-01-10 12:00 UTC
        let now = jan_first() + Duration::days(9) + Duration::hours(12);
        let users = users_at(&[
            9 * 24 + 1, // today
            8 * 24 + 5, // yesterday
            4 * 24,     // this week
            0,          // earlier this month
            -24,        // last year
        ]);

        let stats = signup_stats(&users, &now);

        assert_eq!(
            stats,
            SignupStats {
                today: 1,
                yesterday: 1,
                last7: 3,
                month: 4,
                total: 5,
            }
        );
    }

    #[test]
    fn test_day_boundaries_follow_time_zone() {
        // 2024-01-02 02:00 UTC is still Jan 1st at UTC-3
        let users = users_at(&[26]);
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let now_utc = jan_first() + Duration::days(1) + Duration::hours(4);
        let now_brt = now_utc.with_timezone(&brt);

        assert_eq!(signup_stats(&users, &now_utc).today, 1);
        assert_eq!(signup_stats(&users, &now_brt).yesterday, 1);
    }

    #[test]
    fn test_daily_signups_window() {
        let now = jan_first() + Duration::days(2);
        let users = users_at(&[0, 1, 48]);

        let series = daily_signups(&users, &now, 3);

        let counts: Vec<usize> = series.iter().map(|(_, count)| *count).collect();
        assert_eq!(counts, vec![2, 0, 1]);
        assert_eq!(series[0].0, jan_first().date_naive());
        assert!(daily_signups(&users, &Utc::now(), 0).is_empty());
    }
}
