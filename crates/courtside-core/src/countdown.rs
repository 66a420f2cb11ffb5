// Countdown arithmetic for the next tip-off.

use std::fmt;

use chrono::{DateTime, Utc};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownView {
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    /// The target time has been reached.
    Started,
}

impl CountdownView {
    /// Split the time left until `target` into whole days, hours, minutes
    /// and seconds, truncating toward zero at each step.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let delta = (target - now).num_milliseconds();
        if delta <= 0 {
            return CountdownView::Started;
        }
        CountdownView::Remaining {
            days: delta / MS_PER_DAY,
            hours: (delta % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (delta % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (delta % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, CountdownView::Started)
    }
}

impl fmt::Display for CountdownView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownView::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => write!(f, "{days}d {hours:02}h {minutes:02}m {seconds:02}s"),
            CountdownView::Started => write!(f, "started"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn splits_remaining_time() {
        let target = now()
            + Duration::days(2)
            + Duration::hours(3)
            + Duration::minutes(4)
            + Duration::seconds(5)
            + Duration::milliseconds(999);
        assert_eq!(
            CountdownView::until(target, now()),
            CountdownView::Remaining {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
    }

    #[test]
    fn display_is_compact() {
        let view = CountdownView::Remaining {
            days: 12,
            hours: 3,
            minutes: 0,
            seconds: 9,
        };
        assert_eq!(view.to_string(), "12d 03h 00m 09s");
        assert_eq!(CountdownView::Started.to_string(), "started");
    }

    #[test]
    fn sub_second_remaining_shows_zeros() {
        let target = now() + Duration::milliseconds(400);
        assert_eq!(
            CountdownView::until(target, now()),
            CountdownView::Remaining {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn reached_or_past_target_is_started() {
        assert!(CountdownView::until(now(), now()).is_started());
        assert!(CountdownView::until(now() - Duration::minutes(1), now()).is_started());
    }
}
