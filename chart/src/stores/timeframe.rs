use chrono::{DateTime, Duration, Utc};

use shared::models::TimeFrame;
use shared::utils::{history_floor, parse_date};

/// Active timeframe and the request window derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeStore {
    timeframe: TimeFrame,
    period1: DateTime<Utc>,
    period2: DateTime<Utc>,
}

impl TimeframeStore {
    pub fn new(timeframe: TimeFrame, now: DateTime<Utc>) -> Self {
        let (period1, period2) = Self::window(timeframe, now);
        Self {
            timeframe,
            period1,
            period2,
        }
    }

    pub fn timeframe(&self) -> TimeFrame {
        self.timeframe
    }

    pub fn period(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.period1, self.period2)
    }

    pub fn set_timeframe(&mut self, timeframe: TimeFrame, now: DateTime<Utc>) {
        let (period1, period2) = Self::window(timeframe, now);
        self.timeframe = timeframe;
        self.period1 = period1;
        self.period2 = period2;
    }

    fn window(timeframe: TimeFrame, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match timeframe {
            TimeFrame::Day1 => {
                let today = now.date_naive().and_hms_opt(0, 0, 0).map(|d| d.and_utc()).unwrap_or(now);
                let start = parse_date("2014-01-01").unwrap_or_else(|_| history_floor());
                (start, today)
            }
            TimeFrame::Minute1 => (now - Duration::days(7), now),
            TimeFrame::Minute5 | TimeFrame::Minute15 => (now - Duration::days(60), now),
            TimeFrame::Hour1 => (now - Duration::days(720), now),
            TimeFrame::Week1 => (history_floor(), now),
        }
    }
}

impl Default for TimeframeStore {
    fn default() -> Self {
        Self::new(TimeFrame::default(), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap()
    }

    #[test]
    fn daily_window_starts_in_2014_and_ends_today() {
        let store = TimeframeStore::new(TimeFrame::Day1, now());
        let (from, to) = store.period();
        assert_eq!(from, Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn intraday_windows_count_back_from_now() {
        let mut store = TimeframeStore::new(TimeFrame::Day1, now());
        store.set_timeframe(TimeFrame::Minute1, now());
        assert_eq!(store.period(), (now() - Duration::days(7), now()));

        store.set_timeframe(TimeFrame::Minute15, now());
        assert_eq!(store.period().0, now() - Duration::days(60));

        store.set_timeframe(TimeFrame::Hour1, now());
        assert_eq!(store.period().0, now() - Duration::days(720));
        assert_eq!(store.timeframe(), TimeFrame::Hour1);
    }

    #[test]
    fn weekly_window_reaches_the_history_floor() {
        let store = TimeframeStore::new(TimeFrame::Week1, now());
        assert_eq!(store.period().0, history_floor());
    }
}
