use chrono::{DateTime, Datelike, Utc};

use shared::models::Strategy;
use shared::utils::parse_date;

pub const MIN_RANGE_MONTHS: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacktestStore {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    strategy: Strategy,
}

impl Default for BacktestStore {
    fn default() -> Self {
        let from = parse_date("2023-01-01").unwrap_or_default();
        let to = parse_date("2024-01-01").unwrap_or_default();
        Self {
            from,
            to,
            strategy: Strategy::Macd,
        }
    }
}

impl BacktestStore {
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn set_from(&mut self, from: DateTime<Utc>) {
        self.from = from;
    }

    pub fn set_to(&mut self, to: DateTime<Utc>) {
        self.to = to;
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// True when at least three whole months separate the dates.
    pub fn is_valid_date_range(&self) -> bool {
        whole_months_between(self.from, self.to) >= MIN_RANGE_MONTHS
    }
}

fn whole_months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i32 {
    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    // an incomplete last month does not count
    let to_day = (to.day(), to.time());
    let from_day = (from.day(), from.time());
    if months > 0 && to_day < from_day {
        months -= 1;
    } else if months < 0 && to_day > from_day {
        months += 1;
    }
    months
}
