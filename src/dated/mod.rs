//! Date-bucketed item lists
//!
//! `DatedList` keeps items in insertion order and indexes them by calendar
//! year and month so that monthly counts and trend figures can be queried
//! without rescanning. All bucketing is done in UTC.

pub mod trend;
pub mod yearly;

pub use yearly::YearlyItemList;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Extracts the epoch-millisecond timestamp an item is bucketed by
pub type DateProvider<T> = fn(&T) -> i64;

pub const MONTHS_IN_YEAR: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Convert epoch milliseconds to a UTC date-time; out-of-range values map to the epoch
pub fn date_time_of(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// Calendar day key `YYYY-MM-DD` of an epoch-millisecond timestamp
pub fn day_key(millis: i64) -> String {
    date_time_of(millis).format("%Y-%m-%d").to_string()
}

/// Append-only list of items indexed by year and month
#[derive(Clone)]
pub struct DatedList<T> {
    items: Vec<T>,
    min_date: Option<i64>,
    max_date: Option<i64>,
    items_per_year: BTreeMap<i32, YearlyItemList<T>>,
    date_provider: DateProvider<T>,
}

impl<T: Clone> DatedList<T> {
    pub fn new(date_provider: DateProvider<T>) -> Self {
        Self {
            items: Vec::new(),
            min_date: None,
            max_date: None,
            items_per_year: BTreeMap::new(),
            date_provider,
        }
    }

    pub fn push(&mut self, item: T) {
        let date = (self.date_provider)(&item);
        self.min_date = Some(self.min_date.map_or(date, |min| min.min(date)));
        self.max_date = Some(self.max_date.map_or(date, |max| max.max(date)));

        let year = date_time_of(date).year();
        let date_provider = self.date_provider;
        self.items_per_year
            .entry(year)
            .or_insert_with(|| YearlyItemList::new(date_provider))
            .push(item.clone());
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn min_date(&self) -> Option<i64> {
        self.min_date
    }

    pub fn max_date(&self) -> Option<i64> {
        self.max_date
    }

    /// Every year from the earliest to the latest item, inclusive
    pub fn year_range(&self) -> Vec<i32> {
        match (self.min_date, self.max_date) {
            (Some(min), Some(max)) => (date_time_of(min).year()..=date_time_of(max).year()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn items_for_year(&self, year: i32) -> Option<&YearlyItemList<T>> {
        self.items_per_year.get(&year)
    }

    pub fn monthly_item_count(&self, year: i32, month: u32) -> usize {
        self.items_for_year(year)
            .map_or(0, |items| items.monthly_item_count(month))
    }

    pub fn is_date_within_range(&self, year: i32, month: u32) -> bool {
        self.is_date_within_range_as_of(year, month, Utc::now().date_naive())
    }

    /// Whether `(year, month)` overlaps the observed date range and is not after `today`'s month.
    ///
    /// The earliest item must precede the last day of the month (23:59) and
    /// the latest item must follow its first day (23:59).
    pub fn is_date_within_range_as_of(&self, year: i32, month: u32, today: NaiveDate) -> bool {
        let (Some(min_date), Some(max_date)) = (self.min_date, self.max_date) else {
            return false;
        };
        if trend::is_past_month(year, month, today) {
            return false;
        }
        let Some(first_day) = Utc.with_ymd_and_hms(year, month, 1, 23, 59, 0).single() else {
            return false;
        };
        let last_day = last_day_of_month(year, month)
            .and_then(|day| Utc.with_ymd_and_hms(year, month, day, 23, 59, 0).single())
            .unwrap_or(first_day);

        min_date < last_day.timestamp_millis() && max_date > first_day.timestamp_millis()
    }

    pub fn month_on_month_change(&self, year: i32, month: u32) -> Option<f64> {
        self.month_on_month_change_as_of(year, month, Utc::now().date_naive())
    }

    /// Change in item count from the previous month; `None` outside the observed range.
    ///
    /// January compares against December of the previous year and yields NaN
    /// when either year has no items at all.
    pub fn month_on_month_change_as_of(&self, year: i32, month: u32, today: NaiveDate) -> Option<f64> {
        if !self.is_date_within_range_as_of(year, month, today) {
            return None;
        }
        if month > 1 {
            return Some(
                self.items_for_year(year)
                    .map_or(0.0, |items| items.month_on_month_change(month)),
            );
        }
        Some(match (self.items_for_year(year - 1), self.items_for_year(year)) {
            (Some(prev), Some(curr)) => trend::rate_of_change(
                prev.monthly_item_count(12) as f64,
                curr.monthly_item_count(1) as f64,
            ),
            _ => f64::NAN,
        })
    }

    pub fn quarter_on_quarter_change(&self, year: i32, month: u32) -> Option<f64> {
        self.quarter_on_quarter_change_as_of(year, month, Utc::now().date_naive())
    }

    /// Change in item count from the previous quarter; `None` outside the observed range
    pub fn quarter_on_quarter_change_as_of(&self, year: i32, month: u32, today: NaiveDate) -> Option<f64> {
        if !self.is_date_within_range_as_of(year, month, today) {
            return None;
        }
        if trend::month_to_quarter(month) > 0 {
            return Some(
                self.items_for_year(year)
                    .map_or(0.0, |items| items.quarter_on_quarter_change(month)),
            );
        }
        Some(match (self.items_for_year(year - 1), self.items_for_year(year)) {
            (Some(prev), Some(curr)) => trend::rate_of_change(
                prev.quarterly_item_count(3) as f64,
                curr.quarterly_item_count(0) as f64,
            ),
            _ => f64::NAN,
        })
    }

    /// Month-on-month change as a percentage string; empty outside the observed range
    pub fn displayable_month_on_month_change(&self, year: i32, month: u32) -> String {
        self.month_on_month_change(year, month)
            .map(trend::format_rate_of_change)
            .unwrap_or_default()
    }

    pub fn displayable_quarter_on_quarter_change(&self, year: i32, month: u32) -> String {
        self.quarter_on_quarter_change(year, month)
            .map(trend::format_rate_of_change)
            .unwrap_or_default()
    }
}

impl<'a, T> IntoIterator for &'a DatedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for DatedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatedList")
            .field("items", &self.items)
            .field("min_date", &self.min_date)
            .field("max_date", &self.max_date)
            .finish_non_exhaustive()
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(year: i32, month: u32, day: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap().timestamp_millis()
    }

    fn list_of(dates: &[(i32, u32, u32)]) -> DatedList<i64> {
        let mut list = DatedList::new(|d: &i64| *d);
        for (year, month, day) in dates {
            list.push(millis(*year, *month, *day));
        }
        list
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_empty_list() {
        let list = list_of(&[]);
        assert!(list.is_empty());
        assert!(list.year_range().is_empty());
        assert_eq!(list.min_date(), None);
        assert!(!list.is_date_within_range_as_of(2024, 1, today()));
        assert_eq!(list.month_on_month_change_as_of(2024, 2, today()), None);
    }

    #[test]
    fn test_min_max_and_year_range() {
        let list = list_of(&[(2023, 5, 1), (2021, 2, 3), (2022, 7, 7)]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.min_date(), Some(millis(2021, 2, 3)));
        assert_eq!(list.max_date(), Some(millis(2023, 5, 1)));
        assert_eq!(list.year_range(), vec![2021, 2022, 2023]);
        assert_eq!(list.items()[0], millis(2023, 5, 1));
    }

    #[test]
    fn test_monthly_counts() {
        let list = list_of(&[(2024, 3, 1), (2024, 3, 30), (2023, 3, 1)]);
        assert_eq!(list.monthly_item_count(2024, 3), 2);
        assert_eq!(list.monthly_item_count(2023, 3), 1);
        assert_eq!(list.monthly_item_count(2022, 3), 0);
        assert!(list.items_for_year(2022).is_none());
    }

    #[test]
    fn test_range_guard() {
        let list = list_of(&[(2024, 2, 10), (2024, 5, 20)]);
        assert!(!list.is_date_within_range_as_of(2024, 1, today()));
        assert!(list.is_date_within_range_as_of(2024, 2, today()));
        assert!(list.is_date_within_range_as_of(2024, 4, today()));
        assert!(list.is_date_within_range_as_of(2024, 5, today()));
        assert!(!list.is_date_within_range_as_of(2024, 6, today()));
    }

    #[test]
    fn test_range_guard_rejects_future_months() {
        let list = list_of(&[(2025, 1, 10), (2025, 9, 20)]);
        assert!(list.is_date_within_range_as_of(2025, 6, today()));
        assert!(!list.is_date_within_range_as_of(2025, 7, today()));
    }

    #[test]
    fn test_month_on_month_change() {
        let list = list_of(&[(2024, 2, 10), (2024, 3, 1), (2024, 3, 2), (2024, 5, 20)]);
        assert_eq!(list.month_on_month_change_as_of(2024, 3, today()), Some(1.0));
        assert_eq!(list.month_on_month_change_as_of(2024, 4, today()), Some(-1.0));
        assert_eq!(list.month_on_month_change_as_of(2024, 5, today()), Some(f64::INFINITY));
        assert_eq!(list.month_on_month_change_as_of(2024, 7, today()), None);
    }

    #[test]
    fn test_month_on_month_change_across_years() {
        let list = list_of(&[(2023, 12, 1), (2023, 12, 2), (2024, 1, 5), (2024, 2, 5)]);
        assert_eq!(list.month_on_month_change_as_of(2024, 1, today()), Some(-0.5));

        let single_year = list_of(&[(2024, 1, 5), (2024, 2, 5)]);
        let change = single_year.month_on_month_change_as_of(2024, 1, today());
        assert!(change.is_some_and(f64::is_nan));
    }

    #[test]
    fn test_quarter_on_quarter_change() {
        let list = list_of(&[(2023, 11, 1), (2024, 1, 1), (2024, 2, 1), (2024, 4, 1), (2024, 7, 1)]);
        assert_eq!(list.quarter_on_quarter_change_as_of(2024, 2, today()), Some(1.0));
        assert_eq!(list.quarter_on_quarter_change_as_of(2024, 5, today()), Some(-0.5));
        assert_eq!(list.quarter_on_quarter_change_as_of(2024, 8, today()), None);
    }

    #[test]
    fn test_displayable_changes() {
        let list = list_of(&[(2024, 2, 10), (2024, 3, 1), (2024, 3, 2), (2024, 5, 20)]);
        assert_eq!(list.displayable_month_on_month_change(2024, 3), "100%");
        assert_eq!(list.displayable_month_on_month_change(2024, 4), "-100%");
        assert_eq!(list.displayable_month_on_month_change(2024, 7), "");
        assert_eq!(list.displayable_quarter_on_quarter_change(2024, 5), "-66.7%");

        let single_year = list_of(&[(2024, 1, 5), (2024, 2, 5)]);
        assert_eq!(single_year.displayable_month_on_month_change(2024, 1), "N/A");
    }

    #[test]
    fn test_day_key() {
        assert_eq!(day_key(millis(2024, 2, 29)), "2024-02-29");
        assert_eq!(day_key(0), "1970-01-01");
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(29));
        assert_eq!(last_day_of_month(2023, 2), Some(28));
        assert_eq!(last_day_of_month(2024, 12), Some(31));
        assert_eq!(last_day_of_month(2024, 13), None);
    }
}
