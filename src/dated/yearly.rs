//! Items of a single calendar year, bucketed by month

use super::{date_time_of, trend, DateProvider};
use chrono::Datelike;
use std::fmt;

const MONTHS_IN_YEAR: usize = 12;

/// Items of one year with per-month buckets (months are 1-based)
#[derive(Clone)]
pub struct YearlyItemList<T> {
    items: Vec<T>,
    items_per_month: [Vec<T>; MONTHS_IN_YEAR],
    date_provider: DateProvider<T>,
}

impl<T: Clone> YearlyItemList<T> {
    pub fn new(date_provider: DateProvider<T>) -> Self {
        Self {
            items: Vec::new(),
            items_per_month: std::array::from_fn(|_| Vec::new()),
            date_provider,
        }
    }

    /// Add an item; the caller guarantees it falls within this year
    pub fn push(&mut self, item: T) {
        let month = date_time_of((self.date_provider)(&item)).month0() as usize;
        self.items_per_month[month].push(item.clone());
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items of `month`; empty for months outside `1..=12`
    pub fn monthly_items(&self, month: u32) -> &[T] {
        month
            .checked_sub(1)
            .and_then(|index| self.items_per_month.get(index as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn monthly_item_count(&self, month: u32) -> usize {
        self.monthly_items(month).len()
    }

    /// Item count of a 0-based quarter `[0..3]`
    pub fn quarterly_item_count(&self, quarter: u32) -> usize {
        let start_month = 1 + quarter * 3;
        (start_month..start_month + 3)
            .map(|month| self.monthly_item_count(month))
            .sum()
    }

    /// Change from the previous month; NaN for January
    pub fn month_on_month_change(&self, month: u32) -> f64 {
        if month > 1 {
            trend::rate_of_change(
                self.monthly_item_count(month - 1) as f64,
                self.monthly_item_count(month) as f64,
            )
        } else {
            f64::NAN
        }
    }

    /// Change from the previous quarter; NaN within the first quarter
    pub fn quarter_on_quarter_change(&self, month: u32) -> f64 {
        let quarter = trend::month_to_quarter(month);
        if quarter > 0 {
            trend::rate_of_change(
                self.quarterly_item_count(quarter - 1) as f64,
                self.quarterly_item_count(quarter) as f64,
            )
        } else {
            f64::NAN
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for YearlyItemList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YearlyItemList")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
