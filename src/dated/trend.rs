//! Trend arithmetic
//!
//! Month-over-month and quarter-over-quarter change figures. The values are
//! signed fractions (`-0.5` is a 50% drop) and may be infinite when the
//! previous period was empty; NaN marks a figure that cannot be computed.

use chrono::{Datelike, NaiveDate};

/// Displayed for figures that cannot be computed
pub const NOT_AVAILABLE: &str = "N/A";

/// Relative change from `prev` to `curr`.
///
/// Equal values give `0`; an empty previous period gives `+∞` when the
/// current one grew and `-∞` otherwise.
pub fn rate_of_change(prev: f64, curr: f64) -> f64 {
    if prev == curr {
        0.0
    } else if prev != 0.0 {
        let delta = curr / prev;
        if delta < 1.0 {
            -(1.0 - delta)
        } else {
            delta - 1.0
        }
    } else if curr > 0.0 {
        f64::INFINITY
    } else {
        f64::NEG_INFINITY
    }
}

/// Render a rate as a percentage with at most one fractional digit
pub fn format_rate_of_change(rate: f64) -> String {
    if rate.is_nan() {
        return NOT_AVAILABLE.to_string();
    }
    if rate.is_infinite() {
        return if rate > 0.0 { "∞%".to_string() } else { "-∞%".to_string() };
    }

    let percent = format!("{:.1}", rate * 100.0);
    let (sign, digits) = match percent.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", percent.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, "0"));

    let mut formatted = format!("{}{}", sign, group_thousands(whole));
    if fraction != "0" {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    formatted.push('%');
    formatted
}

/// Format the change between two counts
pub fn format_change(prev: f64, curr: f64) -> String {
    format_rate_of_change(rate_of_change(prev, curr))
}

/// Convert a 1-based month `[1..12]` to a 0-based quarter `[0..3]`
pub fn month_to_quarter(month: u32) -> u32 {
    month.saturating_sub(1) / 3
}

/// Whether `(year, month)` lies after the month containing `today`
pub fn is_past_month(year: i32, month: u32, today: NaiveDate) -> bool {
    (year, month) > (today.year(), today.month())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_of_change() {
        assert_eq!(rate_of_change(0.0, 0.0), 0.0);
        assert_eq!(rate_of_change(0.0, 5.0), f64::INFINITY);
        assert_eq!(rate_of_change(10.0, 10.0), 0.0);
        assert_eq!(rate_of_change(10.0, 5.0), -0.5);
        assert_eq!(rate_of_change(5.0, 10.0), 1.0);
        assert_eq!(rate_of_change(0.0, -3.0), f64::NEG_INFINITY);
        assert_eq!(rate_of_change(4.0, 0.0), -1.0);
    }

    #[test]
    fn test_rate_of_change_nan() {
        assert!(rate_of_change(f64::NAN, 1.0).is_nan());
        assert!(rate_of_change(1.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_format_rate_of_change() {
        assert_eq!(format_rate_of_change(f64::NAN), "N/A");
        assert_eq!(format_rate_of_change(0.0), "0%");
        assert_eq!(format_rate_of_change(-0.5), "-50%");
        assert_eq!(format_rate_of_change(1.0), "100%");
        assert_eq!(format_rate_of_change(0.1234), "12.3%");
        assert_eq!(format_rate_of_change(-0.3333), "-33.3%");
        assert_eq!(format_rate_of_change(123.456), "12,345.6%");
        assert_eq!(format_rate_of_change(f64::INFINITY), "∞%");
        assert_eq!(format_rate_of_change(f64::NEG_INFINITY), "-∞%");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(4.0, 6.0), "50%");
        assert_eq!(format_change(3.0, 3.0), "0%");
    }

    #[test]
    fn test_month_to_quarter() {
        assert_eq!(month_to_quarter(1), 0);
        assert_eq!(month_to_quarter(3), 0);
        assert_eq!(month_to_quarter(4), 1);
        assert_eq!(month_to_quarter(9), 2);
        assert_eq!(month_to_quarter(12), 3);
    }

    #[test]
    fn test_is_past_month() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(!is_past_month(2024, 6, today));
        assert!(!is_past_month(2024, 1, today));
        assert!(is_past_month(2024, 7, today));
        assert!(is_past_month(2025, 1, today));
        assert!(!is_past_month(2023, 12, today));
    }
}
