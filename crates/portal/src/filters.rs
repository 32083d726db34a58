//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format an optional date as `12 Mar 2026`, or a dash when unset.
#[askama::filter_fn]
pub fn fmt_date(value: &Option<NaiveDate>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_date(*value))
}

/// Format a decimal amount as money.
#[askama::filter_fn]
pub fn fmt_money(value: &Decimal, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(value))
}

/// Humanize a snake_case status value: `in_review` -> `In review`.
#[askama::filter_fn]
pub fn humanize(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(humanize_label(&value.to_string()))
}

fn format_date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "—".to_string(), |d| d.format("%d %b %Y").to_string())
}

fn format_money(value: &Decimal) -> String {
    format!("${}", value.round_dp(2))
}

fn humanize_label(value: &str) -> String {
    let s = value.replace('_', " ");
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        c.to_uppercase().collect::<String>() + chars.as_str()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 12);
        assert_eq!(format_date(date), "12 Mar 2026");
        assert_eq!(format_date(None), "—");
    }

    #[test]
    fn test_format_money() {
        let amount = Decimal::new(125_050, 2); // 1250.50
        assert_eq!(format_money(&amount), "$1250.50");
    }

    #[test]
    fn test_humanize_label() {
        assert_eq!(humanize_label("in_review"), "In review");
        assert_eq!(humanize_label("paid"), "Paid");
    }
}
