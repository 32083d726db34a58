//! Calendar route handler.
//!
//! Month view over the active project's dated records: phase starts and
//! ends, deliverable due dates, and payment due dates.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::Deserialize;

use crate::db::{DeliverableRepository, PaymentRepository, PhaseRepository};
use crate::error::AppError;
use crate::filters;
use crate::routes::projects::{ProjectOptionView, switcher_options};
use crate::scope::ProjectScope;
use crate::state::AppState;

/// Query parameters for the calendar page.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
}

/// One dated entry in the month view.
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub label: String,
    /// `phase`, `deliverable` or `payment`; styles the entry.
    pub kind: &'static str,
}

/// Calendar page template.
#[derive(Template, WebTemplate)]
#[template(path = "calendar.html")]
pub struct CalendarTemplate {
    pub user_name: String,
    pub is_staff: bool,
    pub switcher: Vec<ProjectOptionView>,
    pub has_project: bool,
    pub month_label: String,
    pub prev_month: String,
    pub next_month: String,
    pub entries: Vec<CalendarEntry>,
}

/// Parse a `YYYY-MM` parameter into the first day of that month.
///
/// Malformed input falls back to the current month rather than erroring:
/// the parameter comes from navigation links, not user-typed forms.
fn parse_month(raw: Option<&str>) -> NaiveDate {
    let today = Utc::now().date_naive();
    let current = today.with_day(1).unwrap_or(today);

    let Some(raw) = raw else { return current };
    let Some((year, month)) = raw.split_once('-') else {
        return current;
    };
    match (year.parse::<i32>(), month.parse::<u32>()) {
        (Ok(y), Ok(m)) => NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(current),
        _ => current,
    }
}

/// Format a month as a `?month=` parameter value.
fn month_param(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn in_month(date: NaiveDate, first: NaiveDate, next: NaiveDate) -> bool {
    date >= first && date < next
}

/// Display the calendar for the active project.
///
/// # Errors
///
/// Returns an error if a project-detail query fails.
pub async fn show(
    axum::extract::State(state): axum::extract::State<AppState>,
    scope: ProjectScope,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, AppError> {
    let first = parse_month(query.month.as_deref());
    let next = first + Months::new(1);
    let prev = first - Months::new(1);

    let mut template = CalendarTemplate {
        user_name: scope.user.name.clone(),
        is_staff: scope.user.role.is_staff(),
        switcher: switcher_options(&scope),
        has_project: false,
        month_label: first.format("%B %Y").to_string(),
        prev_month: month_param(prev),
        next_month: month_param(next),
        entries: Vec::new(),
    };

    let Some(project) = scope.active_project() else {
        return Ok(template);
    };
    template.has_project = true;
    let id = project.id();

    let mut entries = Vec::new();

    for phase in PhaseRepository::new(state.pool()).list_for_project(id).await? {
        if let Some(date) = phase.starts_on.filter(|d| in_month(*d, first, next)) {
            entries.push(CalendarEntry {
                date,
                label: format!("{} begins", phase.name),
                kind: "phase",
            });
        }
        if let Some(date) = phase.ends_on.filter(|d| in_month(*d, first, next)) {
            entries.push(CalendarEntry {
                date,
                label: format!("{} wraps up", phase.name),
                kind: "phase",
            });
        }
    }

    for deliverable in DeliverableRepository::new(state.pool())
        .list_for_project(id)
        .await?
    {
        if let Some(date) = deliverable.due_on.filter(|d| in_month(*d, first, next)) {
            entries.push(CalendarEntry {
                date,
                label: format!("{} due", deliverable.title),
                kind: "deliverable",
            });
        }
    }

    for payment in PaymentRepository::new(state.pool()).list_for_project(id).await? {
        if let Some(date) = payment.due_on.filter(|d| in_month(*d, first, next)) {
            entries.push(CalendarEntry {
                date,
                label: format!("{} payment due", payment.description),
                kind: "payment",
            });
        }
    }

    entries.sort_by_key(|e| e.date);
    template.entries = entries;

    Ok(template)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_valid() {
        assert_eq!(
            parse_month(Some("2026-03")),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_month_garbage_falls_back_to_current() {
        let current = Utc::now().date_naive().with_day(1).unwrap();
        assert_eq!(parse_month(Some("not-a-month")), current);
        assert_eq!(parse_month(Some("2026-13")), current);
        assert_eq!(parse_month(None), current);
    }

    #[test]
    fn test_month_param_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 1).unwrap();
        assert_eq!(month_param(date), "2026-12");
        assert_eq!(parse_month(Some("2026-12")), date);
    }

    #[test]
    fn test_in_month_bounds() {
        let first = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let next = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert!(in_month(first, first, next));
        assert!(in_month(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(), first, next));
        assert!(!in_month(next, first, next));
        assert!(!in_month(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(), first, next));
    }
}
