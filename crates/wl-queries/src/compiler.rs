//! Condition compiler
//!
//! Turns an ordered condition list into one JQL string. Each condition
//! renders to at most one part; parts are joined left to right with the
//! connective of the condition that precedes them in the list. Top-level
//! AND/OR chains are written exactly as authored, without grouping.
//!
//! Compilation never fails: a condition that cannot be rendered (blank value,
//! value of the wrong shape) contributes nothing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use crate::conditions::{Condition, ConditionValue};
use crate::fields::Field;

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date prefix pattern"));

static FUNCTION_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+\(.*\)$").expect("valid function call pattern"));

/// Datetime layouts accepted after a leading `YYYY-MM-DD`
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Compile a condition list into a query string
pub fn compile(conditions: &[Condition]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(conditions.len() * 2);

    for (idx, condition) in conditions.iter().enumerate() {
        let Some(part) = compile_condition(condition) else {
            continue;
        };

        if !parts.is_empty() {
            // The list entry right before this one decides the join, even
            // when that entry rendered nothing.
            parts.push(conditions[idx - 1].logic.as_str().to_string());
        }
        parts.push(part);
    }

    trace!(conditions = conditions.len(), tokens = parts.len(), "compiled conditions");
    parts.join(" ")
}

/// Render a single condition, or `None` when it contributes nothing
pub fn compile_condition(condition: &Condition) -> Option<String> {
    let field = condition.field.as_str();
    let op = condition.operator.as_str();

    if condition.field == Field::Custom {
        return non_blank_scalar(&condition.value).map(str::to_string);
    }

    if condition.field == Field::WorklogAuthor {
        let authors = condition.value.as_list()?;
        if authors.is_empty() {
            return None;
        }
        return Some(format!("{field} {op} ({})", quote_all(authors)));
    }

    if condition.field.is_date() {
        let value = non_blank_scalar(&condition.value)?;
        return Some(format!("{field} {op} \"{}\"", normalize_date(value)));
    }

    if condition.operator.is_membership() {
        return match &condition.value {
            ConditionValue::Scalar(_) => {
                let value = non_blank_scalar(&condition.value)?;
                if condition.field == Field::IssueFunction || FUNCTION_CALL.is_match(value) {
                    return Some(format!("{field} {op} {value}"));
                }

                let inner = strip_parentheses(value).trim();
                if inner.is_empty() {
                    return None;
                }
                if inner.contains(',') {
                    let items: Vec<&str> = inner.split(',').collect();
                    Some(format!("{field} {op} ({})", quote_all(&items)))
                } else {
                    Some(format!("{field} {op} (\"{inner}\")"))
                }
            }
            ConditionValue::List(items) if items.is_empty() => None,
            ConditionValue::List(items) => Some(format!("{field} {op} ({})", quote_all(items))),
        };
    }

    match &condition.value {
        ConditionValue::List(items) if items.is_empty() => None,
        ConditionValue::List(items) => {
            let joiner = if condition.operator.is_negated() { " AND " } else { " OR " };
            let comparisons: Vec<String> = items
                .iter()
                .map(|item| format!("{field} {op} \"{}\"", item.trim()))
                .collect();
            Some(format!("({})", comparisons.join(joiner)))
        }
        ConditionValue::Scalar(_) => {
            let value = non_blank_scalar(&condition.value)?;
            Some(format!("{field} {op} \"{value}\""))
        }
    }
}

fn non_blank_scalar(value: &ConditionValue) -> Option<&str> {
    value.as_scalar().map(str::trim).filter(|v| !v.is_empty())
}

fn quote_all<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("\"{}\"", item.as_ref().trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drop one leading `(` and one trailing `)`, independently
fn strip_parentheses(value: &str) -> &str {
    let value = value.strip_prefix('(').unwrap_or(value);
    value.strip_suffix(')').unwrap_or(value)
}

/// Canonical `yyyy-MM-dd` for values that start with a calendar date
///
/// Anything else (relative expressions like `-7d` or `startOfWeek()`, or a
/// date that does not exist) is returned unchanged.
fn normalize_date(value: &str) -> String {
    if !DATE_PREFIX.is_match(value) {
        return value.to_string();
    }
    match parse_calendar_date(value) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|datetime| datetime.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::Logic;
    use crate::operators::Operator;

    fn cond(field: Field, operator: Operator, value: ConditionValue, logic: Logic) -> Condition {
        Condition::unchecked(field, operator, value).with_logic(logic)
    }

    fn scalar(field: Field, operator: Operator, value: &str) -> Condition {
        cond(field, operator, ConditionValue::scalar(value), Logic::And)
    }

    #[test]
    fn test_worklog_authors() {
        let conditions = vec![cond(
            Field::WorklogAuthor,
            Operator::In,
            ConditionValue::list(["alice", "bob"]),
            Logic::And,
        )];
        assert_eq!(compile(&conditions), r#"worklogAuthor in ("alice", "bob")"#);
    }

    #[test]
    fn test_worklog_authors_are_trimmed() {
        let conditions = vec![cond(
            Field::WorklogAuthor,
            Operator::NotIn,
            ConditionValue::list([" alice ", "bob"]),
            Logic::And,
        )];
        assert_eq!(compile(&conditions), r#"worklogAuthor not in ("alice", "bob")"#);
    }

    #[test]
    fn test_worklog_date() {
        let conditions = vec![scalar(Field::WorklogDate, Operator::GreaterThanOrEqual, "2024-01-05")];
        assert_eq!(compile(&conditions), r#"worklogDate >= "2024-01-05""#);
    }

    #[test]
    fn test_date_with_time_is_truncated() {
        let conditions = vec![
            scalar(Field::UpdatedDate, Operator::LessThan, "2024-03-09T17:45:00"),
            scalar(Field::CreatedDate, Operator::GreaterThan, "2024-03-09T23:30:00+09:00"),
        ];
        assert_eq!(
            compile(&conditions),
            r#"updatedDate < "2024-03-09" AND createdDate > "2024-03-09""#
        );
    }

    #[test]
    fn test_relative_and_invalid_dates_are_quoted_verbatim() {
        assert_eq!(
            compile(&[scalar(Field::WorklogDate, Operator::GreaterThanOrEqual, " -7d ")]),
            r#"worklogDate >= "-7d""#
        );
        assert_eq!(
            compile(&[scalar(Field::WorklogDate, Operator::GreaterThanOrEqual, "startOfWeek()")]),
            r#"worklogDate >= "startOfWeek()""#
        );
        assert_eq!(
            compile(&[scalar(Field::WorklogDate, Operator::Equals, "2024-02-30")]),
            r#"worklogDate = "2024-02-30""#
        );
    }

    #[test]
    fn test_join_uses_previous_logic() {
        let conditions = vec![
            cond(Field::Project, Operator::Equals, ConditionValue::scalar("ABC"), Logic::Or),
            cond(Field::Issuetype, Operator::Equals, ConditionValue::scalar("Bug"), Logic::And),
        ];
        assert_eq!(compile(&conditions), r#"project = "ABC" OR issuetype = "Bug""#);
    }

    #[test]
    fn test_last_condition_logic_is_unused() {
        let conditions = vec![
            cond(Field::Project, Operator::Equals, ConditionValue::scalar("ABC"), Logic::And),
            cond(Field::Issuetype, Operator::Equals, ConditionValue::scalar("Bug"), Logic::Or),
        ];
        assert_eq!(compile(&conditions), r#"project = "ABC" AND issuetype = "Bug""#);
    }

    #[test]
    fn test_custom_passthrough() {
        let conditions = vec![scalar(Field::Custom, Operator::None, "status = \"In Progress\"")];
        assert_eq!(compile(&conditions), r#"status = "In Progress""#);
    }

    #[test]
    fn test_empty_conditions_emit_nothing() {
        assert_eq!(compile(&[Condition::empty()]), "");
        assert_eq!(compile(&[scalar(Field::Project, Operator::Equals, "")]), "");
        assert_eq!(compile(&[scalar(Field::Custom, Operator::None, "   ")]), "");
        assert_eq!(compile(&[]), "");
    }

    #[test]
    fn test_skipped_condition_still_lends_its_logic() {
        let conditions = vec![
            cond(Field::Project, Operator::Equals, ConditionValue::scalar("ABC"), Logic::And),
            cond(Field::Summary, Operator::Contains, ConditionValue::scalar(""), Logic::Or),
            cond(Field::Key, Operator::Equals, ConditionValue::scalar("ABC-1"), Logic::And),
        ];
        assert_eq!(compile(&conditions), r#"project = "ABC" OR key = "ABC-1""#);
    }

    #[test]
    fn test_leading_blank_conditions_leave_no_join_token() {
        let conditions = vec![
            cond(Field::WorklogAuthor, Operator::In, ConditionValue::List(vec![]), Logic::Or),
            scalar(Field::Resolution, Operator::NotEquals, "Unresolved"),
        ];
        assert_eq!(compile(&conditions), r#"resolution != "Unresolved""#);
    }

    #[test]
    fn test_membership_with_comma_separated_scalar() {
        assert_eq!(
            compile(&[scalar(Field::Project, Operator::In, "(ABC, DEF ,GHI)")]),
            r#"project in ("ABC", "DEF", "GHI")"#
        );
        assert_eq!(
            compile(&[scalar(Field::Key, Operator::In, "ABC-1,ABC-2")]),
            r#"key in ("ABC-1", "ABC-2")"#
        );
    }

    #[test]
    fn test_membership_with_single_scalar_is_parenthesized() {
        assert_eq!(
            compile(&[scalar(Field::Issuetype, Operator::In, "Bug")]),
            r#"issuetype in ("Bug")"#
        );
        assert_eq!(
            compile(&[scalar(Field::Issuetype, Operator::In, "(Bug)")]),
            r#"issuetype in ("Bug")"#
        );
    }

    #[test]
    fn test_membership_with_function_call() {
        assert_eq!(
            compile(&[scalar(Field::Key, Operator::In, "linkedIssues(ABC-1)")]),
            "key in linkedIssues(ABC-1)"
        );
        assert_eq!(
            compile(&[scalar(Field::IssueFunction, Operator::In, "subtasksOf(\"project = ABC\")")]),
            r#"issueFunction in subtasksOf("project = ABC")"#
        );
    }

    #[test]
    fn test_membership_with_list() {
        let conditions = vec![cond(
            Field::Project,
            Operator::In,
            ConditionValue::list(["ABC", " DEF"]),
            Logic::And,
        )];
        assert_eq!(compile(&conditions), r#"project in ("ABC", "DEF")"#);

        let empty = vec![cond(Field::Key, Operator::In, ConditionValue::List(vec![]), Logic::And)];
        assert_eq!(compile(&empty), "");
    }

    #[test]
    fn test_list_on_comparison_operator_expands() {
        let any = vec![cond(
            Field::Summary,
            Operator::Contains,
            ConditionValue::list(["login", "logout"]),
            Logic::And,
        )];
        assert_eq!(compile(&any), r#"(summary ~ "login" OR summary ~ "logout")"#);

        let none = vec![cond(
            Field::Project,
            Operator::NotEquals,
            ConditionValue::list(["ABC", "DEF"]),
            Logic::And,
        )];
        assert_eq!(compile(&none), r#"(project != "ABC" AND project != "DEF")"#);
    }

    #[test]
    fn test_mixed_chain_is_not_grouped() {
        let conditions = vec![
            cond(Field::Project, Operator::Equals, ConditionValue::scalar("A"), Logic::Or),
            cond(Field::Project, Operator::Equals, ConditionValue::scalar("B"), Logic::And),
            cond(Field::Issuetype, Operator::Equals, ConditionValue::scalar("Bug"), Logic::And),
        ];
        assert_eq!(
            compile(&conditions),
            r#"project = "A" OR project = "B" AND issuetype = "Bug""#
        );
    }

    #[test]
    fn test_wrong_shape_contributes_nothing() {
        let author_scalar = scalar(Field::WorklogAuthor, Operator::In, "alice");
        let date_list = cond(
            Field::WorklogDate,
            Operator::Equals,
            ConditionValue::list(["2024-01-01"]),
            Logic::And,
        );
        assert_eq!(compile(&[author_scalar, date_list]), "");
    }

    #[test]
    fn test_scalar_chain_one_part_per_condition() {
        let conditions = vec![
            cond(Field::Project, Operator::Equals, ConditionValue::scalar("ABC"), Logic::And),
            cond(Field::Text, Operator::Contains, ConditionValue::scalar(" crash "), Logic::Or),
            cond(Field::Parent, Operator::NotEquals, ConditionValue::scalar("ABC-7"), Logic::And),
        ];
        assert_eq!(
            compile(&conditions),
            r#"project = "ABC" AND text ~ "crash" OR parent != "ABC-7""#
        );
    }
}
