//! Row-level evaluation of predicate trees with SQL-like null handling.

use crate::traits::Row;
use freightdesk_core::{Comparison, OrderBy, Predicate, SortDirection};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

pub fn matches(pred: &Predicate, row: &Row) -> bool {
    match pred {
        Predicate::Compare { field, cmp, value } => {
            let Some(actual) = present(row, field) else {
                return false;
            };
            let ord = compare_values(actual, value);
            match cmp {
                Comparison::Eq => ord == Some(Ordering::Equal),
                Comparison::Ne => ord != Some(Ordering::Equal),
                Comparison::Gt => ord == Some(Ordering::Greater),
                Comparison::Gte => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
                Comparison::Lt => ord == Some(Ordering::Less),
                Comparison::Lte => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            }
        }
        Predicate::Contains { field, needle } => present(row, field)
            .and_then(scalar_text)
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
        Predicate::InList { field, values } => present(row, field)
            .is_some_and(|actual| values.iter().any(|v| loosely_equal(actual, v))),
        Predicate::NotInList { field, values } => present(row, field)
            .is_some_and(|actual| !values.iter().any(|v| loosely_equal(actual, v))),
        Predicate::And(children) => children.iter().all(|c| matches(c, row)),
        Predicate::Or(children) => children.iter().any(|c| matches(c, row)),
    }
}

fn present<'r>(row: &'r Row, field: &str) -> Option<&'r JsonValue> {
    row.get(field).filter(|v| !v.is_null())
}

fn scalar_text(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers compare numerically, strings lexicographically (ISO dates sort
/// correctly this way). Different types are unordered.
pub fn compare_values(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn loosely_equal(a: &JsonValue, b: &JsonValue) -> bool {
    compare_values(a, b) == Some(Ordering::Equal)
}

// Tie-break for values compare_values cannot order, keeping the sort total.
fn type_rank(v: &JsonValue) -> u8 {
    match v {
        JsonValue::Bool(_) => 0,
        JsonValue::Number(_) => 1,
        JsonValue::String(_) => 2,
        _ => 3,
    }
}

/// Ordering for `ORDER BY`: nulls sort as the largest value, so they come
/// last ascending and first descending. Mixed-type columns group by type,
/// booleans then numbers then strings.
pub fn order_rows(rows: &mut [Row], order: &OrderBy) {
    rows.sort_by(|a, b| {
        let ord = match (present(a, &order.field), present(b, &order.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => compare_values(x, y)
                .unwrap_or_else(|| type_rank(x).cmp(&type_rank(y))),
        };
        match order.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}
