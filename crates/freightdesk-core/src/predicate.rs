//! Predicate trees and the operator table that produces them.
//!
//! The shape handed to executors is an AND of per-clause predicates, each of
//! which is either a single leaf or an OR across the clause's field group.

use crate::dates::DatePreset;
use crate::filter::{FilterClause, FilterValue, Operator};
use crate::schema::FieldKind;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// Map a requested operator onto a comparison. Membership operators on a
    /// scalar, and an absent operator, fall back to equality.
    pub fn from_operator(op: Option<Operator>) -> Self {
        match op {
            Some(Operator::Ne) => Self::Ne,
            Some(Operator::Gt) => Self::Gt,
            Some(Operator::Gte) => Self::Gte,
            Some(Operator::Lt) => Self::Lt,
            Some(Operator::Lte) => Self::Lte,
            Some(Operator::Eq | Operator::In | Operator::NotIn) | None => Self::Eq,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Compare {
        field: String,
        cmp: Comparison,
        value: JsonValue,
    },
    /// Case-insensitive substring match (`ILIKE '%needle%'`).
    Contains { field: String, needle: String },
    InList { field: String, values: Vec<JsonValue> },
    NotInList { field: String, values: Vec<JsonValue> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// AND-combine, flattening nested ANDs. Empty input yields `None`, a single
    /// predicate is returned as-is.
    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        let mut flat = Vec::new();
        for p in preds {
            match p {
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Self::And(flat)),
        }
    }

    /// OR-combine, same collapsing rules as [`Predicate::all`].
    pub fn any(preds: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        let mut flat = Vec::new();
        for p in preds {
            match p {
                Self::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Self::Or(flat)),
        }
    }

    /// Every field name referenced anywhere in the tree.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Compare { field, .. }
            | Self::Contains { field, .. }
            | Self::InList { field, .. }
            | Self::NotInList { field, .. } => out.push(field),
            Self::And(children) | Self::Or(children) => {
                for c in children {
                    c.collect_fields(out);
                }
            }
        }
    }
}

/// Builds per-clause predicates following the operator table.
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder {
    today: NaiveDate,
}

impl PredicateBuilder {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn clause(&self, clause: &FilterClause) -> Option<Predicate> {
        let fields: Vec<(&str, FieldKind)> = clause
            .fields
            .iter()
            .map(|(n, k)| (n.as_str(), *k))
            .collect();
        self.build(&fields, &clause.value, clause.operator)
    }

    /// One predicate per field, OR-combined across the group. `None` when
    /// nothing is left to filter on (e.g. the `All` date preset).
    pub fn build(
        &self,
        fields: &[(&str, FieldKind)],
        value: &FilterValue,
        op: Option<Operator>,
    ) -> Option<Predicate> {
        let leaves: Vec<Predicate> = fields
            .iter()
            .filter_map(|(name, kind)| self.leaf(name, *kind, value, op))
            .collect();
        Predicate::any(leaves)
    }

    fn leaf(
        &self,
        field: &str,
        kind: FieldKind,
        value: &FilterValue,
        op: Option<Operator>,
    ) -> Option<Predicate> {
        let field = field.to_string();
        match value {
            FilterValue::List(items) => {
                let values = items.iter().map(|v| coerce(kind, v)).collect();
                Some(if op == Some(Operator::NotIn) {
                    Predicate::NotInList { field, values }
                } else {
                    Predicate::InList { field, values }
                })
            }
            FilterValue::Scalar(v) if kind.is_comparable() => {
                if kind == FieldKind::Temporal {
                    if let Some(preset) = v.as_str().and_then(DatePreset::from_token) {
                        let (start, end) = preset.window(self.today)?;
                        return Predicate::all([
                            Predicate::Compare {
                                field: field.clone(),
                                cmp: Comparison::Gte,
                                value: JsonValue::String(start.to_string()),
                            },
                            Predicate::Compare {
                                field,
                                cmp: Comparison::Lte,
                                value: JsonValue::String(end.to_string()),
                            },
                        ]);
                    }
                }
                Some(Predicate::Compare {
                    field,
                    cmp: Comparison::from_operator(op),
                    value: coerce(kind, v),
                })
            }
            FilterValue::Scalar(v) => Some(Predicate::Contains {
                field,
                needle: needle_text(v),
            }),
        }
    }
}

/// Nudge a client value towards the field's kind; values that do not parse
/// are passed through untouched.
pub fn coerce(kind: FieldKind, v: &JsonValue) -> JsonValue {
    match (kind, v) {
        (FieldKind::Numeric, JsonValue::String(s)) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                JsonValue::from(i)
            } else if let Some(n) = s
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                JsonValue::Number(n)
            } else {
                v.clone()
            }
        }
        (FieldKind::Boolean, JsonValue::String(s)) => match s.as_str() {
            "true" => JsonValue::Bool(true),
            "false" => JsonValue::Bool(false),
            _ => v.clone(),
        },
        _ => v.clone(),
    }
}

fn needle_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, v: &JsonValue) -> fmt::Result {
    match v {
        JsonValue::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        JsonValue::Null => f.write_str("NULL"),
        other => write!(f, "{other}"),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[JsonValue]) -> fmt::Result {
    f.write_str("(")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_literal(f, v)?;
    }
    f.write_str(")")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { field, cmp, value } => {
                write!(f, "{field} {} ", cmp.symbol())?;
                write_literal(f, value)
            }
            Self::Contains { field, needle } => {
                write!(f, "{field} ILIKE '%{}%'", needle.replace('\'', "''"))
            }
            Self::InList { field, values } => {
                write!(f, "{field} IN ")?;
                write_list(f, values)
            }
            Self::NotInList { field, values } => {
                write!(f, "{field} NOT IN ")?;
                write_list(f, values)
            }
            Self::And(children) | Self::Or(children) => {
                let (sep, in_or) = match self {
                    Self::And(_) => (" AND ", false),
                    _ => (" OR ", true),
                };
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    let wrap = matches!(
                        (c, in_or),
                        (Self::Or(_), false) | (Self::And(_), true)
                    );
                    if wrap {
                        write!(f, "({c})")?;
                    } else {
                        write!(f, "{c}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> PredicateBuilder {
        PredicateBuilder::new(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap())
    }

    #[test]
    fn comparable_kinds_use_operator() {
        let b = builder();
        let p = b
            .build(
                &[("pallets", FieldKind::Numeric)],
                &FilterValue::Scalar(json!(5)),
                Some(Operator::Gte),
            )
            .unwrap();
        assert_eq!(p.to_string(), "pallets >= 5");

        let p = b
            .build(
                &[("priority", FieldKind::Boolean)],
                &FilterValue::Scalar(json!(true)),
                Some(Operator::Ne),
            )
            .unwrap();
        assert_eq!(p.to_string(), "priority != true");
    }

    #[test]
    fn membership_operator_on_scalar_falls_back_to_eq() {
        let p = builder()
            .build(
                &[("pallets", FieldKind::Numeric)],
                &FilterValue::Scalar(json!(3)),
                Some(Operator::NotIn),
            )
            .unwrap();
        assert_eq!(p.to_string(), "pallets = 3");
    }

    #[test]
    fn text_ignores_operator() {
        let p = builder()
            .build(
                &[("reference", FieldKind::Text)],
                &FilterValue::Scalar(json!("TEST")),
                Some(Operator::Gt),
            )
            .unwrap();
        assert_eq!(
            p,
            Predicate::Contains {
                field: "reference".into(),
                needle: "TEST".into()
            }
        );
    }

    #[test]
    fn lists_are_membership_regardless_of_kind() {
        let b = builder();
        let p = b
            .build(
                &[("reference", FieldKind::Text)],
                &FilterValue::List(vec![json!("a"), json!("b")]),
                Some(Operator::Gt),
            )
            .unwrap();
        assert_eq!(p.to_string(), "reference IN ('a', 'b')");

        let p = b
            .build(
                &[("pallets", FieldKind::Numeric)],
                &FilterValue::List(vec![json!("1"), json!(2)]),
                Some(Operator::NotIn),
            )
            .unwrap();
        assert_eq!(p.to_string(), "pallets NOT IN (1, 2)");
    }

    #[test]
    fn or_group_builds_one_leaf_per_field() {
        let p = builder()
            .build(
                &[("id", FieldKind::Text), ("reference", FieldKind::Text)],
                &FilterValue::Scalar(json!("X")),
                None,
            )
            .unwrap();
        assert_eq!(p.to_string(), "id ILIKE '%X%' OR reference ILIKE '%X%'");
    }

    #[test]
    fn mixed_group_uses_each_fields_own_kind() {
        let p = builder()
            .build(
                &[("notes", FieldKind::Text), ("pallets", FieldKind::Numeric)],
                &FilterValue::Scalar(json!("7")),
                Some(Operator::Lt),
            )
            .unwrap();
        assert_eq!(p.to_string(), "notes ILIKE '%7%' OR pallets < 7");
    }

    #[test]
    fn date_presets_expand_to_windows() {
        let b = builder();
        let p = b
            .build(
                &[("eta_date", FieldKind::Temporal)],
                &FilterValue::Scalar(json!("this_week")),
                Some(Operator::Gt),
            )
            .unwrap();
        assert_eq!(
            p.to_string(),
            "eta_date >= '2026-10-19' AND eta_date <= '2026-10-25'"
        );

        let p = b
            .build(
                &[("eta_date", FieldKind::Temporal), ("etd_date", FieldKind::Temporal)],
                &FilterValue::Scalar(json!("today")),
                None,
            )
            .unwrap();
        assert_eq!(
            p.to_string(),
            "(eta_date >= '2026-10-21' AND eta_date <= '2026-10-21') OR \
             (etd_date >= '2026-10-21' AND etd_date <= '2026-10-21')"
        );

        assert!(b
            .build(
                &[("eta_date", FieldKind::Temporal)],
                &FilterValue::Scalar(json!("All")),
                None,
            )
            .is_none());
    }

    #[test]
    fn coercion_follows_kind() {
        assert_eq!(coerce(FieldKind::Numeric, &json!("12")), json!(12));
        assert_eq!(coerce(FieldKind::Numeric, &json!("1.5")), json!(1.5));
        assert_eq!(coerce(FieldKind::Numeric, &json!("abc")), json!("abc"));
        assert_eq!(coerce(FieldKind::Boolean, &json!("false")), json!(false));
        assert_eq!(coerce(FieldKind::Temporal, &json!("2026-01-01")), json!("2026-01-01"));
        assert_eq!(coerce(FieldKind::Text, &json!("12")), json!("12"));
    }

    #[test]
    fn all_and_any_collapse() {
        let leaf = Predicate::Contains {
            field: "a".into(),
            needle: "x".into(),
        };
        assert_eq!(Predicate::all(Vec::new()), None);
        assert_eq!(Predicate::all([leaf.clone()]), Some(leaf.clone()));
        let nested = Predicate::all([
            Predicate::And(vec![leaf.clone(), leaf.clone()]),
            leaf.clone(),
        ])
        .unwrap();
        assert_eq!(nested, Predicate::And(vec![leaf.clone(), leaf.clone(), leaf]));
    }
}
