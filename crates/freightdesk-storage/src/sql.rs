//! Parameterized Postgres rendering of compiled queries.

use freightdesk_core::{CompiledQuery, CountQuery, Predicate};
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<JsonValue>,
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn render_select(query: &CompiledQuery) -> SqlQuery {
    let mut r = Renderer::default();
    let mut sql = format!("SELECT * FROM {}", quote_ident(&query.entity));
    if let Some(p) = &query.predicate {
        sql.push_str(" WHERE ");
        r.predicate(p, &mut sql);
    }
    if let Some(order) = &query.order_by {
        sql.push_str(&format!(
            " ORDER BY {} {}",
            quote_ident(&order.field),
            order.direction.as_str()
        ));
    }
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = query.offset {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    SqlQuery {
        sql,
        params: r.params,
    }
}

pub fn render_count(query: &CountQuery) -> SqlQuery {
    let mut r = Renderer::default();
    let mut sql = format!("SELECT count(*) FROM {}", quote_ident(&query.entity));
    if let Some(p) = &query.predicate {
        sql.push_str(" WHERE ");
        r.predicate(p, &mut sql);
    }
    SqlQuery {
        sql,
        params: r.params,
    }
}

#[derive(Default)]
struct Renderer {
    params: Vec<JsonValue>,
}

impl Renderer {
    fn bind(&mut self, v: JsonValue) -> String {
        self.params.push(v);
        format!("${}", self.params.len())
    }

    fn list(&mut self, values: &[JsonValue]) -> String {
        values
            .iter()
            .map(|v| self.bind(v.clone()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn predicate(&mut self, p: &Predicate, out: &mut String) {
        match p {
            Predicate::Compare { field, cmp, value } => {
                let ph = self.bind(value.clone());
                out.push_str(&format!("{} {} {ph}", quote_ident(field), cmp.symbol()));
            }
            Predicate::Contains { field, needle } => {
                let ph = self.bind(JsonValue::String(format!("%{needle}%")));
                out.push_str(&format!("{}::text ILIKE {ph}", quote_ident(field)));
            }
            Predicate::InList { values, .. } if values.is_empty() => {
                out.push_str("FALSE");
            }
            Predicate::InList { field, values } => {
                let items = self.list(values);
                out.push_str(&format!("{} IN ({items})", quote_ident(field)));
            }
            // NOT IN never admits NULLs, so the empty list must not either.
            Predicate::NotInList { field, values } if values.is_empty() => {
                out.push_str(&format!("{} IS NOT NULL", quote_ident(field)));
            }
            Predicate::NotInList { field, values } => {
                let items = self.list(values);
                out.push_str(&format!("{} NOT IN ({items})", quote_ident(field)));
            }
            Predicate::And(children) => self.group(children, " AND ", out),
            Predicate::Or(children) => self.group(children, " OR ", out),
        }
    }

    fn group(&mut self, children: &[Predicate], sep: &str, out: &mut String) {
        for (i, c) in children.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            if matches!(c, Predicate::And(_) | Predicate::Or(_)) {
                out.push('(');
                self.predicate(c, out);
                out.push(')');
            } else {
                self.predicate(c, out);
            }
        }
    }
}
