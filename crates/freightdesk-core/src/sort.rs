use crate::errors::{QueryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(QueryError::InvalidSortDirection(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `[field, direction]` as the client sent it; nothing is validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    pub field: String,
    pub direction: String,
}

impl SortRequest {
    pub fn new(field: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: direction.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_str())
    }
}

pub struct SortResolver<'a> {
    whitelist: &'a BTreeSet<String>,
}

impl<'a> SortResolver<'a> {
    pub fn new(whitelist: &'a BTreeSet<String>) -> Self {
        Self { whitelist }
    }

    /// A bad direction is rejected; a field outside the whitelist just means
    /// "no sort".
    pub fn resolve(&self, request: Option<&SortRequest>) -> Result<Option<OrderBy>> {
        let Some(req) = request else {
            return Ok(None);
        };
        let direction = SortDirection::parse(&req.direction)?;
        if !self.whitelist.contains(&req.field) {
            debug!(field = req.field.as_str(), "sort field not sortable, ignoring sort");
            return Ok(None);
        }
        Ok(Some(OrderBy {
            field: req.field.clone(),
            direction,
        }))
    }
}
