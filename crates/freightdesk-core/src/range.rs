//! `range=[start, end]` handling and the matching `Content-Range` header.

use crate::errors::{QueryError, Result};
use serde::Serialize;

/// Inclusive index window. `end < 0` asks for every row from `start` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeRequest {
    start: i64,
    end: i64,
}

impl RangeRequest {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start < 0 {
            return Err(QueryError::MalformedRange(format!(
                "start must be non-negative, got {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.end < 0
    }

    /// Rows covered by `[start, end]`, zero when inverted. Saturates instead
    /// of overflowing for bounds near `i64::MAX`.
    pub fn span(&self) -> u64 {
        let n = i128::from(self.end) - i128::from(self.start) + 1;
        u64::try_from(n.max(0)).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

pub struct RangeTranslator;

impl RangeTranslator {
    /// `None` means no OFFSET/LIMIT at all, either because no range was given
    /// or because the range opted out with a negative end.
    pub fn translate(range: Option<&RangeRequest>) -> Option<Pagination> {
        let r = range?;
        if r.is_unbounded() {
            return None;
        }
        Some(Pagination {
            offset: r.start as u64,
            limit: r.span(),
        })
    }
}

pub struct ContentRange;

impl ContentRange {
    /// `start-end/total`, echoing the requested bounds without clamping them
    /// to the row count.
    pub fn format(range: Option<&RangeRequest>, total: u64) -> String {
        match range {
            None => format!("0-{total}/{total}"),
            Some(r) => format!("{}-{}/{}", r.start, r.end, total),
        }
    }
}
