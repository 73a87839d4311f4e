use serde_json::Value;

use crate::error::CoreError;
use crate::model::{PageEnvelope, Pagination};

/// A validated `limit` / `offset` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Parse raw `limit` / `offset` values. A limit above `max_limit` is
    /// clamped; non-positive limits and negative offsets are rejected.
    pub fn parse(
        limit: Option<&str>,
        offset: Option<&str>,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Self, CoreError> {
        let limit = match limit {
            Some(raw) => parse_integer("limit", raw)?,
            None => default_limit,
        };
        if limit <= 0 {
            return Err(CoreError::invalid_parameter("limit", "must be greater than 0"));
        }

        let offset = match offset {
            Some(raw) => parse_integer("offset", raw)?,
            None => 0,
        };
        if offset < 0 {
            return Err(CoreError::invalid_parameter("offset", "must not be negative"));
        }

        Ok(Self {
            limit: limit.min(max_limit),
            offset,
        })
    }

    /// True when the window starts past the last matching row.
    pub fn is_past_end(&self, total: i64) -> bool {
        self.offset >= total
    }
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::invalid_parameter(name, format!("'{}' is not an integer", raw)))
}

/// Builds `next` / `previous` links for a list request. Every original
/// query parameter is kept in order; `limit` and `offset` are rewritten.
#[derive(Debug, Clone)]
pub struct LinkTemplate<'a> {
    pub path: &'a str,
    pub params: &'a [(String, String)],
}

impl LinkTemplate<'_> {
    pub fn at(&self, window: PageWindow, offset: i64) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(self.params.len() + 2);
        let mut has_limit = false;
        let mut has_offset = false;

        for (key, value) in self.params {
            match key.as_str() {
                "limit" => {
                    has_limit = true;
                    pairs.push(("limit", window.limit.to_string()));
                }
                "offset" => {
                    has_offset = true;
                    pairs.push(("offset", offset.to_string()));
                }
                _ => pairs.push((key.as_str(), value.clone())),
            }
        }
        if !has_offset {
            pairs.push(("offset", offset.to_string()));
        }
        if !has_limit {
            pairs.push(("limit", window.limit.to_string()));
        }

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Wrap one page of rows in the response envelope.
pub fn envelope(data: Vec<Value>, total: i64, window: PageWindow, links: &LinkTemplate<'_>) -> PageEnvelope {
    // An offset that cannot be advanced without overflowing has no next page.
    let next = window
        .offset
        .checked_add(window.limit)
        .filter(|next_offset| *next_offset < total)
        .map(|next_offset| links.at(window, next_offset));
    let previous = (window.offset > 0).then(|| links.at(window, window.offset.saturating_sub(window.limit).max(0)));

    PageEnvelope {
        data,
        pagination: Pagination {
            total,
            limit: window.limit,
            offset: window.offset,
            next,
            previous,
        },
    }
}
