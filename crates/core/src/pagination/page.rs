use serde::{Deserialize, Serialize};

use super::filter::RecordFilter;
use super::token::{encode_token, PageKey};
use crate::record::{Record, ValidationError};

/// Multiplier applied to the page size of a filtered listing, since the
/// store applies its limit before the filter.
pub const FILTER_OVERFETCH_FACTOR: u32 = 20;
pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 1000;
/// Native batch-write limit of the store.
pub const BATCH_DELETE_CHUNK_SIZE: usize = 25;

/// Caller-facing page size, always in `1..=MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(u32);

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_PAGE_LIMIT)
    }
}

impl PageLimit {
    pub fn new(limit: u32) -> Result<Self, ValidationError> {
        if (1..=MAX_PAGE_LIMIT).contains(&limit) {
            Ok(Self(limit))
        } else {
            Err(ValidationError::InvalidLimit {
                value: limit.to_string(),
                max: MAX_PAGE_LIMIT,
            })
        }
    }

    /// Parses the raw `limit` query parameter. Absent or blank means the default.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        raw.parse::<u32>()
            .ok()
            .and_then(|n| Self::new(n).ok())
            .ok_or_else(|| ValidationError::InvalidLimit {
                value: raw.to_string(),
                max: MAX_PAGE_LIMIT,
            })
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Store limit for a filtered query.
    pub fn overfetched(self) -> u32 {
        self.0.saturating_mul(FILTER_OVERFETCH_FACTOR)
    }
}

/// One descending query on the published index (`ConstantKey = :ck`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedIndexQuery {
    /// Items the store evaluates before filtering.
    pub limit: u32,
    pub exclusive_start_key: Option<PageKey>,
    pub filter: RecordFilter,
}

impl PublishedIndexQuery {
    pub fn sorted(limit: PageLimit, exclusive_start_key: Option<PageKey>) -> Self {
        Self {
            limit: limit.get(),
            exclusive_start_key,
            filter: RecordFilter::default(),
        }
    }

    pub fn filtered(
        limit: PageLimit,
        exclusive_start_key: Option<PageKey>,
        filter: RecordFilter,
    ) -> Self {
        Self {
            limit: limit.overfetched(),
            exclusive_start_key,
            filter,
        }
    }
}

/// What the store returns for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    pub items: Vec<Record>,
    pub last_evaluated_key: Option<PageKey>,
}

/// A page of results as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Shapes an unfiltered query result; the store's key is forwarded as is.
pub fn sorted_page(output: QueryOutput) -> Page<Record> {
    Page {
        count: output.items.len(),
        next_token: output.last_evaluated_key.as_ref().map(encode_token),
        items: output.items,
    }
}

/// Shapes a filtered, over-fetched query result down to `limit` items.
///
/// When items had to be dropped, the token resumes right after the last
/// returned item. Forwarding the store's key in that case would skip the
/// dropped items on the next page.
pub fn filtered_page(output: QueryOutput, limit: PageLimit) -> Page<Record> {
    let QueryOutput {
        mut items,
        last_evaluated_key,
    } = output;
    let limit = limit.get() as usize;

    let next_key = if items.len() > limit {
        items.truncate(limit);
        items.last().map(PageKey::for_record)
    } else {
        last_evaluated_key
    };

    Page {
        count: items.len(),
        next_token: next_key.as_ref().map(encode_token),
        items,
    }
}
