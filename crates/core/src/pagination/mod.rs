//! Query/pagination engine: continuation tokens, filter composition and
//! page shaping for listings over the published index.

mod filter;
mod page;
mod token;

pub use filter::{FilterExpression, FilterValue, RecordFilter};
pub use page::{
    filtered_page, sorted_page, Page, PageLimit, PublishedIndexQuery, QueryOutput,
    BATCH_DELETE_CHUNK_SIZE, DEFAULT_PAGE_LIMIT, FILTER_OVERFETCH_FACTOR, MAX_PAGE_LIMIT,
};
pub use token::{decode_token, encode_token, PageKey, TokenError};
