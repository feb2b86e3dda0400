//! Query-parameter merging.

use crate::types::QueryParams;
use url::Url;

/// Concatenate partial query sets in registration order.
///
/// Nothing is de-duplicated: a key set by two resolvers is sent twice.
pub fn merge_query<I>(sets: I) -> QueryParams
where
    I: IntoIterator<Item = QueryParams>,
{
    sets.into_iter().fold(QueryParams::new(), |mut merged, set| {
        merged.extend(set);
        merged
    })
}

/// Append `params` after any query already present on `url`.
pub fn append_query(url: &mut Url, params: &QueryParams) {
    if params.is_empty() {
        return;
    }
    url.query_pairs_mut().extend_pairs(params.iter());
}
