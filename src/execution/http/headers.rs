//! Header merging.
//!
//! Header sets produced by resolvers are folded into one `HeaderMap` in
//! registration order. Names are case-insensitive: `HeaderName` lowercases
//! them on parse.

use crate::error::RequestError;
use crate::types::HeaderSet;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

/// Merge header sets in order.
///
/// Object-shaped sets replace every earlier value for a name. Pair lists and
/// header maps append, so a name repeated inside one list is sent repeatedly.
pub fn merge_headers<I>(sets: I) -> Result<HeaderMap, RequestError>
where
    I: IntoIterator<Item = HeaderSet>,
{
    let mut merged = HeaderMap::new();
    for set in sets {
        match set {
            HeaderSet::Object(entries) => {
                for (name, value) in entries {
                    let (name, value) = parse_header(&name, &value)?;
                    merged.insert(name, value);
                }
            }
            HeaderSet::Pairs(entries) => {
                for (name, value) in entries {
                    let (name, value) = parse_header(&name, &value)?;
                    merged.append(name, value);
                }
            }
            HeaderSet::Map(map) => {
                for (name, value) in map.iter() {
                    merged.append(name.clone(), value.clone());
                }
            }
        }
    }
    Ok(merged)
}

/// Set `content-type` unless the caller already configured one.
pub fn apply_default_content_type(headers: &mut HeaderMap, content_type: &'static str) {
    headers
        .entry(CONTENT_TYPE)
        .or_insert_with(|| HeaderValue::from_static(content_type));
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), RequestError> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|source| RequestError::InvalidHeaderName {
            name: name.to_string(),
            source,
        })?;
    let header_value =
        HeaderValue::from_str(value).map_err(|source| RequestError::InvalidHeaderValue {
            name: name.to_string(),
            source,
        })?;
    Ok((header_name, header_value))
}
