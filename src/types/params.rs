//! Partial query and header sets produced by resolvers.

use reqwest::header::HeaderMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// An ordered list of URL-encoded key/value pairs.
///
/// Used both for query resolvers and for `application/x-www-form-urlencoded`
/// bodies. Duplicate keys are kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one pair.
    pub fn pair(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Build pairs from any serde value that serializes as a flat map or
    /// sequence of pairs.
    pub fn from_serialize<T>(value: &T) -> Result<Self, serde_urlencoded::ser::Error>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(value)?;
        Ok(url::form_urlencoded::parse(encoded.as_bytes())
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `application/x-www-form-urlencoded` serialization of the pairs.
    pub fn to_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    pub(crate) fn extend(&mut self, other: QueryParams) {
        self.pairs.extend(other.pairs);
    }
}

impl IntoIterator for QueryParams {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for QueryParams {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for QueryParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for QueryParams {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for QueryParams {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

/// A partial header set produced by one header resolver.
///
/// The shape decides how the set merges with earlier ones:
/// - `Object`: one value per name; each entry replaces every earlier value for
///   that name.
/// - `Pairs` and `Map`: every entry is appended, so repeated names produce
///   repeated header occurrences.
#[derive(Debug, Clone)]
pub enum HeaderSet {
    Object(Vec<(String, String)>),
    Pairs(Vec<(String, String)>),
    Map(HeaderMap),
}

impl HeaderSet {
    /// Object-shaped set: later entries for the same (case-insensitive) name win.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Object(collect_pairs(entries))
    }

    /// Explicit pair list: every entry survives the merge.
    pub fn pairs<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Pairs(collect_pairs(entries))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Object(entries) | Self::Pairs(entries) => entries.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }
}

impl Default for HeaderSet {
    fn default() -> Self {
        Self::Pairs(Vec::new())
    }
}

fn collect_pairs<K, V, I>(entries: I) -> Vec<(String, String)>
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for HeaderSet {
    fn from(map: HashMap<K, V>) -> Self {
        Self::object(map)
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for HeaderSet {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::object(map)
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for HeaderSet {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Self::pairs(pairs)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for HeaderSet {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::pairs(pairs)
    }
}

impl From<HeaderMap> for HeaderSet {
    fn from(map: HeaderMap) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Paging {
        page: u32,
        tags: Vec<&'static str>,
    }

    #[test]
    fn from_serialize_keeps_field_order() {
        let params = QueryParams::from_serialize(&[("q", "rust"), ("q", "http")]).unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("q", "rust"), ("q", "http")]);
    }

    #[test]
    fn from_serialize_rejects_nested_values() {
        let paging = Paging {
            page: 2,
            tags: vec!["a"],
        };
        assert!(QueryParams::from_serialize(&paging).is_err());
    }

    #[test]
    fn urlencodes_reserved_characters() {
        let params = QueryParams::new().pair("q", "a b&c").pair("x", "é");
        assert_eq!(params.to_urlencoded(), "q=a+b%26c&x=%C3%A9");
    }

    #[test]
    fn header_set_shapes_follow_their_source() {
        let mut map = HashMap::new();
        map.insert("accept", "application/json");
        assert!(matches!(HeaderSet::from(map), HeaderSet::Object(_)));
        assert!(matches!(
            HeaderSet::from([("x-tag", "a"), ("x-tag", "b")]),
            HeaderSet::Pairs(ref p) if p.len() == 2
        ));
        assert!(HeaderSet::default().is_empty());
    }
}
