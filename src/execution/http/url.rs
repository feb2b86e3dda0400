//! URL joining.

use crate::error::RequestError;
use url::Url;

/// Join a resolved path onto a base URL.
///
/// Both paths are split on `/`, empty segments dropped and the rest rejoined,
/// so slash placement on either side never matters and an empty path yields
/// the base path. A `?query` suffix on `path` becomes the URL query. A
/// `#fragment` suffix is dropped, as are the base URL's own query and
/// fragment. A path that is itself an absolute URL with a host is used as-is.
pub fn join_url(base: &Url, path: &str) -> Result<Url, RequestError> {
    if let Ok(absolute) = Url::parse(path)
        && absolute.has_host()
    {
        return Ok(absolute);
    }

    let path = path.split_once('#').map_or(path, |(path, _fragment)| path);
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };

    let joined = base
        .path()
        .split('/')
        .chain(path.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if base.cannot_be_a_base() {
        return Err(RequestError::InvalidUrl {
            url: base.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }

    let mut url = base.clone();
    url.set_path(&format!("/{joined}"));
    url.set_query(query.filter(|q| !q.is_empty()));
    url.set_fragment(None);
    Ok(url)
}

/// Parse a base URL, reporting the offending input on failure.
pub fn parse_base_url(raw: &str) -> Result<Url, RequestError> {
    let url = Url::parse(raw).map_err(|source| RequestError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(RequestError::InvalidUrl {
            url: raw.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(base: &str, path: &str) -> String {
        join_url(&Url::parse(base).unwrap(), path).unwrap().to_string()
    }

    #[test]
    fn slash_placement_does_not_matter() {
        let expected = "http://h/a/b";
        assert_eq!(join("http://h/a/", "b"), expected);
        assert_eq!(join("http://h/a", "b"), expected);
        assert_eq!(join("http://h/a/", "/b"), expected);
        assert_eq!(join("http://h/a", "/b/"), expected);
        assert_eq!(join("http://h/a//", "//b"), expected);
    }

    #[test]
    fn empty_path_yields_base_root() {
        assert_eq!(join("http://h", ""), "http://h/");
        assert_eq!(join("http://h/", "/"), "http://h/");
        assert_eq!(join("http://h/api", ""), "http://h/api");
    }

    #[test]
    fn relative_path_appends_to_base_path() {
        assert_eq!(join("http://h:8080/api/v1", "users/42"), "http://h:8080/api/v1/users/42");
    }

    #[test]
    fn path_query_is_kept_and_base_query_dropped() {
        assert_eq!(join("http://h/api?key=1#frag", "search?q=rust"), "http://h/api/search?q=rust");
        assert_eq!(join("http://h/api?key=1", "search"), "http://h/api/search");
        assert_eq!(join("http://h/api", "search?q=rust#top"), "http://h/api/search?q=rust");
        assert_eq!(join("http://h/api", "docs#intro"), "http://h/api/docs");
    }

    #[test]
    fn absolute_path_replaces_base() {
        assert_eq!(join("http://h/api", "https://other.example/x"), "https://other.example/x");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("http://localhost:3000").is_ok());
    }
}
