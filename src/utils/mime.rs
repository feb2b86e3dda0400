//! MIME type detection utilities

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME by file path or URL (extension-based)
pub fn guess_mime_from_path_or_url(path_or_url: &str) -> Option<String> {
    mime_guess::from_path(path_or_url)
        .first_raw()
        .map(|s| s.to_string())
}

/// Combined guess for multipart parts: prefer the file name, fall back to
/// magic numbers, otherwise octet-stream.
pub fn guess_mime(bytes: Option<&[u8]>, file_name: Option<&str>) -> String {
    if let Some(name) = file_name
        && let Some(m) = guess_mime_from_path_or_url(name)
    {
        return m;
    }
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    crate::defaults::content_type::OCTET_STREAM.to_string()
}
