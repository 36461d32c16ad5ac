use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use url::Url;

/// Pick a download name for an asset.
///
/// Priority: explicit name, last segment of the source URL, last segment of
/// the CDN public id, then `photo_<fallback_id>.jpg`. Blank candidates fall
/// through to the next tier, so the result is never empty.
pub fn resolve_filename(
    explicit: Option<&str>,
    source_url: Option<&str>,
    cdn_id: Option<&str>,
    fallback_id: Option<&str>,
) -> String {
    if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    if let Some(name) = source_url.and_then(url_segment) {
        return name;
    }

    if let Some(name) = cdn_id.and_then(last_segment) {
        return name.to_string();
    }

    let id = fallback_id.map(str::trim).filter(|id| !id.is_empty()).unwrap_or("image");
    format!("photo_{}.jpg", id)
}

/// Attachment name for a whole-gallery archive
pub fn archive_filename(gallery_name: &str) -> String {
    let safe: String = gallery_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_Gallery.zip", safe)
}

/// `Content-Disposition` value carrying both an ASCII fallback and the
/// RFC 5987 UTF-8 form of the name.
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if ascii == filename {
        format!("attachment; filename=\"{}\"", ascii)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii,
            utf8_percent_encode(filename, NON_ALPHANUMERIC)
        )
    }
}

fn url_segment(raw: &str) -> Option<String> {
    let segment = match Url::parse(raw) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.last())
            .map(str::to_string),
        Err(_) => None,
    };

    // Unparseable (or opaque) URLs still usually end in a file name
    let segment = segment.or_else(|| {
        raw.split('?')
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string)
    })?;

    let decoded = percent_decode_str(&segment).decode_utf8().ok()?;
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}

fn last_segment(value: &str) -> Option<&str> {
    value
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_name_wins_after_trim() {
        let name = resolve_filename(Some("  IMG_01.jpg "), Some("https://x/y/z.jpg"), Some("a/b"), None);
        assert_eq!(name, "IMG_01.jpg");
    }

    #[test]
    fn blank_explicit_name_falls_to_url() {
        let name = resolve_filename(Some("  "), Some("https://x/y/z.jpg"), Some("folder/name"), None);
        assert_eq!(name, "z.jpg");
    }

    #[test]
    fn url_segment_is_percent_decoded() {
        let name = resolve_filename(None, Some("https://cdn.example.com/a/My%20Photo.jpg?dl=1"), None, None);
        assert_eq!(name, "My Photo.jpg");
    }

    #[test]
    fn unparseable_url_uses_naive_split() {
        let name = resolve_filename(None, Some("not a url///"), Some("a/b"), None);
        assert_eq!(name, "b");

        let name = resolve_filename(None, Some("uploads/v1/shot.png?x=1"), None, None);
        assert_eq!(name, "shot.png");
    }

    #[test]
    fn invalid_utf8_escape_falls_through() {
        let name = resolve_filename(None, Some("https://x/y/%FF%FE"), Some("folder/kept"), None);
        assert_eq!(name, "kept");
    }

    #[test]
    fn trailing_slash_url_falls_to_cdn_id() {
        let name = resolve_filename(None, Some("https://x/y/"), Some("studio/gallery/abc123"), None);
        assert_eq!(name, "abc123");
    }

    #[test]
    fn synthesized_name_when_nothing_else() {
        assert_eq!(resolve_filename(None, None, None, Some("42")), "photo_42.jpg");
        assert_eq!(resolve_filename(Some(""), Some(""), Some("folder/"), None), "photo_image.jpg");
    }

    #[test]
    fn archive_name_replaces_non_alphanumerics() {
        assert_eq!(archive_filename("Smith & Jones: 2024"), "Smith___Jones__2024_Gallery.zip");
        assert_eq!(archive_filename("Zoë"), "Zo__Gallery.zip");
    }

    #[test]
    fn content_disposition_escapes_non_ascii() {
        assert_eq!(content_disposition("a.jpg"), "attachment; filename=\"a.jpg\"");
        let header = content_disposition("café \"1\".jpg");
        assert!(header.starts_with("attachment; filename=\"caf_ _1_.jpg\"; filename*=UTF-8''"));
        assert!(header.contains("caf%C3%A9"));
    }
}
