use url::Url;

/// Parse `url` and accept only http and https.
pub(super) fn parse_http_url(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() {
        Some(parsed)
    } else {
        None
    }
}

/// Validate an HTTP response before its body is handed to the extractors.
///
/// Returns Ok(()) if valid, Err(reason) if invalid.
pub(super) fn validate_response(status_code: reqwest::StatusCode, body: &str) -> Result<(), String> {
    if !status_code.is_success() {
        let reason = status_code.canonical_reason().unwrap_or("unknown error");
        return Err(format!("status {} ({})", status_code.as_u16(), reason.to_lowercase()));
    }

    let head: String = body.chars().take(2048).collect::<String>().to_ascii_lowercase();
    if !head.contains("<html") && !head.contains("<!doctype") && !head.contains("<body") {
        return Err("invalid - missing HTML markers".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://www.lesoir.be/").is_some());
        assert!(parse_http_url("  http://www.dhnet.be/x ").is_some());
        assert!(parse_http_url("ftp://www.lesoir.be/").is_none());
        assert!(parse_http_url("/relative").is_none());
        assert!(parse_http_url("mailto:a@b.be").is_none());
    }

    #[test]
    fn test_validate_response() {
        assert!(validate_response(StatusCode::OK, "<!DOCTYPE html><html></html>").is_ok());
        assert_eq!(
            validate_response(StatusCode::NOT_FOUND, "").unwrap_err(),
            "status 404 (not found)"
        );
        assert_eq!(
            validate_response(StatusCode::OK, "{\"json\": true}").unwrap_err(),
            "invalid - missing HTML markers"
        );
    }
}
