/// Private helpers for splitting URL strings

/// Schemes whose last path segment may carry `;params`.
pub(super) const USES_PARAMS: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps", "rtspu",
    "sip", "sips", "mms", "sftp", "tel",
];

/// Drop leading control/space characters and any embedded tab or newline.
pub(super) fn sanitize(url: &str) -> String {
    url.trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect()
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

/// Split `scheme:rest` when the text before the first colon is a valid scheme.
pub(super) fn split_scheme(url: &str) -> Option<(&str, &str)> {
    let idx = url.find(':')?;
    if idx == 0 {
        return None;
    }
    let candidate = &url[..idx];
    let first = candidate.chars().next()?;
    if !first.is_ascii_alphabetic() || !candidate.chars().all(is_scheme_char) {
        return None;
    }
    Some((candidate, &url[idx + 1..]))
}

/// Split `;params` off the last path segment.
pub(super) fn split_params(path: &str) -> (&str, &str) {
    let search_from = path.rfind('/').unwrap_or(0);
    match path[search_from..].find(';') {
        Some(offset) => {
            let idx = search_from + offset;
            (&path[..idx], &path[idx + 1..])
        }
        None => (path, ""),
    }
}

/// Host part of a netloc: userinfo and port removed, IPv6 brackets unwrapped.
pub(super) fn netloc_hostname(netloc: &str) -> Option<String> {
    let hostinfo = match netloc.rfind('@') {
        Some(idx) => &netloc[idx + 1..],
        None => netloc,
    };
    let host = match hostinfo.split_once('[') {
        Some((_, bracketed)) => bracketed.split(']').next().unwrap_or(bracketed),
        None => hostinfo.split(':').next().unwrap_or(hostinfo),
    };
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}
