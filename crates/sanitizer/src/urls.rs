//! URL helpers shared by the link and image validators.

use url::Url;

/// Absolutize host-relative (`/x`) and scheme-relative (`//host/x`)
/// references against the internal host. Anything else is returned as is.
pub(crate) fn absolutize(reference: &str, scheme: &str, internal_host: &str) -> String {
    if reference.starts_with("//") {
        format!("{scheme}:{reference}")
    } else if reference.starts_with('/') {
        format!("{scheme}://{internal_host}{reference}")
    } else {
        reference.to_string()
    }
}

/// Parses `absolute` and requires an http(s) URL with a host.
pub(crate) fn parse_web_url(absolute: &str) -> Option<Url> {
    let url = Url::parse(absolute).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str().filter(|h| !h.is_empty())?;
    Some(url)
}

pub(crate) fn has_credentials(url: &Url) -> bool {
    !url.username().is_empty() || url.password().is_some()
}

/// Whether the author wrote a port, including the scheme's default one,
/// which the parsed [`Url`] silently drops.
pub(crate) fn has_explicit_port(absolute: &str, url: &Url) -> bool {
    if url.port().is_some() {
        return true;
    }
    // Mirror the URL parser: outer C0/space trimmed, tabs and newlines
    // removed, and any run of slashes after a special scheme skipped.
    let cleaned: String = absolute
        .trim_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let Some((_, rest)) = cleaned.split_once(':') else {
        return false;
    };
    let authority = rest
        .trim_start_matches(['/', '\\'])
        .split(['/', '\\', '?', '#'])
        .next()
        .unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host_port = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split_once(']').map_or("", |(_, after)| after),
        None => host_port,
    };
    host_port.contains(':')
}

/// `host` equals the internal host or is one of its subdomains.
pub(crate) fn is_internal_host(host: &str, internal_host: &str) -> bool {
    let host = host.trim_end_matches('.');
    host.eq_ignore_ascii_case(internal_host)
        || host
            .len()
            .checked_sub(internal_host.len() + 1)
            .is_some_and(|split| {
                host.as_bytes()[split] == b'.'
                    && host[split + 1..].eq_ignore_ascii_case(internal_host)
            })
}

/// Path of `url` with leading slashes collapsed, so the result can never be
/// read back as a scheme-relative reference to another host.
pub(crate) fn host_path(url: &Url) -> String {
    format!("/{}", url.path().trim_start_matches('/'))
}

/// Path plus fragment, dropping scheme, host and query.
pub(crate) fn host_relative(url: &Url) -> String {
    match url.fragment() {
        Some(fragment) => format!("{}#{fragment}", host_path(url)),
        None => host_path(url),
    }
}
