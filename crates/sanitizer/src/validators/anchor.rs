use html::{Node, escape_attribute};

use crate::context::ValidationContext;
use crate::engine::Engine;
use crate::error::{ErrorCode, Errors};
use crate::urls;

/// Validate a link and rebuild its opening tag from `href` alone.
///
/// Internal targets become host-relative; external ones keep the full URL
/// and gain `rel='nofollow' target='_blank'`. Returns `None` once an error
/// is recorded.
pub(crate) fn validate(
    engine: &Engine<'_>,
    node: &Node,
    ctx: &ValidationContext,
    errors: &mut Errors,
) -> Option<String> {
    let config = &engine.sanitizer.config;
    let Some(href) = node.attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
        errors.add(ErrorCode::LinkNoTarget);
        return None;
    };

    let absolute = urls::absolutize(href, &config.scheme, &config.internal_hostname);
    let Some(url) = urls::parse_web_url(&absolute) else {
        errors.add_detail(ErrorCode::LinkInvalid, href);
        return None;
    };
    let host = url.host_str().unwrap_or_default();
    if urls::has_credentials(&url) {
        // Report the host only; the userinfo is a secret.
        errors.add_detail(ErrorCode::LinkCredentials, host);
        return None;
    }
    if urls::has_explicit_port(&absolute, &url) {
        errors.add_detail(ErrorCode::LinkPort, host);
        return None;
    }

    let internal = urls::is_internal_host(host, &config.internal_hostname);
    let target = if internal {
        urls::host_relative(&url)
    } else if ctx.allow_external_links {
        url.to_string()
    } else {
        errors.add_detail(ErrorCode::LinkExternal, url.as_str());
        return None;
    };

    let rebuilt = urls::absolutize(&target, &config.scheme, &config.internal_hostname);
    if urls::parse_web_url(&rebuilt).is_none() {
        errors.add_detail(ErrorCode::LinkInvalid, href);
        return None;
    }

    if config.check_link_reachability
        && let Some(prober) = engine.sanitizer.prober.as_deref()
        && let Err(err) = prober.probe(&url)
    {
        log::warn!(target: "sanitizer.anchor", "link target unreachable: {err}");
        errors.add_detail(ErrorCode::LinkUnreachable, url.as_str());
        return None;
    }

    log::trace!(target: "sanitizer.anchor", "accepted link to {host} (internal: {internal})");
    let mut open = format!("<a href='{}'", escape_attribute(&target));
    if !internal {
        open.push_str(" rel='nofollow' target='_blank'");
    }
    open.push('>');
    Some(open)
}
