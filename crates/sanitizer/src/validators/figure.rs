use html::dom_utils::{element_children, has_text_content, text_content};
use html::{Node, escape_attribute};

use crate::assets::ImageDimensions;
use crate::context::{Scope, ValidationContext};
use crate::engine::{Engine, nfc};
use crate::error::{ErrorCode, Errors};
use crate::urls;

struct ResolvedImage {
    path: String,
    dimensions: ImageDimensions,
}

/// Validate `<figure><img><figcaption>` and queue the rebuilt image and
/// caption for emission before `</figure>`. The figure's own children are
/// never walked: its content is entirely synthesized.
pub(crate) fn validate(
    engine: &Engine<'_>,
    node: &Node,
    level: usize,
    ctx: &mut ValidationContext,
    errors: &mut Errors,
) {
    let Some(kids) = element_children(node) else {
        errors.add(ErrorCode::ImageChildren);
        return;
    };
    let (img, caption) = match kids.as_slice() {
        [] => {
            errors.add(ErrorCode::ImageNoImage);
            errors.add(ErrorCode::ImageNoCaption);
            return;
        }
        [only] if only.is_element_named("img") => {
            errors.add(ErrorCode::ImageNoCaption);
            return;
        }
        [only] if only.is_element_named("figcaption") => {
            errors.add(ErrorCode::ImageNoImage);
            return;
        }
        [img, caption] => (*img, *caption),
        _ => {
            errors.add(ErrorCode::ImageChildren);
            return;
        }
    };

    let image = resolve_image(engine, img, errors);
    let caption = render_caption(engine, caption, ctx, errors);
    if let (Some(image), Some((caption_html, alt))) = (image, caption) {
        let ImageDimensions { width, height } = image.dimensions;
        ctx.push_tail_insert(
            level,
            "figure",
            format!(
                "<img src='{}' width='{width}' height='{height}' alt='{}' aria-hidden='true'>\
                 <figcaption>{caption_html}</figcaption>",
                escape_attribute(&image.path),
                escape_attribute(&alt),
            ),
        );
    }
}

fn resolve_image(engine: &Engine<'_>, img: &Node, errors: &mut Errors) -> Option<ResolvedImage> {
    let config = &engine.sanitizer.config;
    let src = img.attr("src").map(str::trim).unwrap_or("");
    if !img.is_element_named("img") || src.is_empty() {
        errors.add(ErrorCode::ImageNoImage);
        return None;
    }

    let absolute = urls::absolutize(src, &config.scheme, &config.internal_hostname);
    let url = match urls::parse_web_url(&absolute) {
        Some(url) if !urls::has_credentials(&url) && !urls::has_explicit_port(&absolute, &url) => url,
        _ => {
            errors.add_detail(ErrorCode::ImageInvalidSource, src);
            return None;
        }
    };
    let host = url.host_str().unwrap_or_default();
    if !urls::is_internal_host(host, &config.internal_hostname) {
        errors.add_detail(ErrorCode::ImageExternal, url.as_str());
        errors.set_hint(ErrorCode::ImageExternal, &config.internal_hostname);
        return None;
    }

    let path = urls::host_path(&url);
    let Some(dimensions) = engine.sanitizer.assets.dimensions(&path) else {
        log::debug!(target: "sanitizer.figure", "no asset for {path}");
        errors.add_detail(ErrorCode::ImageNonExistent, &path);
        return None;
    };
    Some(ResolvedImage { path, dimensions })
}

/// Validated caption markup plus its plain text for `alt`.
fn render_caption(
    engine: &Engine<'_>,
    caption: &Node,
    ctx: &ValidationContext,
    errors: &mut Errors,
) -> Option<(String, String)> {
    if !caption.is_element_named("figcaption") || !has_text_content(caption) {
        errors.add(ErrorCode::ImageNoCaption);
        return None;
    }
    let html = engine.walk_nested(
        caption.children(),
        &engine.sanitizer.caption_tags,
        Scope::Caption,
        ctx,
        errors,
    );
    let alt = nfc(&text_content(caption).split_whitespace().collect::<Vec<_>>().join(" "));
    Some((html, alt))
}
