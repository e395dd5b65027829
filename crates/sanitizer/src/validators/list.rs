use crate::context::ValidationContext;
use crate::engine::Engine;

/// Narrow the whitelist to list-safe tags for the outermost `ul`/`ol`.
/// The list set only ever removes tags from the active one; `li` is the
/// single addition.
/// Nested lists keep the frame opened by the outermost one, which is
/// unwound when that list's end tag is reached at its own level.
pub(crate) fn enter(engine: &Engine<'_>, tag: &str, level: usize, ctx: &mut ValidationContext) {
    if ctx.in_list() {
        return;
    }
    log::trace!(target: "sanitizer.list", "<{tag}> opens a list frame at level {level}");
    let reduced = engine.sanitizer.list_tags.within(&ctx.allowed, "li");
    ctx.enter_list(tag, level, &reduced);
}
