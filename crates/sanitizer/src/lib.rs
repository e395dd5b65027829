//! Whitelisting sanitizer for user-authored rich text.
//!
//! Input is parsed strictly, walked against the configured whitelist with
//! per-tag rules for links, quotations, figures and lists, re-serialized, and
//! re-parsed once more before it is handed back. Any problem rejects the whole
//! input; callers get the original text back together with every error found.

mod assets;
mod config;
mod context;
mod engine;
mod error;
mod probe;
mod reflow;
mod tags;
mod urls;
mod validators;
mod verify;

pub use crate::assets::{AssetStore, FsAssetStore, ImageDimensions, MemoryAssetStore, NoAssets};
pub use crate::config::{
    ConfigError, DEFAULT_ALLOWED_TAGS, DEFAULT_CAPTION_TAGS, DEFAULT_CITE_TAGS, DEFAULT_CLASSES,
    DEFAULT_LIST_TAGS, SanitizerConfig,
};
pub use crate::error::{ErrorCode, Errors, Rejected};
pub use crate::probe::{LinkProber, StaticProber};
pub use crate::reflow::reflow;
pub use crate::tags::AllowedTagSet;
pub use crate::verify::SanitizedHtml;

use html::Node;

use crate::context::{Scope, ValidationContext};
use crate::engine::Engine;

/// How input is interpreted before validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Input is markup in the whitelisted dialect.
    #[default]
    Html,
    /// Input is plain text; it is reflowed into paragraphs first.
    Raw,
}

/// A configured sanitizer. Immutable once built, so one instance can serve
/// concurrent calls.
pub struct Sanitizer {
    pub(crate) config: SanitizerConfig,
    pub(crate) allowed: AllowedTagSet,
    pub(crate) caption_tags: AllowedTagSet,
    pub(crate) cite_tags: AllowedTagSet,
    pub(crate) list_tags: AllowedTagSet,
    pub(crate) assets: Box<dyn AssetStore>,
    pub(crate) prober: Option<Box<dyn LinkProber>>,
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer")
            .field("config", &self.config)
            .field("prober", &self.prober.is_some())
            .finish_non_exhaustive()
    }
}

impl Sanitizer {
    /// Builds a sanitizer. Images resolve beneath `asset_root` when set; an
    /// HTTP prober is created when reachability checks are enabled.
    pub fn new(config: SanitizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let assets: Box<dyn AssetStore> = match &config.asset_root {
            Some(root) => Box::new(FsAssetStore::new(root)),
            None => Box::new(NoAssets),
        };
        let prober: Option<Box<dyn LinkProber>> = if config.check_link_reachability {
            Some(Box::new(net::HttpProber::new(config.probe_timeout())?))
        } else {
            None
        };
        Ok(Self {
            allowed: AllowedTagSet::new(&config.allowed_tags),
            caption_tags: AllowedTagSet::new(&config.caption_whitelist),
            cite_tags: AllowedTagSet::new(&config.cite_whitelist),
            list_tags: AllowedTagSet::new(&config.list_whitelist),
            assets,
            prober,
            config,
        })
    }

    pub fn with_asset_store(mut self, store: impl AssetStore + 'static) -> Self {
        self.assets = Box::new(store);
        self
    }

    pub fn with_link_prober(mut self, prober: impl LinkProber + 'static) -> Self {
        self.prober = Some(Box::new(prober));
        self
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    pub fn sanitize(&self, input: &str) -> Result<SanitizedHtml, Rejected> {
        self.run(input, Mode::Html, self.config.allow_external_links)
    }

    pub fn sanitize_mode(&self, input: &str, mode: Mode) -> Result<SanitizedHtml, Rejected> {
        self.run(input, mode, self.config.allow_external_links)
    }

    /// Like [`Sanitizer::sanitize`], overriding the external link policy for
    /// this call only.
    pub fn sanitize_with_external_links(
        &self,
        input: &str,
        allow: bool,
    ) -> Result<SanitizedHtml, Rejected> {
        self.run(input, Mode::Html, allow)
    }

    /// Runs the validation walk over an already parsed tree and returns the
    /// unverified serialization.
    pub fn validate(&self, root: &Node) -> Result<String, Errors> {
        self.validate_with(root, self.config.allow_external_links)
    }

    fn validate_with(&self, root: &Node, allow_external_links: bool) -> Result<String, Errors> {
        let nodes = match root {
            Node::Document { children } => children.as_slice(),
            other => std::slice::from_ref(other),
        };
        let mut ctx = ValidationContext::new(self.allowed.clone(), Scope::Body, allow_external_links);
        let mut errors = Errors::new();
        let out = Engine::new(self).walk(nodes, &mut ctx, &mut errors);
        if errors.is_empty() { Ok(out) } else { Err(errors) }
    }

    fn run(&self, input: &str, mode: Mode, allow_external_links: bool) -> Result<SanitizedHtml, Rejected> {
        let reject = |errors: Errors| Rejected {
            input: input.to_string(),
            errors,
        };
        let source = match mode {
            Mode::Html => std::borrow::Cow::Borrowed(input),
            Mode::Raw => std::borrow::Cow::Owned(reflow(input)),
        };

        let dom = match html::parse_fragment(&source) {
            Ok(dom) => dom,
            Err(err) => {
                log::debug!(target: "sanitizer", "rejected {} bytes: {:?} at byte {}", input.len(), err.code, err.position);
                let mut errors = Errors::new();
                errors.add_detail(ErrorCode::InvalidMarkup, &err.to_string());
                return Err(reject(errors));
            }
        };

        let output = self.validate_with(&dom, allow_external_links).map_err(|errors| {
            log::debug!(
                target: "sanitizer",
                "rejected {} bytes: {:?}",
                input.len(),
                errors.codes().collect::<Vec<_>>()
            );
            reject(errors)
        })?;

        match verify::finalize(&output) {
            Ok(html) => {
                log::debug!(target: "sanitizer", "sanitized {} bytes into {}", input.len(), html.as_str().len());
                Ok(html)
            }
            Err(err) => {
                log::error!(target: "sanitizer", "output failed verification: {err}");
                let mut errors = Errors::new();
                errors.add(ErrorCode::InvalidMarkup);
                Err(reject(errors))
            }
        }
    }
}
