//! The rendering entry points, shared by all requests.

use crate::compose::{merge_blocks, BlockTable, Renderer};
use crate::context::{Context, RenderEnv};
use crate::errors::{Error, Result};
use crate::resolver::{Chain, Loaded, Resolver};
use crate::source::TemplateSource;
use base64::prelude::{Engine as _, BASE64_URL_SAFE_NO_PAD};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Default limit for how deeply snippets may include other snippets.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// A rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// A short checksum of `html`, usable as an http entity tag.
    pub etag: String,
}

/// Renders templates from a default root, optionally overridden by a
/// theme.
///
/// An engine is meant to live for the whole process and be shared by
/// all requests; rendering only reads from it.
#[derive(Debug)]
pub struct Engine {
    resolver: Resolver,
    max_include_depth: usize,
}

impl Engine {
    /// Create an engine with the default templates in `default`.
    pub fn new(default: impl TemplateSource + 'static) -> Self {
        Engine {
            resolver: Resolver::new(default),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Add the theme `name`, whose templates override the defaults
    /// when it is active.
    ///
    /// The name of the default root can not be used for a theme.
    pub fn with_theme(
        mut self,
        name: impl Into<String>,
        source: impl TemplateSource + 'static,
    ) -> Result<Self> {
        self.resolver.add_theme(name, source)?;
        Ok(self)
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Forget all parsed templates, so changed sources are read again.
    pub fn clear_cache(&self) {
        self.resolver.clear_cache()
    }

    /// Find the concrete template for logical `path` under `theme`.
    pub fn resolve(&self, path: &str, theme: Option<&str>) -> Result<Arc<Loaded>> {
        self.resolver.resolve(path, theme)
    }

    /// Resolve `path` and everything it extends.
    pub fn build_chain(&self, path: &str, theme: Option<&str>) -> Result<Chain> {
        let leaf = self.resolver.resolve(path, theme)?;
        self.resolver.build_chain(leaf, theme)
    }

    /// The block definitions of `chain`.
    pub fn merge_blocks<'c>(&self, chain: &'c Chain) -> BlockTable<'c> {
        merge_blocks(chain)
    }

    /// Render the page `path` with `context` to a string.
    pub fn render(
        &self,
        path: &str,
        context: &Context,
        env: &RenderEnv,
    ) -> Result<String> {
        let mut buf = Vec::new();
        self.render_to(&mut buf, path, context, env)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Render the page `path` and compute its entity tag.
    pub fn render_page(
        &self,
        path: &str,
        context: &Context,
        env: &RenderEnv,
    ) -> Result<Rendered> {
        let html = self.render(path, context, env)?;
        let etag = checksum_slug(html.as_bytes());
        Ok(Rendered { html, etag })
    }

    /// Render the page `path` with `context` to `out`.
    pub fn render_to(
        &self,
        out: &mut dyn Write,
        path: &str,
        context: &Context,
        env: &RenderEnv,
    ) -> Result<()> {
        debug!(path, theme = ?env.active_theme(), "rendering");
        self.render_nested(out, path, context, env, 0)
    }

    /// Render the snippet `path` with only `params` in scope.
    ///
    /// The globals and helpers of `env` are available to the snippet
    /// as to any template, but nothing else from the caller is.
    pub fn render_snippet(
        &self,
        path: &str,
        params: &Context,
        env: &RenderEnv,
    ) -> Result<String> {
        self.render(path, params, env)
    }

    pub(crate) fn render_nested(
        &self,
        out: &mut dyn Write,
        path: &str,
        context: &Context,
        env: &RenderEnv,
        depth: usize,
    ) -> Result<()> {
        if depth > self.max_include_depth {
            return Err(Error::IncludeDepth {
                path: path.to_string(),
                max: self.max_include_depth,
            });
        }
        let chain = self.build_chain(path, env.active_theme())?;
        Renderer::new(self, env, &chain, depth).render(out, context)
    }
}

/// A short and url-safe checksum string from string data.
pub fn checksum_slug(data: &[u8]) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(&md5::compute(data)[..6])
}
