//! Themed html templates with block inheritance and snippets.
//!
//! A page is rendered from a chain of templates: the requested
//! template may `@extends` a parent, which may extend another, up to a
//! base page layout.
//! Each template in the chain defines named blocks, and the most
//! derived definition of each block is the one rendered into the base
//! page, optionally wrapping its parent's definition with `@super()`.
//! Reusable snippets are included with `@include`, getting only the
//! parameters they are explicitly given.
//!
//! Every template is looked up first in the active theme, if any, and
//! then in the default templates.
//! This is done separately for each template in a chain and for each
//! snippet, so a theme can override just the parts it needs to.
//!
//! The syntax is described in the [Template_syntax] module.
//!
//! # Example
//!
//! ```
//! use templayer::{Context, Engine, MemorySource, RenderEnv};
//!
//! # fn main() -> templayer::Result<()> {
//! let defaults = MemorySource::with_templates(
//!     "default",
//!     [
//!         ("page.html", "<title>@block title {Site}</title>"),
//!         ("user/read.html", "@extends(\"page.html\")\n\
//!                             @block title {@user.name - @super()}"),
//!     ],
//! );
//! let theme = MemorySource::with_templates(
//!     "midnight-blue",
//!     [("page.html", "<title class=\"dark\">@block title {Site}</title>")],
//! );
//! let engine = Engine::new(defaults).with_theme("midnight-blue", theme)?;
//!
//! let context = Context::new().with("user", templayer::Value::map([("name", "kim")]));
//! let env = RenderEnv::new();
//! assert_eq!(
//!     engine.render("user/read.html", &context, &env)?,
//!     "<title>kim - Site</title>",
//! );
//! let env = RenderEnv::new().theme("midnight-blue");
//! assert_eq!(
//!     engine.render("user/read.html", &context, &env)?,
//!     "<title class=\"dark\">kim - Site</title>",
//! );
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod compose;
mod config;
mod context;
mod engine;
mod errors;
mod expression;
mod nom_delimited_list;
mod parseresult;
mod resolver;
mod source;
mod spacelike;
mod template;
pub mod template_utils;
mod templateexpression;
mod value;

#[allow(non_snake_case)]
pub mod Template_syntax;

pub use crate::compose::{merge_blocks, BlockDef, BlockTable};
pub use crate::config::EngineConfig;
pub use crate::context::{Context, DefaultHelpers, Helpers, RenderEnv};
pub use crate::engine::{
    checksum_slug, Engine, Rendered, DEFAULT_MAX_INCLUDE_DEPTH,
};
pub use crate::errors::{Error, Result};
pub use crate::expression::{Expr, Helper};
pub use crate::resolver::{Chain, Loaded, Origin, Resolver, DEFAULT_ROOT};
pub use crate::source::{DirSource, MemorySource, TemplateSource};
pub use crate::template::Template;
pub use crate::templateexpression::TemplateExpression;
pub use crate::value::Value;
