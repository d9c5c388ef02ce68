//! Render contexts, request scoped globals and helpers.

use crate::errors::Result;
use crate::template_utils::escape;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The variables visible to a template.
///
/// The top level template of a page gets the context assembled by
/// the controller, and the whole `@extends` chain shares it.
/// A snippet gets a new context holding only its explicit parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Read a context from a json object.
    pub fn from_json(json: &str) -> Result<Self> {
        let json: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json)?;
        Ok(json.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder style [`insert`](Context::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Look up a dotted path, the first part naming a variable.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        self.vars.get(first.as_ref())?.get_path(rest)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Context {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// The functions templates may call as `h.name(...)`.
///
/// These are collaborators of the rendering, not part of it: access
/// control, display formatting, localization and markdown all live in
/// the application, which passes an implementation in the
/// [`RenderEnv`].
pub trait Helpers: Send + Sync {
    /// May the current user perform `action` on `target`?
    fn check_access(&self, action: &str, target: &Value) -> bool;

    /// A human readable name for a domain object.
    fn display_name(&self, obj: &Value) -> String;

    /// The localized text for `key`.
    fn translate(&self, key: &str) -> String;

    /// Render markdown `text` to html.
    ///
    /// The result is written to the page verbatim, so implementations
    /// must sanitize their input.
    fn markdown(&self, text: &str) -> String;

    /// Number of followers of an object.
    fn follow_count(&self, obj_type: &str, obj_id: &str) -> i64;
}

/// Helpers that need no application: access is denied, text is not
/// translated and "markdown" is escaped into a single paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHelpers;

impl Helpers for DefaultHelpers {
    fn check_access(&self, _action: &str, _target: &Value) -> bool {
        false
    }

    fn display_name(&self, obj: &Value) -> String {
        ["display_name", "title", "fullname", "name"]
            .iter()
            .filter_map(|key| obj.get(key))
            .map(Value::text)
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| obj.text())
    }

    fn translate(&self, key: &str) -> String {
        key.to_string()
    }

    fn markdown(&self, text: &str) -> String {
        if text.is_empty() {
            String::new()
        } else {
            format!("<p>{}</p>", escape(text))
        }
    }

    fn follow_count(&self, _obj_type: &str, _obj_id: &str) -> i64 {
        0
    }
}

/// Everything about a render that is scoped to one request rather than
/// to one template: the active theme, the globals (`g.*`, such as the
/// logged in user or the locale) and the helpers (`h.*`).
///
/// The same environment reaches every template of a page, snippets
/// included; no template can modify it.
#[derive(Clone)]
pub struct RenderEnv {
    theme: Option<String>,
    globals: Value,
    helpers: Arc<dyn Helpers>,
}

impl RenderEnv {
    pub fn new() -> Self {
        RenderEnv {
            theme: None,
            globals: Value::Map(BTreeMap::new()),
            helpers: Arc::new(DefaultHelpers),
        }
    }

    /// Use the theme `name` instead of only the default templates.
    pub fn theme(mut self, name: impl Into<String>) -> Self {
        self.theme = Some(name.into());
        self
    }

    pub fn maybe_theme(mut self, name: Option<String>) -> Self {
        self.theme = name;
        self
    }

    pub fn globals(mut self, globals: Context) -> Self {
        self.globals = Value::Map(globals.vars);
        self
    }

    pub fn global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Map(ref mut map) = self.globals {
            map.insert(name.into(), value.into());
        }
        self
    }

    pub fn helpers(mut self, helpers: Arc<dyn Helpers>) -> Self {
        self.helpers = helpers;
        self
    }

    pub fn active_theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub(crate) fn global_value(&self) -> &Value {
        &self.globals
    }

    pub(crate) fn helper_impl(&self) -> &dyn Helpers {
        self.helpers.as_ref()
    }
}

impl Default for RenderEnv {
    fn default() -> Self {
        RenderEnv::new()
    }
}

impl fmt::Debug for RenderEnv {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        out.debug_struct("RenderEnv")
            .field("theme", &self.theme)
            .field("globals", &self.globals)
            .finish_non_exhaustive()
    }
}
