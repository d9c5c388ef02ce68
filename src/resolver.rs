//! Locating templates in theme and default roots.

use crate::errors::{Error, Result};
use crate::source::TemplateSource;
use crate::template::Template;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

/// Name of the root holding the default templates.
pub const DEFAULT_ROOT: &str = "default";

/// Identity of a concrete template: the root it was found in and its
/// logical path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub root: String,
    pub path: String,
}

impl Display for Origin {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}:{}", self.root, self.path)
    }
}

/// A resolved and parsed template.
#[derive(Debug)]
pub struct Loaded {
    pub origin: Origin,
    pub template: Template,
}

/// An inheritance chain, from the requested template to the base
/// page it (indirectly) extends.
#[derive(Debug, Clone)]
pub struct Chain {
    templates: Vec<Arc<Loaded>>,
}

impl Chain {
    /// The most derived template, the one that was requested.
    pub fn leaf(&self) -> &Loaded {
        &self.templates[0]
    }

    /// The base template, whose body is the page skeleton.
    pub fn root(&self) -> &Loaded {
        &self.templates[self.templates.len() - 1]
    }

    /// Templates ordered from most derived to most base.
    pub fn iter(&self) -> impl Iterator<Item = &Loaded> {
        self.templates.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn origins(&self) -> Vec<&Origin> {
        self.iter().map(|t| &t.origin).collect()
    }
}

struct Root {
    name: String,
    source: Box<dyn TemplateSource>,
}

type CacheKey = (String, Option<String>);

/// Finds templates by logical path, looking in the active theme before
/// the default templates.
///
/// Sources are assumed not to change while the resolver is alive, so
/// parsed templates are cached per path and theme.
pub struct Resolver {
    default: Root,
    themes: BTreeMap<String, Root>,
    cache: RwLock<HashMap<CacheKey, Arc<Loaded>>>,
}

impl Resolver {
    pub fn new(default: impl TemplateSource + 'static) -> Self {
        Resolver {
            default: Root {
                name: DEFAULT_ROOT.into(),
                source: Box::new(default),
            },
            themes: BTreeMap::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Add (or replace) the theme `name`.
    pub fn add_theme(
        &mut self,
        name: impl Into<String>,
        source: impl TemplateSource + 'static,
    ) -> Result<()> {
        let name = name.into();
        if name == DEFAULT_ROOT {
            return Err(Error::ReservedThemeName(name));
        }
        self.themes.insert(
            name.clone(),
            Root {
                name,
                source: Box::new(source),
            },
        );
        self.clear_cache();
        Ok(())
    }

    pub fn themes(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn has_theme(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The roots to search, in order.
    fn roots(&self, theme: Option<&str>) -> Result<Vec<&Root>> {
        let mut roots = Vec::with_capacity(2);
        if let Some(theme) = theme {
            let root = self
                .themes
                .get(theme)
                .ok_or_else(|| Error::UnknownTheme(theme.to_string()))?;
            roots.push(root);
        }
        roots.push(&self.default);
        Ok(roots)
    }

    /// Find the template at logical `path`, in the `theme` root if it
    /// is there, otherwise in the default root.
    pub fn resolve(&self, path: &str, theme: Option<&str>) -> Result<Arc<Loaded>> {
        check_path(path)?;
        let key = (path.to_string(), theme.map(str::to_string));
        if let Some(loaded) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            trace!(path, ?theme, "template cache hit");
            return Ok(loaded.clone());
        }
        let loaded = Arc::new(self.load(path, theme)?);
        // A concurrent render may have loaded the same template; both
        // results are identical, so it does not matter which is kept.
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, loaded.clone());
        Ok(loaded)
    }

    fn load(&self, path: &str, theme: Option<&str>) -> Result<Loaded> {
        let roots = self.roots(theme)?;
        for root in &roots {
            let source = root.source.load(path).map_err(|source| Error::Read {
                root: root.source.describe(),
                path: path.to_string(),
                source,
            })?;
            if let Some(source) = source {
                debug!(path, root = %root.name, "resolved template");
                let template = Template::parse(path, source.as_bytes())?;
                return Ok(Loaded {
                    origin: Origin {
                        root: root.name.clone(),
                        path: path.to_string(),
                    },
                    template,
                });
            }
        }
        debug!(path, ?theme, "template not found");
        Err(Error::TemplateNotFound {
            path: path.to_string(),
            searched: roots.iter().map(|r| r.source.describe()).collect(),
        })
    }

    /// Follow `@extends` from `leaf` up to the base template.
    ///
    /// Each parent is resolved on its own, so a theme can override a
    /// page while leaving its layout at the default, or the other way
    /// around.
    pub fn build_chain(
        &self,
        leaf: Arc<Loaded>,
        theme: Option<&str>,
    ) -> Result<Chain> {
        let mut templates = vec![leaf];
        loop {
            let current = &templates[templates.len() - 1];
            let Some(parent) = current.template.extends() else {
                break;
            };
            let parent = self.resolve(parent, theme)?;
            if templates.iter().any(|t| t.origin == parent.origin) {
                let mut chain: Vec<String> =
                    templates.iter().map(|t| t.origin.to_string()).collect();
                chain.push(parent.origin.to_string());
                return Err(Error::CyclicInheritance { chain });
            }
            templates.push(parent);
        }
        debug!(
            leaf = %templates[0].origin,
            depth = templates.len(),
            "built inheritance chain"
        );
        Ok(Chain { templates })
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        out.debug_struct("Resolver")
            .field("default", &self.default.source)
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Logical paths are relative and slash separated, without `.` or
/// `..` parts, so they can't escape their root.
fn check_path(path: &str) -> Result<()> {
    let valid = !path.is_empty()
        && !path.contains('\\')
        && path
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidPath(path.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::{Origin, Resolver};
    use crate::errors::Error;
    use crate::source::MemorySource;
    use std::sync::Arc;

    fn resolver() -> Resolver {
        let mut resolver = Resolver::new(MemorySource::with_templates(
            "default",
            [
                ("page.html", "<html>@block content {}</html>"),
                ("user/read.html", "@extends(\"page.html\")"),
                ("user/list.html", "@extends(\"page.html\")"),
            ],
        ));
        resolver.add_theme(
            "midnight-blue",
            MemorySource::with_templates(
                "midnight-blue",
                [("page.html", "<html class=\"dark\">@block content {}</html>")],
            ),
        )
        .unwrap();
        resolver
            .add_theme("plain", MemorySource::new("plain"))
            .unwrap();
        resolver
    }

    fn origin(root: &str, path: &str) -> Origin {
        Origin {
            root: root.into(),
            path: path.into(),
        }
    }

    #[test]
    fn theme_can_not_shadow_default_root_name() {
        let mut r = resolver();
        assert!(matches!(
            r.add_theme("default", MemorySource::new("other")),
            Err(Error::ReservedThemeName(_))
        ));
        assert!(!r.has_theme("default"));
    }

    #[test]
    fn default_only_path_resolves_to_default_for_any_theme() {
        let r = resolver();
        for theme in [None, Some("midnight-blue"), Some("plain")] {
            let loaded = r.resolve("user/read.html", theme).unwrap();
            assert_eq!(loaded.origin, origin("default", "user/read.html"));
        }
    }

    #[test]
    fn theme_shadows_default_only_for_that_theme() {
        let r = resolver();
        assert_eq!(
            r.resolve("page.html", Some("midnight-blue")).unwrap().origin,
            origin("midnight-blue", "page.html")
        );
        assert_eq!(
            r.resolve("page.html", Some("plain")).unwrap().origin,
            origin("default", "page.html")
        );
        assert_eq!(
            r.resolve("page.html", None).unwrap().origin,
            origin("default", "page.html")
        );
    }

    #[test]
    fn chain_mixes_roots() {
        let r = resolver();
        let leaf = r.resolve("user/read.html", Some("midnight-blue")).unwrap();
        let chain = r.build_chain(leaf, Some("midnight-blue")).unwrap();
        assert_eq!(
            chain.origins(),
            [
                &origin("default", "user/read.html"),
                &origin("midnight-blue", "page.html"),
            ]
        );
    }

    #[test]
    fn not_found_lists_searched_roots() {
        let r = resolver();
        match r.resolve("group/read.html", Some("midnight-blue")) {
            Err(Error::TemplateNotFound { path, searched }) => {
                assert_eq!(path, "group/read.html");
                assert_eq!(searched, ["<midnight-blue>", "<default>"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_theme() {
        assert!(matches!(
            resolver().resolve("page.html", Some("nope")),
            Err(Error::UnknownTheme(_))
        ));
    }

    #[test]
    fn invalid_paths() {
        let r = resolver();
        for path in ["", "/etc/passwd", "../page.html", "user//read.html", "a/./b"] {
            assert!(
                matches!(r.resolve(path, None), Err(Error::InvalidPath(_))),
                "{path:?}"
            );
        }
    }

    #[test]
    fn resolve_is_cached() {
        let r = resolver();
        let a = r.resolve("page.html", None).unwrap();
        let b = r.resolve("page.html", None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let themed = r.resolve("page.html", Some("midnight-blue")).unwrap();
        assert!(!Arc::ptr_eq(&a, &themed));
    }

    #[test]
    fn self_extension_is_cyclic() {
        let r = Resolver::new(MemorySource::with_templates(
            "default",
            [("a.html", "@extends(\"a.html\")")],
        ));
        let leaf = r.resolve("a.html", None).unwrap();
        match r.build_chain(leaf, None) {
            Err(Error::CyclicInheritance { chain }) => {
                assert_eq!(chain, ["default:a.html", "default:a.html"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mutual_extension_is_cyclic() {
        let r = Resolver::new(MemorySource::with_templates(
            "default",
            [
                ("a.html", "@extends(\"b.html\")"),
                ("b.html", "@extends(\"a.html\")"),
            ],
        ));
        let leaf = r.resolve("a.html", None).unwrap();
        match r.build_chain(leaf, None) {
            Err(Error::CyclicInheritance { chain }) => {
                assert_eq!(
                    chain,
                    ["default:a.html", "default:b.html", "default:a.html"]
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
