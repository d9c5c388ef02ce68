//! Where template sources are read from.
//!
//! A template root is anything implementing [`TemplateSource`]: a
//! directory on disk, or an in-memory map of templates for tests and
//! for templates bundled into a binary.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A root that template sources can be loaded from.
pub trait TemplateSource: fmt::Debug + Send + Sync {
    /// Load the source of the template at the logical `path`.
    ///
    /// A template that does not exist in this root is `Ok(None)`;
    /// errors are for templates that exist but can't be read.
    fn load(&self, path: &str) -> io::Result<Option<String>>;

    /// Describe this root for error messages.
    fn describe(&self) -> String;
}

/// Templates in a directory, with logical paths relative to it.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file system path of the template at logical `path`.
    pub fn file_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl TemplateSource for DirSource {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        let file = self.file_path(path);
        // A directory, or a file where a parent directory is expected,
        // means there is no such template in this root.
        if !file.is_file() {
            return Ok(None);
        }
        match fs::read_to_string(file) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Templates held in memory, keyed by logical path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        MemorySource {
            name: name.into(),
            templates: HashMap::new(),
        }
    }

    /// Add (or replace) the template at `path`.
    pub fn add(
        &mut self,
        path: impl Into<String>,
        source: impl Into<String>,
    ) -> &mut Self {
        self.templates.insert(path.into(), source.into());
        self
    }

    pub fn with_templates(
        name: impl Into<String>,
        templates: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut source = MemorySource::new(name);
        for (path, template) in templates {
            source.add(path, template);
        }
        source
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.templates.get(path).cloned())
    }

    fn describe(&self) -> String {
        format!("<{}>", self.name)
    }
}
