//! Provider switches.

use std::path::{Path, PathBuf};

/// Extensions and lookup behaviour of a [`JsonProvider`](crate::JsonProvider).
///
/// [`JsonOptions::default`] turns every extension on and renders missing
/// values as empty; [`JsonOptions::none`] is plain mustache.
///
/// ```rust
/// use stache_json::JsonOptions;
///
/// let options = JsonOptions::none()
///     .equal(true)
///     .error_undefined(true)
///     .partial_dir("templates/partials");
/// assert!(options.equal && !options.compare);
/// assert_eq!(options.partial_dirs().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    /// Names starting with `/` are JSON pointers.
    pub json_pointer: bool,
    /// `{{#*}}` and `{{#key.*}}` iterate object members, `{{*}}` is the key.
    pub object_iter: bool,
    /// `{{#key=value}}` and `{{#key=!value}}` sections.
    pub equal: bool,
    /// `{{#key>value}}`, `>=`, `<` and `<=` sections.
    pub compare: bool,
    /// Look partials up in the data before the partial directories.
    pub partial_data_first: bool,
    /// Missing values and partials are errors instead of empty text.
    pub error_undefined: bool,
    partial_dirs: Vec<PathBuf>,
}

impl JsonOptions {
    /// Every extension disabled.
    pub fn none() -> Self {
        Self {
            json_pointer: false,
            object_iter: false,
            equal: false,
            compare: false,
            partial_data_first: false,
            error_undefined: false,
            partial_dirs: Vec::new(),
        }
    }

    pub fn json_pointer(mut self, enabled: bool) -> Self {
        self.json_pointer = enabled;
        self
    }

    pub fn object_iter(mut self, enabled: bool) -> Self {
        self.object_iter = enabled;
        self
    }

    pub fn equal(mut self, enabled: bool) -> Self {
        self.equal = enabled;
        self
    }

    pub fn compare(mut self, enabled: bool) -> Self {
        self.compare = enabled;
        self
    }

    pub fn partial_data_first(mut self, enabled: bool) -> Self {
        self.partial_data_first = enabled;
        self
    }

    pub fn error_undefined(mut self, enabled: bool) -> Self {
        self.error_undefined = enabled;
        self
    }

    /// Adds a directory searched for `<name>.mustache` and `<name>` files.
    /// Directories are searched in the order they were added.
    pub fn partial_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.partial_dirs.push(dir.into());
        self
    }

    pub fn partial_dirs(&self) -> &[PathBuf] {
        &self.partial_dirs
    }

    /// Candidate files for the partial `name`, in lookup order.
    pub(crate) fn partial_candidates<'s>(&'s self, name: &'s str) -> impl Iterator<Item = PathBuf> + 's {
        self.partial_dirs.iter().flat_map(move |dir| candidates(dir, name))
    }
}

fn candidates(dir: &Path, name: &str) -> [PathBuf; 2] {
    [dir.join(format!("{}.mustache", name)), dir.join(name)]
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            json_pointer: true,
            object_iter: true,
            equal: true,
            compare: true,
            partial_data_first: true,
            error_undefined: false,
            partial_dirs: Vec::new(),
        }
    }
}
