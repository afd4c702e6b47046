//! Compilation options.

use std::path::PathBuf;

use smol_str::SmolStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::locator::FsLocator;

/// Options for one compilation request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompileOptions {
    /// Directories searched, in order, for imported modules.
    pub import_paths: Vec<PathBuf>,
    /// Extension of module source files, without the dot.
    pub source_extension: SmolStr,
    /// Produce the module dependency report.
    pub module_deps: bool,
    /// Module imported implicitly by every module; left out of headers.
    pub default_module: SmolStr,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            import_paths: Vec::new(),
            source_extension: SmolStr::new_static("d"),
            module_deps: false,
            default_module: SmolStr::new_static("object"),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.import_paths.push(path.into());
        self
    }

    pub fn import_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.import_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn source_extension(mut self, extension: impl Into<SmolStr>) -> Self {
        self.source_extension = extension.into();
        self
    }

    pub fn module_deps(mut self, enabled: bool) -> Self {
        self.module_deps = enabled;
        self
    }

    pub fn default_module(mut self, name: impl Into<SmolStr>) -> Self {
        self.default_module = name.into();
        self
    }

    /// File-system locator over the configured import paths.
    pub fn fs_locator(&self) -> FsLocator {
        FsLocator::new(self.import_paths.clone(), self.source_extension.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::default();
        assert!(options.import_paths.is_empty());
        assert_eq!(options.source_extension, "d");
        assert!(!options.module_deps);
        assert_eq!(options.default_module, "object");
    }

    #[test]
    fn test_builder() {
        let options = CompileOptions::new()
            .import_path("/usr/include/d")
            .import_paths(["src", "lib"])
            .source_extension("di")
            .module_deps(true)
            .default_module("core.object");

        assert_eq!(
            options.import_paths,
            vec![PathBuf::from("/usr/include/d"), PathBuf::from("src"), PathBuf::from("lib")]
        );
        assert_eq!(options.source_extension, "di");
        assert!(options.module_deps);
        assert_eq!(options.default_module, "core.object");
    }
}
