//! Finding module sources.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

/// Source text of a module, and where it came from.
#[derive(Clone, Debug)]
pub struct LocatedSource {
    pub path: PathBuf,
    pub text: Arc<str>,
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("no source for module {module} in {searched} import path(s)")]
    NotFound { module: SmolStr, searched: usize },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Maps a module path such as `["std", "stdio"]` to its source.
pub trait SourceLocator {
    fn locate(&self, path: &[SmolStr]) -> Result<LocatedSource, LocateError>;
}

/// Searches import directories in order for `a/b/c.<ext>`.
#[derive(Clone, Debug)]
pub struct FsLocator {
    import_paths: Vec<PathBuf>,
    extension: SmolStr,
}

impl FsLocator {
    pub fn new(import_paths: Vec<PathBuf>, extension: impl Into<SmolStr>) -> Self {
        Self {
            import_paths,
            extension: extension.into(),
        }
    }

    /// Relative file name of a module path: `std/stdio.d`.
    pub fn relative_path(&self, path: &[SmolStr]) -> PathBuf {
        let mut relative: PathBuf = path.iter().map(|segment| segment.as_str()).collect();
        relative.set_extension(self.extension.as_str());
        relative
    }
}

impl SourceLocator for FsLocator {
    fn locate(&self, path: &[SmolStr]) -> Result<LocatedSource, LocateError> {
        let relative = self.relative_path(path);

        for dir in &self.import_paths {
            let candidate = dir.join(&relative);
            if !candidate.is_file() {
                continue;
            }
            tracing::trace!(path = %candidate.display(), "found module source");
            let text = std::fs::read_to_string(&candidate).map_err(|source| LocateError::Read {
                path: candidate.clone(),
                source,
            })?;
            return Ok(LocatedSource {
                path: candidate,
                text: text.into(),
            });
        }

        Err(LocateError::NotFound {
            module: SmolStr::new(path.join(".")),
            searched: self.import_paths.len(),
        })
    }
}

/// In-memory module sources keyed by dotted name.
///
/// Each module gets a virtual path (`std/stdio.d`) so that diagnostics and
/// dependency reports look the same as for files on disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryLocator {
    sources: FxHashMap<SmolStr, LocatedSource>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` as the source of module `dotted`.
    pub fn add(&mut self, dotted: &str, text: impl Into<Arc<str>>) -> &mut Self {
        let mut path: PathBuf = dotted.split('.').collect();
        path.set_extension("d");
        self.sources.insert(
            SmolStr::new(dotted),
            LocatedSource {
                path,
                text: text.into(),
            },
        );
        self
    }

    /// Register `text` under an explicit virtual path.
    pub fn add_with_path(&mut self, dotted: &str, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> &mut Self {
        self.sources.insert(
            SmolStr::new(dotted),
            LocatedSource {
                path: path.into(),
                text: text.into(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceLocator for MemoryLocator {
    fn locate(&self, path: &[SmolStr]) -> Result<LocatedSource, LocateError> {
        let dotted = path.join(".");
        self.sources
            .get(dotted.as_str())
            .cloned()
            .ok_or_else(|| LocateError::NotFound {
                module: SmolStr::new(&dotted),
                searched: 0,
            })
    }
}
