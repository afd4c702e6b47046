//! Project configuration and source discovery.

mod locator;
mod options;

pub use locator::{FsLocator, LocateError, LocatedSource, MemoryLocator, SourceLocator};
pub use options::CompileOptions;
