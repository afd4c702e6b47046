//! Foundation types for the modlink front end.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Interned module source identifiers
//! - [`Loc`], [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Name`], [`Interner`] - Identifier interning
//!
//! This module has NO dependencies on other modlink modules.

mod file_id;
mod intern;
mod span;

pub use file_id::FileId;
pub use intern::{Interner, Name};
pub use span::{LineCol, LineIndex, Loc, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
