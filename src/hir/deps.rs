//! Module dependency report.
//!
//! One line per import semantic pass, consumed by external build tools:
//!
//! ```text
//! app.main (src\(x\)/main.d) : private static : std.stdio (/usr/include/std/stdio.d) : out=stdout,writefln
//! ```
//!
//! Field order and separators are a compatibility surface and must not
//! change. Paths escape `(`, `)` and `\` with a leading backslash.

use std::borrow::Cow;
use std::fmt;

use smol_str::SmolStr;

use crate::syntax::Protection;

/// Placeholder for the target path when the import did not resolve.
pub const UNRESOLVED_PATH: &str = "???";

/// Escape `(`, `)` and `\` by prefixing a backslash.
pub fn escape_path(path: &str) -> Cow<'_, str> {
    if !path.contains(['(', ')', '\\']) {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len() + 4);
    for c in path.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Everything one dependency line is made of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyRecord {
    pub importer: SmolStr,
    pub importer_path: SmolStr,
    /// The *scope's* declared protection, not the import's resolved one.
    pub scope_protection: Protection,
    pub is_static: bool,
    pub packages: Vec<SmolStr>,
    pub id: SmolStr,
    /// `None` when the target module could not be resolved.
    pub target_path: Option<SmolStr>,
    pub alias: Option<SmolStr>,
    /// Bind-list entries as `(name, alias)`.
    pub bindings: Vec<(SmolStr, Option<SmolStr>)>,
}

impl fmt::Display for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) : {}",
            self.importer,
            escape_path(&self.importer_path),
            self.scope_protection.keyword()
        )?;
        if self.is_static {
            f.write_str(" static")?;
        }
        f.write_str(" : ")?;
        for package in &self.packages {
            write!(f, "{package}.")?;
        }
        let target = match &self.target_path {
            Some(path) => escape_path(path),
            None => Cow::Borrowed(UNRESOLVED_PATH),
        };
        write!(f, "{} ({})", self.id, target)?;

        if let Some(alias) = &self.alias {
            write!(f, " -> {alias}")?;
        } else if !self.bindings.is_empty() {
            f.write_str(" : ")?;
            for (i, (name, alias)) in self.bindings.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                match alias {
                    Some(alias) => write!(f, "{alias}={name}")?,
                    None => f.write_str(name)?,
                }
            }
        }
        Ok(())
    }
}

/// Report buffer for one compilation request.
///
/// Only exists when dependency reporting is enabled; the session owns it and
/// hands the text back when the compilation finishes.
#[derive(Clone, Debug, Default)]
pub struct DepsReport {
    buf: String,
    lines: usize,
}

impl DepsReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record followed by a newline.
    pub fn push(&mut self, record: &DependencyRecord) {
        use std::fmt::Write as _;
        // Writing into a String cannot fail.
        let _ = writeln!(self.buf, "{record}");
        self.lines += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DependencyRecord {
        DependencyRecord {
            importer: "pkg.A".into(),
            importer_path: "a.d".into(),
            scope_protection: Protection::Public,
            is_static: true,
            packages: vec!["b".into()],
            id: "C".into(),
            target_path: None,
            alias: None,
            bindings: Vec::new(),
        }
    }

    #[test]
    fn test_escape_path() {
        assert_eq!(escape_path("plain/path.d"), "plain/path.d");
        assert!(matches!(escape_path("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_path(r"C:\src\(x).d"), r"C:\\src\\\(x\).d");
    }

    #[test]
    fn test_unresolved_static_public() {
        assert_eq!(record().to_string(), "pkg.A (a.d) : public static : b.C (???)");
    }

    #[test]
    fn test_resolved_path_is_escaped() {
        let mut rec = record();
        rec.target_path = Some("lib/b(1)/C.d".into());
        assert_eq!(
            rec.to_string(),
            r"pkg.A (a.d) : public static : b.C (lib/b\(1\)/C.d)"
        );
    }

    #[test]
    fn test_default_protection_leaves_empty_word() {
        let mut rec = record();
        rec.scope_protection = Protection::Default;
        rec.is_static = false;
        assert_eq!(rec.to_string(), "pkg.A (a.d) :  : b.C (???)");
    }

    #[test]
    fn test_alias_suffix() {
        let mut rec = record();
        rec.is_static = false;
        rec.alias = Some("c".into());
        assert_eq!(rec.to_string(), "pkg.A (a.d) : public : b.C (???) -> c");
    }

    #[test]
    fn test_bind_list_suffix() {
        let mut rec = record();
        rec.is_static = false;
        rec.scope_protection = Protection::Private;
        rec.bindings = vec![("f".into(), None), ("g".into(), Some("h".into()))];
        assert_eq!(rec.to_string(), "pkg.A (a.d) : private : b.C (???) : f,h=g");
    }

    #[test]
    fn test_report_appends_lines() {
        let mut report = DepsReport::new();
        report.push(&record());
        report.push(&record());
        assert_eq!(report.line_count(), 2);
        assert_eq!(
            report.into_string(),
            "pkg.A (a.d) : public static : b.C (???)\npkg.A (a.d) : public static : b.C (???)\n"
        );
    }
}
