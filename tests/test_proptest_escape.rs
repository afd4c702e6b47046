//! Property tests for dependency-report path escaping.
#![cfg(feature = "proptest")]

use modlink::hir::escape_path;
use proptest::prelude::*;

/// Undo `escape_path`: drop the backslash in front of every escaped char.
fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn arb_path() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./()\\\\ ]{0,40}"
}

proptest! {
    #[test]
    fn escape_roundtrips(path in arb_path()) {
        prop_assert_eq!(unescape(&escape_path(&path)), path);
    }

    #[test]
    fn escape_adds_one_char_per_special(path in arb_path()) {
        let specials = path.chars().filter(|c| matches!(c, '(' | ')' | '\\')).count();
        prop_assert_eq!(escape_path(&path).len(), path.len() + specials);
    }

    #[test]
    fn plain_paths_are_untouched(path in "[a-zA-Z0-9_./]{0,40}") {
        prop_assert_eq!(escape_path(&path), path.as_str());
    }
}
