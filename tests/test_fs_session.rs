//! Sessions reading modules from disk.

use std::fs;
use std::path::Path;

use modlink::hir::{ResolveResult, Session, codes};
use modlink::project::CompileOptions;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

#[test]
fn test_compiles_from_import_paths() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/main.d", "module app.main;\nimport util.strings : join;\n");
    write(dir.path(), "util/strings.d", "module util.strings;\nfn join;\n");

    let options = CompileOptions::new().import_path(dir.path()).module_deps(true);
    let mut session = Session::with_fs_locator(options);
    let main = session.add_root("app.main").unwrap();
    session.analyze();

    assert!(matches!(session.lookup(main, "join"), ResolveResult::Found(_)));

    let output = session.finish().unwrap();
    let expected = format!(
        "app.main ({}) : public : util.strings ({}) : join\n",
        dir.path().join("app/main.d").display(),
        dir.path().join("util/strings.d").display(),
    );
    assert_eq!(output.deps.as_deref(), Some(expected.as_str()));
}

#[test]
fn test_later_import_path_is_searched() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write(first.path(), "app.d", "import lib;\n");
    write(second.path(), "lib.d", "fn f;\n");

    let options = CompileOptions::new().import_paths([first.path(), second.path()]);
    let mut session = Session::with_fs_locator(options);
    let app = session.add_root("app").unwrap();
    session.analyze();

    assert!(session.lookup(app, "f").is_found());
    let lib = session.module_by_name("lib").unwrap();
    assert_eq!(
        session.registry().module(lib).src_path,
        second.path().join("lib.d").display().to_string()
    );
}

#[test]
fn test_custom_source_extension() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.di", "import lib;\n");
    write(dir.path(), "lib.di", "");
    write(dir.path(), "lib.d", "this does not parse");

    let options = CompileOptions::new().import_path(dir.path()).source_extension("di");
    let mut session = Session::with_fs_locator(options);
    session.add_root("app").unwrap();
    session.analyze();

    assert!(session.finish().is_ok());
}

#[test]
fn test_missing_file_fails_the_compilation() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app.d", "import std.stdio;\n");

    let options = CompileOptions::new().import_path(dir.path());
    let mut session = Session::with_fs_locator(options);
    session.add_root("app").unwrap();
    session.analyze();

    let failed = session.finish().unwrap_err();
    assert_eq!(failed.error_count(), 1);
    assert_eq!(failed.diagnostics[0].code.as_deref(), Some(codes::UNRESOLVED_MODULE));
    assert_eq!(&*failed.diagnostics[0].message, "module std.stdio cannot be found");
}
