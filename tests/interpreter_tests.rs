use pylibscan::classifier::{LibraryClassifier, SkipKind};
use pylibscan::config::ProbeMode;
use pylibscan::resolver::{Interpreter, LibraryRootProvider, ModuleResolver, ResolveError};
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// `None` when no `python3` is on the PATH; callers return early.
fn python3() -> Option<Interpreter> {
    let available = Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("python3 not available, skipping");
        return None;
    }
    Some(Interpreter::new("python3"))
}

/// A root holding one module with a syntax error and two valid ones.
fn library_with_broken_module() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("scanmod_broken.py"), "def (:\n").unwrap();
    fs::write(temp.path().join("scanmod_good.py"), "VALUE = 1\n").unwrap();
    fs::write(temp.path().join("_scanmod_hidden.py"), "VALUE = 2\n").unwrap();
    temp
}

#[test]
fn test_import_mode_drops_module_with_syntax_error() {
    let Some(python) = python3() else { return };
    let temp = library_with_broken_module();
    let resolver = python
        .with_probe(ProbeMode::Import)
        .with_search_path(temp.path());
    let classifier = LibraryClassifier::new(resolver);

    let result = classifier.classify(temp.path());

    assert!(!result.contains("scanmod_broken"));
    assert_eq!(result.public.iter().collect::<Vec<_>>(), vec!["scanmod_good"]);
    assert_eq!(result.hidden.iter().collect::<Vec<_>>(), vec!["_scanmod_hidden"]);
    assert_eq!(result.stats.skipped.get(&SkipKind::NotImportable), Some(&1));
}

#[test]
fn test_find_mode_only_locates_modules() {
    let Some(python) = python3() else { return };
    let temp = library_with_broken_module();
    let resolver = python.with_search_path(temp.path());
    let classifier = LibraryClassifier::new(resolver);

    let result = classifier.classify(temp.path());

    // Locating never compiles the source, so the broken module is kept
    assert!(result.public.contains("scanmod_broken"));
    assert!(result.public.contains("scanmod_good"));
}

#[test]
fn test_import_failure_carries_last_stderr_line() {
    let Some(python) = python3() else { return };
    let temp = library_with_broken_module();
    let resolver = python
        .with_probe(ProbeMode::Import)
        .with_search_path(temp.path());

    match resolver.resolve("scanmod_broken") {
        Err(ResolveError::Failed { name, reason }) => {
            assert_eq!(name, "scanmod_broken");
            assert!(reason.contains("SyntaxError"), "unexpected reason: {}", reason);
        }
        other => panic!("expected import failure, got {:?}", other),
    }
}

#[test]
fn test_denylisted_module_is_located_not_imported() {
    let Some(python) = python3() else { return };
    let temp = library_with_broken_module();
    let resolver = python
        .with_probe(ProbeMode::Import)
        .with_import_denylist(vec!["scanmod_broken".to_string()])
        .with_search_path(temp.path());

    assert_eq!(resolver.resolve("scanmod_broken"), Ok(()));
}

#[test]
fn test_resolve_standard_and_missing_modules() {
    let Some(python) = python3() else { return };

    for mode in [ProbeMode::Find, ProbeMode::Import] {
        let resolver = python.clone().with_probe(mode);
        assert_eq!(resolver.resolve("os"), Ok(()), "os should resolve in {:?} mode", mode);
    }

    assert_eq!(
        python.resolve("no_such_mod_xyz"),
        Err(ResolveError::NotFound("no_such_mod_xyz".to_string()))
    );
}

#[test]
fn test_keywords_and_builtins() {
    let Some(python) = python3() else { return };

    let keywords = python.keywords().unwrap();
    assert!(keywords.iter().any(|k| k == "def"));
    assert!(keywords.iter().any(|k| k == "False"));
    assert!(keywords.iter().all(|k| !k.is_empty() && k.trim() == k));

    let builtins = python.builtins().unwrap();
    assert!(builtins.iter().any(|b| b == "print"));
    assert!(builtins.iter().any(|b| b == "__import__"));
}

#[test]
fn test_library_root_is_the_stdlib_directory() {
    let Some(python) = python3() else { return };

    let root = python.library_root().unwrap();

    assert!(root.is_dir());
    assert!(root.join("os.py").is_file(), "{} has no os.py", root.display());
}
