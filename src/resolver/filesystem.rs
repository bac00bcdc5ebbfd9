use super::{ModuleResolver, ResolveError};
use crate::config::{Config, ExtensionRule};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves names by looking at the library root directly, without an
/// interpreter.
///
/// A name is importable when the root holds a source module `name<suffix>`,
/// a directory `name/` (regular or namespace package), or an extension module
/// `name.<tag><suffix>` inside a directory accepted by the extension rule.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
    source_suffix: String,
    extensions: ExtensionRule,
    extension_dirs: Vec<PathBuf>,
}

impl FileSystemResolver {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        let extension_dirs = find_extension_dirs(&root, &config.extensions);
        Self {
            root,
            source_suffix: config.scan.source_suffix.clone(),
            extensions: config.extensions.clone(),
            extension_dirs,
        }
    }

    fn has_source_module(&self, name: &str) -> bool {
        self.root
            .join(format!("{}{}", name, self.source_suffix))
            .is_file()
    }

    fn has_package(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }

    fn has_extension_module(&self, name: &str) -> bool {
        self.extension_dirs.iter().any(|dir| {
            let Ok(entries) = fs::read_dir(dir) else {
                return false;
            };
            entries.flatten().any(|entry| {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else {
                    return false;
                };
                self.extensions
                    .strip_suffix(file_name)
                    .and_then(|stem| stem.split('.').next())
                    .map_or(false, |stem| stem == name)
            })
        })
    }
}

impl ModuleResolver for FileSystemResolver {
    fn resolve(&self, name: &str) -> Result<(), ResolveError> {
        if self.has_source_module(name)
            || self.has_package(name)
            || self.has_extension_module(name)
        {
            Ok(())
        } else {
            Err(ResolveError::NotFound(name.to_string()))
        }
    }
}

/// Direct children of `root` (and `root` itself) accepted by the extension rule.
fn find_extension_dirs(root: &Path, rule: &ExtensionRule) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    let root_name = root.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if rule.accepts_parent(root_name) {
        dirs.push(root.to_path_buf());
    }

    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            let accepted = path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| rule.accepts_parent(n));
            if accepted {
                dirs.push(path);
            }
        }
    }

    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_each_module_kind() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("os.py"), "").unwrap();
        fs::create_dir_all(root.join("json")).unwrap();
        fs::write(root.join("json/__init__.py"), "").unwrap();
        fs::create_dir_all(root.join("lib-dynload")).unwrap();
        fs::write(root.join("lib-dynload/_ssl.cpython-311-x86_64-linux-gnu.so"), "").unwrap();

        let resolver = FileSystemResolver::new(root, &Config::default());

        assert!(resolver.resolve("os").is_ok());
        assert!(resolver.resolve("json").is_ok());
        assert!(resolver.resolve("_ssl").is_ok());
        assert_eq!(
            resolver.resolve("_ss"),
            Err(ResolveError::NotFound("_ss".to_string()))
        );
        assert!(resolver.resolve("missing").is_err());
    }
}
