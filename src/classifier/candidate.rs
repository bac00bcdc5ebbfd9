use crate::config::Config;
use crate::resolver::ResolveError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

// Unicode-aware identifier: a letter or underscore followed by word characters
static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\W\d]\w*$").unwrap());

/// A hypothesised top-level importable name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateName(String);

impl CandidateName {
    /// Reduces `raw` to its first path segment and the part before the first
    /// `.`, then checks that what remains can be imported by name.
    pub fn parse(raw: &str) -> Result<Self, Skipped> {
        let segment = raw.split(|c: char| c == '/' || c == '\\').next().unwrap_or("");
        let top = segment.split('.').next().unwrap_or("");

        if top.is_empty() {
            return Err(Skipped::EmptyName);
        }
        if !IDENTIFIER_REGEX.is_match(top) {
            return Err(Skipped::MalformedName(top.to_string()));
        }

        Ok(CandidateName(top.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hidden components start with an underscore.
    pub fn is_hidden(&self) -> bool {
        self.0.starts_with('_')
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a file contributed nothing to the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skipped {
    /// Not a package marker, source module or extension module
    UnrecognizedFile(PathBuf),
    /// Lives below a packaging-cache sentinel directory
    PackagingCache(PathBuf),
    /// Derivation produced nothing, e.g. a marker file at the root
    EmptyName,
    /// Derived text is not a valid module name
    MalformedName(String),
    /// The walk could not read the entry
    Unreadable(String),
    /// The resolver rejected the candidate
    NotImportable(ResolveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    UnrecognizedFile,
    PackagingCache,
    EmptyName,
    MalformedName,
    Unreadable,
    NotImportable,
}

impl Skipped {
    pub fn kind(&self) -> SkipKind {
        match self {
            Skipped::UnrecognizedFile(_) => SkipKind::UnrecognizedFile,
            Skipped::PackagingCache(_) => SkipKind::PackagingCache,
            Skipped::EmptyName => SkipKind::EmptyName,
            Skipped::MalformedName(_) => SkipKind::MalformedName,
            Skipped::Unreadable(_) => SkipKind::Unreadable,
            Skipped::NotImportable(_) => SkipKind::NotImportable,
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skipped::UnrecognizedFile(path) => write!(f, "unrecognized file {}", path.display()),
            Skipped::PackagingCache(path) => {
                write!(f, "inside packaging cache: {}", path.display())
            }
            Skipped::EmptyName => write!(f, "empty candidate name"),
            Skipped::MalformedName(name) => write!(f, "malformed name '{}'", name),
            Skipped::Unreadable(reason) => write!(f, "unreadable entry: {}", reason),
            Skipped::NotImportable(err) => write!(f, "{}", err),
        }
    }
}

/// Derives the candidate name for one file.
///
/// `relative` is the file's path below the library root and `root_name` the
/// root directory's own name, which stands in as the parent of top-level
/// files when the extension rule is consulted.
pub fn derive_candidate(
    relative: &Path,
    root_name: &str,
    config: &Config,
) -> Result<CandidateName, Skipped> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => segments.push(part),
                None => {
                    return Err(Skipped::MalformedName(part.to_string_lossy().into_owned()));
                }
            },
            _ => continue,
        }
    }

    let Some((file_name, dirs)) = segments.split_last() else {
        return Err(Skipped::EmptyName);
    };

    if dirs.iter().any(|d| config.scan.sentinels.iter().any(|s| s.as_str() == *d)) {
        return Err(Skipped::PackagingCache(relative.to_path_buf()));
    }

    let parent = dirs.last().copied().unwrap_or(root_name);

    let raw = if *file_name == config.scan.package_marker {
        // The package is the directory holding the marker
        match dirs.first() {
            Some(dir) => *dir,
            None => return Err(Skipped::EmptyName),
        }
    } else if let Some(stem) = file_name.strip_suffix(config.scan.source_suffix.as_str()) {
        dirs.first().copied().unwrap_or(stem)
    } else if config.extensions.accepts_parent(parent) {
        match config.extensions.strip_suffix(file_name) {
            Some(stem) => stem,
            None => return Err(Skipped::UnrecognizedFile(relative.to_path_buf())),
        }
    } else {
        return Err(Skipped::UnrecognizedFile(relative.to_path_buf()));
    };

    CandidateName::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(path: &str) -> Result<CandidateName, Skipped> {
        derive_candidate(Path::new(path), "python3.11", &Config::default())
    }

    #[test]
    fn test_source_and_package_names() {
        let cases = vec![
            ("os.py", "os"),
            ("json/__init__.py", "json"),
            ("json/decoder.py", "json"),
            ("email/mime/base.py", "email"),
            ("email/mime/__init__.py", "email"),
            ("_collections_abc.py", "_collections_abc"),
            ("lib-dynload/_ssl.cpython-311-x86_64-linux-gnu.so", "_ssl"),
            ("lib-dynload/math.so", "math"),
        ];

        for (path, expected) in cases {
            let name = derive(path).unwrap_or_else(|e| panic!("{} skipped: {}", path, e));
            assert_eq!(name.as_str(), expected, "Path {} should derive {}", path, expected);
        }
    }

    #[test]
    fn test_rejected_files() {
        assert_eq!(
            derive("site-packages/extra.py").unwrap_err().kind(),
            SkipKind::PackagingCache
        );
        assert_eq!(
            derive("encodings/_ssl.so").unwrap_err().kind(),
            SkipKind::UnrecognizedFile
        );
        assert_eq!(
            derive("json/__pycache__/decoder.cpython-311.pyc").unwrap_err().kind(),
            SkipKind::UnrecognizedFile
        );
        assert_eq!(derive("__init__.py").unwrap_err(), Skipped::EmptyName);
        assert_eq!(
            derive("lib2to3-tests/data.py").unwrap_err(),
            Skipped::MalformedName("lib2to3-tests".to_string())
        );
    }

    #[test]
    fn test_extension_rule_at_root_uses_root_name() {
        let name = derive_candidate(Path::new("_json.so"), "lib-dynload", &Config::default()).unwrap();
        assert_eq!(name.as_str(), "_json");
    }

    #[test]
    fn test_parse_collapses_to_top_level() {
        assert_eq!(CandidateName::parse("xml/dom").unwrap().as_str(), "xml");
        assert_eq!(CandidateName::parse("a.b.c").unwrap().as_str(), "a");
        assert!(CandidateName::parse("_thread").unwrap().is_hidden());
        assert!(!CandidateName::parse("thread").unwrap().is_hidden());
        assert_eq!(CandidateName::parse(".hidden"), Err(Skipped::EmptyName));
    }
}
