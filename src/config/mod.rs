use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "pylibscan.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSettings,
    pub extensions: ExtensionRule,
    pub python: PythonSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Library root; when unset the interpreter is asked for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Directory names marking third-party add-on packages
    pub sentinels: Vec<String>,
    /// File whose presence turns a directory into a package
    pub package_marker: String,
    /// Suffix of pure source modules
    pub source_suffix: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            root: None,
            sentinels: vec!["site-packages".to_string()],
            package_marker: "__init__.py".to_string(),
            source_suffix: ".py".to_string(),
        }
    }
}

/// Decides which files count as compiled extension modules.
///
/// A file qualifies when its name ends with one of `suffixes` and its
/// immediate parent directory is named in `parent_dirs`. The entry `"*"`
/// accepts any parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionRule {
    pub parent_dirs: Vec<String>,
    pub suffixes: Vec<String>,
}

impl Default for ExtensionRule {
    fn default() -> Self {
        Self {
            parent_dirs: vec!["lib-dynload".to_string()],
            suffixes: vec![".so".to_string()],
        }
    }
}

impl ExtensionRule {
    pub fn accepts_parent(&self, parent: &str) -> bool {
        self.parent_dirs.iter().any(|d| d == "*" || d == parent)
    }

    /// Returns the file name with the matching suffix removed.
    pub fn strip_suffix<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.suffixes
            .iter()
            .find_map(|suffix| file_name.strip_suffix(suffix.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// Locate the module without executing it; broken sources still count
    Find,
    /// Import the module, rejecting anything that raises. Runs each module's
    /// top-level code except for names on the import deny-list
    Import,
}

impl Default for ProbeMode {
    fn default() -> Self {
        ProbeMode::Find
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonSettings {
    pub interpreter: String,
    pub probe: ProbeMode,
    /// Modules whose top-level code has side effects; import mode only
    /// locates them
    pub import_denylist: Vec<String>,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            probe: ProbeMode::Find,
            import_denylist: vec!["antigravity".to_string(), "this".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Text,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Markdown
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub wrap_width: usize,
    pub color: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            wrap_width: 80,
            color: true,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Loads `explicit` when given, otherwise `pylibscan.toml` from the
    /// working directory if present, otherwise the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            log::debug!("Using configuration from {}", local.display());
            return Self::load(local);
        }

        Ok(Self::default())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the configuration to `path`, never replacing an existing file.
    pub fn write_new(&self, path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ScanError::ConfigExists(path.to_path_buf()));
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ScanError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
[scan]
sentinels = ["dist-packages", "site-packages"]

[python]
probe = "import"
"#,
        )
        .unwrap();

        assert_eq!(config.scan.sentinels, vec!["dist-packages", "site-packages"]);
        assert_eq!(config.scan.package_marker, "__init__.py");
        assert_eq!(config.python.probe, ProbeMode::Import);
        assert_eq!(config.python.interpreter, "python3");
        assert_eq!(config.python.import_denylist, vec!["antigravity", "this"]);
        assert_eq!(config.extensions, ExtensionRule::default());
        assert_eq!(config.output.wrap_width, 80);
    }

    #[test]
    fn test_extension_rule() {
        let rule = ExtensionRule::default();
        assert!(rule.accepts_parent("lib-dynload"));
        assert!(!rule.accepts_parent("encodings"));
        assert_eq!(
            rule.strip_suffix("_ssl.cpython-311-x86_64-linux-gnu.so"),
            Some("_ssl.cpython-311-x86_64-linux-gnu")
        );
        assert_eq!(rule.strip_suffix("README.txt"), None);

        let any = ExtensionRule {
            parent_dirs: vec!["*".to_string()],
            suffixes: vec![".so".to_string(), ".pyd".to_string()],
        };
        assert!(any.accepts_parent("DLLs"));
        assert_eq!(any.strip_suffix("_ctypes.pyd"), Some("_ctypes"));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("lib-dynload"));
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
