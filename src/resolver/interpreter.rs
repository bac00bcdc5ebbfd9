use super::{LibraryRootProvider, ModuleResolver, ResolveError};
use crate::config::{ProbeMode, PythonSettings};
use crate::error::{Result, ScanError};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const STDLIB_SCRIPT: &str = "import sysconfig; print(sysconfig.get_paths()['stdlib'])";

const FIND_SCRIPT: &str = "\
import importlib.util, sys
try:
    spec = importlib.util.find_spec(sys.argv[1])
except Exception as exc:
    sys.stderr.write('%s: %s\\n' % (type(exc).__name__, exc))
    sys.exit(1)
sys.exit(0 if spec is not None else 2)
";

const IMPORT_SCRIPT: &str = "import importlib, sys; importlib.import_module(sys.argv[1])";

const KEYWORDS_SCRIPT: &str = "import keyword; print('\\n'.join(keyword.kwlist))";

const BUILTINS_SCRIPT: &str = "import builtins; print('\\n'.join(dir(builtins)))";

/// A Python interpreter used as the host environment.
///
/// Every query spawns the interpreter once with `-B` so that probing never
/// writes bytecode caches into the scanned tree.
#[derive(Debug, Clone)]
pub struct Interpreter {
    program: String,
    probe: ProbeMode,
    search_path: Option<PathBuf>,
    import_denylist: Vec<String>,
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            probe: ProbeMode::Find,
            search_path: None,
            import_denylist: Vec::new(),
        }
    }

    pub fn from_settings(settings: &PythonSettings) -> Self {
        Self::new(settings.interpreter.clone())
            .with_probe(settings.probe)
            .with_import_denylist(settings.import_denylist.iter().cloned())
    }

    pub fn with_probe(mut self, probe: ProbeMode) -> Self {
        self.probe = probe;
        self
    }

    /// Exports `path` as `PYTHONPATH` so modules under a custom root resolve.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Names that import mode locates instead of executing.
    pub fn with_import_denylist<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.import_denylist = names.into_iter().collect();
        self
    }

    fn command(&self, script: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-B").arg("-c").arg(script);
        if let Some(path) = &self.search_path {
            cmd.env("PYTHONPATH", path);
        }
        cmd
    }

    /// Runs `script` and returns its stdout, failing on a non-zero exit.
    fn query(&self, script: &str) -> Result<String> {
        let output = self
            .command(script)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ScanError::Interpreter {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ScanError::InterpreterFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: last_line(&output.stderr),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ScanError::NotUtf8(self.program.clone()))
    }

    fn query_lines(&self, script: &str) -> Result<Vec<String>> {
        Ok(self
            .query(script)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// The language's reserved keywords.
    pub fn keywords(&self) -> Result<Vec<String>> {
        self.query_lines(KEYWORDS_SCRIPT)
    }

    /// Names exposed by the builtins module.
    pub fn builtins(&self) -> Result<Vec<String>> {
        self.query_lines(BUILTINS_SCRIPT)
    }

    fn executes(&self, name: &str) -> bool {
        self.probe == ProbeMode::Import && !self.import_denylist.iter().any(|n| n == name)
    }

    fn probe(&self, name: &str) -> std::io::Result<Output> {
        let script = if self.executes(name) { IMPORT_SCRIPT } else { FIND_SCRIPT };
        // Imported modules may print; only stderr matters here
        self.command(script)
            .arg(name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
    }
}

impl LibraryRootProvider for Interpreter {
    fn library_root(&self) -> Result<PathBuf> {
        let stdout = self.query(STDLIB_SCRIPT)?;
        let root = PathBuf::from(stdout.trim());
        if !root.is_dir() {
            return Err(ScanError::RootMissing(root));
        }
        Ok(root)
    }
}

impl ModuleResolver for Interpreter {
    fn resolve(&self, name: &str) -> std::result::Result<(), ResolveError> {
        let output = self.probe(name).map_err(|e| ResolveError::Failed {
            name: name.to_string(),
            reason: format!("could not run {}: {}", self.program, e),
        })?;

        if output.status.success() {
            return Ok(());
        }

        let reason = last_line(&output.stderr);
        if reason.is_empty() || output.status.code() == Some(2) {
            Err(ResolveError::NotFound(name.to_string()))
        } else {
            Err(ResolveError::Failed {
                name: name.to_string(),
                reason,
            })
        }
    }
}

fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}
