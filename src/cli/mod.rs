use crate::classifier::LibraryClassifier;
use crate::config::{Config, OutputFormat, ProbeMode, DEFAULT_CONFIG_FILE};
use crate::report;
use crate::resolver::{
    FileSystemResolver, FixedRoot, Interpreter, LibraryRootProvider, ModuleResolver,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pylibscan")]
#[command(
    version,
    about = "List the public and hidden top-level modules of a Python standard library",
    long_about = None
)]
pub struct Args {
    /// Library root to scan (default: asked from the interpreter)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Python interpreter used to locate the library and probe names
    #[arg(long, value_name = "BIN", env = "PYLIBSCAN_PYTHON")]
    pub python: Option<String>,

    /// Resolve names from the file system instead of an interpreter
    #[arg(long)]
    pub offline: bool,

    /// How the interpreter checks a name. `find` accepts modules with syntax
    /// errors; `import` rejects them but runs each module's top-level code
    /// (names in `python.import_denylist` are only located)
    #[arg(long, value_enum)]
    pub probe: Option<ProbeMode>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Maximum line width of markdown name blocks
    #[arg(long, value_name = "COLUMNS")]
    pub wrap: Option<usize>,

    /// Configuration file (default: ./pylibscan.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored labels
    #[arg(long)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the language keywords and builtin names
    Keywords,

    /// Write a default configuration file
    Init {
        /// Destination (default: ./pylibscan.toml)
        path: Option<PathBuf>,
    },
}

impl Args {
    /// Log filter implied by `--verbose`/`--quiet`; `RUST_LOG` still wins.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    match &args.command {
        Some(Commands::Init { path }) => {
            let path = path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            init_config(&path)
        }
        Some(Commands::Keywords) => {
            let config = load_config(&args)?;
            show_keywords(&config)
        }
        None => {
            let config = load_config(&args)?;
            scan_library(&args, &config)
        }
    }
}

/// Config file values overridden by command line flags.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::discover(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(root) = &args.root {
        config.scan.root = Some(root.clone());
    }
    if let Some(python) = &args.python {
        config.python.interpreter = python.clone();
    }
    if let Some(probe) = args.probe {
        config.python.probe = probe;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(wrap) = args.wrap {
        config.output.wrap_width = wrap;
    }
    if args.no_color {
        config.output.color = false;
        colored::control::set_override(false);
    }

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn init_config(path: &Path) -> Result<()> {
    Config::default()
        .write_new(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn show_keywords(config: &Config) -> Result<()> {
    let interpreter = Interpreter::from_settings(&config.python);

    let keywords = interpreter
        .keywords()
        .context("Failed to list keywords")?;
    let builtins = interpreter
        .builtins()
        .context("Failed to list builtins")?;

    println!("{}", report::format_keywords(&keywords, &builtins, &config.output)?);
    Ok(())
}

fn scan_library(args: &Args, config: &Config) -> Result<()> {
    let interpreter = Interpreter::from_settings(&config.python);

    let root = match &config.scan.root {
        Some(root) => FixedRoot(root.clone()).library_root(),
        None => interpreter.library_root(),
    }
    .context("Failed to locate the library root")?;

    info!("Library root: {}", root.display());

    let resolver: Box<dyn ModuleResolver> = if args.offline {
        Box::new(FileSystemResolver::new(&root, config))
    } else if config.scan.root.is_some() {
        // A custom root must be visible to the interpreter's import system
        Box::new(interpreter.with_search_path(&root))
    } else {
        Box::new(interpreter)
    };

    let classifier = LibraryClassifier::with_config(resolver, config.clone());
    let result = classifier.classify(&root);

    println!("{}", report::format_classification(&result, &config.output)?);
    Ok(())
}
