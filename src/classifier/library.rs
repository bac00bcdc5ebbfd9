use super::candidate::{derive_candidate, CandidateName, SkipKind, Skipped};
use crate::config::Config;
use crate::error::Result;
use crate::resolver::{LibraryRootProvider, ModuleResolver, ResolveError};
use log::{debug, info};
use serde::Serialize;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Counters collected during one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub files: usize,
    pub candidates: usize,
    pub probes: usize,
    pub skipped: BTreeMap<SkipKind, usize>,
}

impl ScanStats {
    fn record_skip(&mut self, path: &Path, skipped: &Skipped) {
        debug!("Skipping {}: {}", path.display(), skipped);
        *self.skipped.entry(skipped.kind()).or_insert(0) += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Importable top-level names split by visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub public: BTreeSet<String>,
    pub hidden: BTreeSet<String>,
    pub stats: ScanStats,
}

impl Classification {
    fn insert(&mut self, name: CandidateName) {
        if name.is_hidden() {
            self.hidden.insert(name.into_string());
        } else {
            self.public.insert(name.into_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.public.contains(name) || self.hidden.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.hidden.is_empty()
    }
}

/// Walks a library root and keeps every derived name the resolver accepts.
pub struct LibraryClassifier<R> {
    resolver: R,
    config: Config,
}

impl<R: ModuleResolver> LibraryClassifier<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, Config::default())
    }

    pub fn with_config(resolver: R, config: Config) -> Self {
        Self { resolver, config }
    }

    /// Asks `provider` for the root, then classifies it.
    pub fn scan<P: LibraryRootProvider + ?Sized>(&self, provider: &P) -> Result<Classification> {
        let root = provider.library_root()?;
        Ok(self.classify(&root))
    }

    /// Classifies every file below `root`.
    ///
    /// Never fails: unreadable entries, unrecognized files and rejected names
    /// are counted in the stats and otherwise ignored. Sentinel directories
    /// are pruned from the walk and counted once each.
    pub fn classify(&self, root: &Path) -> Classification {
        let mut result = Classification::default();
        // Each distinct name is probed once per scan
        let mut verdicts: HashMap<CandidateName, std::result::Result<(), ResolveError>> =
            HashMap::new();
        let pruned = Cell::new(0usize);

        let root_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");

        info!("Scanning library root {}", root.display());

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() > 0 && self.is_sentinel_dir(entry) {
                    debug!("Pruning packaging cache {}", entry.path().display());
                    pruned.set(pruned.get() + 1);
                    return false;
                }
                true
            });

        for item in walker {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    result.stats.record_skip(&path, &Skipped::Unreadable(e.to_string()));
                    continue;
                }
            };

            if !is_file(&entry) {
                continue;
            }
            result.stats.files += 1;

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let candidate = match derive_candidate(relative, root_name, &self.config) {
                Ok(candidate) => candidate,
                Err(skipped) => {
                    result.stats.record_skip(relative, &skipped);
                    continue;
                }
            };
            result.stats.candidates += 1;

            let verdict = match verdicts.get(&candidate) {
                Some(known) => known.clone(),
                None => {
                    result.stats.probes += 1;
                    let verdict = self.resolver.resolve(candidate.as_str());
                    verdicts.insert(candidate.clone(), verdict.clone());
                    verdict
                }
            };

            match verdict {
                Ok(()) => result.insert(candidate),
                Err(e) => result.stats.record_skip(relative, &Skipped::NotImportable(e)),
            }
        }

        if pruned.get() > 0 {
            *result.stats.skipped.entry(SkipKind::PackagingCache).or_insert(0) += pruned.get();
        }

        info!(
            "Found {} public and {} hidden names in {} files ({} skipped)",
            result.public.len(),
            result.hidden.len(),
            result.stats.files,
            result.stats.skipped_total()
        );

        result
    }

    fn is_sentinel_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map_or(false, |name| self.config.scan.sentinels.iter().any(|s| s == name))
    }
}

fn is_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
