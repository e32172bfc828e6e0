//! Game catalog discovery: one metadata file per game directory.

use crate::log_debug;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Raw metadata as written next to each game.
#[derive(Debug, Deserialize)]
struct GameMeta {
    name: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    thumbnail_path: Option<PathBuf>,
    executable_path: PathBuf,
}

/// One launchable program. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub author: String,
    pub release_date: Option<String>,
    pub thumbnail_path: Option<PathBuf>,
    pub executable_path: PathBuf,
    /// Directory holding the metadata file; the game runs from here.
    pub game_dir: PathBuf,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, executable_path: impl Into<PathBuf>) -> Self {
        let executable_path = executable_path.into();
        let game_dir = executable_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            name: name.into(),
            author: String::new(),
            release_date: None,
            thumbnail_path: None,
            executable_path,
            game_dir,
        }
    }

    pub fn caption(&self) -> String {
        if self.author.is_empty() {
            self.name.clone()
        } else {
            format!("{} by {}", self.name, self.author)
        }
    }
}

/// Raised when a catalog would hold no entries; the launcher cannot browse nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyCatalogError;

impl fmt::Display for EmptyCatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game catalog is empty; nothing to launch")
    }
}

impl std::error::Error for EmptyCatalogError {}

/// Non-empty, ordered list of games.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, EmptyCatalogError> {
        if entries.is_empty() {
            return Err(EmptyCatalogError);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

/// Walk `root` (lexical order) and load every `meta_file` found. Returned
/// paths are absolute even when `root` is relative.
///
/// Broken metadata files are logged and skipped so one bad game cannot take the
/// whole cabinet down. A missing root is an error.
pub fn load_catalog(root: &Path, meta_file: &str) -> Result<Vec<CatalogEntry>> {
    if !root.is_dir() {
        bail!("games root {} is not a directory", root.display());
    }
    // Children are spawned from their game directory, so every path handed to
    // the supervisor must survive the chdir.
    let root = fs::canonicalize(root)
        .with_context(|| format!("could not resolve games root {}", root.display()))?;
    let mut entries = Vec::new();
    for item in WalkDir::new(&root).sort_by_file_name() {
        let item = match item {
            Ok(item) => item,
            Err(err) => {
                log_debug(&format!("skipping unreadable catalog path: {err}"));
                continue;
            }
        };
        if !item.file_type().is_file() || item.file_name() != meta_file {
            continue;
        }
        match load_entry(item.path()) {
            Ok(entry) => {
                log_debug(&format!(
                    "found game '{}' at {}",
                    entry.name,
                    item.path().display()
                ));
                entries.push(entry);
            }
            Err(err) => {
                log_debug(&format!("could not load {}: {err:#}", item.path().display()));
                tracing::warn!(
                    path = %item.path().display(),
                    error = %format!("{err:#}"),
                    "skipping game metadata"
                );
            }
        }
    }
    Ok(entries)
}

fn load_entry(meta_path: &Path) -> Result<CatalogEntry> {
    let bytes =
        fs::read(meta_path).with_context(|| format!("could not read {}", meta_path.display()))?;
    let meta: GameMeta = serde_json::from_slice(&bytes)
        .with_context(|| format!("could not parse {}", meta_path.display()))?;
    if meta.executable_path.as_os_str().is_empty() {
        bail!("executable_path is empty");
    }
    let game_dir = meta_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(CatalogEntry {
        name: meta.name,
        author: meta.author,
        release_date: meta.release_date,
        thumbnail_path: meta.thumbnail_path.map(|p| resolve_in(&game_dir, p)),
        executable_path: resolve_in(&game_dir, meta.executable_path),
        game_dir,
    })
}

fn resolve_in(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}
