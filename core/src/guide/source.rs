//! Guide loading
//!
//! Guides are looked up per zone in a single directory:
//! - `<zone>.toml` (preferred)
//! - `<zone>.json`
//!
//! Loaded tables are cached per zone. [`GuideSource::reload`] always drops the
//! cached copy first, so edits on disk take effect on the next zone load
//! without restarting.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;
use thiserror::Error;

use super::callbacks::CallbackRegistry;
use super::table::{GuideDocument, GuideTable};

/// Errors that can occur while loading a zone's guide
#[derive(Debug, Error)]
pub enum GuideError {
    #[error("no guide for zone {zone}")]
    NotFound { zone: u32 },
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl GuideError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Where zone guides come from.
pub trait GuideSource {
    /// Return the guide for `zone`, possibly from cache.
    fn load(&mut self, zone: u32) -> Result<Arc<GuideTable>, GuideError>;

    /// Discard any cached guide for `zone` and load it again.
    fn reload(&mut self, zone: u32) -> Result<Arc<GuideTable>, GuideError>;
}

/// Loads `<zone>.toml` / `<zone>.json` files from a directory.
#[derive(Debug)]
pub struct DirectoryGuideSource {
    dir: PathBuf,
    callbacks: CallbackRegistry,
    cache: HashMap<u32, Arc<GuideTable>>,
}

impl DirectoryGuideSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_callbacks(dir, CallbackRegistry::new())
    }

    pub fn with_callbacks(dir: impl Into<PathBuf>, callbacks: CallbackRegistry) -> Self {
        Self {
            dir: dir.into(),
            callbacks,
            cache: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Drop the cached guide for `zone`. Returns whether one was cached.
    pub fn invalidate(&mut self, zone: u32) -> bool {
        self.cache.remove(&zone).is_some()
    }

    /// First existing guide file for `zone`.
    fn guide_path(&self, zone: u32) -> Option<PathBuf> {
        ["toml", "json"]
            .iter()
            .map(|ext| self.dir.join(format!("{zone}.{ext}")))
            .find(|path| path.is_file())
    }

    fn read(&self, zone: u32) -> Result<GuideTable, GuideError> {
        let path = self.guide_path(zone).ok_or(GuideError::NotFound { zone })?;
        let table = load_file(&path, &self.callbacks)?;
        tracing::debug!(
            target: "guide",
            zone,
            path = %path.display(),
            entries = table.len(),
            rejected = table.rejected(),
            "Loaded guide"
        );
        Ok(table)
    }
}

impl GuideSource for DirectoryGuideSource {
    fn load(&mut self, zone: u32) -> Result<Arc<GuideTable>, GuideError> {
        if let Some(table) = self.cache.get(&zone) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(self.read(zone)?);
        self.cache.insert(zone, Arc::clone(&table));
        Ok(table)
    }

    fn reload(&mut self, zone: u32) -> Result<Arc<GuideTable>, GuideError> {
        self.invalidate(zone);
        self.load(zone)
    }
}

/// Load a single guide file, choosing the parser by extension.
pub fn load_file(path: &Path, callbacks: &CallbackRegistry) -> Result<GuideTable, GuideError> {
    let contents = fs::read_to_string(path).map_err(|e| GuideError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let document = parse_document(path, &contents)?;
    Ok(GuideTable::from_document(document, callbacks))
}

fn parse_document(path: &Path, contents: &str) -> Result<GuideDocument, GuideError> {
    let parsed: Result<GuideDocument, String> = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    } else {
        toml::from_str(contents).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| GuideError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Guides shipped next to the executable.
pub fn default_builtin_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("guides")))
}

/// Per-user guide directory.
pub fn default_user_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("warden").join("guides"))
}

/// Pick the guide directory: explicit config first, then a `guides/` folder
/// next to the executable if it exists, then the per-user directory.
pub fn resolve_guide_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = configured {
        return Some(dir.to_path_buf());
    }
    default_builtin_dir()
        .filter(|dir| dir.is_dir())
        .or_else(default_user_dir)
}
