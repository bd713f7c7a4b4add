use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::KamerstukError;

/// Metadata for one kamerstuk, as composed by a lookup and persisted in the
/// cache file. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KamerstukInfo {
    pub dossiernummer: String,
    pub ondernummer: String,
    pub vergaderjaar: String,
    pub kamer: String,
    pub kamerstuktype: String,
    pub documenttitel: String,
    pub dossiertitel: String,
}

type CacheMap = BTreeMap<String, BTreeMap<String, KamerstukInfo>>;

/// Two-level persistent cache: dossiernummer -> ondernummer -> info.
///
/// The backing file is read once at construction and rewritten wholesale on
/// every insert. No eviction; the universe of real kamerstukken is bounded.
#[derive(Debug)]
pub struct KamerstukCache {
    path: Option<PathBuf>,
    entries: CacheMap,
}

impl KamerstukCache {
    /// Load the cache from `path`. A missing or unparseable file yields an
    /// empty cache; a stale or corrupt file must never block lookups.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cache file is not valid JSON, starting empty");
                    CacheMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file not readable, starting empty");
                CacheMap::new()
            }
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Cache without a backing file; inserts stay in memory.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: CacheMap::new(),
        }
    }

    pub fn get(&self, dossiernummer: &str, ondernummer: &str) -> Option<&KamerstukInfo> {
        self.entries.get(dossiernummer)?.get(ondernummer)
    }

    /// Insert one entry and flush the whole cache to disk before returning.
    pub fn insert(&mut self, info: KamerstukInfo) -> Result<(), KamerstukError> {
        self.entries
            .entry(info.dossiernummer.clone())
            .or_default()
            .insert(info.ondernummer.clone(), info);
        self.flush()
    }

    pub fn flush(&self) -> Result<(), KamerstukError> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_string(&self.entries)?)?;
        }
        Ok(())
    }

    /// Number of distinct dossiers.
    pub fn dossier_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of cached entries across all dossiers.
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }
}

// ── Tests ──
