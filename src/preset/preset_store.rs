use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::{Result, VoxError};

use super::{
    preset_id::PresetId,
    preset_record::{PresetField, PresetRecord},
};

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)=([\w.\-]+)").expect("assignment pattern is valid"));

/// Extract every `key=value` pair from a configure argument string.
pub fn parse_assignments(args: &str) -> Vec<(String, String)> {
    ASSIGNMENT
        .captures_iter(args)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

type PresetMap = BTreeMap<PresetId, PresetRecord>;

/// File-backed preset storage.
///
/// Every access goes through one mutex, so a merge (read, apply, persist) is atomic with
/// respect to other callers in the process.
#[derive(Debug)]
pub struct PresetStore {
    path: PathBuf,
    presets: Mutex<PresetMap>,
}

impl PresetStore {
    /// Open the store backed by `path`. A missing or unreadable file yields an empty store.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let presets = load(&path);
        info!(count = presets.len(), "Loaded presets");
        Self {
            path,
            presets: Mutex::new(presets),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, PresetMap> {
        self.presets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: &PresetId) -> Option<PresetRecord> {
        self.lock().get(id).cloned()
    }

    /// Stored record or the default one. Never writes anything back.
    pub fn get_or_default(&self, id: &PresetId) -> PresetRecord {
        self.get(id).unwrap_or_default()
    }

    /// All presets in numeric id order.
    pub fn list(&self) -> Vec<(PresetId, PresetRecord)> {
        self.lock()
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Parse `args` as `key=value` tokens and merge them into preset `id`.
    pub fn merge_update_args(&self, id: &PresetId, args: &str) -> Result<PresetRecord> {
        self.merge_update(id, parse_assignments(args))
    }

    /// Apply `pairs` on top of the current (or default) record and persist the result.
    ///
    /// Unknown aliases and values that do not coerce are skipped. When persisting fails the
    /// in-memory state is rolled back and an error is returned.
    #[tracing::instrument(skip(self, pairs), fields(preset_id = %id))]
    pub fn merge_update<I, K, V>(&self, id: &PresetId, pairs: I) -> Result<PresetRecord>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        if pairs.is_empty() {
            return Err(VoxError::invalid_input("expected at least one key=value pair"));
        }

        let mut presets = self.lock();
        let mut record = presets.get(id).cloned().unwrap_or_default();

        for (key, value) in &pairs {
            let (key, value): (&str, &str) = (key.as_ref(), value.as_ref());
            match PresetField::from_alias(key) {
                Some(field) => {
                    if !record.apply(field, value) {
                        debug!(key, value, "Skipping value that does not coerce");
                    }
                }
                None => debug!(key, "Skipping unknown alias"),
            }
        }

        let previous = presets.insert(id.clone(), record.clone());
        if let Err(e) = save(&self.path, &presets) {
            match previous {
                Some(previous) => presets.insert(id.clone(), previous),
                None => presets.remove(id),
            };
            warn!(error = %e, "Failed to persist presets");
            return Err(VoxError::persist(id, e.to_string()));
        }

        info!("Preset updated");
        Ok(record)
    }
}

fn load(path: &Path) -> PresetMap {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if path.exists() {
                warn!(error = %e, "Cannot read preset file, starting empty");
            }
            return PresetMap::new();
        }
    };

    let object = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            warn!("Preset file is not a JSON object, starting empty");
            return PresetMap::new();
        }
        Err(e) => {
            warn!(error = %e, "Cannot parse preset file, starting empty");
            return PresetMap::new();
        }
    };

    let mut presets = PresetMap::new();
    for (key, value) in &object {
        let Ok(id) = key.parse::<PresetId>() else {
            warn!(key = %key, "Skipping preset with non-numeric id");
            continue;
        };
        match PresetRecord::from_value(value) {
            Some(record) => {
                if presets.insert(id, record).is_some() {
                    warn!(key = %key, "Duplicate preset id, replacing the earlier entry");
                }
            }
            None => warn!(key = %key, "Skipping malformed preset"),
        }
    }
    presets
}

/// Write the whole mapping to a sibling temp file, then rename it over `path`.
fn save(path: &Path, presets: &PresetMap) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(presets)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
