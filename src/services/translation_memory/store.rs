use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::model::MemoryEntry;
use super::{hash, normalize};
use crate::error::CoreError;
use crate::services::catalog_store;

pub const TM_FILE: &str = ".translation_memory.json";

pub fn tm_path(locales_dir: &Path) -> PathBuf {
    locales_dir.join(TM_FILE)
}

/// Carrega a memória. Arquivo ausente ou quebrado vira memória vazia.
/// Entradas antigas sem normalized/hash são migradas; duplicatas são
/// resolvidas na hora (e persistidas de volta se algo mudou).
pub fn load(path: &Path) -> Vec<MemoryEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("failed to read {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut entries: Vec<MemoryEntry> = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            warn!("failed to parse {}: {e}", path.display());
            return Vec::new();
        }
    };

    let mut migrated = false;
    for e in entries.iter_mut() {
        migrated |= ensure_norm_hash(e);
    }

    let (mut entries, removed) = dedup(entries);
    migrated |= removed > 0;

    sort_entries(&mut entries);

    if migrated {
        if let Err(e) = save(path, &entries) {
            warn!("failed to persist memory migration: {e}");
        }
    }

    entries
}

pub fn save(path: &Path, entries: &[MemoryEntry]) -> Result<(), CoreError> {
    let mut entries: Vec<MemoryEntry> = entries.to_vec();

    for e in entries.iter_mut() {
        ensure_norm_hash(e);
    }

    let (mut entries, _removed) = dedup(entries);
    sort_entries(&mut entries);

    let json = serde_json::to_string_pretty(&entries).map_err(|e| CoreError::Persistence {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    catalog_store::write_atomic(path, json.as_bytes())
}

pub fn remember(
    entries: &mut Vec<MemoryEntry>,
    source_lang: &str,
    target_lang: &str,
    group: &str,
    original: &str,
    translation: &str,
) {
    if original.trim().is_empty() || translation.trim().is_empty() {
        return;
    }

    let normalized = normalize::normalize(original);
    let h = hash::hash_norm(&normalized);

    entries.push(MemoryEntry {
        source_lang: source_lang.to_string(),
        target_lang: target_lang.to_string(),
        original: original.to_string(),
        translation: translation.to_string(),
        group: group.to_string(),
        normalized,
        hash: h,
    });
}

fn ensure_norm_hash(e: &mut MemoryEntry) -> bool {
    let mut changed = false;

    if e.normalized.is_empty() {
        e.normalized = normalize::normalize(&e.original);
        changed = true;
    }

    if e.hash.is_empty() {
        e.hash = hash::hash_norm(&e.normalized);
        changed = true;
    }

    changed
}

fn dedup(entries: Vec<MemoryEntry>) -> (Vec<MemoryEntry>, usize) {
    let mut map: HashMap<(String, String, String), MemoryEntry> = HashMap::new();
    let mut removed = 0usize;

    for mut e in entries {
        ensure_norm_hash(&mut e);

        let key = (e.source_lang.clone(), e.target_lang.clone(), e.hash.clone());

        match map.get_mut(&key) {
            None => {
                map.insert(key, e);
            }
            Some(existing) => {
                if pick_better(existing, &e) {
                    *existing = e;
                }
                removed += 1;
            }
        }
    }

    (map.into_values().collect(), removed)
}

/// Entre duas traduções do mesmo texto: não-vazia ganha de vazia; entre
/// duas não-vazias, a mais longa ganha.
fn pick_better(current: &MemoryEntry, candidate: &MemoryEntry) -> bool {
    let cur_empty = current.translation.trim().is_empty();
    let cand_empty = candidate.translation.trim().is_empty();

    if cur_empty && !cand_empty {
        return true;
    }
    if !cur_empty && cand_empty {
        return false;
    }

    candidate.translation.len() > current.translation.len()
}

fn sort_entries(entries: &mut [MemoryEntry]) {
    entries.sort_by(|a, b| {
        (&a.source_lang, &a.target_lang, &a.hash, &a.original)
            .cmp(&(&b.source_lang, &b.target_lang, &b.hash, &b.original))
    });
}
