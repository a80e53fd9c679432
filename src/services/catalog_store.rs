use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::error::CoreError;
use crate::model::catalog::Catalog;

/// Snapshot da última sincronização bem-sucedida. Fica no mesmo diretório
/// dos catálogos, mas como dotfile o discovery nunca o lista como idioma.
pub const BASELINE_FILE: &str = ".baseline.json";

pub fn baseline_path(locales_dir: &Path) -> PathBuf {
    locales_dir.join(BASELINE_FILE)
}

pub fn catalog_path(locales_dir: &Path, code: &str) -> PathBuf {
    locales_dir.join(format!("{code}.json"))
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CoreError> {
    let data = fs::read_to_string(path).map_err(|e| CoreError::Structural {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let value: Value = serde_json::from_str(&data).map_err(|e| CoreError::Structural {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CoreError::Structural {
            path: path.display().to_string(),
            message: "top-level value is not an object".to_string(),
        }),
    }
}

/// Catálogo ilegível ou malformado conta como vazio: loga e segue.
pub fn load_or_empty(path: &Path) -> Catalog {
    if !path.exists() {
        return Catalog::new();
    }

    match load_catalog(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("treating catalog as empty: {e}");
            Catalog::new()
        }
    }
}

pub fn save_catalog(path: &Path, catalog: &Catalog) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(&Value::Object(catalog.clone())).map_err(|e| {
        CoreError::Persistence {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    })?;

    write_atomic(path, json.as_bytes())
}

/// Remove uma chave de topo do catálogo no disco. Chave ausente (ou arquivo
/// ausente) é no-op: retorna Ok(false) e não toca o arquivo.
pub fn delete_key(path: &Path, key: &str) -> Result<bool, CoreError> {
    if !path.exists() {
        return Ok(false);
    }

    let mut catalog = load_or_empty(path);

    if catalog.shift_remove(key).is_none() {
        return Ok(false);
    }

    save_catalog(path, &catalog)?;
    Ok(true)
}

/// Escrita via arquivo temporário + rename, para nunca deixar um catálogo
/// meio escrito no disco.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let persist_err = |e: std::io::Error| CoreError::Persistence {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }

    fs::write(&tmp, bytes).map_err(persist_err)?;

    if path.exists() {
        fs::remove_file(path).map_err(persist_err)?;
    }

    fs::rename(&tmp, path).map_err(persist_err)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "catalog".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
