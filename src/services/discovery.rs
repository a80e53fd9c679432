use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CoreError;
use crate::services::catalog_store;

#[derive(Debug, Clone, Serialize)]
pub struct CatalogFile {
    pub code: String,
    pub path: PathBuf,
    pub exists: bool,
}

/// Lista os catálogos de um diretório de locales: um `<code>.json` por
/// idioma, fonte primeiro, demais em ordem alfabética. Dotfiles (baseline,
/// translation memory) nunca contam como idioma. Alvos declarados que
/// ainda não existem no disco entram com `exists: false`.
pub fn list_catalogs(
    locales_dir: &Path,
    source_lang: &str,
    declared_targets: &[String],
) -> Result<Vec<CatalogFile>, CoreError> {
    let mut found: Vec<CatalogFile> = Vec::new();

    let entries = fs::read_dir(locales_dir).map_err(|e| {
        CoreError::Discovery(format!("{}: {}", locales_dir.display(), e))
    })?;

    for entry in entries.flatten() {
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => continue,
        };

        if stem.starts_with('.') || stem.is_empty() {
            continue;
        }

        found.push(CatalogFile {
            code: stem,
            path,
            exists: true,
        });
    }

    for code in declared_targets {
        if code == source_lang || found.iter().any(|c| &c.code == code) {
            continue;
        }
        found.push(CatalogFile {
            code: code.clone(),
            path: catalog_store::catalog_path(locales_dir, code),
            exists: false,
        });
    }

    if !found.iter().any(|c| c.code == source_lang && c.exists) {
        return Err(CoreError::Discovery(format!(
            "{}/{}.json",
            locales_dir.display(),
            source_lang
        )));
    }

    found.sort_by(|a, b| {
        let a_source = a.code == source_lang;
        let b_source = b.code == source_lang;
        b_source.cmp(&a_source).then_with(|| a.code.cmp(&b.code))
    });

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn source_sorts_first_then_alphabetical() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["fr.json", "de.json", "en.json", "es.json"] {
            touch(dir.path(), name);
        }

        let catalogs = list_catalogs(dir.path(), "en", &[]).unwrap();
        let codes: Vec<&str> = catalogs.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "de", "es", "fr"]);
        assert!(catalogs.iter().all(|c| c.exists));
    }

    #[test]
    fn dotfiles_and_non_json_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "en.json");
        touch(dir.path(), ".baseline.json");
        touch(dir.path(), ".translation_memory.json");
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let catalogs = list_catalogs(dir.path(), "en", &[]).unwrap();
        assert_eq!(catalogs.len(), 1);
        assert_eq!(catalogs[0].code, "en");
    }

    #[test]
    fn declared_targets_appear_without_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "en.json");
        touch(dir.path(), "fr.json");

        let targets = vec!["fr".to_string(), "pt-BR".to_string()];
        let catalogs = list_catalogs(dir.path(), "en", &targets).unwrap();

        let pt = catalogs.iter().find(|c| c.code == "pt-BR").unwrap();
        assert!(!pt.exists);
        assert_eq!(pt.path, dir.path().join("pt-BR.json"));

        // fr já existia: não duplica
        assert_eq!(catalogs.iter().filter(|c| c.code == "fr").count(), 1);
    }

    #[test]
    fn missing_source_is_a_discovery_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "fr.json");

        let err = list_catalogs(dir.path(), "en", &[]).unwrap_err();
        assert!(matches!(err, CoreError::Discovery(_)));
    }
}
