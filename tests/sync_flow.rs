use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use serde_json::{json, Value};

use locsync_core::error::ProviderError;
use locsync_core::model::report::{LanguageStatus, RunOutcome};
use locsync_core::services::ai::GroupTranslator;
use locsync_core::services::catalog_store;
use locsync_core::services::sync::{self, SyncConfig};

/// Tradutor de mentira: prefixa cada texto com o idioma alvo, ou falha
/// para os idiomas configurados.
struct StubTranslator {
    fail: HashSet<String>,
    systemic: bool,
    calls: Mutex<usize>,
}

impl StubTranslator {
    fn new() -> Self {
        StubTranslator {
            fail: HashSet::new(),
            systemic: false,
            calls: Mutex::new(0),
        }
    }

    fn failing(langs: &[&str], systemic: bool) -> Self {
        StubTranslator {
            fail: langs.iter().map(|l| l.to_string()).collect(),
            systemic,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

fn translate_value(value: &Value, lang: &str) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), translate_value(v, lang)))
                .collect(),
        ),
        Value::String(s) => Value::String(format!("[{lang}] {s}")),
        other => other.clone(),
    }
}

impl GroupTranslator for StubTranslator {
    fn translate_group(
        &self,
        _group: &str,
        entries: &Value,
        target_lang: &str,
    ) -> Result<Value, ProviderError> {
        *self.calls.lock().unwrap() += 1;

        if self.fail.contains(target_lang) {
            return Err(if self.systemic {
                ProviderError::Network("connection refused".into())
            } else {
                ProviderError::Response("gibberish".into())
            });
        }

        Ok(translate_value(entries, target_lang))
    }
}

fn write_catalog(dir: &Path, name: &str, value: Value) {
    catalog_store::save_catalog(&dir.join(name), &value.as_object().cloned().unwrap()).unwrap();
}

fn read_catalog(dir: &Path, name: &str) -> Value {
    Value::Object(catalog_store::load_catalog(&dir.join(name)).unwrap())
}

fn cfg<'a>(dir: &'a Path, use_tm: bool) -> SyncConfig<'a> {
    SyncConfig {
        locales_dir: dir,
        source_lang: "en",
        provider: "stub",
        api_key: "key",
        model: "model",
        targets: &[],
        custom_prompt: "",
        use_tm,
    }
}

#[test]
fn first_run_translates_everything_and_seeds_baseline() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"common": {"hello": "Hi"}}));
    write_catalog(dir.path(), "fr.json", json!({}));

    let stub = StubTranslator::new();
    let report = sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Translated);
    assert_eq!(report.translated, 1);
    assert_eq!(report.failed, 0);

    assert_eq!(
        read_catalog(dir.path(), "fr.json"),
        json!({"common": {"hello": "[fr] Hi"}})
    );
    assert_eq!(
        read_catalog(dir.path(), ".baseline.json"),
        json!({"common": {"hello": "Hi"}})
    );
}

#[test]
fn unchanged_source_is_no_work_and_calls_nobody() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"common": {"hello": "Hi"}}));
    write_catalog(dir.path(), "fr.json", json!({}));

    let stub = StubTranslator::new();
    sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();
    let first_calls = stub.calls();

    let report = sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();

    assert_eq!(report.outcome, RunOutcome::NoWork);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.translated, 0);
    assert_eq!(stub.calls(), first_calls);
    assert!(report
        .languages
        .iter()
        .all(|l| l.status == LanguageStatus::Skipped));
}

#[test]
fn deletion_only_run_propagates_and_skips_translation() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"a": "1"}));
    write_catalog(dir.path(), "fr.json", json!({"a": "x", "b": "y"}));
    write_catalog(dir.path(), ".baseline.json", json!({"a": "1", "b": "2"}));

    let stub = StubTranslator::new();
    let report = sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();

    assert_eq!(report.outcome, RunOutcome::NoWork);
    assert_eq!(stub.calls(), 0);

    // fr perdeu "b", baseline também; o resto ficou
    assert_eq!(read_catalog(dir.path(), "fr.json"), json!({"a": "x"}));
    assert_eq!(read_catalog(dir.path(), ".baseline.json"), json!({"a": "1"}));

    assert_eq!(report.deletions.len(), 2);
    assert!(report.deletions.iter().all(|d| d.ok && d.key == "b"));
    assert!(report.deletions.iter().any(|d| d.target == "fr"));
    assert!(report.deletions.iter().any(|d| d.target == "baseline"));
}

#[test]
fn baseline_advances_when_some_languages_succeed() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"common": {"hello": "Hi"}}));
    write_catalog(dir.path(), "de.json", json!({}));
    write_catalog(dir.path(), "es.json", json!({}));
    write_catalog(dir.path(), "fr.json", json!({}));

    // "es" falha com erro de conteúdo, não de rede: não derruba o resto
    let stub = StubTranslator::failing(&["es"], false);
    let report = sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Translated);
    assert_eq!(report.translated, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);

    let es = report.languages.iter().find(|l| l.lang == "es").unwrap();
    assert_eq!(es.status, LanguageStatus::Failed);

    assert_eq!(
        read_catalog(dir.path(), ".baseline.json"),
        json!({"common": {"hello": "Hi"}})
    );
    assert_eq!(
        read_catalog(dir.path(), "de.json"),
        json!({"common": {"hello": "[de] Hi"}})
    );
}

#[test]
fn systemic_failure_aborts_remaining_languages() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"common": {"hello": "Hi"}}));
    write_catalog(dir.path(), "de.json", json!({}));
    write_catalog(dir.path(), "es.json", json!({}));
    write_catalog(dir.path(), "fr.json", json!({}));

    // "de" é o primeiro alvo; falha de rede aborta es e fr sem tentar
    let stub = StubTranslator::failing(&["de"], true);
    let report = sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Failed);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(stub.calls(), 1);

    for lang in ["es", "fr"] {
        let l = report.languages.iter().find(|l| l.lang == lang).unwrap();
        assert_eq!(l.status, LanguageStatus::Skipped);
        assert!(l.error.is_some());
    }

    // run todo falho: baseline não nasce, o próximo run repete o diff
    assert!(!dir.path().join(".baseline.json").exists());
}

#[test]
fn incremental_run_sends_only_changed_groups_and_keeps_manual_work() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(
        dir.path(),
        "en.json",
        json!({"common": {"hello": "Hello"}, "menu": {"open": "Open"}}),
    );
    write_catalog(
        dir.path(),
        "fr.json",
        json!({"common": {"hello": "Salut"}, "menu": {"open": "Ouvrir"}}),
    );
    // baseline de antes da mudança em common.hello
    write_catalog(
        dir.path(),
        ".baseline.json",
        json!({"common": {"hello": "Hi"}, "menu": {"open": "Open"}}),
    );

    let stub = StubTranslator::new();
    let report = sync::run_with(&stub, &cfg(dir.path(), false)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Translated);
    assert_eq!(stub.calls(), 1);

    // menu não mudou: a tradução manual sobrevive intacta
    assert_eq!(
        read_catalog(dir.path(), "fr.json"),
        json!({"common": {"hello": "[fr] Hello"}, "menu": {"open": "Ouvrir"}})
    );
}

#[test]
fn declared_target_without_file_gets_created() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"title": "App"}));

    let stub = StubTranslator::new();
    let targets = vec!["pt-BR".to_string()];
    let mut config = cfg(dir.path(), false);
    config.targets = &targets;

    let report = sync::run_with(&stub, &config).unwrap();

    assert_eq!(report.translated, 1);
    assert_eq!(
        read_catalog(dir.path(), "pt-BR.json"),
        json!({"title": "[pt-BR] App"})
    );
}

#[test]
fn translation_memory_resolves_repeat_groups_without_provider() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path(), "en.json", json!({"common": {"hello": "Hi"}}));
    write_catalog(dir.path(), "fr.json", json!({}));

    let stub = StubTranslator::new();
    let report = sync::run_with(&stub, &cfg(dir.path(), true)).unwrap();
    assert_eq!(report.translated, 1);
    assert_eq!(stub.calls(), 1);

    // some o baseline: o próximo run reclassifica como first run, mas a
    // memória já conhece todas as folhas
    std::fs::remove_file(dir.path().join(".baseline.json")).unwrap();

    let report = sync::run_with(&stub, &cfg(dir.path(), true)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Translated);
    assert_eq!(stub.calls(), 1);

    let fr = &report.languages[0];
    assert!(fr.groups.iter().all(|g| g.ok && g.from_memory));
    assert_eq!(
        read_catalog(dir.path(), "fr.json"),
        json!({"common": {"hello": "[fr] Hi"}})
    );
}
