use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::catalog::Catalog;
use crate::model::report::{
    GroupResult, LanguageResult, LanguageStatus, RunOutcome, SyncReport,
};
use crate::services::ai::{AiTranslator, GroupTranslator};
use crate::services::catalog_store as store;
use crate::services::deletion;
use crate::services::diff::{self, DiffResult};
use crate::services::discovery::{self, CatalogFile};
use crate::services::grouping;
use crate::services::merge;
use crate::services::translation_memory::{matcher, model::MemoryEntry, store as tm_store};

pub struct SyncConfig<'a> {
    pub locales_dir: &'a Path,
    pub source_lang: &'a str,
    pub provider: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub targets: &'a [String],
    pub custom_prompt: &'a str,
    pub use_tm: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    FirstRun,
    Incremental,
    DeletionOnly,
    NoWork,
}

#[derive(Debug, Serialize)]
pub struct SyncPreview {
    pub kind: RunKind,
    pub diff: Option<DiffResult>,
    pub groups: Vec<String>,
}

struct Classification {
    kind: RunKind,
    diff: Option<DiffResult>,
    translatable: Map<String, Value>,
}

/// Decisão única de classificação do run, compartilhada por run e preview
/// para nunca divergirem.
fn classify(baseline_present: bool, baseline: &Catalog, current: &Catalog) -> Classification {
    // sem baseline utilizável: primeira sincronização, vai tudo
    if !baseline_present || baseline.is_empty() {
        let translatable = grouping::group(current);
        let kind = if translatable.is_empty() {
            RunKind::NoWork
        } else {
            RunKind::FirstRun
        };
        return Classification {
            kind,
            diff: None,
            translatable,
        };
    }

    let d = diff::diff(baseline, current);

    if d.is_empty() {
        return Classification {
            kind: RunKind::NoWork,
            diff: Some(d),
            translatable: Map::new(),
        };
    }

    let touched = d.touched();

    if touched.is_empty() {
        return Classification {
            kind: RunKind::DeletionOnly,
            diff: Some(d),
            translatable: Map::new(),
        };
    }

    // só os valores ATUAIS das chaves novas/alteradas, nunca o baseline
    let mut filtered = Catalog::new();
    for key in &touched {
        if let Some(value) = current.get(key) {
            filtered.insert(key.clone(), value.clone());
        }
    }

    Classification {
        kind: RunKind::Incremental,
        diff: Some(d),
        translatable: grouping::group(&filtered),
    }
}

/// Classifica o run sem executar nada: não propaga deleção, não chama
/// provider, não escreve arquivo.
pub fn preview(
    locales_dir: &Path,
    source_lang: &str,
    targets: &[String],
) -> Result<SyncPreview, CoreError> {
    let catalogs = discovery::list_catalogs(locales_dir, source_lang, targets)?;
    let current = store::load_or_empty(&catalogs[0].path);

    let baseline_path = store::baseline_path(locales_dir);
    let baseline_present = baseline_path.exists();
    let baseline = if baseline_present {
        store::load_or_empty(&baseline_path)
    } else {
        Catalog::new()
    };

    let c = classify(baseline_present, &baseline, &current);

    Ok(SyncPreview {
        kind: c.kind,
        diff: c.diff,
        groups: c.translatable.keys().cloned().collect(),
    })
}

pub fn run(cfg: &SyncConfig) -> Result<SyncReport, CoreError> {
    let translator = AiTranslator::new(
        cfg.provider,
        cfg.api_key,
        cfg.model,
        cfg.source_lang,
        cfg.custom_prompt,
    )?;
    run_with(&translator, cfg)
}

/// O passo de sincronização inteiro, com o provider atrás da costura
/// GroupTranslator. Sequencial por idioma e por grupo; a ordem é o
/// comportamento de referência.
pub fn run_with(
    translator: &dyn GroupTranslator,
    cfg: &SyncConfig,
) -> Result<SyncReport, CoreError> {
    let catalogs = discovery::list_catalogs(cfg.locales_dir, cfg.source_lang, cfg.targets)?;
    let source = &catalogs[0];
    let targets = &catalogs[1..];

    let current = store::load_or_empty(&source.path);

    let baseline_path = store::baseline_path(cfg.locales_dir);
    let baseline_present = baseline_path.exists();
    let baseline = if baseline_present {
        store::load_or_empty(&baseline_path)
    } else {
        Catalog::new()
    };

    let classification = classify(baseline_present, &baseline, &current);

    let mut report = SyncReport::empty(RunOutcome::NoWork);

    // deleções primeiro: valem mesmo que a tradução falhe inteira depois
    if let Some(d) = &classification.diff {
        if !d.missing.is_empty() {
            info!("propagating {} removed keys", d.missing.len());
            report.deletions = deletion::propagate_deletions(&d.missing, targets, &baseline_path);
        }
    }

    match classification.kind {
        RunKind::NoWork | RunKind::DeletionOnly => {
            for target in targets {
                report.languages.push(skipped(&target.code, None));
            }
            report.skipped = report.languages.len();
            return Ok(report);
        }
        RunKind::FirstRun => info!("first run: translating the whole source catalog"),
        RunKind::Incremental => info!(
            "incremental run: {} groups to translate",
            classification.translatable.len()
        ),
    }

    let translatable = classification.translatable;

    let tm_file = tm_store::tm_path(cfg.locales_dir);
    let mut memory = if cfg.use_tm {
        tm_store::load(&tm_file)
    } else {
        Vec::new()
    };

    let mut abort_message: Option<String> = None;

    for target in targets {
        if let Some(message) = &abort_message {
            report.languages.push(skipped(&target.code, Some(message.clone())));
            continue;
        }

        let (result, systemic) =
            translate_language(translator, cfg, target, &translatable, &mut memory);

        if result.status == LanguageStatus::Failed {
            if let Some(error) = &result.error {
                report.errors.push(format!("{}: {error}", target.code));
            }
        }

        if systemic {
            warn!("provider failure for {}, aborting remaining languages", target.code);
            abort_message = Some("skipped: provider failure in a previous language".to_string());
        }

        report.languages.push(result);
    }

    for lang in &report.languages {
        match lang.status {
            LanguageStatus::Translated => report.translated += 1,
            LanguageStatus::Skipped => report.skipped += 1,
            LanguageStatus::Failed => report.failed += 1,
        }
    }

    // o baseline só avança se pelo menos um idioma traduziu: um run todo
    // falho mantém o mesmo diff para a próxima tentativa
    if report.translated > 0 {
        if let Err(e) = store::save_catalog(&baseline_path, &current) {
            warn!("failed to update baseline: {e}");
            report.errors.push(e.to_string());
        }
    }

    if cfg.use_tm {
        if let Err(e) = tm_store::save(&tm_file, &memory) {
            warn!("failed to save translation memory: {e}");
        }
    }

    report.outcome = if report.translated > 0 {
        RunOutcome::Translated
    } else if report.failed > 0 {
        RunOutcome::Failed
    } else {
        RunOutcome::NoWork
    };

    Ok(report)
}

fn translate_language(
    translator: &dyn GroupTranslator,
    cfg: &SyncConfig,
    target: &CatalogFile,
    translatable: &Map<String, Value>,
    memory: &mut Vec<MemoryEntry>,
) -> (LanguageResult, bool) {
    let existing = store::load_or_empty(&target.path);

    let mut groups: Vec<GroupResult> = Vec::new();
    let mut new_groups: Map<String, Value> = Map::new();
    let mut failed = 0usize;
    let mut done = 0usize;
    let mut aborted = false;
    let mut last_systemic = false;

    for (name, entries) in translatable {
        // memória primeiro: grupo resolvido inteiro sem chamada ao provider
        if cfg.use_tm {
            if let Some(translated) =
                translate_from_memory(memory, cfg.source_lang, &target.code, entries)
            {
                new_groups.insert(name.clone(), translated);
                groups.push(GroupResult {
                    group: name.clone(),
                    ok: true,
                    from_memory: true,
                    error: None,
                });
                done += 1;
                continue;
            }
        }

        match translator.translate_group(name, entries, &target.code) {
            Ok(translated) => {
                if cfg.use_tm {
                    remember_leaves(
                        memory,
                        cfg.source_lang,
                        &target.code,
                        name,
                        entries,
                        &translated,
                    );
                }
                new_groups.insert(name.clone(), translated);
                groups.push(GroupResult {
                    group: name.clone(),
                    ok: true,
                    from_memory: false,
                    error: None,
                });
                done += 1;
            }
            Err(e) => {
                warn!("group {name} failed for {}: {e}", target.code);
                last_systemic = e.is_systemic();
                groups.push(GroupResult {
                    group: name.clone(),
                    ok: false,
                    from_memory: false,
                    error: Some(e.to_string()),
                });
                failed += 1;
                done += 1;

                // breaker: acima de 50% de erro com pelo menos dois grupos
                // falhos, parar de gastar chamadas nesse idioma
                if failed >= 2 && failed * 2 > done {
                    aborted = true;
                    break;
                }
            }
        }
    }

    let status;
    let mut error: Option<String> = None;

    if new_groups.is_empty() {
        status = LanguageStatus::Failed;
        error = Some(
            groups
                .iter()
                .rev()
                .find_map(|g| g.error.clone())
                .unwrap_or_else(|| "no group translated".to_string()),
        );
    } else {
        // grupos que deram certo são persistidos mesmo num idioma abortado:
        // o baseline pode avançar por causa de outro idioma e esse conteúdo
        // não seria reenviado
        let merged = merge::update_catalog(&existing, &new_groups);
        match store::save_catalog(&target.path, &merged) {
            Ok(()) => {
                if aborted {
                    status = LanguageStatus::Failed;
                    error = Some("translation aborted: error rate above 50%".to_string());
                } else {
                    status = LanguageStatus::Translated;
                }
            }
            Err(e) => {
                status = LanguageStatus::Failed;
                error = Some(e.to_string());
            }
        }
    }

    let systemic = status == LanguageStatus::Failed && last_systemic;

    (
        LanguageResult {
            lang: target.code.clone(),
            status,
            groups,
            error,
        },
        systemic,
    )
}

fn skipped(code: &str, error: Option<String>) -> LanguageResult {
    LanguageResult {
        lang: code.to_string(),
        status: LanguageStatus::Skipped,
        groups: Vec::new(),
        error,
    }
}

/// Monta o grupo traduzido só com a memória. None se qualquer folha de
/// texto não tiver match exato.
fn translate_from_memory(
    memory: &[MemoryEntry],
    source_lang: &str,
    target_lang: &str,
    entries: &Value,
) -> Option<Value> {
    match entries {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                out.insert(
                    key.clone(),
                    translate_from_memory(memory, source_lang, target_lang, value)?,
                );
            }
            Some(Value::Object(out))
        }
        Value::String(text) => {
            if text.trim().is_empty() {
                return Some(entries.clone());
            }
            matcher::exact_match(memory, source_lang, target_lang, text)
                .map(|e| Value::String(e.translation.clone()))
        }
        other => Some(other.clone()),
    }
}

fn remember_leaves(
    memory: &mut Vec<MemoryEntry>,
    source_lang: &str,
    target_lang: &str,
    group: &str,
    original: &Value,
    translated: &Value,
) {
    match (original, translated) {
        (Value::Object(o), Value::Object(t)) => {
            for (key, original_value) in o {
                if let Some(translated_value) = t.get(key) {
                    remember_leaves(
                        memory,
                        source_lang,
                        target_lang,
                        group,
                        original_value,
                        translated_value,
                    );
                }
            }
        }
        (Value::String(o), Value::String(t)) => {
            tm_store::remember(memory, source_lang, target_lang, group, o, t);
        }
        _ => {}
    }
}
