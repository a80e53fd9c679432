use std::path::Path;

use serde_json::{json, Value};

use crate::model::project::ProjectInfo;
use crate::services::{catalog_store, discovery, project, qa, sync};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload<'a>(req: &'a Value) -> &'a Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn str_field<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn list_field(payload: &Value, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "locsync-core alive" })),

        Command::CatalogList => {
            let locales_path = str_field(payload, "locales_path");
            if locales_path.is_empty() {
                return err(id, "payload.locales_path is required");
            }

            let source = source_language(payload);
            let targets = list_field(payload, "targets");

            match discovery::list_catalogs(Path::new(locales_path), source, &targets) {
                Ok(catalogs) => ok(id, json!({ "catalogs": catalogs })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::SyncPreview => {
            let locales_path = str_field(payload, "locales_path");
            if locales_path.is_empty() {
                return err(id, "payload.locales_path is required");
            }

            let source = source_language(payload);
            let targets = list_field(payload, "targets");

            match sync::preview(Path::new(locales_path), source, &targets) {
                Ok(preview) => match serde_json::to_value(&preview) {
                    Ok(v) => ok(id, v),
                    Err(e) => err(id, e.to_string()),
                },
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::SyncRun => {
            let locales_path = str_field(payload, "locales_path");
            let provider = str_field(payload, "provider");
            let api_key = str_field(payload, "api_key");
            let model = str_field(payload, "model");

            if locales_path.is_empty() {
                return err(id, "payload.locales_path is required");
            }
            if provider.is_empty() {
                return err(id, "payload.provider is required");
            }
            if api_key.is_empty() {
                return err(id, "payload.api_key is required");
            }
            if model.is_empty() {
                return err(id, "payload.model is required");
            }

            let targets = list_field(payload, "targets");
            let use_tm = payload
                .get("use_tm")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            let cfg = sync::SyncConfig {
                locales_dir: Path::new(locales_path),
                source_lang: source_language(payload),
                provider,
                api_key,
                model,
                targets: &targets,
                custom_prompt: str_field(payload, "custom_prompt"),
                use_tm,
            };

            match sync::run(&cfg) {
                Ok(report) => match serde_json::to_value(&report) {
                    Ok(v) => ok(id, json!({ "report": v })),
                    Err(e) => err(id, e.to_string()),
                },
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::RunQa => {
            let locales_path = str_field(payload, "locales_path");
            let target_language = str_field(payload, "target_language");

            if locales_path.is_empty() {
                return err(id, "payload.locales_path is required");
            }
            if target_language.is_empty() {
                return err(id, "payload.target_language is required");
            }

            let locales = Path::new(locales_path);
            let source = catalog_store::load_or_empty(&catalog_store::catalog_path(
                locales,
                source_language(payload),
            ));
            let target = catalog_store::load_or_empty(&catalog_store::catalog_path(
                locales,
                target_language,
            ));

            let issues = qa::run(&source, &target);
            ok(id, json!({ "issues": issues }))
        }

        Command::ProjectList => {
            let base = base_dir(payload);
            ok(id, json!({ "projects": project::list_projects(&base) }))
        }

        Command::ProjectCreate => {
            let name = str_field(payload, "name");
            let locales_path = str_field(payload, "locales_path");

            if name.is_empty() {
                return err(id, "payload.name is required");
            }
            if locales_path.is_empty() {
                return err(id, "payload.locales_path is required");
            }

            let info = ProjectInfo {
                name: name.to_string(),
                locales_path: locales_path.to_string(),
                source_language: source_language(payload).to_string(),
                target_languages: list_field(payload, "target_languages"),
                provider: str_field(payload, "provider").to_string(),
                model: str_field(payload, "model").to_string(),
                ..ProjectInfo::default()
            };

            match project::create_project(&base_dir(payload), info) {
                Ok(p) => ok(id, json!({ "project_path": p.project_path })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::ProjectOpen => {
            let project_path = str_field(payload, "project_path");
            if project_path.is_empty() {
                return err(id, "payload.project_path is required");
            }

            match project::open_project(Path::new(project_path)) {
                Ok(p) => ok(id, json!({ "project": p })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::ProjectSave => {
            let project_val = payload.get("project").cloned().unwrap_or(Value::Null);
            if project_val.is_null() {
                return err(id, "payload.project is required");
            }

            let info: ProjectInfo = match serde_json::from_value(project_val) {
                Ok(v) => v,
                Err(e) => return err(id, format!("invalid payload.project: {e}")),
            };

            match project::save_project(&base_dir(payload), info) {
                Ok(p) => ok(id, json!({ "project": p })),
                Err(e) => err(id, e.to_string()),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

fn source_language<'a>(payload: &'a Value) -> &'a str {
    let lang = str_field(payload, "source_language");
    if lang.is_empty() {
        "en"
    } else {
        lang
    }
}

fn base_dir(payload: &Value) -> std::path::PathBuf {
    let base = str_field(payload, "base_path");
    if base.is_empty() {
        project::default_base_dir()
    } else {
        std::path::PathBuf::from(base)
    }
}
