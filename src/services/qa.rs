use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::catalog::Catalog;

#[derive(Debug, Serialize, Deserialize)]
pub struct QaIssue {
    pub key: String,
    pub code: String,
    pub message: String,
}

/// Compara um catálogo alvo com a fonte, chave achatada por chave achatada
/// (caminho com pontos). Só aponta problemas; nunca altera nada.
pub fn run(source: &Catalog, target: &Catalog) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    let source_flat = flatten(source);
    let target_flat = flatten(target);

    let placeholder_re = Regex::new(r"\{[^{}]*\}").unwrap();

    for (key, source_value) in &source_flat {
        let Some(target_value) = target_flat.get(key) else {
            issues.push(issue(key, "MISSING_KEY", "Chave da fonte ausente no alvo"));
            continue;
        };

        let (Value::String(source_text), Value::String(target_text)) =
            (source_value, target_value)
        else {
            continue;
        };

        let source_trim = source_text.trim();
        let target_trim = target_text.trim();

        if target_trim.is_empty() && !source_trim.is_empty() {
            issues.push(issue(key, "EMPTY_TRANSLATION", "Tradução vazia"));
            continue;
        }

        if !target_trim.is_empty() && target_trim == source_trim {
            issues.push(issue(
                key,
                "SAME_AS_SOURCE",
                "Tradução idêntica ao texto fonte",
            ));
        }

        let source_ph: BTreeSet<&str> = placeholder_re
            .find_iter(source_text)
            .map(|m| m.as_str())
            .collect();
        let target_ph: BTreeSet<&str> = placeholder_re
            .find_iter(target_text)
            .map(|m| m.as_str())
            .collect();

        if source_ph != target_ph {
            issues.push(issue(
                key,
                "PLACEHOLDER_MISMATCH",
                "Placeholders diferentes entre fonte e tradução",
            ));
        }
    }

    for key in target_flat.keys() {
        if !source_flat.contains_key(key) {
            issues.push(issue(key, "ORPHAN_KEY", "Chave do alvo não existe na fonte"));
        }
    }

    issues
}

fn issue(key: &str, code: &str, message: &str) -> QaIssue {
    QaIssue {
        key: key.to_string(),
        code: code.to_string(),
        message: message.to_string(),
    }
}

fn flatten(catalog: &Catalog) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(catalog, "", &mut out);
    out
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(nested, &path, out),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: serde_json::Value) -> Catalog {
        value.as_object().cloned().unwrap()
    }

    fn codes_for(issues: &[QaIssue], key: &str) -> Vec<String> {
        issues
            .iter()
            .filter(|i| i.key == key)
            .map(|i| i.code.clone())
            .collect()
    }

    #[test]
    fn reports_missing_and_orphan_keys() {
        let source = obj(json!({"common": {"hello": "Hi", "bye": "Bye"}}));
        let target = obj(json!({"common": {"hello": "Salut", "extra": "??"}}));

        let issues = run(&source, &target);
        assert_eq!(codes_for(&issues, "common.bye"), vec!["MISSING_KEY"]);
        assert_eq!(codes_for(&issues, "common.extra"), vec!["ORPHAN_KEY"]);
    }

    #[test]
    fn reports_untranslated_and_empty_values() {
        let source = obj(json!({"a": "Hello", "b": "World"}));
        let target = obj(json!({"a": "Hello", "b": "  "}));

        let issues = run(&source, &target);
        assert_eq!(codes_for(&issues, "a"), vec!["SAME_AS_SOURCE"]);
        assert_eq!(codes_for(&issues, "b"), vec!["EMPTY_TRANSLATION"]);
    }

    #[test]
    fn reports_placeholder_drift() {
        let source = obj(json!({"greet": "Hi {name}!"}));
        let target = obj(json!({"greet": "Salut {nome} !"}));

        let issues = run(&source, &target);
        assert_eq!(codes_for(&issues, "greet"), vec!["PLACEHOLDER_MISMATCH"]);
    }

    #[test]
    fn clean_translation_yields_no_issues() {
        let source = obj(json!({"common": {"greet": "Hi {name}"}}));
        let target = obj(json!({"common": {"greet": "Salut {name}"}}));

        assert!(run(&source, &target).is_empty());
    }
}
