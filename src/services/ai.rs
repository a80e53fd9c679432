use rand::{thread_rng, Rng};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

use std::{thread, time::Duration};

use crate::error::{CoreError, ProviderError};
use crate::services::grouping::DEFAULT_GROUP;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const TIMEOUT_SECS: u64 = 60;

/// Costura para testes e para frontends que queiram outro transporte:
/// o sync só conhece esta interface.
pub trait GroupTranslator {
    fn translate_group(
        &self,
        group: &str,
        entries: &Value,
        target_lang: &str,
    ) -> Result<Value, ProviderError>;
}

pub struct AiTranslator {
    client: Client,
    endpoint: &'static str,
    api_key: String,
    model: String,
    source_lang: String,
    custom_prompt: String,
}

impl AiTranslator {
    pub fn new(
        provider: &str,
        api_key: &str,
        model: &str,
        source_lang: &str,
        custom_prompt: &str,
    ) -> Result<Self, CoreError> {
        let endpoint = endpoint_for(provider)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::Provider(ProviderError::Network(e.to_string())))?;

        Ok(AiTranslator {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
            source_lang: source_lang.to_string(),
            custom_prompt: custom_prompt.to_string(),
        })
    }

    fn request_completion(&self, body: &Value) -> Result<String, ProviderError> {
        let mut last_err = ProviderError::Network("request not attempted".into());

        for attempt in 0..MAX_RETRIES {
            let res = self
                .client
                .post(self.endpoint)
                .bearer_auth(&self.api_key)
                .json(body)
                .send();

            let resp = match res {
                Ok(r) => r,
                Err(e) => {
                    last_err = ProviderError::Network(e.to_string());
                    if attempt + 1 < MAX_RETRIES {
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                    break;
                }
            };

            let status = resp.status();

            // Lê como texto primeiro: não perde a mensagem de erro quando
            // o corpo não é JSON válido.
            let text = match resp.text() {
                Ok(t) => t,
                Err(e) => {
                    last_err = ProviderError::Network(e.to_string());
                    if attempt + 1 < MAX_RETRIES {
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                    break;
                }
            };

            if !status.is_success() {
                last_err = ProviderError::Http {
                    status: status.as_u16(),
                    message: extract_error_message(&text),
                };
                if should_retry_http(status) && attempt + 1 < MAX_RETRIES {
                    thread::sleep(backoff(attempt));
                    continue;
                }
                break;
            }

            match serde_json::from_str::<Value>(&text) {
                Ok(v) => {
                    if let Some(content) = v
                        .get("choices")
                        .and_then(|c| c.get(0))
                        .and_then(|c| c.get("message"))
                        .and_then(|m| m.get("content"))
                        .and_then(|c| c.as_str())
                    {
                        return Ok(content.to_string());
                    }
                    last_err = ProviderError::Response(
                        "missing choices[0].message.content".into(),
                    );
                }
                Err(_) => {
                    last_err = ProviderError::Response("invalid JSON from provider".into());
                }
            }

            if attempt + 1 < MAX_RETRIES {
                thread::sleep(backoff(attempt));
            }
        }

        Err(last_err)
    }

    fn build_prompt(&self, group: &str, entries: &Value, target_lang: &str) -> String {
        let mut p = String::new();

        p.push_str(&format!(
            "Translate the JSON string values from {} to {}.\n",
            self.source_lang, target_lang
        ));
        p.push_str("Keep every key exactly as it is and keep the structure.\n");
        p.push_str("Reply with a single JSON object and nothing else.\n");

        if group != DEFAULT_GROUP {
            p.push_str(&format!(
                "Context: these texts belong to the \"{group}\" section of an application interface.\n"
            ));
        }

        if !self.custom_prompt.trim().is_empty() {
            p.push_str(self.custom_prompt.trim());
            p.push('\n');
        }

        p.push_str("JSON:\n");
        p.push_str(&serde_json::to_string_pretty(entries).unwrap_or_default());

        p
    }
}

impl GroupTranslator for AiTranslator {
    fn translate_group(
        &self,
        group: &str,
        entries: &Value,
        target_lang: &str,
    ) -> Result<Value, ProviderError> {
        let prompt = self.build_prompt(group, entries, target_lang);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": "You are a professional software localization translator." },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.3
        });

        let content = self.request_completion(&body)?;
        parse_group_response(&content, entries)
    }
}

fn endpoint_for(provider: &str) -> Result<&'static str, CoreError> {
    match provider {
        "openai" => Ok("https://api.openai.com/v1/chat/completions"),
        "deepseek" => Ok("https://api.deepseek.com/v1/chat/completions"),
        other => Err(CoreError::Provider(ProviderError::Unsupported(
            other.to_string(),
        ))),
    }
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx tipicamente são temporários
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn extract_error_message(body_text: &str) -> String {
    // Padrão comum: { "error": { "message": "..." } } ou { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    // Fallback: corpo bruto (limitado)
    let trimmed = body_text.trim();
    if trimmed.len() > 400 {
        let mut end = 400;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}

/// Interpreta a resposta do provider para um grupo. Primeiro como JSON
/// (tirando cerca de código, se houver); se não der, recuperação linha a
/// linha "chave: valor" (heurística best-effort, não um parser garantido).
/// Chaves que o provider não devolveu ficam com o texto original.
pub fn parse_group_response(content: &str, requested: &Value) -> Result<Value, ProviderError> {
    let cleaned = strip_code_fence(content);

    if let Ok(v) = serde_json::from_str::<Value>(cleaned) {
        if v.is_object() {
            return Ok(fill_missing(requested, &v));
        }
    }

    recover_key_values(content, requested)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // descarta o rótulo da cerca ("json", "JSON", vazio...)
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Contrato do provider: chaves preservadas, só valores traduzidos. Resposta
/// curta é completada com o original; chave extra é descartada; valor que
/// mudou de tipo volta ao original.
pub fn fill_missing(requested: &Value, response: &Value) -> Value {
    match (requested, response) {
        (Value::Object(req), Value::Object(resp)) => {
            let mut out = Map::new();
            for (key, req_value) in req {
                let filled = match resp.get(key) {
                    Some(resp_value) => fill_missing(req_value, resp_value),
                    None => req_value.clone(),
                };
                out.insert(key.clone(), filled);
            }
            Value::Object(out)
        }
        (Value::String(_), Value::String(_)) => response.clone(),
        _ => requested.clone(),
    }
}

fn recover_key_values(content: &str, requested: &Value) -> Result<Value, ProviderError> {
    let requested_obj = match requested.as_object() {
        Some(o) => o,
        None => return Err(ProviderError::Response("group is not an object".into())),
    };

    let line_re = Regex::new(r#"^\s*"?([^":]+?)"?\s*[:=]\s*(.+?)\s*,?\s*$"#).unwrap();

    let mut out = requested_obj.clone();
    let mut recovered = 0usize;

    for line in content.lines() {
        let Some(caps) = line_re.captures(line) else {
            continue;
        };

        let key = caps[1].trim();
        let value = caps[2].trim().trim_matches('"');

        // só aceita chaves pedidas, e só as de valor textual plano
        match requested_obj.get(key) {
            Some(Value::String(_)) => {
                out.insert(key.to_string(), Value::String(value.to_string()));
                recovered += 1;
            }
            _ => continue,
        }
    }

    if recovered == 0 {
        return Err(ProviderError::Response(
            "unable to parse provider response".into(),
        ));
    }

    Ok(Value::Object(out))
}
