use serde::{Deserialize, Serialize};

fn default_ai_prompt_preset() -> String {
    "default".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub project_path: String,

    #[serde(default, alias = "locales_root")]
    pub locales_path: String,

    #[serde(default = "default_source_language", alias = "source_lang")]
    pub source_language: String,

    #[serde(default, alias = "target_langs")]
    pub target_languages: Vec<String>,

    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub model: String,

    #[serde(default = "default_ai_prompt_preset")]
    pub ai_prompt_preset: String,

    #[serde(default)]
    pub ai_custom_prompt_text: String,

    #[serde(default)]
    pub use_translation_memory: bool,
}
