use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    NoWork,
    Translated,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LanguageStatus {
    Translated,
    Skipped,
    Failed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupResult {
    pub group: String,
    pub ok: bool,

    /// Resolvido pela translation memory, sem chamada ao provider.
    #[serde(default)]
    pub from_memory: bool,

    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageResult {
    pub lang: String,
    pub status: LanguageStatus,
    pub groups: Vec<GroupResult>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletionItem {
    pub target: String,
    pub key: String,
    pub ok: bool,

    /// false quando a chave já não existia (no-op).
    pub removed: bool,

    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncReport {
    pub outcome: RunOutcome,
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub languages: Vec<LanguageResult>,
    pub deletions: Vec<DeletionItem>,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn empty(outcome: RunOutcome) -> Self {
        SyncReport {
            outcome,
            translated: 0,
            skipped: 0,
            failed: 0,
            languages: Vec::new(),
            deletions: Vec::new(),
            errors: Vec::new(),
        }
    }
}
