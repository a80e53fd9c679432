use serde::{Deserialize, Serialize};

/// Uma tradução lembrada: um texto-folha da fonte, já traduzido para um
/// idioma alvo. O grupo de origem fica registrado só como contexto.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub source_lang: String,
    pub target_lang: String,

    pub original: String,
    pub translation: String,

    /// Grupo do catálogo de onde o texto veio (informativo, não entra
    /// no match).
    #[serde(default)]
    pub group: String,

    pub normalized: String,

    pub hash: String,
}
