use super::model::MemoryEntry;
use super::{hash, normalize};

/// Match exato por (idioma fonte, idioma alvo, texto normalizado).
pub fn exact_match<'a>(
    entries: &'a [MemoryEntry],
    source_lang: &str,
    target_lang: &str,
    original: &str,
) -> Option<&'a MemoryEntry> {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        return None;
    }

    let norm = normalize::normalize(trimmed);
    let h = hash::hash_norm(&norm);

    entries.iter().find(|e| {
        e.source_lang == source_lang
            && e.target_lang == target_lang
            && e.hash == h
            && e.normalized == norm
    })
}
