use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;

/// Diff raso: só chaves de topo. Qualquer mudança dentro de um valor
/// aninhado marca a chave inteira como changed; a tradução é por grupo,
/// então granularidade de grupo basta.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub missing: Vec<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.missing.is_empty()
    }

    /// Chaves cujo valor atual precisa ir para tradução.
    pub fn touched(&self) -> Vec<String> {
        let mut keys = self.added.clone();
        keys.extend(self.changed.iter().cloned());
        keys
    }
}

pub fn diff(baseline: &Catalog, current: &Catalog) -> DiffResult {
    let mut result = DiffResult::default();

    for (key, value) in current {
        match baseline.get(key) {
            None => result.added.push(key.clone()),
            Some(old) if old != value => result.changed.push(key.clone()),
            Some(_) => {}
        }
    }

    for key in baseline.keys() {
        if !current.contains_key(key) {
            result.missing.push(key.clone());
        }
    }

    result
}
