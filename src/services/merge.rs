use serde_json::{Map, Value};

use crate::model::catalog::Catalog;
use crate::services::grouping::{self, DEFAULT_GROUP};

/// Reaplica grupos recém-traduzidos sobre um catálogo alvo.
///
/// Por grupo nomeado: ausente no alvo → insere; conjunto de chaves mudou
/// (chave criada/removida no grupo desde a última tradução) → substitui o
/// grupo inteiro, para nunca misturar estrutura velha com nova; mesmo
/// conjunto → merge chave a chave, a tradução sobrescreve o valor.
///
/// O grupo "default" sempre faz merge chave a chave: seus membros são
/// chaves de topo, então remoções chegam pelo propagador de deleção e o
/// conteúdo incremental é por construção um subconjunto.
///
/// Grupos não mencionados ficam intocados.
pub fn update_catalog(existing: &Catalog, new_groups: &Map<String, Value>) -> Catalog {
    let mut groups = grouping::group(existing);

    for (name, incoming) in new_groups {
        let incoming_entries = match incoming.as_object() {
            Some(entries) => entries,
            None => continue,
        };

        let merged = match groups.get(name).and_then(Value::as_object) {
            Some(current) if name == DEFAULT_GROUP || same_key_set(current, incoming_entries) => {
                let mut out = current.clone();
                for (key, value) in incoming_entries {
                    out.insert(key.clone(), value.clone());
                }
                Value::Object(out)
            }
            _ => incoming.clone(),
        };

        groups.insert(name.clone(), merged);
    }

    grouping::merge_groups(&groups)
}

fn same_key_set(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len() && a.keys().all(|k| b.contains_key(k))
}
