use serde_json::{Map, Value};

use crate::model::catalog::Catalog;

/// Grupo sintético que agrega as entradas escalares de topo.
pub const DEFAULT_GROUP: &str = "default";

/// Projeta um catálogo em grupos: cada objeto de topo vira um grupo com o
/// próprio nome; escalares de topo caem todos no grupo "default".
/// Cada valor do mapa retornado é sempre um Value::Object.
pub fn group(catalog: &Catalog) -> Map<String, Value> {
    let mut groups = Map::new();
    let mut default_entries = Map::new();

    for (key, value) in catalog {
        match value {
            Value::Object(_) => {
                groups.insert(key.clone(), value.clone());
            }
            scalar => {
                default_entries.insert(key.clone(), scalar.clone());
            }
        }
    }

    if !default_entries.is_empty() {
        groups.insert(DEFAULT_GROUP.to_string(), Value::Object(default_entries));
    }

    groups
}

/// Inverso de group: entradas do "default" voltam para o topo, os demais
/// grupos reatacham sob o próprio nome.
pub fn merge_groups(groups: &Map<String, Value>) -> Catalog {
    let mut catalog = Catalog::new();

    for (name, value) in groups {
        if name == DEFAULT_GROUP {
            if let Value::Object(entries) = value {
                for (key, entry) in entries {
                    catalog.insert(key.clone(), entry.clone());
                }
                continue;
            }
        }
        catalog.insert(name.clone(), value.clone());
    }

    catalog
}
