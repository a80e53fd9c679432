use std::path::Path;

use tracing::warn;

use crate::model::report::DeletionItem;
use crate::services::catalog_store;
use crate::services::discovery::CatalogFile;

/// Propaga chaves removidas da fonte para todos os catálogos alvo e para o
/// baseline. Fan-out best-effort: cada par alvo×chave é independente, falha
/// de um não bloqueia os outros. Roda antes de qualquer tradução, então a
/// deleção vale mesmo que o passo de tradução falhe inteiro depois.
pub fn propagate_deletions(
    removed: &[String],
    targets: &[CatalogFile],
    baseline_path: &Path,
) -> Vec<DeletionItem> {
    let mut items = Vec::new();

    for target in targets {
        for key in removed {
            items.push(delete_one(&target.code, &target.path, key));
        }
    }

    for key in removed {
        items.push(delete_one("baseline", baseline_path, key));
    }

    items
}

fn delete_one(target: &str, path: &Path, key: &str) -> DeletionItem {
    match catalog_store::delete_key(path, key) {
        Ok(removed) => DeletionItem {
            target: target.to_string(),
            key: key.to_string(),
            ok: true,
            removed,
            error: None,
        },
        Err(e) => {
            warn!("failed to delete key {key} from {target}: {e}");
            DeletionItem {
                target: target.to_string(),
                key: key.to_string(),
                ok: false,
                removed: false,
                error: Some(e.to_string()),
            }
        }
    }
}
