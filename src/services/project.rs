use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::model::project::ProjectInfo;

const PROJECT_FILE: &str = "project.json";

/// Diretório padrão onde os projetos ficam registrados. Só aqui se olha
/// ambiente; todo o resto do módulo recebe o diretório explícito.
pub fn default_base_dir() -> PathBuf {
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("LocSync").join("Projects");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("Projects")
}

/// Nome de diretório seguro a partir do nome de exibição: se vier um
/// caminho, usa só o basename; caracteres problemáticos viram '_'.
fn safe_project_dir_name(name: &str) -> String {
    let mut n = name.trim().to_string();

    if n.contains('\\') || n.contains('/') {
        if let Some(base) = Path::new(&n).file_name().and_then(|s| s.to_str()) {
            n = base.to_string();
        }
    }

    let mut out = String::with_capacity(n.len());
    for ch in n.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }

    let out = out.trim().trim_matches('.').to_string();
    if out.is_empty() {
        "Project".to_string()
    } else {
        out
    }
}

pub fn list_projects(base: &Path) -> Vec<ProjectInfo> {
    let mut projects = Vec::new();

    if let Ok(entries) = fs::read_dir(base) {
        for entry in entries.flatten() {
            let path = entry.path().join(PROJECT_FILE);
            if !path.exists() {
                continue;
            }
            if let Ok(data) = fs::read_to_string(&path) {
                if let Ok(project) = serde_json::from_str::<ProjectInfo>(&data) {
                    projects.push(project);
                }
            }
        }
    }

    projects
}

pub fn create_project(base: &Path, mut project: ProjectInfo) -> Result<ProjectInfo, CoreError> {
    let safe_name = safe_project_dir_name(&project.name);
    let project_dir = base.join(&safe_name);

    if project_dir.exists() {
        return Err(CoreError::Persistence {
            path: project_dir.display().to_string(),
            message: "project already exists".to_string(),
        });
    }

    fs::create_dir_all(&project_dir).map_err(|e| CoreError::Persistence {
        path: project_dir.display().to_string(),
        message: e.to_string(),
    })?;

    project.project_path = project_dir.to_string_lossy().to_string();

    if project.source_language.trim().is_empty() {
        project.source_language = "en".to_string();
    }
    if project.ai_prompt_preset.trim().is_empty() {
        project.ai_prompt_preset = "default".to_string();
    }

    write_project(&project_dir, &project)?;

    Ok(project)
}

pub fn open_project(project_path: &Path) -> Result<ProjectInfo, CoreError> {
    let path = project_path.join(PROJECT_FILE);

    let data = fs::read_to_string(&path).map_err(|e| CoreError::Structural {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_json::from_str::<ProjectInfo>(&data).map_err(|e| CoreError::Structural {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

pub fn save_project(base: &Path, mut project: ProjectInfo) -> Result<ProjectInfo, CoreError> {
    let project_dir: PathBuf = {
        let current = project.project_path.trim();
        if current.is_empty() {
            base.join(safe_project_dir_name(&project.name))
        } else {
            PathBuf::from(current)
        }
    };

    fs::create_dir_all(&project_dir).map_err(|e| CoreError::Persistence {
        path: project_dir.display().to_string(),
        message: e.to_string(),
    })?;

    project.project_path = project_dir.to_string_lossy().to_string();

    if project.ai_prompt_preset.trim().is_empty() {
        project.ai_prompt_preset = "default".to_string();
    }

    write_project(&project_dir, &project)?;

    Ok(project)
}

fn write_project(dir: &Path, project: &ProjectInfo) -> Result<(), CoreError> {
    let path = dir.join(PROJECT_FILE);

    let json = serde_json::to_string_pretty(project).map_err(|e| CoreError::Persistence {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    fs::write(&path, json).map_err(|e| CoreError::Persistence {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
