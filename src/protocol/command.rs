#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogList,
    SyncPreview,
    SyncRun,
    RunQa,
    ProjectList,
    ProjectCreate,
    ProjectOpen,
    ProjectSave,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.list" => Command::CatalogList,
            "sync.preview" => Command::SyncPreview,
            "sync.run" => Command::SyncRun,
            "run_qa" => Command::RunQa,
            "project.list" => Command::ProjectList,
            "project.create" => Command::ProjectCreate,
            "project.open" => Command::ProjectOpen,
            "project.save" => Command::ProjectSave,
            _ => Command::Unknown,
        }
    }
}
