use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no source catalog found: {0}")]
    Discovery(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("malformed catalog {path}: {message}")]
    Structural { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    Persistence { path: String, message: String },
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    Response(String),

    #[error("unsupported provider: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Falha que não depende do idioma alvo (rede, auth, quota, servidor).
    /// Quando uma língua falha por uma dessas, o resto do run é abortado.
    pub fn is_systemic(&self) -> bool {
        matches!(
            self,
            ProviderError::Network(_) | ProviderError::Http { .. }
        )
    }
}
