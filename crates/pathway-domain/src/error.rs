// error.rs
use thiserror::Error;

/// Error del dominio para la extracción de vías causales.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Error de formato DOT: {0}")]
    DotError(String),

    #[error("Error de regla Kappa: {0}")]
    RuleError(String),

    #[error("Error de E/S: {0}")]
    IoError(String),

    #[error("Error de herramienta externa [{tool}]: {detail}")]
    ExternalToolError { tool: String, detail: String },

    #[error("Error de serialización: {0}")]
    SerializationError(String),
}

// Implementación de conversión desde std::io::Error a DomainError
impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}

// Implementación de conversión desde serde_json::Error a DomainError
impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}
