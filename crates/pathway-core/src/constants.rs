//! Constantes del motor.
//!
//! Valores estáticos que participan en el cálculo de fingerprints. Cambiar
//! `ENGINE_VERSION` invalida de forma determinista todos los fingerprints
//! aunque la definición y los datos no cambien.

/// Versión lógica del motor de extracción. Mantener estable mientras no haya
/// cambios incompatibles en el formato de eventos o fingerprints.
pub const ENGINE_VERSION: &str = "KP1.0";
