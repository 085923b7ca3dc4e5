//! Tipos de evento de una corrida y estructura `RunEvent`.
//!
//! Rol en el pipeline:
//! - Cada ejecución del `PipelineEngine` emite eventos a un `EventStore`
//!   append-only.
//! - Los eventos permiten reconstruir el estado del `RunRepository` (replay)
//!   sin depender de estructuras mutables.
//! - El enum `RunEventKind` define el contrato observable y estable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Emisión inicial de una corrida: fija la `definition_hash` y cantidad
    /// de steps. Invariante: debe ser el primer evento de un `run_id`.
    RunInitialized { definition_hash: String, step_count: usize },
    /// Un step comenzó su ejecución. No implica éxito.
    StepStarted { step_index: usize, step_id: String },
    /// Un step terminó correctamente, con sus outputs (hashes) y fingerprint.
    StepFinished {
        step_index: usize,
        step_id: String,
        outputs: Vec<String>,
        fingerprint: String,
    },
    /// Un step terminó con error terminal. La corrida no continúa
    /// (stop-on-failure).
    StepFailed {
        step_index: usize,
        step_id: String,
        error: EngineError,
        fingerprint: String,
    },
    /// Hito ligero generado por un step (conteo de núcleos, tamaño de traza).
    /// No altera el estado principal.
    StepSignal {
        step_index: usize,
        step_id: String,
        signal: String,
        data: serde_json::Value,
    },
    /// Evento de cierre con fingerprint agregado de la corrida (hash de los
    /// fingerprints ordenados de los steps exitosos).
    RunCompleted { run_fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
