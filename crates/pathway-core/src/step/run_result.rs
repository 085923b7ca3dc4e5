use serde_json::Value;

use crate::{errors::EngineError, model::Artifact};

/// Hito ligero emitido por un step durante su ejecución.
pub struct StepSignal {
    pub signal: String,
    pub data: Value,
}

/// Resultado abstracto de ejecutar un step.
pub enum StepRunResult {
    Success { outputs: Vec<Artifact> },
    SuccessWithSignals { outputs: Vec<Artifact>, signals: Vec<StepSignal> },
    Failure { error: EngineError },
}
