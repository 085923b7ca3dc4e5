//! Errores específicos del motor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum EngineError {
    #[error("run already completed")] RunCompleted,
    #[error("invalid step index")] InvalidStepIndex,
    #[error("missing required inputs")] MissingInputs,
    #[error("first step must be source kind")] FirstStepMustBeSource,
    #[error("step failed: {0}")] StepFailed(String),
    #[error("internal: {0}")] Internal(String),
}
