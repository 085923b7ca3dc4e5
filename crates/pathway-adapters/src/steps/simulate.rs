//! SimulateStep (Transform)
//!
//! Corre el simulador estocástico en modo batch sobre el modelo anotado y
//! verifica que la traza exista y no esté vacía. Los parámetros de
//! simulación entran al fingerprint del step.

use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};
use serde::{Deserialize, Serialize};

use crate::artifacts::{ModelArtifact, TraceArtifact};
use crate::tools;

/// Parámetros deterministas de la simulación.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulateParams {
    /// Duración de la simulación en unidades de tiempo del modelo.
    pub sim_time: u64,
    /// Semilla del generador; `None` deja que el simulador elija.
    pub seed: Option<u64>,
}

impl Default for SimulateParams {
    fn default() -> Self {
        Self { sim_time: 1000,
               seed: None }
    }
}

#[derive(Clone, Debug)]
pub struct SimulateStep {
    pub kasim: String,
    pub params: SimulateParams,
}

impl SimulateStep {
    pub fn new(kasim: impl Into<String>, params: SimulateParams) -> Self {
        Self { kasim: kasim.into(),
               params }
    }
}

impl TypedStep for SimulateStep {
    type Params = SimulateParams;
    type Input = ModelArtifact;
    type Output = TraceArtifact;

    fn id(&self) -> &'static str {
        "simulate"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn params_default(&self) -> Self::Params {
        self.params.clone()
    }

    fn run_typed(&self, input: Option<Self::Input>, params: Self::Params) -> StepRunResultTyped<Self::Output> {
        let input = match input {
            Some(input) => input,
            None => return StepRunResultTyped::Failure { error: EngineError::MissingInputs },
        };
        let trace = match tools::run_kasim(&self.kasim,
                                           Path::new(&input.annotated_model),
                                           params.sim_time,
                                           params.seed)
        {
            Ok(trace) => trace,
            Err(e) => return StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        };
        let bytes = std::fs::metadata(&trace).map(|m| m.len()).unwrap_or(0);
        let output = TraceArtifact { eoi: input.eoi,
                                     workdir: input.workdir,
                                     trace_path: trace.display().to_string(),
                                     source_model: input.source_model,
                                     schema_version: 1 };
        let signal = StepSignal { signal: "trace_written".to_string(),
                                  data: serde_json::json!({ "path": output.trace_path, "bytes": bytes }) };
        StepRunResultTyped::SuccessWithSignals { outputs: vec![output],
                                                 signals: vec![signal] }
    }
}
