//! ExtractCoresStep (Transform)
//!
//! Corre el extractor de flujo causal sobre la traza. El extractor escribe
//! un `causalcore-<n>.dot` por cada ocurrencia del evento de interés; sin
//! núcleos la etapa falla, porque una vía vacía sería indistinguible de un
//! éxito.

use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};

use crate::artifacts::{CoreSetArtifact, TraceArtifact};
use crate::{files, tools};

#[derive(Clone, Debug)]
pub struct ExtractCoresStep {
    pub kaflow: String,
}

impl ExtractCoresStep {
    pub fn new(kaflow: impl Into<String>) -> Self {
        Self { kaflow: kaflow.into() }
    }
}

impl TypedStep for ExtractCoresStep {
    type Params = ();
    type Input = TraceArtifact;
    type Output = CoreSetArtifact;

    fn id(&self) -> &'static str {
        "extract_cores"
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }

    fn run_typed(&self, input: Option<Self::Input>, _params: Self::Params) -> StepRunResultTyped<Self::Output> {
        let input = match input {
            Some(input) => input,
            None => return StepRunResultTyped::Failure { error: EngineError::MissingInputs },
        };
        let workdir = Path::new(&input.workdir);
        if let Err(e) = tools::run_kaflow(&self.kaflow, workdir, Path::new(&input.trace_path)) {
            return StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) };
        }
        let cores = match files::numbered_dot_files(workdir, "causalcore") {
            Ok(cores) => cores,
            Err(e) => return StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        };
        if cores.is_empty() {
            return StepRunResultTyped::Failure { error: EngineError::StepFailed(format!(
                "KaFlow no produjo núcleos causales en {}", input.workdir)) };
        }
        let output = CoreSetArtifact { eoi: input.eoi,
                                       workdir: input.workdir,
                                       core_count: cores.len(),
                                       source_model: input.source_model,
                                       schema_version: 1 };
        let signal = StepSignal { signal: "cores_extracted".to_string(),
                                  data: serde_json::json!({ "count": cores.len() }) };
        StepRunResultTyped::SuccessWithSignals { outputs: vec![output],
                                                 signals: vec![signal] }
    }
}
