//! CollectCoresStep (Source)
//!
//! Entrada alternativa al pipeline de condensación: toma los
//! `causalcore-<n>.dot` ya presentes en un directorio de trabajo, sin volver
//! a simular ni extraer. Es el primer paso cuando se re-procesa una corrida
//! existente.

use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, TypedStep};

use crate::artifacts::CoreSetArtifact;
use crate::files;

#[derive(Clone, Debug)]
pub struct CollectCoresStep {
    pub workdir: String,
    pub eoi: String,
    pub source_model: String,
}

impl CollectCoresStep {
    pub fn new(workdir: impl Into<String>, eoi: impl Into<String>, source_model: impl Into<String>) -> Self {
        Self { workdir: workdir.into(),
               eoi: eoi.into(),
               source_model: source_model.into() }
    }
}

impl TypedStep for CollectCoresStep {
    type Params = ();
    type Input = CoreSetArtifact; // ignorado (Source)
    type Output = CoreSetArtifact;

    fn id(&self) -> &'static str {
        "collect_cores"
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }

    fn run_typed(&self, _input: Option<Self::Input>, _params: Self::Params) -> StepRunResultTyped<Self::Output> {
        let cores = match files::numbered_dot_files(Path::new(&self.workdir), "causalcore") {
            Ok(cores) => cores,
            Err(e) => return StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        };
        if cores.is_empty() {
            return StepRunResultTyped::Failure { error: EngineError::StepFailed(format!(
                "sin núcleos causales en {}", self.workdir)) };
        }
        StepRunResultTyped::Success { outputs: vec![CoreSetArtifact { eoi: self.eoi.clone(),
                                                                      workdir: self.workdir.clone(),
                                                                      core_count: cores.len(),
                                                                      source_model: self.source_model.clone(),
                                                                      schema_version: 1 }] }
    }
}
