//! MergeCoresStep (Transform)
//!
//! Parsea los núcleos causales crudos, fusiona los equivalentes sumando
//! ocurrencias y pesos, y escribe `core-<i>.dot` ordenados por ocurrencia.
//! Los crudos se eliminan tras la fusión; su número queda registrado en el
//! atributo `prevcores` de cada núcleo fusionado.

use std::fs;
use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};
use pathway_domain::merge::merge_equivalent;
use pathway_domain::{parse_dot, render_dot, CausalGraph, DomainError, DotOptions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::artifacts::{CoreSetArtifact, MergedCoresArtifact};
use crate::files;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MergeParams {
    pub edge_labels: bool,
}

#[derive(Clone, Debug)]
pub struct MergeCoresStep {
    pub params: MergeParams,
}

impl MergeCoresStep {
    pub fn new(params: MergeParams) -> Self {
        Self { params }
    }
}

/// Parseo en paralelo de los núcleos: el orden lo da el número de archivo,
/// no el orden de terminación.
fn parse_cores(cores: &[(u64, std::path::PathBuf)]) -> Result<Vec<(u64, CausalGraph)>, DomainError> {
    cores.par_iter()
         .map(|(number, path)| -> Result<(u64, CausalGraph), DomainError> {
             let text = fs::read_to_string(path)?;
             let graph = parse_dot(&text).map_err(|e| {
                             DomainError::DotError(format!("{}: {}", path.display(), e))
                         })?;
             Ok((*number, graph))
         })
         .collect()
}

fn merge_cores(workdir: &Path, edge_labels: bool) -> Result<usize, DomainError> {
    let core_files = files::numbered_dot_files(workdir, "causalcore")?;
    if core_files.is_empty() {
        return Err(DomainError::ValidationError(format!("sin núcleos causales en {}", workdir.display())));
    }
    let parsed = parse_cores(&core_files)?;
    let mut merged = merge_equivalent(parsed);
    log::debug!("{} núcleos crudos, {} únicos", core_files.len(), merged.len());

    let options = DotOptions { edge_labels,
                               compact_ranks: true };
    for (index, graph) in merged.iter_mut().enumerate() {
        let path = workdir.join(format!("core-{}.dot", index + 1));
        fs::write(&path, render_dot(graph, &options))?;
    }
    for (_, path) in &core_files {
        fs::remove_file(path)?;
    }
    Ok(merged.len())
}

impl TypedStep for MergeCoresStep {
    type Params = MergeParams;
    type Input = CoreSetArtifact;
    type Output = MergedCoresArtifact;

    fn id(&self) -> &'static str {
        "merge_cores"
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
        let merged_count = match merge_cores(Path::new(&input.workdir), params.edge_labels) {
            Ok(count) => count,
            Err(e) => return StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        };
        let signal = StepSignal { signal: "cores_merged".to_string(),
                                  data: serde_json::json!({ "raw": input.core_count, "unique": merged_count }) };
        let output = MergedCoresArtifact { eoi: input.eoi,
                                           workdir: input.workdir,
                                           merged_count,
                                           source_model: input.source_model,
                                           schema_version: 1 };
        StepRunResultTyped::SuccessWithSignals { outputs: vec![output],
                                                 signals: vec![signal] }
    }
}
