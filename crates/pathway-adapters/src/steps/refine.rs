//! LoopCoresStep (Transform)
//!
//! Pliega cada núcleo único en una vía de eventos: quita introducciones y
//! reglas ignoradas, fusiona nodos repetidos, re-rankea por camino más
//! largo, y vuelve a fusionar las vías que quedaron equivalentes. Escribe
//! `eventpath-<i>.dot`; los `core-<i>.dot` se conservan como intermedios.

use std::fs;
use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};
use pathway_domain::merge::merge_equivalent;
use pathway_domain::transform::{fuse_edges, merge_same_labels, remove_ignored, remove_intro, rerank};
use pathway_domain::{parse_dot, render_dot, DomainError, DotOptions};
use serde::{Deserialize, Serialize};

use crate::artifacts::{EventPathsArtifact, MergedCoresArtifact};
use crate::files;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoopParams {
    /// Subcadenas de nombres de regla a ignorar (p. ej. " unbinds").
    pub ignore: Vec<String>,
    pub edge_labels: bool,
}

#[derive(Clone, Debug)]
pub struct LoopCoresStep {
    pub params: LoopParams,
}

impl LoopCoresStep {
    pub fn new(params: LoopParams) -> Self {
        Self { params }
    }
}

fn loop_cores(workdir: &Path, params: &LoopParams) -> Result<usize, DomainError> {
    let core_files = files::numbered_dot_files(workdir, "core")?;
    if core_files.is_empty() {
        return Err(DomainError::ValidationError(format!("sin núcleos fusionados en {}", workdir.display())));
    }
    let mut looped = Vec::with_capacity(core_files.len());
    for (number, path) in &core_files {
        let text = fs::read_to_string(path)?;
        let mut core = parse_dot(&text).map_err(|e| DomainError::DotError(format!("{}: {}", path.display(), e)))?;
        remove_intro(&mut core);
        remove_ignored(&mut core, &params.ignore);
        merge_same_labels(&mut core);
        fuse_edges(&mut core);
        rerank(&mut core);
        looped.push((*number, core));
    }
    let mut paths = merge_equivalent(looped);

    let options = DotOptions { edge_labels: params.edge_labels,
                               compact_ranks: false };
    for (index, graph) in paths.iter_mut().enumerate() {
        let out = workdir.join(format!("eventpath-{}.dot", index + 1));
        fs::write(&out, render_dot(graph, &options))?;
    }
    Ok(paths.len())
}

impl TypedStep for LoopCoresStep {
    type Params = LoopParams;
    type Input = MergedCoresArtifact;
    type Output = EventPathsArtifact;

    fn id(&self) -> &'static str {
        "loop_cores"
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
        let path_count = match loop_cores(Path::new(&input.workdir), &params) {
            Ok(count) => count,
            Err(e) => return StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        };
        let signal = StepSignal { signal: "paths_folded".to_string(),
                                  data: serde_json::json!({ "cores": input.merged_count, "paths": path_count }) };
        let output = EventPathsArtifact { eoi: input.eoi,
                                          workdir: input.workdir,
                                          path_count,
                                          source_model: input.source_model,
                                          schema_version: 1 };
        StepRunResultTyped::SuccessWithSignals { outputs: vec![output],
                                                 signals: vec![signal] }
    }
}
