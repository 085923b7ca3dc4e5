//! AssemblePathwayStep (Sink)
//!
//! Une todas las vías de eventos en una única vía (`eventpathway.dot`), la
//! convierte a vía de especies con las reglas del modelo original y escribe
//! el artefacto final: `pathway.dot` en el workdir y la copia exportada
//! `pathway-<eoi>.dot` junto al modelo.

use std::fs;
use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, StepSignal, TypedStep};
use pathway_domain::merge::unite_paths;
use pathway_domain::species::to_species_pathway;
use pathway_domain::{parse_dot, render_dot, CausalGraph, DomainError, DotOptions};
use serde::{Deserialize, Serialize};

use crate::artifacts::{EventPathsArtifact, PathwayArtifact};
use crate::files;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssembleParams {
    pub edge_labels: bool,
}

#[derive(Clone, Debug)]
pub struct AssemblePathwayStep {
    pub params: AssembleParams,
}

impl AssemblePathwayStep {
    pub fn new(params: AssembleParams) -> Self {
        Self { params }
    }
}

fn assemble(input: &EventPathsArtifact, edge_labels: bool) -> Result<PathwayArtifact, DomainError> {
    let workdir = Path::new(&input.workdir);
    let path_files = files::numbered_dot_files(workdir, "eventpath")?;
    if path_files.is_empty() {
        return Err(DomainError::ValidationError(format!("sin vías de eventos en {}", input.workdir)));
    }
    let mut paths: Vec<CausalGraph> = Vec::with_capacity(path_files.len());
    for (_, path) in &path_files {
        let text = fs::read_to_string(path)?;
        paths.push(parse_dot(&text).map_err(|e| DomainError::DotError(format!("{}: {}", path.display(), e)))?);
    }

    let options = DotOptions { edge_labels,
                               compact_ranks: false };
    let mut event_pathway = unite_paths(&paths, &input.eoi);
    let event_pathway_path = workdir.join("eventpathway.dot");
    fs::write(&event_pathway_path, render_dot(&mut event_pathway, &options))?;

    let model_text = fs::read_to_string(&input.source_model)?;
    let mut species_pathway = event_pathway.clone();
    to_species_pathway(&mut species_pathway, &model_text, &input.eoi)?;

    // El EOI debería ser terminal en la vía final.
    let end_labels: Vec<&str> = species_pathway.end_nodes()
                                               .into_iter()
                                               .map(|i| species_pathway.nodes[i].label.as_str())
                                               .collect();
    if let Some(eoi) = species_pathway.eoi.as_deref() {
        if !end_labels.contains(&eoi) {
            log::warn!("el evento de interés \"{}\" no es terminal en la vía final", eoi);
        }
    }

    let species_pathway_path = workdir.join("pathway.dot");
    let rendered = {
        let mut graph = species_pathway.clone();
        render_dot(&mut graph, &options)
    };
    fs::write(&species_pathway_path, &rendered)?;
    let exported = workdir.parent()
                          .unwrap_or_else(|| Path::new("."))
                          .join(format!("pathway-{}.dot", input.eoi));
    fs::write(&exported, &rendered)?;

    Ok(PathwayArtifact { eoi: input.eoi.clone(),
                         workdir: input.workdir.clone(),
                         event_pathway: event_pathway_path.display().to_string(),
                         species_pathway: species_pathway_path.display().to_string(),
                         exported: exported.display().to_string(),
                         node_count: species_pathway.nodes.len(),
                         edge_count: species_pathway.edges.len(),
                         schema_version: 1 })
}

impl TypedStep for AssemblePathwayStep {
    type Params = AssembleParams;
    type Input = EventPathsArtifact;
    type Output = PathwayArtifact;

    fn id(&self) -> &'static str {
        "assemble_pathway"
    }

    fn kind(&self) -> StepKind {
        StepKind::Sink
    }

    fn params_default(&self) -> Self::Params {
        self.params.clone()
    }

    fn run_typed(&self, input: Option<Self::Input>, params: Self::Params) -> StepRunResultTyped<Self::Output> {
        let input = match input {
            Some(input) => input,
            None => return StepRunResultTyped::Failure { error: EngineError::MissingInputs },
        };
        match assemble(&input, params.edge_labels) {
            Ok(output) => {
                let signal = StepSignal { signal: "pathway_written".to_string(),
                                          data: serde_json::json!({
                                              "species_pathway": output.species_pathway,
                                              "nodes": output.node_count,
                                              "edges": output.edge_count,
                                          }) };
                StepRunResultTyped::SuccessWithSignals { outputs: vec![output],
                                                         signals: vec![signal] }
            }
            Err(e) => StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        }
    }
}
