//! Driver principal: encuentra la vía causal hacia un evento de interés en
//! una simulación Kappa.
//!
//! Encadena las seis etapas del pipeline (anotar modelo, simular, extraer
//! núcleos, fusionar, plegar bucles, ensamblar la vía) dentro del motor
//! determinista y reporta el resumen de la corrida.

mod config;

use std::path::Path;

use config::RunConfig;
use pathway_adapters::steps::{AnnotateModelStep, AssembleParams, AssemblePathwayStep, ExtractCoresStep,
                              LoopCoresStep, LoopParams, MergeCoresStep, MergeParams, SimulateParams, SimulateStep};
use pathway_adapters::{tools, PathwayArtifact};
use pathway_core::model::ArtifactSpec;
use pathway_core::{InMemoryEventStore, InMemoryRunRepository, PipelineEngine, RunEventKind};

fn main() {
    config::init_dotenv();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match RunConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[kappa-pathways] {}", e);
            eprintln!("{}", RunConfig::usage());
            std::process::exit(2);
        }
    };
    if !Path::new(&config.model).is_file() {
        eprintln!("[kappa-pathways] modelo no encontrado: {}", config.model);
        std::process::exit(4);
    }

    let mut engine = PipelineEngine::<InMemoryEventStore, InMemoryRunRepository>::new()
        .first_step(AnnotateModelStep::new(config.model.as_str(), config.eoi.as_str()))
        .add_step(SimulateStep::new(config.kasim.as_str(),
                                    SimulateParams { sim_time: config.sim_time,
                                                     seed: config.seed }))
        .add_step(ExtractCoresStep::new(config.kaflow.as_str()))
        .add_step(MergeCoresStep::new(MergeParams { edge_labels: config.edge_labels }))
        .add_step(LoopCoresStep::new(LoopParams { ignore: config.ignore.clone(),
                                                  edge_labels: config.edge_labels }))
        .add_step(AssemblePathwayStep::new(AssembleParams { edge_labels: config.edge_labels }))
        .build();

    let run_id = match engine.run() {
        Ok(run_id) => run_id,
        Err(e) => {
            eprintln!("[kappa-pathways] corrida fallida: {}", e);
            std::process::exit(5);
        }
    };

    // Resumen: señales de progreso de cada etapa y artefacto final.
    let events = engine.events_for(run_id);
    for event in &events {
        if let RunEventKind::StepSignal { step_id, signal, data, .. } = &event.kind {
            println!("[{}] {}: {}", step_id, signal, data);
        }
    }
    let pathway = events.iter()
                        .rev()
                        .find_map(|e| match &e.kind {
                            RunEventKind::StepFinished { step_id, outputs, .. } if step_id == "assemble_pathway" => {
                                outputs.first().cloned()
                            }
                            _ => None,
                        })
                        .and_then(|hash| engine.get_artifact(&hash).cloned())
                        .and_then(|artifact| PathwayArtifact::from_artifact(&artifact).ok());

    let pathway = match pathway {
        Some(pathway) => pathway,
        None => {
            eprintln!("[kappa-pathways] la corrida terminó sin artefacto final");
            std::process::exit(5);
        }
    };
    println!("vía de eventos: {}", pathway.event_pathway);
    println!("vía de especies: {} ({} nodos, {} aristas)",
             pathway.species_pathway, pathway.node_count, pathway.edge_count);
    println!("exportada: {}", pathway.exported);
    if let Some(fingerprint) = engine.run_fingerprint() {
        println!("fingerprint de la corrida: {}", fingerprint);
    }

    if config.render {
        let dot = config.dot.clone().unwrap_or_else(|| "dot".to_string());
        match tools::render_pngs(&dot, Path::new(&pathway.workdir)) {
            Ok(rendered) => println!("renderizados: {} grafos", rendered),
            Err(e) => eprintln!("[kappa-pathways] render fallido: {}", e),
        }
    }
}
