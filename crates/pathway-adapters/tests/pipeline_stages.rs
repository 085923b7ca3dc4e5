//! Etapas de condensación corriendo dentro del engine, sobre núcleos
//! sintéticos en un directorio temporal. No requiere las herramientas
//! externas: cubre collect -> merge -> loop -> assemble.

use std::fs;
use std::path::PathBuf;

use pathway_adapters::steps::{AssembleParams, AssemblePathwayStep, CollectCoresStep, LoopCoresStep, LoopParams,
                              MergeCoresStep, MergeParams};
use pathway_adapters::PathwayArtifact;
use pathway_core::model::ArtifactSpec;
use pathway_core::{InMemoryEventStore, InMemoryRunRepository, Pipe, PipelineEngine, RunEventKind};

const MODEL: &str = "\
'L binds R' L(s[./1]), R(s[./1]) @ 1.0\n\
'R phos' R(s[1] Y{u/p}) @ 0.5\n\
'R unbinds L' L(s[1/.]), R(s[1/.]) @ 0.1\n";

const CORE_SHORT: &str = r#"digraph G{
"1" [label="Intro L"] ;
"2" [label="Intro R"] ;
"3" [label="L binds R"] ;
"5" [label="R phos"] ;
"8" [label="R(Y{p})"] ;
"1" -> "3" ;
"2" -> "3" ;
"3" -> "5" ;
"5" -> "8" ;
}"#;

const CORE_LONG: &str = r#"digraph G{
"2" [label="Intro L"] ;
"4" [label="Intro R"] ;
"6" [label="L binds R"] ;
"7" [label="R unbinds L"] ;
"9" [label="L binds R"] ;
"11" [label="R phos"] ;
"14" [label="R(Y{p})"] ;
"2" -> "6" ;
"4" -> "6" ;
"6" -> "7" ;
"7" -> "9" ;
"9" -> "11" ;
"11" -> "14" ;
}"#;

struct Scratch {
    base: PathBuf,
    workdir: PathBuf,
    model: PathBuf,
}

fn scratch(tag: &str) -> Scratch {
    let base = std::env::temp_dir().join(format!("kpw-stages-{}-{}", tag, uuid::Uuid::new_v4()));
    let workdir = base.join("R(Y{p})");
    fs::create_dir_all(&workdir).expect("workdir");
    let model = base.join("toy.ka");
    fs::write(&model, MODEL).expect("model");
    fs::write(workdir.join("causalcore-1.dot"), CORE_SHORT).expect("core 1");
    fs::write(workdir.join("causalcore-2.dot"), CORE_SHORT).expect("core 2");
    fs::write(workdir.join("causalcore-3.dot"), CORE_LONG).expect("core 3");
    Scratch { base, workdir, model }
}

fn condensation_engine(s: &Scratch) -> PipelineEngine<InMemoryEventStore, InMemoryRunRepository> {
    PipelineEngine::<InMemoryEventStore, InMemoryRunRepository>::new()
        .first_step(CollectCoresStep::new(s.workdir.display().to_string(),
                                          "R(Y{p})",
                                          s.model.display().to_string()))
        .add_step(MergeCoresStep::new(MergeParams::default()))
        .add_step(LoopCoresStep::new(LoopParams { ignore: vec![" unbinds".to_string()],
                                                  edge_labels: false }))
        .add_step(AssemblePathwayStep::new(AssembleParams::default()))
        .build()
}

#[test]
fn condensation_stages_produce_all_artifacts() {
    let s = scratch("full");
    let mut engine = condensation_engine(&s);
    let run_id = engine.run().expect("condensation should complete");

    // Los crudos se eliminan tras la fusión; los intermedios quedan.
    assert!(!s.workdir.join("causalcore-1.dot").exists());
    assert!(s.workdir.join("core-1.dot").exists());
    assert!(s.workdir.join("core-2.dot").exists());
    assert!(s.workdir.join("eventpath-1.dot").exists());
    assert!(s.workdir.join("eventpathway.dot").exists());
    assert!(s.workdir.join("pathway.dot").exists());
    assert!(s.base.join("pathway-R(Y{p}).dot").exists());

    // El artefacto final sale del último StepFinished.
    let events = engine.events_for(run_id);
    let hash = events.iter()
                     .rev()
                     .find_map(|e| match &e.kind {
                         RunEventKind::StepFinished { step_id, outputs, .. } if step_id == "assemble_pathway" => {
                             outputs.first().cloned()
                         }
                         _ => None,
                     })
                     .expect("assemble finished");
    let artifact = engine.get_artifact(&hash).expect("artifact");
    let pathway = PathwayArtifact::from_artifact(artifact).expect("decode");
    assert!(pathway.node_count > 0);
    assert!(pathway.species_pathway.ends_with("pathway.dot"));

    fs::remove_dir_all(&s.base).ok();
}

#[test]
fn merged_core_carries_occurrence_and_prevcores() {
    let s = scratch("occurrence");
    let mut engine = condensation_engine(&s);
    engine.run().expect("condensation should complete");

    let core_text = fs::read_to_string(s.workdir.join("core-1.dot")).expect("core-1");
    // Dos núcleos crudos idénticos se fusionan en el más frecuente.
    assert!(core_text.contains("label=\"Occurrence = 2\""));
    assert!(core_text.contains("prevcores=\"[1, 2]\""));

    fs::remove_dir_all(&s.base).ok();
}

#[test]
fn species_pathway_names_species_not_rules() {
    let s = scratch("species");
    let mut engine = condensation_engine(&s);
    engine.run().expect("condensation should complete");

    let pathway_text = fs::read_to_string(s.workdir.join("pathway.dot")).expect("pathway");
    assert!(pathway_text.contains("nodestype=\"species\""));
    assert!(pathway_text.contains("R-Y"));
    assert!(!pathway_text.contains("L binds R"));

    fs::remove_dir_all(&s.base).ok();
}

#[test]
fn signals_report_stage_progress() {
    let s = scratch("signals");
    let mut engine = condensation_engine(&s);
    let run_id = engine.run().expect("condensation should complete");

    let events = engine.events_for(run_id);
    let signals: Vec<&str> = events.iter()
                                   .filter_map(|e| match &e.kind {
                                       RunEventKind::StepSignal { signal, .. } => Some(signal.as_str()),
                                       _ => None,
                                   })
                                   .collect();
    assert!(signals.contains(&"cores_merged"));
    assert!(signals.contains(&"paths_folded"));
    assert!(signals.contains(&"pathway_written"));

    fs::remove_dir_all(&s.base).ok();
}

#[test]
fn pipe_definition_runs_the_same_stages() {
    let s = scratch("pipe");
    let definition = Pipe::new(CollectCoresStep::new(s.workdir.display().to_string(),
                                                     "R(Y{p})",
                                                     s.model.display().to_string()))
        .then(MergeCoresStep::new(MergeParams::default()))
        .then(LoopCoresStep::new(LoopParams { ignore: vec![" unbinds".to_string()],
                                              edge_labels: false }))
        .then(AssemblePathwayStep::new(AssembleParams::default()))
        .build();

    let mut engine: PipelineEngine<InMemoryEventStore, InMemoryRunRepository> = PipelineEngine::default();
    engine.set_default_definition(definition);
    engine.run().expect("pipe-built condensation should complete");
    assert!(s.workdir.join("pathway.dot").exists());

    fs::remove_dir_all(&s.base).ok();
}
