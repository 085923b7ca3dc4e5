//! pathway-core: motor lineal determinista del pipeline de extracción
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod repo;
pub mod step;

pub use engine::{PipelineEngine, RunCtx};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use model::{Artifact, ArtifactKind};
pub use repo::{build_pipeline_definition, InMemoryRunRepository, PipelineDefinition, RunRepository};
pub use step::{Pipe, SameAs, StepDefinition, StepKind, StepRunResult, StepRunResultTyped, StepStatus, TypedStep};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RunEventKind;

    // Pipeline mínimo declarado con las macros: un artifact JSON encadenado
    // por tres pasos tipados.
    typed_artifact!(StageFile { path: String });

    typed_step! {
        source SeedStep {
            id: "seed",
            output: StageFile,
            params: (),
            run(_me, _p) {{
                StageFile { path: "model.ka".to_string(), schema_version: 1 }
            }}
        }
    }

    typed_step! {
        step StampStep {
            id: "stamp",
            kind: StepKind::Transform,
            input: StageFile,
            output: StageFile,
            params: (),
            run(_me, inp, _p) {{
                StageFile { path: format!("{}.trace", inp.path), schema_version: 1 }
            }}
        }
    }

    typed_step! {
        step StoreStep {
            id: "store",
            kind: StepKind::Sink,
            input: StageFile,
            output: StageFile,
            params: (),
            run(_me, inp, _p) {{
                inp
            }}
        }
    }

    #[test]
    fn typed_builder_runs_full_pipeline() {
        let mut engine = PipelineEngine::<InMemoryEventStore, InMemoryRunRepository>::new()
            .first_step(SeedStep::new())
            .add_step(StampStep::new())
            .add_step(StoreStep::new())
            .build();

        let run_id = engine.run().expect("pipeline should complete");
        let events = engine.events_for(run_id);
        assert!(events.iter().any(|e| matches!(e.kind, RunEventKind::RunInitialized { .. })));
        assert!(events.iter()
                      .any(|e| matches!(&e.kind, RunEventKind::StepFinished { step_id, .. } if step_id == "stamp")));
        assert!(events.iter().any(|e| matches!(e.kind, RunEventKind::RunCompleted { .. })));
    }

    #[test]
    fn chained_artifact_reaches_the_sink() {
        let mut engine = PipelineEngine::<InMemoryEventStore, InMemoryRunRepository>::new()
            .first_step(SeedStep::new())
            .add_step(StampStep::new())
            .add_step(StoreStep::new())
            .build();

        let run_id = engine.run().expect("pipeline should complete");
        let events = engine.events_for(run_id);
        let last_outputs = events.iter()
                                 .rev()
                                 .find_map(|e| match &e.kind {
                                     RunEventKind::StepFinished { step_id, outputs, .. } if step_id == "store" => {
                                         Some(outputs.clone())
                                     }
                                     _ => None,
                                 })
                                 .expect("store step finished");
        let artifact = engine.get_artifact(&last_outputs[0]).expect("artifact stored");
        assert_eq!(artifact.payload["path"], "model.ka.trace");
    }

    #[test]
    fn fingerprints_are_stable_for_identical_runs() {
        let build = || {
            PipelineEngine::<InMemoryEventStore, InMemoryRunRepository>::new().first_step(SeedStep::new())
                                                                              .add_step(StampStep::new())
                                                                              .add_step(StoreStep::new())
                                                                              .build()
        };
        let mut first = build();
        let mut second = build();
        first.run().expect("first run");
        second.run().expect("second run");
        assert_eq!(first.run_fingerprint(), second.run_fingerprint());
        assert!(first.run_fingerprint().is_some());
    }

    #[test]
    fn pipe_builds_matching_definition() {
        let definition = Pipe::new(SeedStep::new()).then(StampStep::new())
                                                   .then(StoreStep::new())
                                                   .build();
        assert_eq!(definition.len(), 3);
        let ids: Vec<&str> = definition.steps.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["seed", "stamp", "store"]);
    }
}
