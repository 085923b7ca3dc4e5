//! Engine module for the pipeline engine implementation
//!
//! Provides the core engine, builder pattern, and run context for
//! deterministic pipeline execution.

pub mod builder;
pub mod core;
pub mod run_ctx;

pub use builder::{EngineBuilder, EngineBuilderInit};
pub use core::PipelineEngine;
pub use run_ctx::RunCtx;

pub use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use crate::repo::{InMemoryRunRepository, PipelineDefinition, RunRepository};
pub use crate::step::{StepRunResult, StepStatus};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Artifact, ArtifactKind};
    use crate::step::{StepDefinition, StepKind};
    use serde_json::json;

    // Paso fuente de ejemplo
    #[derive(Debug)]
    struct SourceStep;

    impl StepDefinition for SourceStep {
        fn id(&self) -> &str {
            "source"
        }
        fn base_params(&self) -> serde_json::Value {
            json!({})
        }
        fn run(&self, _ctx: &crate::model::ExecutionContext) -> crate::step::StepRunResult {
            crate::step::StepRunResult::Success { outputs: vec![Artifact { kind: ArtifactKind::GenericJson,
                                                                           payload: json!({"data": "trace"}),
                                                                           hash: String::new(),
                                                                           metadata: None }] }
        }
        fn kind(&self) -> StepKind {
            StepKind::Source
        }
    }

    // Paso transformador de ejemplo
    #[derive(Debug)]
    struct TransformStep;

    impl StepDefinition for TransformStep {
        fn id(&self) -> &str {
            "transform"
        }
        fn base_params(&self) -> serde_json::Value {
            json!({})
        }
        fn run(&self, ctx: &crate::model::ExecutionContext) -> crate::step::StepRunResult {
            if let Some(input) = &ctx.input {
                let transformed = json!({
                    "condensed": input.payload["data"],
                    "processed": true
                });
                crate::step::StepRunResult::Success { outputs: vec![Artifact { kind: ArtifactKind::GenericJson,
                                                                               payload: transformed,
                                                                               hash: String::new(),
                                                                               metadata: None }] }
            } else {
                crate::step::StepRunResult::Failure { error: crate::errors::EngineError::MissingInputs }
            }
        }
        fn kind(&self) -> StepKind {
            StepKind::Transform
        }
    }

    // Paso sumidero de ejemplo
    #[derive(Debug)]
    struct SinkStep;

    impl StepDefinition for SinkStep {
        fn id(&self) -> &str {
            "sink"
        }
        fn base_params(&self) -> serde_json::Value {
            json!({})
        }
        fn run(&self, ctx: &crate::model::ExecutionContext) -> crate::step::StepRunResult {
            if ctx.input.is_some() {
                crate::step::StepRunResult::Success { outputs: vec![] }
            } else {
                crate::step::StepRunResult::Failure { error: crate::errors::EngineError::MissingInputs }
            }
        }
        fn kind(&self) -> StepKind {
            StepKind::Sink
        }
    }

    fn manual_definition() -> PipelineDefinition {
        crate::repo::build_pipeline_definition_auto(vec![Box::new(SourceStep),
                                                         Box::new(TransformStep),
                                                         Box::new(SinkStep)])
    }

    #[test]
    fn engine_runs_manual_definition_to_completion() {
        let mut engine: PipelineEngine<InMemoryEventStore, InMemoryRunRepository> = PipelineEngine::default();
        engine.set_default_definition(manual_definition());

        let run_id = engine.run().expect("la corrida debería completarse");
        assert!(!run_id.to_string().is_empty());

        let variants = engine.event_variants().expect("deberían existir variantes");
        // Secuencia esperada: init, (started, finished) x3, completed.
        assert_eq!(variants, vec!["I", "S", "F", "S", "F", "S", "F", "C"]);
        assert!(engine.run_fingerprint().is_some());
    }

    #[test]
    fn engine_steps_one_at_a_time() {
        let mut engine: PipelineEngine<InMemoryEventStore, InMemoryRunRepository> = PipelineEngine::default();
        engine.set_default_definition(manual_definition());

        assert!(engine.step().is_ok());
        assert!(engine.step().is_ok());
        assert!(engine.step().is_ok());
        // La corrida ya se completó.
        assert!(matches!(engine.step(), Err(crate::errors::EngineError::RunCompleted)));
    }

    #[test]
    fn run_ctx_drives_a_specific_run() {
        let mut engine: PipelineEngine<InMemoryEventStore, InMemoryRunRepository> = PipelineEngine::default();
        let definition = manual_definition();
        let run_id = engine.ensure_default_run_id();

        let mut ctx = RunCtx::new(&mut engine, run_id, &definition);
        assert!(ctx.step().is_ok());
        assert!(ctx.run_n(2).is_ok());
        assert!(ctx.run_to_completion().is_ok()); // idempotente una vez completa

        let events = engine.events_for(run_id);
        assert!(events.iter().any(|e| matches!(e.kind, RunEventKind::RunCompleted { .. })));
    }

    #[test]
    fn failed_step_stops_the_run() {
        #[derive(Debug)]
        struct FailingStep;
        impl StepDefinition for FailingStep {
            fn id(&self) -> &str {
                "failing"
            }
            fn base_params(&self) -> serde_json::Value {
                json!({})
            }
            fn run(&self, _ctx: &crate::model::ExecutionContext) -> crate::step::StepRunResult {
                crate::step::StepRunResult::Failure { error: crate::errors::EngineError::StepFailed("sin traza".into()) }
            }
            fn kind(&self) -> StepKind {
                StepKind::Transform
            }
        }

        let mut engine: PipelineEngine<InMemoryEventStore, InMemoryRunRepository> = PipelineEngine::default();
        engine.set_default_definition(crate::repo::build_pipeline_definition_auto(vec![Box::new(SourceStep),
                                                                                       Box::new(FailingStep)]));
        let result = engine.run();
        assert!(result.is_err());
        let events = engine.events().expect("eventos");
        assert!(events.iter().any(|e| matches!(e.kind, RunEventKind::StepFailed { .. })));
        assert!(!events.iter().any(|e| matches!(e.kind, RunEventKind::RunCompleted { .. })));
    }
}
