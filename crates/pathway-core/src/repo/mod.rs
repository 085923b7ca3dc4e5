pub mod types;
pub use types::{RunInstance, RunRepository, StepSlot};
pub use types::{build_pipeline_definition, build_pipeline_definition_auto, InMemoryRunRepository, PipelineDefinition};
