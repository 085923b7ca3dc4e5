//! Tipos de repositorio: estado reconstruido (RunInstance) y definición
//! (PipelineDefinition).
//!
//! El repositorio aplica un replay lineal: consume eventos en orden y
//! actualiza un `RunInstance` por evento. No almacena artifacts completos
//! (sólo hashes) para mantener neutralidad.
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event::{RunEvent, RunEventKind};
use crate::step::{StepDefinition, StepStatus};

pub struct RunInstance {
    pub id: Uuid,
    pub steps: Vec<StepSlot>,
    pub cursor: usize,
    pub completed: bool,
}

/// Estado de un step en la instancia.
pub struct StepSlot {
    pub step_id: String,
    pub status: StepStatus,
    pub fingerprint: Option<String>,
    pub outputs: Vec<String>, // sólo hashes; los Artifacts viven en el engine
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Trait para reconstruir (`replay`) el estado de una corrida a partir de
/// sus eventos.
pub trait RunRepository {
    fn load(&self, run_id: Uuid, events: &[RunEvent], definition: &PipelineDefinition) -> RunInstance;
}

/// Definición inmutable del pipeline.
pub struct PipelineDefinition {
    pub steps: Vec<Box<dyn StepDefinition>>,
    pub definition_hash: String,
}

impl PipelineDefinition {
    pub fn new(steps: Vec<Box<dyn StepDefinition>>, definition_hash: String) -> Self {
        Self { steps, definition_hash }
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

pub struct InMemoryRunRepository;
impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InMemoryRunRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl RunRepository for InMemoryRunRepository {
    fn load(&self, run_id: Uuid, events: &[RunEvent], definition: &PipelineDefinition) -> RunInstance {
        let mut steps: Vec<StepSlot> = definition.steps
                                                 .iter()
                                                 .map(|s| StepSlot { step_id: s.id().to_string(),
                                                                     status: StepStatus::Pending,
                                                                     fingerprint: None,
                                                                     outputs: vec![],
                                                                     started_at: None,
                                                                     finished_at: None })
                                                 .collect();
        let mut completed = false;
        for event in events {
            match &event.kind {
                RunEventKind::RunInitialized { .. } => {}
                RunEventKind::StepStarted { step_index, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::Running;
                        slot.started_at = Some(event.ts);
                    }
                }
                RunEventKind::StepFinished { step_index,
                                             fingerprint,
                                             outputs,
                                             .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::FinishedOk;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.outputs = outputs.clone();
                        slot.finished_at = Some(event.ts);
                    }
                }
                RunEventKind::StepFailed { step_index, fingerprint, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::Failed;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.finished_at = Some(event.ts);
                    }
                }
                RunEventKind::RunCompleted { .. } => completed = true,
                RunEventKind::StepSignal { .. } => {}
            }
        }
        let cursor = steps.iter()
                          .position(|s| matches!(s.status, StepStatus::Pending))
                          .unwrap_or(steps.len());
        RunInstance { id: run_id,
                      steps,
                      cursor,
                      completed }
    }
}

pub fn build_pipeline_definition(step_ids: &[&str], steps: Vec<Box<dyn StepDefinition>>) -> PipelineDefinition {
    use crate::hashing::{hash_str, to_canonical_json};
    use serde_json::json;
    let ids_json = json!(step_ids);
    let canonical = to_canonical_json(&ids_json);
    let definition_hash = hash_str(&canonical);
    PipelineDefinition::new(steps, definition_hash)
}

/// Builder alternativo: recibe directamente los steps y extrae sus ids en
/// orden, sin mantener a mano el arreglo de ids.
pub fn build_pipeline_definition_auto(steps: Vec<Box<dyn StepDefinition>>) -> PipelineDefinition {
    let ids: Vec<String> = steps.iter().map(|s| s.id().to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
    build_pipeline_definition(&id_refs, steps)
}
