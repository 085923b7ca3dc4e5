//! Core PipelineEngine implementation

use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::engine::EngineBuilderInit;
use crate::errors::EngineError;
use crate::event::{EventStore, RunEventKind};
use crate::hashing::hash_value;
use crate::model::{Artifact, ExecutionContext, StepFingerprintInput};
use crate::repo::{PipelineDefinition, RunRepository};
use crate::StepDefinition;

/// Motor de ejecución de pipelines deterministas
///
/// Responsable de orquestar la ejecución de pasos, mantener el estado
/// interno y garantizar el determinismo mediante fingerprints
pub struct PipelineEngine<E, R>
    where E: EventStore,
          R: RunRepository
{
    event_store: E,
    repository: R,
    artifact_store: HashMap<String, Artifact>,
    default_run_id: Option<Uuid>,
    default_definition: Option<PipelineDefinition>,
}

impl<E, R> PipelineEngine<E, R>
    where E: EventStore,
          R: RunRepository
{
    /// Crea un nuevo builder para configurar el engine
    #[inline]
    pub fn builder(event_store: E, repository: R) -> EngineBuilderInit<E, R> {
        EngineBuilderInit { event_store, repository }
    }

    /// Crea un nuevo builder con stores en memoria
    #[inline]
    pub fn new() -> EngineBuilderInit<crate::event::InMemoryEventStore, crate::repo::InMemoryRunRepository> {
        EngineBuilderInit { event_store: crate::event::InMemoryEventStore::default(),
                            repository: crate::repo::InMemoryRunRepository::new() }
    }

    /// Crea un nuevo motor con los stores proporcionados
    pub fn new_with_stores(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               artifact_store: HashMap::new(),
               default_run_id: None,
               default_definition: None }
    }

    /// Acceso de sólo lectura al event store
    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Recupera un artifact por su hash
    pub fn get_artifact(&self, hash: &str) -> Option<&Artifact> {
        self.artifact_store.get(hash)
    }

    /// Almacena un artifact en la cache local
    pub fn store_artifact(&mut self, artifact: Artifact) {
        self.artifact_store.insert(artifact.hash.clone(), artifact);
    }

    /// Garantiza el evento `RunInitialized` y devuelve los eventos actuales
    /// de la corrida (incluido el recién agregado si hizo falta).
    fn load_or_init(&mut self, run_id: Uuid, definition: &PipelineDefinition) -> Vec<crate::event::RunEvent> {
        let mut events = self.event_store.list(run_id);
        let has_init = events.iter().any(|e| matches!(e.kind, RunEventKind::RunInitialized { .. }));
        if !has_init {
            let event = self.event_store
                            .append_kind(run_id,
                                         RunEventKind::RunInitialized { definition_hash: definition.definition_hash
                                                                                                   .clone(),
                                                                        step_count: definition.len() });
            events.push(event);
        }
        self.default_run_id = Some(run_id);
        events
    }

    /// Define/genera un `run_id` por defecto si no existe aún y lo retorna.
    pub fn ensure_default_run_id(&mut self) -> Uuid {
        if self.default_run_id.is_none() {
            self.default_run_id = Some(Uuid::new_v4());
        }
        self.default_run_id.unwrap()
    }

    /// Fija explícitamente un `run_id` por defecto.
    pub fn set_default_run_id(&mut self, run_id: Uuid) {
        self.default_run_id = Some(run_id);
    }

    /// Obtiene el `run_id` por defecto si está configurado.
    pub fn default_run_id(&self) -> Option<Uuid> {
        self.default_run_id
    }

    /// Configura la definición por defecto del pipeline
    pub fn set_default_definition(&mut self, definition: PipelineDefinition) {
        self.default_definition = Some(definition);
    }

    /// Definición por defecto, si está configurada.
    pub fn default_definition(&self) -> Option<&PipelineDefinition> {
        self.default_definition.as_ref()
    }

    fn hash_and_store_outputs(&mut self, outputs: &mut [Artifact]) -> Vec<String> {
        let mut hashes: Vec<String> = Vec::with_capacity(outputs.len());
        for output in outputs.iter_mut() {
            let hash = hash_value(&output.payload);
            output.hash = hash.clone();
            self.store_artifact(output.clone());
            hashes.push(hash);
        }
        hashes
    }

    /// Ejecuta el pipeline completo y retorna el ID de la corrida
    pub fn run(&mut self) -> Result<Uuid, EngineError> {
        self.run_to_completion()
    }

    /// Avanza un paso en la ejecución del pipeline
    pub fn step(&mut self) -> Result<(), EngineError> {
        self.next()
    }

    /// Obtiene los eventos de la corrida por defecto
    pub fn get_events(&self) -> Option<Vec<crate::event::RunEvent>> {
        self.events()
    }

    /// Ejecuta el pipeline completo usando la definición por defecto
    pub fn run_to_completion(&mut self) -> Result<Uuid, EngineError> {
        let run_id = self.ensure_default_run_id();
        let definition = self.default_definition
                             .take()
                             .ok_or_else(|| EngineError::Internal("no default definition configured".into()))?;

        let result = self.run_pipeline_to_completion(run_id, &definition);
        self.default_definition = Some(definition);
        result
    }

    /// Ejecuta una corrida específica hasta su finalización
    pub fn run_pipeline_to_completion(&mut self,
                                      run_id: Uuid,
                                      definition: &PipelineDefinition)
                                      -> Result<Uuid, EngineError> {
        loop {
            match self.next_with(run_id, definition) {
                Ok(()) => continue,
                Err(EngineError::RunCompleted) => return Ok(run_id),
                Err(e) => return Err(e),
            }
        }
    }

    /// Ejecuta el siguiente paso pendiente de la corrida
    pub(crate) fn next_with(&mut self, run_id: Uuid, definition: &PipelineDefinition) -> Result<(), EngineError> {
        let events = self.load_or_init(run_id, definition);
        let instance = self.repository.load(run_id, &events, definition);

        if instance.completed {
            return Err(EngineError::RunCompleted);
        }

        let cursor = instance.cursor;
        if cursor >= definition.len() {
            return Err(EngineError::RunCompleted);
        }

        let step_def = definition.steps[cursor].as_ref();
        let input = if cursor == 0 {
            None
        } else {
            instance.steps
                    .get(cursor - 1)
                    .and_then(|s| s.outputs.first())
                    .and_then(|h| self.artifact_store.get(h).cloned())
        };

        let ctx = ExecutionContext { input,
                                     params: step_def.base_params() };

        let _started = self.event_store.append_kind(run_id,
                                                    RunEventKind::StepStarted { step_index: cursor,
                                                                                step_id: step_def.id().to_string() });

        let run_res = step_def.run(&ctx);

        match run_res {
            crate::step::StepRunResult::Success { outputs } => {
                self.handle_step_success(run_id, cursor, step_def, outputs, Vec::new(), definition)
            }
            crate::step::StepRunResult::SuccessWithSignals { outputs, signals } => {
                self.handle_step_success(run_id, cursor, step_def, outputs, signals, definition)
            }
            crate::step::StepRunResult::Failure { error } => self.handle_step_failure(run_id, cursor, step_def, error),
        }
    }

    fn handle_step_success(&mut self,
                           run_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           mut outputs: Vec<Artifact>,
                           signals: Vec<crate::step::StepSignal>,
                           definition: &PipelineDefinition)
                           -> Result<(), EngineError> {
        let output_hashes = self.hash_and_store_outputs(&mut outputs);

        for signal in signals {
            let _ = self.event_store.append_kind(run_id,
                                                 RunEventKind::StepSignal { step_index: cursor,
                                                                            step_id: step_def.id().to_string(),
                                                                            signal: signal.signal,
                                                                            data: signal.data });
        }

        let fingerprint = self.calculate_step_fingerprint(cursor, step_def, &output_hashes, definition);

        let _finished = self.event_store.append_kind(run_id,
                                                     RunEventKind::StepFinished { step_index: cursor,
                                                                                  step_id: step_def.id().to_string(),
                                                                                  outputs: output_hashes.clone(),
                                                                                  fingerprint });

        if cursor + 1 == definition.len() {
            self.complete_run(run_id, definition);
        }

        Ok(())
    }

    fn handle_step_failure(&mut self,
                           run_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           error: EngineError)
                           -> Result<(), EngineError> {
        let fp_json = json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "definition_hash": step_def.definition_hash(),
            "step_index": cursor,
            "params": step_def.base_params()
        });
        let fingerprint = hash_value(&fp_json);

        let _ = self.event_store.append_kind(run_id,
                                             RunEventKind::StepFailed { step_index: cursor,
                                                                        step_id: step_def.id().to_string(),
                                                                        error: error.clone(),
                                                                        fingerprint });

        Err(error)
    }

    fn calculate_step_fingerprint(&self,
                                  cursor: usize,
                                  step_def: &dyn StepDefinition,
                                  output_hashes: &[String],
                                  definition: &PipelineDefinition)
                                  -> String {
        let params = step_def.base_params();
        let input = StepFingerprintInput { engine_version: crate::constants::ENGINE_VERSION,
                                           definition_hash: &definition.definition_hash,
                                           step_index: cursor,
                                           output_hashes,
                                           params: &params };
        let fp_json = serde_json::to_value(&input).expect("serialize fingerprint input");
        hash_value(&fp_json)
    }

    fn complete_run(&mut self, run_id: Uuid, definition: &PipelineDefinition) {
        let events = self.event_store.list(run_id);
        let step_fps: Vec<String> = events.iter()
                                          .filter_map(|e| match &e.kind {
                                              RunEventKind::StepFinished { fingerprint, .. } => {
                                                  Some(fingerprint.clone())
                                              }
                                              _ => None,
                                          })
                                          .collect();

        let run_fp = hash_value(&json!({
                                    "engine_version": crate::constants::ENGINE_VERSION,
                                    "definition_hash": definition.definition_hash,
                                    "step_fingerprints": step_fps
                                }));

        let _ = self.event_store
                    .append_kind(run_id, RunEventKind::RunCompleted { run_fingerprint: run_fp });
    }

    /// Avanza un paso en la corrida por defecto
    pub fn next(&mut self) -> Result<(), EngineError> {
        let run_id = self.ensure_default_run_id();
        let definition = self.default_definition
                             .take()
                             .ok_or_else(|| EngineError::Internal("no default definition configured".into()))?;

        let result = self.next_with(run_id, &definition);
        self.default_definition = Some(definition);
        result
    }

    /// Lista eventos de la corrida por defecto
    pub fn events(&self) -> Option<Vec<crate::event::RunEvent>> {
        self.default_run_id.map(|rid| self.event_store.list(rid))
    }

    /// Lista eventos de una corrida específica
    pub fn events_for(&self, run_id: Uuid) -> Vec<crate::event::RunEvent> {
        self.event_store.list(run_id)
    }

    /// Variante compacta de eventos para la corrida por defecto
    pub fn event_variants(&self) -> Option<Vec<&'static str>> {
        self.events().map(|events| {
                         events.iter()
                               .map(|e| match e.kind {
                                   RunEventKind::RunInitialized { .. } => "I",
                                   RunEventKind::StepStarted { .. } => "S",
                                   RunEventKind::StepFinished { .. } => "F",
                                   RunEventKind::StepFailed { .. } => "X",
                                   RunEventKind::StepSignal { .. } => "G",
                                   RunEventKind::RunCompleted { .. } => "C",
                               })
                               .collect()
                     })
    }

    /// Fingerprint de la corrida por defecto si está presente
    pub fn run_fingerprint(&self) -> Option<String> {
        let events = self.events()?;
        events.iter().rev().find_map(|e| match &e.kind {
                               RunEventKind::RunCompleted { run_fingerprint } => Some(run_fingerprint.clone()),
                               _ => None,
                           })
    }
}

impl Default for PipelineEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryRunRepository> {
    fn default() -> Self {
        Self::new_with_stores(crate::event::InMemoryEventStore::default(),
                              crate::repo::InMemoryRunRepository::new())
    }
}
