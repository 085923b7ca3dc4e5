//! Run context implementation

use uuid::Uuid;

use crate::engine::PipelineEngine;
use crate::errors::EngineError;
use crate::event::EventStore;
use crate::repo::RunRepository;
use crate::PipelineDefinition;

/// Contexto de ejecución para una corrida específica
///
/// Proporciona una API ergonómica para ejecutar pasos y gestionar el estado
/// de una corrida dentro de un PipelineEngine
pub struct RunCtx<'a, E: EventStore, R: RunRepository> {
    pub engine: &'a mut PipelineEngine<E, R>,
    pub run_id: Uuid,
    pub definition: &'a PipelineDefinition,
}

impl<'a, E: EventStore, R: RunRepository> RunCtx<'a, E, R> {
    /// Crea un nuevo contexto de corrida
    #[inline]
    pub fn new(engine: &'a mut PipelineEngine<E, R>, run_id: Uuid, definition: &'a PipelineDefinition) -> Self {
        Self { engine,
               run_id,
               definition }
    }

    /// Ejecuta el siguiente paso de la corrida
    #[inline]
    pub fn step(&mut self) -> Result<(), EngineError> {
        self.engine.next_with(self.run_id, self.definition)
    }

    /// Ejecuta hasta `n` pasos o hasta que ocurra un error terminal
    #[inline]
    pub fn run_n(&mut self, n: usize) -> Result<(), EngineError> {
        for _ in 0..n {
            match self.step() {
                Ok(()) => continue,
                Err(EngineError::RunCompleted) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Ejecuta pasos hasta que la corrida complete o falle
    #[inline]
    pub fn run_to_completion(&mut self) -> Result<(), EngineError> {
        loop {
            match self.step() {
                Ok(()) => continue,
                Err(EngineError::RunCompleted) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }
}
