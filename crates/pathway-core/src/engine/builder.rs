//! Builder para `PipelineEngine`.
//!
//! Patrón builder seguro en tiempo de compilación que obliga a declarar el
//! primer paso (fuente) y encadenar pasos cuyos tipos de entrada y salida
//! sean compatibles.
//!
//! Notas de diseño
//! - `EngineBuilderInit` representa el estado inicial del builder: stores
//!   (event_store + repository) deben estar presentes.
//! - `EngineBuilder<S, E, R>` mantiene el último tipo de salida conocido
//!   `S::Output` (mediante `PhantomData`) y la lista de pasos en forma de
//!   `Vec<Box<dyn StepDefinition>>`.
//! - El método `add_step` impone en sus bounds que la entrada del siguiente
//!   paso sea compatible con la salida del paso anterior usando `SameAs`.
//!
//! Construcción típica:
//!
//! ```ignore
//! let engine = PipelineEngine::new()
//!     .first_step(AnnotateModelStep::new(model, eoi))
//!     .add_step(SimulateStep::new(kasim, params))
//!     .add_step(ExtractCoresStep::new(kaflow))
//!     .build();
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;

use crate::engine::PipelineEngine;
use crate::event::EventStore;
use crate::repo::RunRepository;
use crate::step::{SameAs, StepDefinition, TypedStep};

/// Estado inicial del builder.
///
/// Contiene las stores necesarias para crear un `PipelineEngine`. Antes de
/// poder añadir pasos debemos definir el primer paso (de tipo `Source`).
pub struct EngineBuilderInit<E: EventStore, R: RunRepository> {
    /// Store de eventos que usará el engine.
    pub event_store: E,
    /// Repositorio de estado de corridas.
    pub repository: R,
}

impl<E: EventStore, R: RunRepository> EngineBuilderInit<E, R> {
    /// Define el primer paso del pipeline y transiciona al builder completo.
    ///
    /// El primer paso conceptualmente debe ser una fuente; se verifica con
    /// `debug_assert!` durante el desarrollo.
    #[inline]
    pub fn first_step<S>(self, step: S) -> EngineBuilder<S, E, R>
        where S: TypedStep + Debug + 'static
    {
        debug_assert!(matches!(<S as TypedStep>::kind(&step), crate::step::StepKind::Source),
                      "El primer paso debe ser de tipo Source",);

        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        steps: vec![Box::new(step)],
                        _out: PhantomData::<S::Output> }
    }
}

/// Builder principal que acumula pasos y garantiza compatibilidad de tipos.
///
/// El parámetro genérico `S` representa el tipo del último `TypedStep`
/// añadido; su asociado `S::Output` se conserva en `_out` para imponer
/// restricciones en el siguiente `add_step`.
pub struct EngineBuilder<S: TypedStep + Debug + 'static, E: EventStore, R: RunRepository> {
    event_store: E,
    repository: R,
    /// Lista de pasos que conforman la definición del pipeline.
    steps: Vec<Box<dyn StepDefinition>>,
    /// Marcador de tipo para el output del último paso añadido.
    _out: PhantomData<S::Output>,
}

impl<S: TypedStep + Debug + 'static, E: EventStore, R: RunRepository> EngineBuilder<S, E, R> {
    /// Añade un siguiente paso al pipeline.
    ///
    /// La comprobación `N::Input: SameAs<S::Output>` asegura que la entrada
    /// del nuevo paso `N` es compatible con la salida del paso anterior `S`.
    #[inline]
    pub fn add_step<N>(mut self, next: N) -> EngineBuilder<N, E, R>
        where N: TypedStep + Debug + 'static,
              N::Input: SameAs<S::Output>
    {
        self.steps.push(Box::new(next));

        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        steps: self.steps,
                        _out: PhantomData }
    }

    /// Construye el `PipelineEngine` final usando las stores y la lista de
    /// pasos. Genera automáticamente la definición del pipeline y la
    /// establece como definición por defecto del engine.
    #[inline]
    pub fn build(self) -> PipelineEngine<E, R> {
        let mut engine = PipelineEngine::new_with_stores(self.event_store, self.repository);
        let definition = crate::repo::build_pipeline_definition_auto(self.steps);
        engine.set_default_definition(definition);
        engine
    }
}
