//! pathway-adapters: pasos concretos del pipeline de extracción y acceso a
//! las herramientas externas (simulador, extractor de flujo, renderizador).

pub mod artifacts;
pub mod files;
pub mod steps;
pub mod tools;

pub use artifacts::{CoreSetArtifact, EventPathsArtifact, MergedCoresArtifact, ModelArtifact, PathwayArtifact,
                    TraceArtifact};
pub use steps::{AnnotateModelStep, AssemblePathwayStep, CollectCoresStep, ExtractCoresStep, LoopCoresStep,
                MergeCoresStep, SimulateStep};
