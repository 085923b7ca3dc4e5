//! Steps del pipeline de extracción, en orden de encadenamiento.

pub mod annotate;
pub mod assemble;
pub mod collect;
pub mod extract;
pub mod merge;
pub mod refine;
pub mod simulate;

pub use annotate::AnnotateModelStep;
pub use assemble::{AssemblePathwayStep, AssembleParams};
pub use collect::CollectCoresStep;
pub use extract::ExtractCoresStep;
pub use merge::{MergeCoresStep, MergeParams};
pub use refine::{LoopCoresStep, LoopParams};
pub use simulate::{SimulateParams, SimulateStep};
