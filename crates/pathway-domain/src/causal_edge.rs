use serde::{Deserialize, Serialize};

/// Relación causal entre dos nodos de un `CausalGraph`. Los extremos son
/// índices dentro del vector de nodos del grafo propietario; el peso cuenta
/// cuántas veces se observó la relación entre núcleos equivalentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalEdge {
    pub source: usize,
    pub target: usize,
    pub weight: u64,
}

impl CausalEdge {
    pub fn new(source: usize, target: usize, weight: u64) -> Self {
        CausalEdge { source, target, weight }
    }
}
