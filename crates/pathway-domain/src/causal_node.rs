use serde::{Deserialize, Serialize};
use std::fmt;

/// Un nodo de evento dentro de un grafo causal. El `rank` se asigna durante
/// la colocación topológica y puede faltar en grafos recién parseados.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalNode {
    pub id: String,
    pub label: String,
    pub rank: Option<u32>,
}

impl CausalNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, rank: Option<u32>) -> Self {
        CausalNode { id: id.into(),
                     label: label.into(),
                     rank }
    }

    /// Un nodo de introducción corresponde a un agente inyectado por el
    /// simulador, no a una regla del modelo.
    pub fn is_intro(&self) -> bool {
        self.label.contains("Intro")
    }
}

impl fmt::Display for CausalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node id: \"{}\", label: \"{}\"", self.id, self.label)?;
        if let Some(r) = self.rank {
            write!(f, ", rank: {}", r)?;
        }
        Ok(())
    }
}
