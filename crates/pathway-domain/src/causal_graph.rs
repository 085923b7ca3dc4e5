use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;

use crate::{CausalEdge, CausalNode};

/// Clase de nodos que contiene un grafo: eventos (reglas del modelo) o
/// especies (resultado de la conversión final).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodesType {
    Event,
    Species,
}

impl NodesType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodesType::Event => "event",
            NodesType::Species => "species",
        }
    }

    pub fn from_label(label: &str) -> Self {
        if label == "species" {
            NodesType::Species
        } else {
            NodesType::Event
        }
    }
}

/// Grafo causal: la estructura de datos compartida por todas las etapas de
/// condensación.
///
/// Invariantes:
/// - Las aristas referencian nodos por índice; toda mutación estructural debe
///   pasar por los helpers de `transform` que remapean índices.
/// - `occurrence` cuenta cuántos núcleos equivalentes representa el grafo;
///   `None` suprime la etiqueta de ocurrencia al escribir DOT.
/// - `prevcores` conserva los números de los núcleos originales fusionados.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalGraph {
    pub eoi: Option<String>,
    pub nodes_type: NodesType,
    pub occurrence: Option<u64>,
    pub prevcores: Option<Vec<u64>>,
    pub nodes: Vec<CausalNode>,
    pub edges: Vec<CausalEdge>,
}

impl CausalGraph {
    pub fn new(eoi: Option<String>) -> Self {
        CausalGraph { eoi,
                      nodes_type: NodesType::Event,
                      occurrence: Some(1),
                      prevcores: None,
                      nodes: Vec::new(),
                      edges: Vec::new() }
    }

    /// Rank más alto presente en el grafo, ignorando nodos sin rank.
    pub fn max_rank(&self) -> Option<u32> {
        self.nodes.iter().filter_map(|n| n.rank).max()
    }

    /// Nodos iniciales. Con ranks asignados son los de rank uno; sin ranks
    /// son los nodos que nunca aparecen como destino. Puede fallar en grafos
    /// cíclicos sin ranks, lo cual no ocurre en el flujo actual.
    pub fn start_nodes(&self) -> Vec<usize> {
        let mut starts: Vec<usize> = (0..self.nodes.len()).filter(|&i| self.nodes[i].rank == Some(1))
                                                          .collect();
        if starts.is_empty() {
            let targets: HashSet<usize> = self.edges.iter().map(|e| e.target).collect();
            starts = (0..self.nodes.len()).filter(|i| !targets.contains(i)).collect();
        }
        starts
    }

    /// Nodos finales: los de rank máximo, o los que nunca aparecen como
    /// origen cuando no hay ranks.
    pub fn end_nodes(&self) -> Vec<usize> {
        let mut ends: Vec<usize> = Vec::new();
        if let Some(max) = self.max_rank() {
            ends = (0..self.nodes.len()).filter(|&i| self.nodes[i].rank == Some(max))
                                        .collect();
        }
        if ends.is_empty() {
            let sources: HashSet<usize> = self.edges.iter().map(|e| e.source).collect();
            ends = (0..self.nodes.len()).filter(|i| !sources.contains(i)).collect();
        }
        ends
    }

    /// Coloca ranks en un núcleo recién parseado que no los trae.
    ///
    /// Un nodo se coloca cuando todos sus padres están colocados y recibe
    /// `max(rank de los padres) + 1`; los padres sin rank reciben el rank
    /// previo. Los nodos sin padres quedan en rank uno.
    pub fn assign_ranks(&mut self) {
        let starts = self.start_nodes();
        let mut placed: HashSet<usize> = starts.into_iter().collect();
        let mut pending: Vec<usize> = (0..self.nodes.len()).filter(|i| !placed.contains(i)).collect();
        while !pending.is_empty() {
            let mut newly_placed: Vec<usize> = Vec::new();
            for &node in &pending {
                let parents: Vec<usize> = self.edges
                                              .iter()
                                              .filter(|e| e.target == node)
                                              .map(|e| e.source)
                                              .collect();
                if !parents.iter().all(|p| placed.contains(p)) {
                    continue;
                }
                let parent_ranks: Vec<u32> = parents.iter().filter_map(|&p| self.nodes[p].rank).collect();
                if parent_ranks.is_empty() {
                    self.nodes[node].rank = Some(2);
                    for &p in &parents {
                        self.nodes[p].rank = Some(1);
                    }
                } else {
                    let highest = *parent_ranks.iter().max().expect("non-empty ranks");
                    self.nodes[node].rank = Some(highest + 1);
                    for &p in &parents {
                        if self.nodes[p].rank.is_none() {
                            self.nodes[p].rank = Some(highest);
                        }
                    }
                }
                newly_placed.push(node);
            }
            if newly_placed.is_empty() {
                // Ciclo sin ranks: no hay colocación válida posible.
                log::warn!("colocación de ranks interrumpida: {} nodos sin colocar", pending.len());
                break;
            }
            for node in newly_placed {
                placed.insert(node);
                pending.retain(|&n| n != node);
            }
        }
    }

    /// Reasigna ids secuenciales `node1..nodeN` en orden de rank y ordena las
    /// aristas por rank del origen. Elimina los números de evento que trae el
    /// extractor de flujo.
    pub fn sequentialize_ids(&mut self) {
        let max = match self.max_rank() {
            Some(m) => m,
            None => return,
        };
        let mut number = 1usize;
        for rank in 1..=max {
            for node in self.nodes.iter_mut() {
                if node.rank == Some(rank) {
                    node.id = format!("node{}", number);
                    number += 1;
                }
            }
        }
        let mut reordered = self.edges.clone();
        reordered.sort_by_key(|e| self.nodes[e.source].rank.unwrap_or(0));
        self.edges = reordered;
    }

    /// Firma estructural del grafo: digest sobre el rank máximo y el multiset
    /// de aristas proyectadas a (etiqueta, rank) de origen y destino. Dos
    /// grafos son equivalentes exactamente cuando comparten firma: mismas
    /// relaciones entre las mismas reglas a los mismos ranks, sin importar
    /// los números de evento ni los pesos.
    pub fn signature(&self) -> String {
        let mut keys: Vec<String> = self.edges.iter().map(|e| self.edge_key(e)).collect();
        keys.sort();
        let mut hasher = Sha256::new();
        hasher.update(self.max_rank().unwrap_or(0).to_le_bytes());
        for key in &keys {
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Clave de equivalencia de una arista: etiquetas y ranks de sus extremos.
    pub fn edge_key(&self, edge: &CausalEdge) -> String {
        let s = &self.nodes[edge.source];
        let t = &self.nodes[edge.target];
        format!("{}@{}>{}@{}",
                s.label,
                s.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
                t.label,
                t.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into()))
    }
}

impl fmt::Display for CausalGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CausalGraph")?;
        if let Some(occ) = self.occurrence {
            write!(f, ", Occurrence = {}", occ)?;
        }
        writeln!(f)?;
        for edge in &self.edges {
            writeln!(f,
                     "Edge source) {}, target) {}, weight: {}",
                     self.nodes[edge.source], self.nodes[edge.target], edge.weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_graph() -> CausalGraph {
        // a -> b -> c, sin ranks
        let mut g = CausalGraph::new(Some("c".into()));
        g.nodes.push(CausalNode::new("node1", "a", None));
        g.nodes.push(CausalNode::new("node2", "b", None));
        g.nodes.push(CausalNode::new("node3", "c", None));
        g.edges.push(CausalEdge::new(0, 1, 1));
        g.edges.push(CausalEdge::new(1, 2, 1));
        g
    }

    #[test]
    fn assign_ranks_places_chain_topologically() {
        let mut g = chain_graph();
        g.assign_ranks();
        assert_eq!(g.nodes[0].rank, Some(1));
        assert_eq!(g.nodes[1].rank, Some(2));
        assert_eq!(g.nodes[2].rank, Some(3));
        assert_eq!(g.max_rank(), Some(3));
    }

    #[test]
    fn start_nodes_fall_back_to_non_targets() {
        let g = chain_graph();
        assert_eq!(g.start_nodes(), vec![0]);
        assert_eq!(g.end_nodes(), vec![2]);
    }

    #[test]
    fn assign_ranks_joins_branches_at_highest_parent() {
        // a -> c, b -> c, c -> d: c debe quedar por encima de ambos padres
        let mut g = CausalGraph::new(None);
        g.nodes.push(CausalNode::new("node1", "a", None));
        g.nodes.push(CausalNode::new("node2", "b", None));
        g.nodes.push(CausalNode::new("node3", "c", None));
        g.nodes.push(CausalNode::new("node4", "d", None));
        g.edges.push(CausalEdge::new(0, 2, 1));
        g.edges.push(CausalEdge::new(1, 2, 1));
        g.edges.push(CausalEdge::new(2, 3, 1));
        g.assign_ranks();
        assert_eq!(g.nodes[2].rank, Some(2));
        assert_eq!(g.nodes[3].rank, Some(3));
    }

    #[test]
    fn signature_ignores_event_ids_and_weights() {
        let mut g1 = chain_graph();
        g1.assign_ranks();
        let mut g2 = chain_graph();
        g2.assign_ranks();
        g2.nodes[0].id = "node99".into();
        g2.edges[0].weight = 7;
        assert_eq!(g1.signature(), g2.signature());
    }

    #[test]
    fn signature_is_rank_sensitive() {
        let mut g1 = chain_graph();
        g1.assign_ranks();
        let mut g2 = chain_graph();
        g2.assign_ranks();
        g2.nodes[2].rank = Some(5);
        assert_ne!(g1.signature(), g2.signature());
    }

    #[test]
    fn sequentialize_renames_in_rank_order() {
        let mut g = chain_graph();
        g.assign_ranks();
        g.nodes[0].id = "node42".into();
        g.sequentialize_ids();
        assert_eq!(g.nodes[0].id, "node1");
        assert_eq!(g.nodes[1].id, "node2");
        assert_eq!(g.nodes[2].id, "node3");
    }
}
