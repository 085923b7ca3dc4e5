//! Conversión de una vía de eventos (nodos = reglas) en una vía de especies
//! (nodos = especies producidas).
//!
//! Los nodos cuya regla modifica el estado de algún sitio pasan a llamarse
//! como la especie que producen; el resto se elimina reconectando sus
//! vecinos. A cada camino se le antepone un nodo sintético con los agentes
//! requeridos antes de la primera modificación.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::kappa_rule::{modified_agents, parse_rule, read_rules, species_label};
use crate::transform::{fuse_edges, merge_same_labels, rerank};
use crate::{CausalEdge, CausalGraph, CausalNode, DomainError, NodesType};

/// Convierte la vía de eventos en una vía de especies usando las reglas del
/// texto del modelo. El evento de interés se registra como pseudo-regla
/// observable.
pub fn to_species_pathway(graph: &mut CausalGraph, model_text: &str, eoi: &str) -> Result<(), DomainError> {
    let mut rules = read_rules(model_text);
    rules.insert(eoi.to_string(), format!("|{}|", eoi));

    let species_by_node = find_modification_nodes(graph, &rules)?;
    let mut protected: Vec<bool> = (0..graph.nodes.len()).map(|i| species_by_node.contains_key(&i)).collect();
    add_first_nodes(graph, &rules, &species_by_node, &mut protected)?;

    for (node, species) in &species_by_node {
        graph.nodes[*node].label = species.clone();
    }
    rebranch(graph, &mut protected);
    merge_same_labels(graph);
    fuse_edges(graph);
    rerank(graph);
    graph.occurrence = None;
    graph.nodes_type = NodesType::Species;
    Ok(())
}

/// Nodos cuya regla modifica al menos un sitio, con la especie que producen.
/// Si la forma Kappa de la especie coincide con el evento de interés, el
/// `eoi` del grafo se renombra a la forma corta.
fn find_modification_nodes(graph: &mut CausalGraph,
                           rules: &BTreeMap<String, String>)
                           -> Result<HashMap<usize, String>, DomainError> {
    let mut species_by_node = HashMap::new();
    for (index, node) in graph.nodes.iter().enumerate() {
        let rule = rules.get(&node.label)
                        .ok_or_else(|| DomainError::ValidationError(format!("regla desconocida: {}", node.label)))?;
        let agents = parse_rule(rule)?;
        let modified = modified_agents(&agents);
        if modified.is_empty() {
            continue;
        }
        let (species, kappa_species) = species_label(&modified);
        if graph.eoi.as_deref() == Some(kappa_species.as_str()) {
            graph.eoi = Some(species.clone());
        }
        species_by_node.insert(index, species);
    }
    Ok(species_by_node)
}

/// Antepone a cada camino un nodo con los agentes vistos antes del primer
/// nodo de modificación, excluyendo los tipos modificados. Sin agentes
/// requeridos se usa una arista de bucle sobre el propio nodo modificado.
fn add_first_nodes(graph: &mut CausalGraph,
                   rules: &BTreeMap<String, String>,
                   species_by_node: &HashMap<usize, String>,
                   protected: &mut Vec<bool>)
                   -> Result<(), DomainError> {
    let mut added_count = 0usize;
    for start in graph.start_nodes() {
        let mut current = start;
        let mut seen_types: Vec<String> = Vec::new();
        let mut visited: HashSet<usize> = HashSet::new();
        let mut path_weight = 0u64;
        let found = loop {
            if !visited.insert(current) {
                break None;
            }
            let rule = rules.get(&graph.nodes[current].label)
                            .ok_or_else(|| {
                                DomainError::ValidationError(format!("regla desconocida: {}",
                                                                     graph.nodes[current].label))
                            })?;
            for agent in parse_rule(rule)? {
                seen_types.push(agent.name);
            }
            if species_by_node.contains_key(&current) {
                break Some(current);
            }
            match graph.edges.iter().find(|e| e.source == current) {
                Some(edge) => {
                    path_weight = edge.weight;
                    current = edge.target;
                }
                None => break None,
            }
        };
        let modified_node = match found {
            Some(node) => node,
            None => continue,
        };

        let rule = &rules[&graph.nodes[modified_node].label];
        let modified_types: HashSet<String> =
            modified_agents(&parse_rule(rule)?).into_iter().map(|a| a.name).collect();
        let mut required: Vec<String> = Vec::new();
        for agent_type in seen_types {
            if !modified_types.contains(&agent_type) && !required.contains(&agent_type) {
                required.push(agent_type);
            }
        }
        if required.is_empty() {
            graph.edges.push(CausalEdge::new(modified_node, modified_node, path_weight));
        } else {
            added_count += 1;
            let id = format!("added{}", added_count);
            graph.nodes.push(CausalNode::new(id, required.join(", "), None));
            protected.push(true);
            graph.edges.push(CausalEdge::new(graph.nodes.len() - 1, modified_node, path_weight));
        }
        graph.nodes[modified_node].rank = Some(1);
    }
    Ok(())
}

/// Elimina los nodos no protegidos reconectando cada arista entrante con
/// cada saliente (peso de la entrante). Se procesa un nodo a la vez para que
/// las cadenas de nodos eliminados colapsen transitivamente.
fn rebranch(graph: &mut CausalGraph, protected: &mut Vec<bool>) {
    let mut index = graph.nodes.len();
    while index > 0 {
        index -= 1;
        if protected[index] {
            continue;
        }
        let mut ups: Vec<CausalEdge> = Vec::new();
        let mut downs: Vec<CausalEdge> = Vec::new();
        let mut kept: Vec<CausalEdge> = Vec::new();
        for edge in graph.edges.drain(..) {
            if edge.source == index && edge.target == index {
                // Bucle sobre un nodo eliminado: se descarta.
            } else if edge.target == index {
                ups.push(edge);
            } else if edge.source == index {
                downs.push(edge);
            } else {
                kept.push(edge);
            }
        }
        for up in &ups {
            for down in &downs {
                kept.push(CausalEdge::new(up.source, down.target, up.weight));
            }
        }
        graph.nodes.remove(index);
        protected.remove(index);
        for edge in kept.iter_mut() {
            if edge.source > index {
                edge.source -= 1;
            }
            if edge.target > index {
                edge.target -= 1;
            }
        }
        graph.edges = kept;
    }
    graph.sequentialize_ids();
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "\
'L binds R' L(s[./1]), R(s[./1]) @ 1.0\n\
'R phos' R(s[1] Y{u/p}) @ 0.5\n\
'A act' A(x{off/on}), R(Y{p}) @ 0.2\n";

    fn event_pathway() -> CausalGraph {
        // L binds R -> R phos -> A act, como vía de eventos re-rankeada.
        let mut g = CausalGraph::new(Some("A(x{on})".to_string()));
        g.nodes.push(CausalNode::new("node1", "L binds R", Some(1)));
        g.nodes.push(CausalNode::new("node2", "R phos", Some(2)));
        g.nodes.push(CausalNode::new("node3", "A act", Some(3)));
        g.edges.push(CausalEdge::new(0, 1, 4));
        g.edges.push(CausalEdge::new(1, 2, 2));
        g
    }

    #[test]
    fn conversion_relabels_modification_nodes() {
        let mut g = event_pathway();
        to_species_pathway(&mut g, MODEL, "A(x{on})").expect("conversion");
        assert_eq!(g.nodes_type, NodesType::Species);
        assert_eq!(g.occurrence, None);
        let labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
        assert!(labels.contains(&"R-Y"));
        assert!(labels.contains(&"A-x"));
        // El nodo de enlace no modifica estados y desaparece.
        assert!(!labels.contains(&"L binds R"));
    }

    #[test]
    fn conversion_adds_required_agents_first_node() {
        let mut g = event_pathway();
        to_species_pathway(&mut g, MODEL, "A(x{on})").expect("conversion");
        // L y R se vieron antes de la primera modificación; R se modifica,
        // L queda como agente requerido.
        let labels: Vec<&str> = g.nodes.iter().map(|n| n.label.as_str()).collect();
        assert!(labels.iter().any(|l| l.contains('L')), "labels: {:?}", labels);
    }

    #[test]
    fn conversion_renames_eoi_to_short_form() {
        // La forma Kappa de la especie de 'A act' coincide con el EOI.
        let mut g = event_pathway();
        to_species_pathway(&mut g, MODEL, "A(x{on})").expect("conversion");
        assert_eq!(g.eoi.as_deref(), Some("A-x"));
    }

    #[test]
    fn rebranch_collapses_chains() {
        let mut g = CausalGraph::new(None);
        g.nodes.push(CausalNode::new("node1", "a", Some(1)));
        g.nodes.push(CausalNode::new("node2", "b", Some(2)));
        g.nodes.push(CausalNode::new("node3", "c", Some(3)));
        g.nodes.push(CausalNode::new("node4", "d", Some(4)));
        g.edges.push(CausalEdge::new(0, 1, 5));
        g.edges.push(CausalEdge::new(1, 2, 3));
        g.edges.push(CausalEdge::new(2, 3, 2));
        let mut protected = vec![true, false, false, true];
        rebranch(&mut g, &mut protected);
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.nodes[g.edges[0].source].label, "a");
        assert_eq!(g.nodes[g.edges[0].target].label, "d");
        assert_eq!(g.edges[0].weight, 5);
    }
}
