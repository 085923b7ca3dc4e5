//! Transformaciones estructurales sobre `CausalGraph`.
//!
//! Estas operaciones implementan la etapa de plegado de bucles: eliminar
//! introducciones y reglas ignoradas, fusionar nodos de igual etiqueta y
//! re-rankear por camino más largo. Todas remapean índices de aristas al
//! eliminar nodos.

use std::collections::{HashMap, HashSet};

use crate::{CausalEdge, CausalGraph};

/// Elimina del grafo los nodos indicados junto con sus aristas incidentes,
/// remapeando los índices de las aristas restantes.
pub fn remove_nodes(graph: &mut CausalGraph, doomed: &HashSet<usize>) {
    if doomed.is_empty() {
        return;
    }
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(graph.nodes.len() - doomed.len());
    for (index, node) in graph.nodes.drain(..).enumerate() {
        if !doomed.contains(&index) {
            remap.insert(index, kept.len());
            kept.push(node);
        }
    }
    graph.nodes = kept;
    let surviving: Vec<CausalEdge> = graph.edges
                                          .iter()
                                          .filter(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target))
                                          .map(|e| CausalEdge::new(remap[&e.source], remap[&e.target], e.weight))
                                          .collect();
    graph.edges = surviving;
}

/// Elimina los nodos de introducción y baja en uno el rank de los restantes.
pub fn remove_intro(graph: &mut CausalGraph) {
    let doomed: HashSet<usize> = (0..graph.nodes.len()).filter(|&i| graph.nodes[i].is_intro())
                                                       .collect();
    remove_nodes(graph, &doomed);
    for node in graph.nodes.iter_mut() {
        if let Some(rank) = node.rank {
            node.rank = Some(rank.saturating_sub(1).max(1));
        }
    }
    graph.sequentialize_ids();
}

/// Elimina los nodos cuya etiqueta contiene alguna subcadena de la lista de
/// ignorados.
pub fn remove_ignored(graph: &mut CausalGraph, ignore: &[String]) {
    if ignore.is_empty() {
        return;
    }
    let doomed: HashSet<usize> =
        (0..graph.nodes.len()).filter(|&i| ignore.iter().any(|s| graph.nodes[i].label.contains(s.as_str())))
                              .collect();
    remove_nodes(graph, &doomed);
    graph.sequentialize_ids();
}

/// Fusiona todos los nodos de igual etiqueta sobre el de rank más bajo,
/// redirigiendo sus aristas. El primer nodo con el rank mínimo gana.
pub fn merge_same_labels(graph: &mut CausalGraph) {
    let mut by_label: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, node) in graph.nodes.iter().enumerate() {
        by_label.entry(node.label.clone()).or_default().push(index);
    }
    let mut redirect: HashMap<usize, usize> = HashMap::new();
    let mut doomed: HashSet<usize> = HashSet::new();
    for indices in by_label.values() {
        if indices.len() < 2 {
            continue;
        }
        let main = *indices.iter()
                           .min_by_key(|&&i| graph.nodes[i].rank.unwrap_or(u32::MAX))
                           .expect("non-empty group");
        for &other in indices {
            if other != main {
                redirect.insert(other, main);
                doomed.insert(other);
            }
        }
    }
    if doomed.is_empty() {
        return;
    }
    for edge in graph.edges.iter_mut() {
        if let Some(&main) = redirect.get(&edge.source) {
            edge.source = main;
        }
        if let Some(&main) = redirect.get(&edge.target) {
            edge.target = main;
        }
    }
    remove_nodes(graph, &doomed);
    graph.sequentialize_ids();
}

/// Colapsa aristas duplicadas entre el mismo par de nodos sumando pesos.
/// Se conserva el orden de primera aparición.
pub fn fuse_edges(graph: &mut CausalGraph) {
    let mut totals: HashMap<(usize, usize), u64> = HashMap::new();
    let mut order: Vec<(usize, usize)> = Vec::new();
    for edge in &graph.edges {
        let key = (edge.source, edge.target);
        if !totals.contains_key(&key) {
            order.push(key);
        }
        *totals.entry(key).or_insert(0) += edge.weight;
    }
    graph.edges = order.into_iter()
                       .map(|(source, target)| CausalEdge::new(source, target, totals[&(source, target)]))
                       .collect();
    graph.sequentialize_ids();
}

/// Reasigna el rank de cada nodo como la longitud del camino ascendente sin
/// bucles más largo hasta un nodo inicial.
pub fn rerank(graph: &mut CausalGraph) {
    let starts: HashSet<usize> = graph.start_nodes().into_iter().collect();
    let mut new_ranks: Vec<Option<u32>> = Vec::with_capacity(graph.nodes.len());
    for node in 0..graph.nodes.len() {
        let mut on_path = HashSet::new();
        let mut best = longest_climb(graph, node, &starts, &mut on_path, false);
        if best.is_none() {
            // Ningún camino sin bucles alcanza un nodo inicial: se toma el
            // camino más largo hasta un nodo sin padres.
            log::warn!("nodo \"{}\" sin camino a los nodos iniciales", graph.nodes[node].label);
            let mut on_path = HashSet::new();
            best = longest_climb(graph, node, &starts, &mut on_path, true);
        }
        new_ranks.push(best);
    }
    for (node, rank) in new_ranks.into_iter().enumerate() {
        graph.nodes[node].rank = rank.or(Some(1));
    }
    graph.sequentialize_ids();
}

/// Camino ascendente sin bucles más largo desde `node` hasta los nodos
/// iniciales, en cantidad de nodos. Con `accept_orphans` un nodo sin padres
/// también cuenta como terminal.
fn longest_climb(graph: &CausalGraph,
                 node: usize,
                 starts: &HashSet<usize>,
                 on_path: &mut HashSet<usize>,
                 accept_orphans: bool)
                 -> Option<u32> {
    if starts.contains(&node) {
        return Some(1);
    }
    on_path.insert(node);
    let mut best: Option<u32> = None;
    let mut has_parent = false;
    for edge in &graph.edges {
        if edge.target != node || on_path.contains(&edge.source) {
            continue;
        }
        has_parent = true;
        if let Some(length) = longest_climb(graph, edge.source, starts, on_path, accept_orphans) {
            best = Some(best.map_or(length + 1, |b| b.max(length + 1)));
        }
    }
    on_path.remove(&node);
    if !has_parent && accept_orphans {
        return Some(1);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CausalNode;

    fn graph_with(labels: &[(&str, u32)], edges: &[(usize, usize, u64)]) -> CausalGraph {
        let mut g = CausalGraph::new(Some(labels.last().unwrap().0.to_string()));
        for (index, (label, rank)) in labels.iter().enumerate() {
            g.nodes.push(CausalNode::new(format!("node{}", index + 1), *label, Some(*rank)));
        }
        for &(s, t, w) in edges {
            g.edges.push(CausalEdge::new(s, t, w));
        }
        g
    }

    #[test]
    fn remove_intro_drops_nodes_and_decrements_ranks() {
        let mut g = graph_with(&[("Intro A", 1), ("A binds B", 2), ("EOI", 3)],
                               &[(0, 1, 1), (1, 2, 1)]);
        remove_intro(&mut g);
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.nodes[0].rank, Some(1));
        assert_eq!(g.nodes[1].rank, Some(2));
    }

    #[test]
    fn remove_ignored_drops_incident_edges() {
        let mut g = graph_with(&[("A binds B", 1), ("A unbinds B", 2), ("EOI", 3)],
                               &[(0, 1, 1), (1, 2, 1), (0, 2, 1)]);
        remove_ignored(&mut g, &[" unbinds".to_string()]);
        assert_eq!(g.nodes.len(), 2);
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.nodes[0].label, "A binds B");
        assert_eq!(g.nodes[1].label, "EOI");
    }

    #[test]
    fn merge_same_labels_keeps_lowest_rank() {
        // La misma regla dispara a rank 1 y a rank 3.
        let mut g = graph_with(&[("A phos", 1), ("B act", 2), ("A phos", 3), ("EOI", 4)],
                               &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        merge_same_labels(&mut g);
        assert_eq!(g.nodes.len(), 3);
        let phos: Vec<&CausalNode> = g.nodes.iter().filter(|n| n.label == "A phos").collect();
        assert_eq!(phos.len(), 1);
        assert_eq!(phos[0].rank, Some(1));
        // La arista B act -> A phos ahora forma el bucle hacia atrás.
        assert!(g.edges
                 .iter()
                 .any(|e| g.nodes[e.source].label == "B act" && g.nodes[e.target].label == "A phos"));
    }

    #[test]
    fn fuse_edges_sums_weights() {
        let mut g = graph_with(&[("A", 1), ("B", 2)], &[(0, 1, 2), (0, 1, 3)]);
        fuse_edges(&mut g);
        assert_eq!(g.edges.len(), 1);
        assert_eq!(g.edges[0].weight, 5);
    }

    #[test]
    fn rerank_uses_longest_loopless_path() {
        // start -> a -> b -> c, y además start -> c: c debe quedar a rank 4.
        let mut g = graph_with(&[("start", 1), ("a", 2), ("b", 2), ("c", 2)],
                               &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (0, 3, 1)]);
        rerank(&mut g);
        assert_eq!(g.nodes.iter().find(|n| n.label == "c").unwrap().rank, Some(4));
        assert_eq!(g.nodes.iter().find(|n| n.label == "b").unwrap().rank, Some(3));
    }

    #[test]
    fn rerank_survives_loops() {
        // a <-> b con inicio en start: el bucle no debe colgar la búsqueda.
        let mut g = graph_with(&[("start", 1), ("a", 2), ("b", 2)],
                               &[(0, 1, 1), (1, 2, 1), (2, 1, 1)]);
        rerank(&mut g);
        assert_eq!(g.nodes.iter().find(|n| n.label == "a").unwrap().rank, Some(2));
        assert_eq!(g.nodes.iter().find(|n| n.label == "b").unwrap().rank, Some(3));
    }
}
