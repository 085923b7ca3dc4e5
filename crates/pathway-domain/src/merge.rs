//! Fusión de grafos causales equivalentes y unión de vías de eventos.

use std::collections::HashMap;

use crate::transform::{fuse_edges, rerank};
use crate::{CausalEdge, CausalGraph, CausalNode};

/// Dos grafos son equivalentes cuando comparten rank máximo y el multiset de
/// aristas proyectadas a (etiqueta, rank); el momento exacto de los eventos
/// no importa.
pub fn equivalent(a: &CausalGraph, b: &CausalGraph) -> bool {
    a.signature() == b.signature()
}

/// Fusiona grafos equivalentes de una lista numerada.
///
/// El primer grafo de cada clase de equivalencia se conserva; absorbe las
/// ocurrencias de los demás y la suma de pesos de las aristas emparejadas
/// por clave. Los números de origen quedan registrados en `prevcores`. El
/// resultado se ordena por ocurrencia descendente.
pub fn merge_equivalent(graphs: Vec<(u64, CausalGraph)>) -> Vec<CausalGraph> {
    let mut merged: Vec<CausalGraph> = Vec::new();
    let mut provenance: Vec<Vec<u64>> = Vec::new();
    let mut by_signature: HashMap<String, usize> = HashMap::new();

    for (number, graph) in graphs {
        let signature = graph.signature();
        match by_signature.get(&signature) {
            Some(&slot) => {
                let kept = &mut merged[slot];
                let occ = graph.occurrence.unwrap_or(1);
                kept.occurrence = Some(kept.occurrence.unwrap_or(1) + occ);
                add_matched_weights(kept, &graph);
                provenance[slot].push(number);
            }
            None => {
                by_signature.insert(signature, merged.len());
                provenance.push(vec![number]);
                merged.push(graph);
            }
        }
    }

    for (slot, graph) in merged.iter_mut().enumerate() {
        graph.prevcores = Some(provenance[slot].clone());
    }
    // Orden estable por ocurrencia descendente.
    graph_sort_by_occurrence(&mut merged);
    merged
}

fn graph_sort_by_occurrence(graphs: &mut [CausalGraph]) {
    graphs.sort_by(|a, b| b.occurrence.unwrap_or(1).cmp(&a.occurrence.unwrap_or(1)));
}

/// Suma a cada arista del grafo conservado el peso de la arista equivalente
/// del otro grafo. Dentro de una misma clave las aristas se emparejan en
/// orden de peso, lo cual es determinista.
fn add_matched_weights(kept: &mut CausalGraph, other: &CausalGraph) {
    let mut kept_groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, edge) in kept.edges.iter().enumerate() {
        kept_groups.entry(kept.edge_key(edge)).or_default().push(index);
    }
    let mut other_groups: HashMap<String, Vec<u64>> = HashMap::new();
    for edge in &other.edges {
        other_groups.entry(other.edge_key(edge)).or_default().push(edge.weight);
    }
    for (key, mut indices) in kept_groups {
        let mut weights = match other_groups.remove(&key) {
            Some(w) => w,
            None => continue,
        };
        indices.sort_by_key(|&i| kept.edges[i].weight);
        weights.sort_unstable();
        for (index, weight) in indices.into_iter().zip(weights) {
            kept.edges[index].weight += weight;
        }
    }
}

/// Une todas las vías de eventos en una única vía agrupada por etiqueta.
///
/// El primer nodo visto con cada etiqueta define el nodo de la unión; las
/// aristas se trasladan por etiqueta, se colapsan duplicados sumando pesos y
/// se re-rankean los nodos. La ocurrencia se limpia: la unión ya no cuenta
/// núcleos.
pub fn unite_paths(paths: &[CausalGraph], eoi: &str) -> CausalGraph {
    let mut united = CausalGraph::new(Some(eoi.to_string()));
    let mut by_label: HashMap<String, usize> = HashMap::new();

    for path in paths {
        for node in &path.nodes {
            if !by_label.contains_key(&node.label) {
                by_label.insert(node.label.clone(), united.nodes.len());
                let id = format!("node{}", united.nodes.len() + 1);
                united.nodes.push(CausalNode::new(id, node.label.clone(), node.rank));
            }
        }
    }
    for path in paths {
        for edge in &path.edges {
            let source = by_label[&path.nodes[edge.source].label];
            let target = by_label[&path.nodes[edge.target].label];
            united.edges.push(CausalEdge::new(source, target, edge.weight));
        }
    }
    fuse_edges(&mut united);
    rerank(&mut united);
    united.occurrence = None;
    united
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(labels: &[&str], weights: &[u64]) -> CausalGraph {
        let mut g = CausalGraph::new(Some(labels.last().unwrap().to_string()));
        for (index, label) in labels.iter().enumerate() {
            g.nodes.push(CausalNode::new(format!("node{}", index + 1), *label, Some(index as u32 + 1)));
        }
        for (index, &w) in weights.iter().enumerate() {
            g.edges.push(CausalEdge::new(index, index + 1, w));
        }
        g
    }

    #[test]
    fn equivalent_cores_merge_occurrences_and_weights() {
        let a = core(&["A", "B", "EOI"], &[1, 1]);
        let b = core(&["A", "B", "EOI"], &[2, 3]);
        let c = core(&["A", "C", "EOI"], &[1, 1]);
        let merged = merge_equivalent(vec![(1, a), (2, b), (3, c)]);
        assert_eq!(merged.len(), 2);
        let first = &merged[0];
        assert_eq!(first.occurrence, Some(2));
        assert_eq!(first.prevcores, Some(vec![1, 2]));
        let weights: Vec<u64> = first.edges.iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![3, 4]);
        assert_eq!(merged[1].occurrence, Some(1));
        assert_eq!(merged[1].prevcores, Some(vec![3]));
    }

    #[test]
    fn merge_sorts_by_occurrence_desc() {
        let a = core(&["A", "EOI"], &[1]);
        let b = core(&["B", "EOI"], &[1]);
        let b2 = core(&["B", "EOI"], &[1]);
        let merged = merge_equivalent(vec![(1, a), (2, b), (3, b2)]);
        assert_eq!(merged[0].occurrence, Some(2));
        assert_eq!(merged[0].nodes[0].label, "B");
    }

    #[test]
    fn different_ranks_do_not_merge() {
        let a = core(&["A", "EOI"], &[1]);
        let mut b = core(&["A", "EOI"], &[1]);
        b.nodes[1].rank = Some(3);
        assert!(!equivalent(&a, &b));
        let merged = merge_equivalent(vec![(1, a), (2, b)]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn unite_paths_groups_by_label() {
        let p1 = core(&["A", "B", "EOI"], &[1, 2]);
        let p2 = core(&["A", "C", "EOI"], &[3, 1]);
        let united = unite_paths(&[p1, p2], "EOI");
        assert_eq!(united.nodes.len(), 4);
        assert_eq!(united.edges.len(), 4);
        assert_eq!(united.occurrence, None);
        // A alimenta dos ramas que confluyen en el EOI.
        let eoi_rank = united.nodes.iter().find(|n| n.label == "EOI").unwrap().rank;
        assert_eq!(eoi_rank, Some(3));
    }

    #[test]
    fn unite_paths_fuses_shared_edges() {
        let p1 = core(&["A", "EOI"], &[2]);
        let p2 = core(&["A", "EOI"], &[5]);
        let united = unite_paths(&[p1, p2], "EOI");
        assert_eq!(united.edges.len(), 1);
        assert_eq!(united.edges[0].weight, 7);
    }
}
