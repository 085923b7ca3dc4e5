//! Lectura y escritura del subconjunto DOT usado por el pipeline.
//!
//! El lector acepta tanto los núcleos causales que emite el extractor de
//! flujo (ids numéricos de evento, sin ranks) como los archivos que escribe
//! este mismo módulo (clusters `rank = same`, atributos `nodestype`, `eoi`,
//! `Occurrence`, `prevcores`). El escritor produce grafos agrupados por rank
//! con aristas invisibles entre anclas de rank para fijar el layout.

use crate::{CausalEdge, CausalGraph, CausalNode, DomainError, NodesType};

/// Opciones de salida DOT.
#[derive(Debug, Clone, Copy)]
pub struct DotOptions {
    /// Etiqueta cada arista con su peso.
    pub edge_labels: bool,
    /// Separación vertical reducida (núcleos) en lugar de la normal (vías).
    pub compact_ranks: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        DotOptions { edge_labels: false,
                     compact_ranks: false }
    }
}

/// Valor de un atributo con comillas: `key="valor"`.
fn quoted_attr<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("{}=\"", key);
    let start = line.find(&pattern)? + pattern.len();
    let end = line[start..].find('"')? + start;
    Some(&line[start..end])
}

/// Normaliza un id de nodo: quita comillas y antepone `node` a los ids
/// numéricos de evento que trae el extractor.
fn normalize_id(token: &str) -> String {
    let bare = token.trim_matches('"');
    if bare.contains("node") {
        bare.to_string()
    } else {
        format!("node{}", bare)
    }
}

/// Parsea un grafo causal desde texto DOT.
///
/// Si el archivo no trae clusters de rank, los ranks se calculan por
/// colocación topológica; si no declara `eoi`, se toma la etiqueta de un
/// nodo de rank máximo.
pub fn parse_dot(text: &str) -> Result<CausalGraph, DomainError> {
    let mut graph = CausalGraph::new(None);
    let mut current_rank: Option<u32> = None;
    let mut saw_rank_cluster = false;

    for line in text.lines() {
        if let Some(value) = quoted_attr(line, "nodestype") {
            graph.nodes_type = NodesType::from_label(value);
        }
        if line.contains("eoi=") {
            if let Some(value) = quoted_attr(line, "eoi") {
                graph.eoi = Some(value.to_string());
            }
        }
        if line.contains("Occurrence") {
            if let Some(label) = quoted_attr(line, "label") {
                let digits = label.trim_start_matches("Occurrence = ");
                let occ = digits.trim().parse::<u64>().map_err(|_| {
                               DomainError::DotError(format!("ocurrencia ilegible: {}", label))
                           })?;
                graph.occurrence = Some(occ);
            }
        }
        if let Some(value) = quoted_attr(line, "prevcores") {
            let inner = value.trim_start_matches('[').trim_end_matches(']');
            let nums: Vec<u64> = inner.split(',')
                                      .filter_map(|p| p.trim().parse::<u64>().ok())
                                      .collect();
            if !nums.is_empty() {
                graph.prevcores = Some(nums);
            }
        }
        if line.contains("rank = same") {
            let open = line.find('"');
            let close = line.rfind('"');
            if let (Some(open), Some(close)) = (open, close) {
                if close > open {
                    let rank = line[open + 1..close].parse::<u32>().map_err(|_| {
                                   DomainError::DotError(format!("rank ilegible: {}", line.trim()))
                               })?;
                    current_rank = Some(rank);
                    saw_rank_cluster = true;
                }
            }
        }
        if line.contains("label=") && !line.contains("Occurrence") && !line.contains("->") {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            let id = normalize_id(tokens[0]);
            let label = quoted_attr(line, "label")
                .ok_or_else(|| DomainError::DotError(format!("nodo sin etiqueta: {}", line.trim())))?;
            graph.nodes.push(CausalNode::new(id, label, current_rank));
        }
    }

    let mut edges: Vec<CausalEdge> = Vec::new();
    for line in text.lines() {
        if !line.contains("->") || line.contains("style=\"invis\"") {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            continue;
        }
        let source_id = normalize_id(tokens[0]);
        let target_id = normalize_id(tokens[2]);
        let source = graph.nodes
                          .iter()
                          .position(|n| n.id == source_id)
                          .ok_or_else(|| DomainError::DotError(format!("origen desconocido: {}", source_id)))?;
        let target = graph.nodes
                          .iter()
                          .position(|n| n.id == target_id)
                          .ok_or_else(|| DomainError::DotError(format!("destino desconocido: {}", target_id)))?;
        let weight = match line.find("weight=") {
            Some(pos) => {
                let rest = &line[pos + "weight=".len()..];
                let end = rest.find(']').unwrap_or(rest.len());
                rest[..end].trim().parse::<u64>().map_err(|_| {
                    DomainError::DotError(format!("peso ilegible: {}", line.trim()))
                })?
            }
            None => 1,
        };
        edges.push(CausalEdge::new(source, target, weight));
    }
    // El extractor lista las aristas de la más tardía a la más temprana.
    edges.reverse();
    graph.edges = edges;

    if !saw_rank_cluster {
        graph.assign_ranks();
    }
    if graph.eoi.is_none() {
        if let Some(max) = graph.max_rank() {
            graph.eoi = graph.nodes
                             .iter()
                             .find(|n| n.rank == Some(max))
                             .map(|n| n.label.clone());
        }
    }
    graph.sequentialize_ids();
    Ok(graph)
}

/// Escribe el grafo como DOT agrupado por rank. Los ids se re-secuencian
/// antes de emitir, por lo que el grafo se recibe mutable.
pub fn render_dot(graph: &mut CausalGraph, opts: &DotOptions) -> String {
    graph.sequentialize_ids();
    let max_rank = graph.max_rank().unwrap_or(0);

    let mut dot = String::from("digraph G{\n");
    dot.push_str(&format!("  nodestype=\"{}\"\n", graph.nodes_type.as_str()));
    if let Some(eoi) = &graph.eoi {
        dot.push_str(&format!("  eoi=\"{}\"\n", eoi));
    }
    if let Some(occ) = graph.occurrence {
        dot.push_str(&format!("  label=\"Occurrence = {}\" fontsize=28 ;\n", occ));
    }
    if let Some(prev) = &graph.prevcores {
        let nums: Vec<String> = prev.iter().map(|n| n.to_string()).collect();
        dot.push_str(&format!("  prevcores=\"[{}]\"\n", nums.join(", ")));
    }
    dot.push_str("  labelloc=\"t\" ;\n");
    if opts.compact_ranks {
        dot.push_str("  ranksep=0.5 ;\n");
    } else {
        dot.push_str("  ranksep=1.0 ;\n");
    }

    for rank in 1..=max_rank {
        dot.push_str(&format!("{{ rank = same ; \"{}\" [shape=plaintext] ;\n", rank));
        for node in &graph.nodes {
            if node.rank != Some(rank) {
                continue;
            }
            let mut shape = "invhouse";
            let mut color = "lightblue";
            if node.is_intro() {
                shape = "rectangle";
                color = "white";
            }
            if graph.eoi.as_deref() == Some(node.label.as_str()) {
                shape = "ellipse";
                color = "indianred2";
            }
            if graph.nodes_type == NodesType::Species {
                shape = "ellipse";
            }
            dot.push_str(&format!("\"{}\" [label=\"{}\", shape={}, style=filled, fillcolor={}] ;\n",
                                  node.id, node.label, shape, color));
        }
        dot.push_str("}\n");
    }
    for rank in 1..max_rank {
        dot.push_str(&format!("\"{}\" -> \"{}\" [style=\"invis\"] ;\n", rank, rank + 1));
    }

    let min_weight = graph.edges.iter().map(|e| e.weight).min().unwrap_or(1).max(1);
    let max_penwidth = 20.0f64;
    for edge in &graph.edges {
        let mut penwidth = edge.weight as f64 / min_weight as f64;
        if penwidth > max_penwidth {
            penwidth = max_penwidth;
        }
        dot.push_str(&format!("\"{}\" -> \"{}\" [penwidth={}",
                              graph.nodes[edge.source].id, graph.nodes[edge.target].id, penwidth));
        dot.push_str(", color=black");
        if opts.edge_labels {
            dot.push_str(&format!(", label=\"  {}\"", edge.weight));
        }
        dot.push_str(&format!(", weight={}] ;\n", edge.weight));
    }
    dot.push('}');
    dot
}
