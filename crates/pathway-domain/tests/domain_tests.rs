//! Condensación completa sobre núcleos sintéticos: parseo DOT, fusión de
//! equivalentes, plegado de bucles, unión de vías y conversión a especies.

use pathway_domain::kappa_rule::{parse_rule, read_rules};
use pathway_domain::merge::{merge_equivalent, unite_paths};
use pathway_domain::species::to_species_pathway;
use pathway_domain::transform::{fuse_edges, merge_same_labels, remove_ignored, remove_intro, rerank};
use pathway_domain::{parse_dot, render_dot, DotOptions, NodesType};

const MODEL: &str = "\
'L binds R' L(s[./1]), R(s[./1]) @ 1.0\n\
'R phos' R(s[1] Y{u/p}) @ 0.5\n\
'R unbinds L' L(s[1/.]), R(s[1/.]) @ 0.1\n";

// Núcleo tal como lo emite el extractor: introducciones, ids de evento y una
// regla ignorable.
const CORE_A: &str = r#"digraph G{
"1" [label="Intro L"] ;
"2" [label="Intro R"] ;
"3" [label="L binds R"] ;
"5" [label="R phos"] ;
"8" [label="R(Y{p})"] ;
"1" -> "3" ;
"2" -> "3" ;
"3" -> "5" ;
"5" -> "8" ;
}"#;

const CORE_B: &str = r#"digraph G{
"2" [label="Intro L"] ;
"4" [label="Intro R"] ;
"6" [label="L binds R"] ;
"7" [label="R unbinds L"] ;
"9" [label="L binds R"] ;
"11" [label="R phos"] ;
"14" [label="R(Y{p})"] ;
"2" -> "6" ;
"4" -> "6" ;
"6" -> "7" ;
"7" -> "9" ;
"9" -> "11" ;
"11" -> "14" ;
}"#;

fn condense(cores: &[&str]) -> pathway_domain::CausalGraph {
    let parsed: Vec<(u64, pathway_domain::CausalGraph)> =
        cores.iter()
             .enumerate()
             .map(|(index, text)| (index as u64 + 1, parse_dot(text).expect("core parse")))
             .collect();
    let merged = merge_equivalent(parsed);
    let mut looped = Vec::new();
    for mut core in merged {
        remove_intro(&mut core);
        remove_ignored(&mut core, &[" unbinds".to_string()]);
        merge_same_labels(&mut core);
        fuse_edges(&mut core);
        rerank(&mut core);
        looped.push(core);
    }
    let paths = merge_equivalent(looped.into_iter().enumerate().map(|(i, g)| (i as u64 + 1, g)).collect());
    unite_paths(&paths, "R(Y{p})")
}

#[test]
fn full_condensation_produces_one_event_pathway() {
    let pathway = condense(&[CORE_A, CORE_A, CORE_B]);
    assert_eq!(pathway.occurrence, None);
    let labels: Vec<&str> = pathway.nodes.iter().map(|n| n.label.as_str()).collect();
    assert!(labels.contains(&"L binds R"));
    assert!(labels.contains(&"R phos"));
    assert!(labels.contains(&"R(Y{p})"));
    assert!(!labels.iter().any(|l| l.contains("Intro")));
    assert!(!labels.iter().any(|l| l.contains("unbinds")));
}

#[test]
fn equivalent_cores_collapse_before_looping() {
    let parsed = vec![(1, parse_dot(CORE_A).expect("parse")),
                      (2, parse_dot(CORE_A).expect("parse")),
                      (3, parse_dot(CORE_B).expect("parse"))];
    let merged = merge_equivalent(parsed);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].occurrence, Some(2));
    assert_eq!(merged[0].prevcores, Some(vec![1, 2]));
}

#[test]
fn looped_cores_from_both_shapes_become_equivalent() {
    // Tras quitar introducciones e ignorados y plegar las repeticiones,
    // ambos núcleos se reducen al mismo camino L binds R -> R phos -> EOI.
    let pathway = condense(&[CORE_A, CORE_B]);
    assert_eq!(pathway.nodes.len(), 3);
    assert_eq!(pathway.edges.len(), 2);
}

#[test]
fn species_conversion_ends_with_species_nodes() {
    let mut pathway = condense(&[CORE_A, CORE_B]);
    to_species_pathway(&mut pathway, MODEL, "R(Y{p})").expect("species");
    assert_eq!(pathway.nodes_type, NodesType::Species);
    assert_eq!(pathway.eoi.as_deref(), Some("R-Y"));
    let labels: Vec<&str> = pathway.nodes.iter().map(|n| n.label.as_str()).collect();
    assert!(labels.contains(&"R-Y"), "labels: {:?}", labels);
}

#[test]
fn condensed_pathway_round_trips_through_dot() {
    let mut pathway = condense(&[CORE_A, CORE_B]);
    let text = render_dot(&mut pathway, &DotOptions::default());
    let back = parse_dot(&text).expect("reparse");
    assert_eq!(back.signature(), pathway.signature());
    assert_eq!(back.eoi, pathway.eoi);
}

#[test]
fn model_rules_parse_back_from_text() {
    let rules = read_rules(MODEL);
    assert_eq!(rules.len(), 3);
    let agents = parse_rule(&rules["R phos"]).expect("parse");
    assert_eq!(agents[0].name, "R");
    assert_eq!(agents[0].sites.len(), 2);
}
