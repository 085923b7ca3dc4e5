//! Utilidades de mantenimiento sobre corridas existentes:
//! - `render`: dibuja un PNG por cada DOT del directorio de trabajo.
//! - `merge`: re-corre la condensación desde los `causalcore-*.dot` ya
//!   extraídos, sin volver a simular.
//! - `toggle-labels`: agrega o quita las etiquetas de peso en los DOT.

use std::fs;
use std::path::Path;

use pathway_adapters::steps::{AssembleParams, AssemblePathwayStep, CollectCoresStep, LoopCoresStep, LoopParams,
                              MergeCoresStep, MergeParams};
use pathway_adapters::{files, tools};
use pathway_core::{InMemoryEventStore, InMemoryRunRepository, Pipe, PipelineEngine};

fn main() {
    // Cargar .env si existe para obtener rutas de herramientas.
    let _ = dotenvy::dotenv();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: pathway-cli <render|merge|toggle-labels> [opciones]");
        std::process::exit(2);
    }
    match args[1].as_str() {
        "render" => render(&args[2..]),
        "merge" => merge(&args[2..]),
        "toggle-labels" => toggle_labels(&args[2..]),
        other => {
            eprintln!("[pathway-cli] subcomando desconocido: {}", other);
            eprintln!("Uso: pathway-cli <render|merge|toggle-labels> [opciones]");
            std::process::exit(2);
        }
    }
}

fn render(args: &[String]) {
    let mut workdir: Option<String> = None;
    let mut dot: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--workdir" => {
                i += 1;
                if i < args.len() {
                    workdir = Some(args[i].clone());
                }
            }
            "--dot" => {
                i += 1;
                if i < args.len() {
                    dot = Some(args[i].clone());
                }
            }
            _ => {}
        }
        i += 1;
    }
    let workdir = match workdir {
        Some(w) => w,
        None => {
            eprintln!("Uso: pathway-cli render --workdir <DIR> [--dot <PATH>]");
            std::process::exit(2);
        }
    };
    if !Path::new(&workdir).is_dir() {
        eprintln!("[pathway-cli render] directorio no encontrado: {}", workdir);
        std::process::exit(4);
    }
    let dot = dot.or_else(|| std::env::var("DOT_PATH").ok()).unwrap_or_else(|| "dot".to_string());
    match tools::render_pngs(&dot, Path::new(&workdir)) {
        Ok(rendered) => {
            println!("renderizados: {} grafos en {}", rendered, workdir);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(5);
        }
    }
}

fn merge(args: &[String]) {
    let mut workdir: Option<String> = None;
    let mut eoi: Option<String> = None;
    let mut model: Option<String> = None;
    let mut ignore: Vec<String> = Vec::new();
    let mut edge_labels = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--workdir" => {
                i += 1;
                if i < args.len() {
                    workdir = Some(args[i].clone());
                }
            }
            "--eoi" => {
                i += 1;
                if i < args.len() {
                    eoi = Some(args[i].clone());
                }
            }
            "--model" => {
                i += 1;
                if i < args.len() {
                    model = Some(args[i].clone());
                }
            }
            "--ignore" => {
                i += 1;
                if i < args.len() {
                    ignore.push(args[i].clone());
                }
            }
            "--edge-labels" => edge_labels = true,
            _ => {}
        }
        i += 1;
    }
    let (workdir, eoi, model) = match (workdir, eoi, model) {
        (Some(w), Some(e), Some(m)) => (w, e, m),
        _ => {
            eprintln!("Uso: pathway-cli merge --workdir <DIR> --eoi <EOI> --model <FILE> [--ignore <SUBSTR>]... [--edge-labels]");
            std::process::exit(2);
        }
    };
    if !Path::new(&workdir).is_dir() {
        eprintln!("[pathway-cli merge] directorio no encontrado: {}", workdir);
        std::process::exit(4);
    }
    if !Path::new(&model).is_file() {
        eprintln!("[pathway-cli merge] modelo no encontrado: {}", model);
        std::process::exit(4);
    }

    let definition = Pipe::new(CollectCoresStep::new(workdir.clone(), eoi, model))
        .then(MergeCoresStep::new(MergeParams { edge_labels }))
        .then(LoopCoresStep::new(LoopParams { ignore, edge_labels }))
        .then(AssemblePathwayStep::new(AssembleParams { edge_labels }))
        .build();

    let mut engine: PipelineEngine<InMemoryEventStore, InMemoryRunRepository> = PipelineEngine::default();
    engine.set_default_definition(definition);
    match engine.run() {
        Ok(run_id) => {
            println!("condensación completa: corrida {} en {}", run_id, workdir);
            // Resumen del artefacto final, si está disponible.
            let last_hash = engine.events_for(run_id).iter().rev().find_map(|e| match &e.kind {
                pathway_core::RunEventKind::StepFinished { outputs, .. } => outputs.first().cloned(),
                _ => None,
            });
            if let Some(artifact) = last_hash.and_then(|h| engine.get_artifact(&h).cloned()) {
                println!("{}", serde_json::to_string_pretty(&artifact.payload).unwrap_or_default());
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(5);
        }
    }
}

fn toggle_labels(args: &[String]) {
    let mut dir = ".".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--dir" => {
                i += 1;
                if i < args.len() {
                    dir = args[i].clone();
                }
            }
            _ => {}
        }
        i += 1;
    }
    let base = Path::new(&dir);
    if !base.is_dir() {
        eprintln!("[pathway-cli toggle-labels] directorio no encontrado: {}", dir);
        std::process::exit(4);
    }
    let mut toggled = 0usize;
    match toggle_dir(base, &mut toggled) {
        Ok(()) => {
            println!("etiquetas alternadas en {} archivos", toggled);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(5);
        }
    }
}

/// Alterna etiquetas en los DOT del directorio y de sus subdirectorios
/// inmediatos.
fn toggle_dir(base: &Path, toggled: &mut usize) -> Result<(), pathway_domain::DomainError> {
    for file in files::dot_files(base)? {
        toggle_file(&file)?;
        *toggled += 1;
    }
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if entry.path().is_dir() {
            for file in files::dot_files(&entry.path())? {
                toggle_file(&file)?;
                *toggled += 1;
            }
        }
    }
    Ok(())
}

/// Agrega la etiqueta de peso en las aristas que no la tienen, o la quita en
/// las que sí. Reescribe el archivo en el lugar.
fn toggle_file(path: &Path) -> Result<(), pathway_domain::DomainError> {
    let text = fs::read_to_string(path)?;
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.contains("->") && line.contains("penwidth") {
            if let Some(label_start) = line.find("label=") {
                // Quitar la etiqueta existente: `label="  N", `
                let rest = &line[label_start..];
                match rest.find("\", ") {
                    Some(end) => {
                        out.push_str(&line[..label_start]);
                        out.push_str(&rest[end + 3..]);
                    }
                    None => out.push_str(line),
                }
            } else if let (Some(weight_pos), Some(bracket)) = (line.find("weight="), line.find(']')) {
                let weight = &line[weight_pos + "weight=".len()..bracket];
                out.push_str(&line[..weight_pos]);
                out.push_str(&format!("label=\"  {}\", ", weight));
                out.push_str(&line[weight_pos..]);
            } else {
                out.push_str(line);
            }
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}
