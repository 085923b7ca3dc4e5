//! Invocación de las herramientas externas: simulador estocástico (KaSim),
//! extractor de flujo causal (KaFlow) y renderizador de grafos (dot).
//!
//! Las tres se tratan como colaboradores opacos: se construye la línea de
//! comandos documentada, se ejecuta en modo bloqueante y se valida el estado
//! de salida. Los constructores de argv están separados de la ejecución para
//! poder verificarlos sin los binarios instalados.

use std::path::{Path, PathBuf};
use std::process::Command;

use pathway_domain::DomainError;

/// Período de muestreo del plot: fino para simulaciones cortas.
fn plot_period(sim_time: u64) -> &'static str {
    if sim_time <= 100 {
        "0.1"
    } else {
        "1"
    }
}

/// Argumentos del simulador en modo batch con traza habilitada.
pub fn kasim_args(model: &Path, sim_time: u64, seed: Option<u64>) -> Vec<String> {
    let stem = model.with_extension("");
    let output = format!("{}.csv", stem.display());
    let trace = format!("{}.json", stem.display());
    let mut args = vec!["-mode".to_string(),
                        "batch".to_string(),
                        "--no-log".to_string(),
                        "-u".to_string(),
                        "t".to_string(),
                        "-p".to_string(),
                        plot_period(sim_time).to_string(),
                        "-l".to_string(),
                        sim_time.to_string(),
                        "-i".to_string(),
                        model.display().to_string(),
                        "-o".to_string(),
                        output,
                        "-trace".to_string(),
                        trace];
    if let Some(seed) = seed {
        args.push("-seed".to_string());
        args.push(seed.to_string());
    }
    args
}

/// Corre el simulador sobre el modelo anotado y devuelve la ruta de la traza.
pub fn run_kasim(kasim: &str, model: &Path, sim_time: u64, seed: Option<u64>) -> Result<PathBuf, DomainError> {
    let args = kasim_args(model, sim_time, seed);
    run_tool("KaSim", kasim, &args)?;
    let trace = model.with_extension("json");
    let metadata = std::fs::metadata(&trace).map_err(|_| DomainError::ExternalToolError {
                                                tool: "KaSim".to_string(),
                                                detail: format!("no produjo la traza {}", trace.display()),
                                            })?;
    if metadata.len() == 0 {
        return Err(DomainError::ExternalToolError { tool: "KaSim".to_string(),
                                                    detail: format!("traza vacía: {}", trace.display()) });
    }
    Ok(trace)
}

/// Argumentos del extractor de flujo: prefijo de salida y traza.
pub fn kaflow_args(workdir: &Path, trace: &Path) -> Vec<String> {
    vec!["-o".to_string(),
         format!("{}/causalcore-", workdir.display()),
         trace.display().to_string()]
}

/// Corre el extractor de flujo causal sobre la traza.
pub fn run_kaflow(kaflow: &str, workdir: &Path, trace: &Path) -> Result<(), DomainError> {
    let args = kaflow_args(workdir, trace);
    run_tool("KaFlow", kaflow, &args)
}

/// Dibuja un PNG por cada archivo DOT del directorio. Devuelve cuántos se
/// renderizaron; un fallo del renderizador se reporta sin abortar el resto.
pub fn render_pngs(dot: &str, workdir: &Path) -> Result<usize, DomainError> {
    let files = crate::files::dot_files(workdir)?;
    let mut rendered = 0usize;
    for file in &files {
        let png = file.with_extension("png");
        let args = vec!["-Tpng".to_string(),
                        file.display().to_string(),
                        "-o".to_string(),
                        png.display().to_string()];
        match run_tool("dot", dot, &args) {
            Ok(()) => rendered += 1,
            Err(e) => log::warn!("render fallido para {}: {}", file.display(), e),
        }
    }
    Ok(rendered)
}

/// Ejecuta un comando bloqueante y valida su estado de salida. En fallo se
/// conserva la cola de stderr para el diagnóstico.
fn run_tool(tool: &str, program: &str, args: &[String]) -> Result<(), DomainError> {
    log::debug!("{} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| DomainError::ExternalToolError { tool: tool.to_string(),
                                                      detail: format!("no se pudo ejecutar {}: {}", program, e) })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: String = stderr.chars().rev().take(400).collect::<Vec<_>>().into_iter().rev().collect();
        return Err(DomainError::ExternalToolError { tool: tool.to_string(),
                                                    detail: format!("estado {}: {}", output.status, tail.trim()) });
    }
    Ok(())
}
