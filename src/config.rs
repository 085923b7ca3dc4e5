//! Configuración de la corrida: flags de línea de comandos, variables de
//! entorno (`KASIM_PATH`, `KAFLOW_PATH`, `DOT_PATH`, cargadas de `.env` si
//! existe) y defaults.

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Forzar carga temprana de .env.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model: String,
    pub eoi: String,
    pub kasim: String,
    pub kaflow: String,
    pub dot: Option<String>,
    pub sim_time: u64,
    pub seed: Option<u64>,
    pub ignore: Vec<String>,
    pub edge_labels: bool,
    pub render: bool,
}

impl RunConfig {
    pub fn usage() -> &'static str {
        "Uso: kappa-pathways --model <FILE.ka> --eoi <EOI> [--kasim <PATH>] [--kaflow <PATH>] \
         [--dot <PATH>] [--simtime <N>] [--seed <N>] [--ignore <SUBSTR>]... [--edge-labels] [--render]"
    }

    /// Construye la configuración desde los argumentos; las rutas de
    /// herramientas caen a las variables de entorno cuando no vienen por
    /// flag.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        init_dotenv();
        let mut model: Option<String> = None;
        let mut eoi: Option<String> = None;
        let mut kasim: Option<String> = None;
        let mut kaflow: Option<String> = None;
        let mut dot: Option<String> = None;
        let mut sim_time: u64 = 1000;
        let mut seed: Option<u64> = None;
        let mut ignore: Vec<String> = Vec::new();
        let mut edge_labels = false;
        let mut render = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--model" => {
                    i += 1;
                    if i < args.len() {
                        model = Some(args[i].clone());
                    }
                }
                "--eoi" => {
                    i += 1;
                    if i < args.len() {
                        eoi = Some(args[i].clone());
                    }
                }
                "--kasim" => {
                    i += 1;
                    if i < args.len() {
                        kasim = Some(args[i].clone());
                    }
                }
                "--kaflow" => {
                    i += 1;
                    if i < args.len() {
                        kaflow = Some(args[i].clone());
                    }
                }
                "--dot" => {
                    i += 1;
                    if i < args.len() {
                        dot = Some(args[i].clone());
                    }
                }
                "--simtime" => {
                    i += 1;
                    if i < args.len() {
                        sim_time = args[i].parse::<u64>().map_err(|_| format!("simtime inválido: {}", args[i]))?;
                    }
                }
                "--seed" => {
                    i += 1;
                    if i < args.len() {
                        seed = Some(args[i].parse::<u64>().map_err(|_| format!("seed inválida: {}", args[i]))?);
                    }
                }
                "--ignore" => {
                    i += 1;
                    if i < args.len() {
                        ignore.push(args[i].clone());
                    }
                }
                "--edge-labels" => edge_labels = true,
                "--render" => render = true,
                other => return Err(format!("flag desconocido: {}", other)),
            }
            i += 1;
        }

        let model = model.ok_or("falta --model")?;
        let eoi = eoi.ok_or("falta --eoi")?;
        if eoi.trim().is_empty() {
            return Err("el EOI no puede estar vacío".to_string());
        }
        if sim_time == 0 {
            return Err("simtime debe ser positivo".to_string());
        }
        let kasim = kasim.or_else(|| env::var("KASIM_PATH").ok())
                         .ok_or("falta --kasim (o la variable KASIM_PATH)")?;
        let kaflow = kaflow.or_else(|| env::var("KAFLOW_PATH").ok())
                           .ok_or("falta --kaflow (o la variable KAFLOW_PATH)")?;
        let dot = dot.or_else(|| env::var("DOT_PATH").ok());

        Ok(RunConfig { model,
                       eoi,
                       kasim,
                       kaflow,
                       dot,
                       sim_time,
                       seed,
                       ignore,
                       edge_labels,
                       render })
    }
}
