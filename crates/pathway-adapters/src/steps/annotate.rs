//! AnnotateModelStep (Source)
//!
//! - Crea el directorio de trabajo keyado por el EOI.
//! - Copia el modelo a `<eoi>/<stem>-eoi.ka` y le agrega el observable y la
//!   directiva de tracking del evento de interés.
//! - No ejecuta herramientas externas; sólo prepara archivos.

use std::fs;
use std::io::Write;
use std::path::Path;

use pathway_core::errors::EngineError;
use pathway_core::step::{StepKind, StepRunResultTyped, TypedStep};
use pathway_domain::DomainError;

use crate::artifacts::ModelArtifact;

#[derive(Clone, Debug)]
pub struct AnnotateModelStep {
    pub model: String,
    pub eoi: String,
}

impl AnnotateModelStep {
    pub fn new(model: impl Into<String>, eoi: impl Into<String>) -> Self {
        Self { model: model.into(),
               eoi: eoi.into() }
    }
}

/// Copia el modelo al workdir y agrega las directivas del EOI. El workdir
/// se crea junto al modelo, con el nombre del EOI.
fn annotate(model: &str, eoi: &str) -> Result<ModelArtifact, DomainError> {
    let model_path = Path::new(model);
    if !model_path.is_file() {
        return Err(DomainError::ValidationError(format!("el modelo no existe: {}", model)));
    }
    let workdir = model_path.parent().unwrap_or_else(|| Path::new(".")).join(eoi);
    fs::create_dir_all(&workdir)?;

    let stem = model_path.file_stem()
                         .and_then(|s| s.to_str())
                         .ok_or_else(|| DomainError::ValidationError(format!("nombre de modelo ilegible: {}", model)))?;
    let annotated = workdir.join(format!("{}-eoi.ka", stem));
    fs::copy(model_path, &annotated)?;

    let mut file = fs::OpenOptions::new().append(true).open(&annotated)?;
    writeln!(file, "%obs: '{}' |{}|", eoi, eoi)?;
    writeln!(file, "%mod: [true] do $TRACK '{}' [true];", eoi)?;

    Ok(ModelArtifact { eoi: eoi.to_string(),
                       workdir: workdir.display().to_string(),
                       annotated_model: annotated.display().to_string(),
                       source_model: model.to_string(),
                       schema_version: 1 })
}

impl TypedStep for AnnotateModelStep {
    type Params = ();
    type Input = ModelArtifact; // ignorado (Source)
    type Output = ModelArtifact;

    fn id(&self) -> &'static str {
        "annotate_model"
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }

    fn run_typed(&self, _input: Option<Self::Input>, _params: Self::Params) -> StepRunResultTyped<Self::Output> {
        match annotate(&self.model, &self.eoi) {
            Ok(output) => StepRunResultTyped::Success { outputs: vec![output] },
            Err(e) => StepRunResultTyped::Failure { error: EngineError::StepFailed(e.to_string()) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotate_appends_obs_and_track_directives() {
        let base = std::env::temp_dir().join(format!("kpw-annotate-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&base).unwrap();
        let model = base.join("toy.ka");
        fs::write(&model, "'A phos' A(x{u/p}) @ 1.0\n").unwrap();

        let artifact = annotate(model.to_str().unwrap(), "A(x{p})").expect("annotate");

        assert!(Path::new(&artifact.workdir).ends_with("A(x{p})"));
        let text = fs::read_to_string(&artifact.annotated_model).unwrap();
        assert!(text.contains("%obs: 'A(x{p})' |A(x{p})|"));
        assert!(text.contains("%mod: [true] do $TRACK 'A(x{p})' [true];"));
        assert!(artifact.annotated_model.ends_with("toy-eoi.ka"));
        fs::remove_dir_all(&base).ok();
    }
}
