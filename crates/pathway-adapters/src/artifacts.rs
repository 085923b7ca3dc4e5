//! Artifacts tipados neutrales intercambiados por los steps del pipeline.
//!
//! Estos tipos no introducen semántica en el core; sólo definen la forma del
//! `payload` JSON que se serializa a `pathway_core::Artifact` con
//! `ArtifactKind::GenericJson` y un `schema_version` estable. Las etapas se
//! pasan rutas dentro del directorio de trabajo keyado por EOI más conteos
//! de resumen; los archivos DOT son la carga útil real.

use pathway_core::typed_artifact;

// Modelo anotado con el evento de interés, listo para simular.
typed_artifact!(ModelArtifact { eoi: String,
                                workdir: String,
                                annotated_model: String,
                                source_model: String });

// Traza producida por el simulador estocástico.
typed_artifact!(TraceArtifact { eoi: String,
                                workdir: String,
                                trace_path: String,
                                source_model: String });

// Conjunto de núcleos causales crudos (`causalcore-<n>.dot`) en el workdir.
typed_artifact!(CoreSetArtifact { eoi: String,
                                  workdir: String,
                                  core_count: usize,
                                  source_model: String });

// Núcleos únicos tras fusionar equivalentes (`core-<i>.dot`).
typed_artifact!(MergedCoresArtifact { eoi: String,
                                      workdir: String,
                                      merged_count: usize,
                                      source_model: String });

// Vías de eventos tras el plegado de bucles (`eventpath-<i>.dot`).
typed_artifact!(EventPathsArtifact { eoi: String,
                                     workdir: String,
                                     path_count: usize,
                                     source_model: String });

// Artefacto final: vía de eventos unificada y vía de especies, más la copia
// exportada junto al modelo.
typed_artifact!(PathwayArtifact { eoi: String,
                                  workdir: String,
                                  event_pathway: String,
                                  species_pathway: String,
                                  exported: String,
                                  node_count: usize,
                                  edge_count: usize });
