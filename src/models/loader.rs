//! ONNX model loader and model registry

use crate::types::label::ImpairmentLevel;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::info;

/// Static description of a known screening model.
///
/// Each exported classifier carries its own class-index ordering: the
/// image pipeline emits classes in alphabetical directory order while the
/// tabular pipeline emits them in CDR index order. The registry makes the
/// ordering explicit so downstream code never guesses.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    /// Model name used in the API and configuration
    pub name: &'static str,
    /// ONNX filename inside the models directory
    pub filename: &'static str,
    /// Class label for each output index
    pub class_order: [ImpairmentLevel; 4],
    /// Expected input feature count
    pub feature_count: usize,
}

/// Models this service knows how to load.
pub const KNOWN_MODELS: [ModelSpec; 2] = [
    ModelSpec {
        name: "mri",
        filename: "mri_classifier.onnx",
        // Alphabetical directory order used during image training
        class_order: [
            ImpairmentLevel::MildImpairment,
            ImpairmentLevel::ModerateImpairment,
            ImpairmentLevel::NoImpairment,
            ImpairmentLevel::VeryMildImpairment,
        ],
        // 128x128 RGB input, flattened
        feature_count: 128 * 128 * 3,
    },
    ModelSpec {
        name: "biomarker",
        filename: "biomarker_classifier.onnx",
        // CDR index order used during tabular training
        class_order: [
            ImpairmentLevel::NoImpairment,
            ImpairmentLevel::VeryMildImpairment,
            ImpairmentLevel::MildImpairment,
            ImpairmentLevel::ModerateImpairment,
        ],
        feature_count: 8,
    },
];

/// Look up a model spec by name.
pub fn find_spec(name: &str) -> Option<&'static ModelSpec> {
    KNOWN_MODELS.iter().find(|spec| spec.name == name)
}

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Registry entry for this model
    pub spec: &'static ModelSpec,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for class scores
    pub output_name: String,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(
        &self,
        path: P,
        spec: &'static ModelSpec,
    ) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(model = %spec.name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob") || o.name.contains("output"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "output".to_string())
            });

        info!(
            model = %spec.name,
            input = %input_name,
            output = %output_name,
            classes = ?spec.class_order,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            spec,
            session,
            input_name,
            output_name,
        })
    }

    /// Load all registered models found in a directory
    pub fn load_all_models<P: AsRef<Path>>(&self, models_dir: P) -> Result<Vec<LoadedModel>> {
        let models_dir = models_dir.as_ref();
        let mut models = Vec::new();

        for spec in &KNOWN_MODELS {
            let path = models_dir.join(spec.filename);
            if path.exists() {
                match self.load_model(&path, spec) {
                    Ok(model) => models.push(model),
                    Err(e) => {
                        tracing::warn!(model = %spec.name, error = %e, "Failed to load model, skipping");
                    }
                }
            } else {
                tracing::warn!(model = %spec.name, path = %path.display(), "Model file not found");
            }
        }

        if models.is_empty() {
            anyhow::bail!("No models loaded from {}", models_dir.display());
        }

        info!(
            count = models.len(),
            "Loaded {} models from {}",
            models.len(),
            models_dir.display()
        );

        Ok(models)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self { onnx_threads: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let spec = find_spec("biomarker").unwrap();
        assert_eq!(spec.feature_count, 8);
        assert_eq!(spec.class_order[0], ImpairmentLevel::NoImpairment);

        assert!(find_spec("eeg").is_none());
    }

    #[test]
    fn test_model_class_orders_differ() {
        // The two pipelines disagree on class-index order; the registry
        // must preserve both orderings rather than canonicalize.
        let mri = find_spec("mri").unwrap();
        let bio = find_spec("biomarker").unwrap();
        assert_ne!(mri.class_order, bio.class_order);
        assert_eq!(mri.class_order[2], ImpairmentLevel::NoImpairment);
    }
}
