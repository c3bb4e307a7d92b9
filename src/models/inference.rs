//! Inference engine for the screening classifiers

use crate::config::AppConfig;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::types::label::ImpairmentLevel;
use anyhow::{anyhow, Context, Result};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by [`InferenceEngine::predict`]
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("model '{model}' expects {expected} features, got {actual}")]
    FeatureCount {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Session(#[from] anyhow::Error),
}

/// Raw output of one model run: the unnormalized class-score vector and
/// the class ordering it was emitted in.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Model that produced the scores
    pub model: String,
    /// Raw class scores, one per output index
    pub scores: Vec<f64>,
    /// Class label for each output index
    pub class_order: Vec<ImpairmentLevel>,
}

/// Inference engine owning the loaded ONNX sessions.
///
/// Constructed once at startup and shared behind an `Arc`; sessions use
/// interior mutability so handlers only need a shared reference.
pub struct InferenceEngine {
    /// Loaded ONNX models (wrapped in RwLock for interior mutability)
    models: Vec<RwLock<LoadedModel>>,
}

impl InferenceEngine {
    /// Create a new inference engine from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_models_dir_and_threads(&config.models.models_dir, config.models.onnx_threads)
    }

    /// Create inference engine with a custom models directory
    pub fn with_models_dir(models_dir: &str) -> Result<Self> {
        Self::with_models_dir_and_threads(models_dir, 1)
    }

    /// Create inference engine with custom models directory and thread count
    pub fn with_models_dir_and_threads(models_dir: &str, onnx_threads: usize) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let models: Vec<RwLock<LoadedModel>> = loader
            .load_all_models(models_dir)?
            .into_iter()
            .map(RwLock::new)
            .collect();

        Ok(Self { models })
    }

    /// Get the number of loaded models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Get loaded model names
    pub fn model_names(&self) -> Vec<String> {
        self.models
            .iter()
            .filter_map(|m| m.read().ok().map(|m| m.spec.name.to_string()))
            .collect()
    }

    /// Run the named model on a feature vector and return its raw class
    /// scores together with the model's class ordering.
    pub fn predict(
        &self,
        model_name: &str,
        features: &[f32],
    ) -> Result<ModelOutput, InferenceError> {
        for model_lock in &self.models {
            let (name, expected) = {
                let model = model_lock
                    .read()
                    .map_err(|e| anyhow!("Lock error: {}", e))?;
                (model.spec.name, model.spec.feature_count)
            };

            if name != model_name {
                continue;
            }

            if features.len() != expected {
                return Err(InferenceError::FeatureCount {
                    model: name.to_string(),
                    expected,
                    actual: features.len(),
                });
            }

            let mut model = model_lock
                .write()
                .map_err(|e| anyhow!("Lock error: {}", e))?;

            let scores = run_session(&mut model, features)?;

            debug!(
                model = %name,
                scores = ?scores,
                "Inference complete"
            );

            let class_order = model.spec.class_order.to_vec();
            return Ok(ModelOutput {
                model: name.to_string(),
                scores,
                class_order,
            });
        }

        Err(InferenceError::UnknownModel(model_name.to_string()))
    }
}

/// Run a single session and extract the class-score vector.
fn run_session(model: &mut LoadedModel, features: &[f32]) -> Result<Vec<f64>> {
    use ort::value::Tensor;

    // Input tensor shape [1, num_features]
    let shape = vec![1_i64, features.len() as i64];
    let input_tensor =
        Tensor::from_array((shape, features.to_vec())).context("Failed to create input tensor")?;

    let input_name = model.input_name.clone();
    let output_name = model.output_name.clone();
    let model_name = model.spec.name;
    let num_classes = model.spec.class_order.len();

    let outputs = model
        .session
        .run(ort::inputs![&input_name => input_tensor])
        .with_context(|| format!("Inference failed for model '{}'", model_name))?;

    // Try the resolved output name first
    if let Some(output) = outputs.get(&output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            return extract_class_scores(shape, data, num_classes, model_name);
        }
    }

    // Fallback: take the first output that extracts as an f32 tensor
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            return extract_class_scores(shape, data, num_classes, model_name);
        }
    }

    Err(anyhow!(
        "Model '{}' produced no f32 tensor output",
        model_name
    ))
}

/// Pull the class-score row out of a [1, num_classes] or [num_classes]
/// output tensor.
fn extract_class_scores(
    shape: &ort::tensor::Shape,
    data: &[f32],
    num_classes: usize,
    model_name: &str,
) -> Result<Vec<f64>> {
    let dims: Vec<i64> = shape.iter().copied().collect();
    let width = *dims.last().unwrap_or(&0) as usize;
    if width != num_classes || data.len() < num_classes {
        return Err(anyhow!(
            "Model '{}' output shape {:?} does not match {} classes",
            model_name,
            dims,
            num_classes
        ));
    }

    let row = &data[data.len() - num_classes..];
    Ok(row.iter().map(|&v| v as f64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_output_carries_class_order() {
        let output = ModelOutput {
            model: "biomarker".to_string(),
            scores: vec![0.1, 0.2, 0.5, 0.2],
            class_order: vec![
                ImpairmentLevel::NoImpairment,
                ImpairmentLevel::VeryMildImpairment,
                ImpairmentLevel::MildImpairment,
                ImpairmentLevel::ModerateImpairment,
            ],
        };

        assert_eq!(output.scores.len(), output.class_order.len());
        assert_eq!(output.class_order[2], ImpairmentLevel::MildImpairment);
    }
}
