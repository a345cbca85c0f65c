use serde::{Deserialize, Serialize};

use crate::encoder::Normalization;
use crate::model::Activation;

/// One dense layer as stored on disk: row-major weights, one row per output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub activation: Activation,
}

/// Physical lead limits, degrees. The network's clamped head output is
/// multiplied by these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputScale {
    pub bearing: f64,
    pub elevation: f64,
}

/// Serialized form of a trained aim predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub input_dim: usize,
    #[serde(default)]
    pub normalization: Normalization,
    pub layers: Vec<LayerSpec>,
    pub output_scale_deg: OutputScale,
}
