use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkpoint::{Checkpoint, OutputScale};
use crate::encoder::{AimInputs, TrackEncoder, ENCODED_LEN};

/// The predictor is optional equipment: every variant here is survivable and
/// drops the agent into coarse-only turret control.
#[derive(Debug, Error)]
pub enum AimModelError {
    #[error("failed to read aim checkpoint {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("aim checkpoint is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("aim checkpoint declares no layers")]
    EmptyNetwork,
    #[error("aim checkpoint declares input_dim {declared}, encoder produces {expected}")]
    InputArity { declared: usize, expected: usize },
    #[error("layer {layer} expects {expected} inputs but its rows have {got}")]
    LayerShape {
        layer: usize,
        expected: usize,
        got: usize,
    },
    #[error("layer {layer} has {rows} rows but {bias} bias terms")]
    BiasShape {
        layer: usize,
        rows: usize,
        bias: usize,
    },
    #[error("layer {layer} contains a non-finite parameter")]
    NonFiniteParameter { layer: usize },
    #[error("network head produces {got} outputs, aim correction needs 2")]
    OutputArity { got: usize },
    #[error("output scale must be finite and > 0, got {bearing} / {elevation}")]
    BadScale { bearing: f64, elevation: f64 },
    #[error("normalization constants must be finite and > 0")]
    BadNormalization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Tanh,
    Linear,
}

impl Activation {
    fn apply(self, z: &mut Array1<f32>) {
        if self == Activation::Tanh {
            z.mapv_inplace(f32::tanh);
        }
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

/// Turret correction in degrees, already clamped to the lead limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AimCorrection {
    pub bearing_deg: f64,
    pub elevation_deg: f64,
}

/// A frozen MLP over encoded target tracks.
///
/// Loaded once at startup and shared read-only; inference takes `&self` and
/// allocates only the per-layer activation vectors.
#[derive(Debug, Clone)]
pub struct AimModel {
    encoder: TrackEncoder,
    layers: Vec<DenseLayer>,
    scale: OutputScale,
}

impl AimModel {
    pub fn load(path: &Path) -> Result<Self, AimModelError> {
        let json = std::fs::read_to_string(path).map_err(|source| AimModelError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, AimModelError> {
        let checkpoint: Checkpoint = serde_json::from_str(json)?;
        Self::from_checkpoint(checkpoint)
    }

    pub fn from_checkpoint(checkpoint: Checkpoint) -> Result<Self, AimModelError> {
        if checkpoint.layers.is_empty() {
            return Err(AimModelError::EmptyNetwork);
        }
        if checkpoint.input_dim != ENCODED_LEN {
            return Err(AimModelError::InputArity {
                declared: checkpoint.input_dim,
                expected: ENCODED_LEN,
            });
        }
        if !checkpoint.normalization.is_well_formed() {
            return Err(AimModelError::BadNormalization);
        }
        let OutputScale { bearing, elevation } = checkpoint.output_scale_deg;
        if !bearing.is_finite() || bearing <= 0.0 || !elevation.is_finite() || elevation <= 0.0 {
            return Err(AimModelError::BadScale { bearing, elevation });
        }

        let mut layers = Vec::with_capacity(checkpoint.layers.len());
        let mut expected_inputs = ENCODED_LEN;
        for (index, spec) in checkpoint.layers.into_iter().enumerate() {
            let rows = spec.weights.len();
            if rows == 0 {
                return Err(AimModelError::LayerShape {
                    layer: index,
                    expected: expected_inputs,
                    got: 0,
                });
            }
            let mut flat = Vec::with_capacity(rows * expected_inputs);
            for row in &spec.weights {
                if row.len() != expected_inputs {
                    return Err(AimModelError::LayerShape {
                        layer: index,
                        expected: expected_inputs,
                        got: row.len(),
                    });
                }
                flat.extend_from_slice(row);
            }
            if spec.bias.len() != rows {
                return Err(AimModelError::BiasShape {
                    layer: index,
                    rows,
                    bias: spec.bias.len(),
                });
            }
            if flat.iter().chain(&spec.bias).any(|v| !v.is_finite()) {
                return Err(AimModelError::NonFiniteParameter { layer: index });
            }

            let weights = Array2::from_shape_vec((rows, expected_inputs), flat)
                .map_err(|_| AimModelError::LayerShape {
                    layer: index,
                    expected: expected_inputs,
                    got: rows,
                })?;
            layers.push(DenseLayer {
                weights,
                bias: Array1::from(spec.bias),
                activation: spec.activation,
            });
            expected_inputs = rows;
        }

        if expected_inputs != 2 {
            return Err(AimModelError::OutputArity {
                got: expected_inputs,
            });
        }

        Ok(Self {
            encoder: TrackEncoder::new(checkpoint.normalization),
            layers,
            scale: checkpoint.output_scale_deg,
        })
    }

    /// Encode the track and run the network.
    ///
    /// The two head outputs are clamped to [-1, 1] before scaling, so a
    /// misbehaving checkpoint can never command more lead than the declared
    /// limits.
    pub fn predict(&self, inputs: &AimInputs<'_>) -> AimCorrection {
        let mut activation = self.encoder.encode(inputs);
        for layer in &self.layers {
            let mut z = layer.weights.dot(&activation) + &layer.bias;
            layer.activation.apply(&mut z);
            activation = z;
        }

        AimCorrection {
            bearing_deg: f64::from(activation[0].clamp(-1.0, 1.0)) * self.scale.bearing,
            elevation_deg: f64::from(activation[1].clamp(-1.0, 1.0)) * self.scale.elevation,
        }
    }

    pub fn output_scale(&self) -> OutputScale {
        self.scale
    }
}
