//! Frozen neural aim predictor: target-track encoder and MLP inference.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod checkpoint;
pub mod encoder;
pub mod model;

pub use checkpoint::{Checkpoint, LayerSpec, OutputScale};
pub use encoder::{AimInputs, Normalization, TrackEncoder, TrackSample, ENCODED_LEN, HISTORY};
pub use model::{Activation, AimCorrection, AimModel, AimModelError};
