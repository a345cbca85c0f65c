use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Number of target-track samples the predictor looks back over.
pub const HISTORY: usize = 4;

const FEATURES_PER_SAMPLE: usize = 5;
const GLOBAL_FEATURES: usize = 4;

/// Width of the encoded feature vector the network consumes.
pub const ENCODED_LEN: usize = HISTORY * FEATURES_PER_SAMPLE + GLOBAL_FEATURES;

/// One observation of target kinematics, in world units per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackSample {
    pub range: f64,
    /// World-frame bearing from the unit to the target, degrees.
    pub bearing_deg: f64,
    pub range_rate: f64,
    pub bearing_rate_deg: f64,
}

/// Everything the predictor sees for one tick.
///
/// `samples` is oldest-first with the newest observation last; shorter
/// histories are zero-padded at the front of the encoding.
#[derive(Debug, Clone, Copy)]
pub struct AimInputs<'a> {
    pub samples: &'a [TrackSample],
    /// World-frame turret bearing, degrees.
    pub turret_bearing_deg: f64,
    pub line_of_sight: bool,
}

/// Scale constants baked into the checkpoint so the encoder and the frozen
/// weights stay consistent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub max_range: f64,
    pub max_range_rate: f64,
    pub max_bearing_rate_deg: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            max_range: 200.0,
            max_range_rate: 5.0,
            max_bearing_rate_deg: 30.0,
        }
    }
}

impl Normalization {
    pub(crate) fn is_well_formed(&self) -> bool {
        [self.max_range, self.max_range_rate, self.max_bearing_rate_deg]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

fn clip(v: f64) -> f32 {
    v.clamp(-1.0, 1.0) as f32
}

/// Maps a target track to the fixed-width feature vector.
///
/// Layout, oldest sample first: per sample `[range, sin(bearing),
/// cos(bearing), range_rate, bearing_rate]` after normalization, then the
/// globals `[sin(aim_error), cos(aim_error), line_of_sight, history_fill]`.
/// Every feature is clipped to [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct TrackEncoder {
    norm: Normalization,
}

impl TrackEncoder {
    pub fn new(norm: Normalization) -> Self {
        Self { norm }
    }

    pub fn encode(&self, inputs: &AimInputs<'_>) -> Array1<f32> {
        let mut features = [0.0f32; ENCODED_LEN];

        let available = inputs.samples.len().min(HISTORY);
        let skipped = HISTORY - available;
        let newest = &inputs.samples[inputs.samples.len() - available..];

        for (slot, sample) in newest.iter().enumerate() {
            let base = (skipped + slot) * FEATURES_PER_SAMPLE;
            let bearing = sample.bearing_deg.to_radians();
            features[base] = clip(sample.range / self.norm.max_range);
            features[base + 1] = clip(bearing.sin());
            features[base + 2] = clip(bearing.cos());
            features[base + 3] = clip(sample.range_rate / self.norm.max_range_rate);
            features[base + 4] = clip(sample.bearing_rate_deg / self.norm.max_bearing_rate_deg);
        }

        let globals = HISTORY * FEATURES_PER_SAMPLE;
        if let Some(last) = newest.last() {
            let aim_error = wrap_degrees(last.bearing_deg - inputs.turret_bearing_deg).to_radians();
            features[globals] = clip(aim_error.sin());
            features[globals + 1] = clip(aim_error.cos());
        }
        features[globals + 2] = if inputs.line_of_sight { 1.0 } else { 0.0 };
        features[globals + 3] = clip(available as f64 / HISTORY as f64);

        Array1::from_iter(features)
    }
}
