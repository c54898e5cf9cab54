//! Model hyperparameters: defaults for GPT-2 small, overridable from the environment.

use std::ops::RangeInclusive;

use bevy::prelude::*;

const EMBEDDING_DIM_VAR: &str = "GPT_EMBEDDING_DIM";
const NUM_HEADS_VAR: &str = "GPT_NUM_HEADS";
const NUM_LAYERS_VAR: &str = "GPT_NUM_LAYERS";
const VOCAB_SIZE_VAR: &str = "GPT_VOCAB_SIZE";
const CONTEXT_LENGTH_VAR: &str = "GPT_CONTEXT_LENGTH";
const FF_DIM_VAR: &str = "GPT_FF_DIM";

/// Shape of the visualized model. Only read while the scene is built.
#[derive(Resource, Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    pub embedding_dim: usize,
    pub num_heads: usize,
    pub num_layers: usize,
    pub vocab_size: usize,
    pub context_length: usize,
    pub ff_dim: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 768,
            num_heads: 12,
            num_layers: 6,
            vocab_size: 50257,
            context_length: 1024,
            ff_dim: 3072,
        }
    }
}

impl ModelConfig {
    pub fn token_embedding_params(&self) -> usize {
        self.vocab_size.saturating_mul(self.embedding_dim)
    }

    pub fn positional_embedding_params(&self) -> usize {
        self.context_length.saturating_mul(self.embedding_dim)
    }

    /// Q, K, V and output projections with biases.
    pub fn attention_params(&self) -> usize {
        let d = self.embedding_dim;
        d.saturating_mul(d).saturating_add(d).saturating_mul(4)
    }

    pub fn feed_forward_params(&self) -> usize {
        self.embedding_dim
            .saturating_mul(self.ff_dim)
            .saturating_mul(2)
            .saturating_add(self.ff_dim)
            .saturating_add(self.embedding_dim)
    }

    /// Gain and bias.
    pub fn layer_norm_params(&self) -> usize {
        self.embedding_dim.saturating_mul(2)
    }

    /// Output projection; weights are tied to the token embedding.
    pub fn output_params(&self) -> usize {
        self.token_embedding_params()
    }

    pub fn total_params(&self) -> usize {
        let per_layer = self
            .attention_params()
            .saturating_add(self.feed_forward_params())
            .saturating_add(self.layer_norm_params().saturating_mul(2));
        self.token_embedding_params()
            .saturating_add(self.positional_embedding_params())
            .saturating_add(self.num_layers.saturating_mul(per_layer))
            .saturating_add(self.layer_norm_params())
    }
}

// Accepted override range per variable.
const EMBEDDING_DIM_RANGE: RangeInclusive<usize> = 1..=16_384;
const NUM_HEADS_RANGE: RangeInclusive<usize> = 1..=128;
const NUM_LAYERS_RANGE: RangeInclusive<usize> = 1..=96;
const VOCAB_SIZE_RANGE: RangeInclusive<usize> = 1..=1_000_000;
const CONTEXT_LENGTH_RANGE: RangeInclusive<usize> = 1..=1_048_576;
const FF_DIM_RANGE: RangeInclusive<usize> = 1..=65_536;

/// Default config with any `GPT_*` environment overrides applied.
/// Unparseable or out-of-range values are reported and ignored.
pub fn model_config() -> ModelConfig {
    let mut config = ModelConfig::default();
    override_from_env(EMBEDDING_DIM_VAR, EMBEDDING_DIM_RANGE, &mut config.embedding_dim);
    override_from_env(NUM_HEADS_VAR, NUM_HEADS_RANGE, &mut config.num_heads);
    override_from_env(NUM_LAYERS_VAR, NUM_LAYERS_RANGE, &mut config.num_layers);
    override_from_env(VOCAB_SIZE_VAR, VOCAB_SIZE_RANGE, &mut config.vocab_size);
    override_from_env(CONTEXT_LENGTH_VAR, CONTEXT_LENGTH_RANGE, &mut config.context_length);
    override_from_env(FF_DIM_VAR, FF_DIM_RANGE, &mut config.ff_dim);
    config
}

fn override_from_env(var: &str, range: RangeInclusive<usize>, slot: &mut usize) {
    let Ok(raw) = std::env::var(var) else {
        return;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if range.contains(&value) => *slot = value,
        Ok(value) => warn!(
            "config: ignoring {var}={value}: outside {}..={}",
            range.start(),
            range.end()
        ),
        Err(err) => warn!("config: ignoring {var}={raw:?}: {err}"),
    }
}

/// Compact parameter count label, e.g. `38.6M`.
pub fn format_params(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
