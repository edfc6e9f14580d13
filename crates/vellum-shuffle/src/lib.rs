//! Rendezvous-hash based shuffling of keys to a fixed set of processors,
//! with per-processor clock-bound filtering and a choose-one/broadcast
//! selection policy.

mod config;
mod pick;
mod weights;

pub use config::{Config, ConfigError, ConfigFromJsonError, Mode, Processor};

/// A validated configuration plus its derived per-processor weight
/// sequence, ready to route `(hash, clock)` inputs.
pub struct Shuffle {
    config: Config,
    weights: Vec<u32>,
}

impl Shuffle {
    /// Build a `Shuffle` from an already-[`Config::validate`]d configuration.
    /// Derives the fixed weight sequence for this processor count once, up
    /// front.
    pub fn new(config: Config) -> Shuffle {
        let weights = weights::derive_weights(config.processors().len());
        tracing::debug!(processors = config.processors().len(), "derived shuffle weights");
        Shuffle { config, weights }
    }

    /// Route `(hash, clock)` to a list of processor indices, per the
    /// configured [`Mode`].
    pub fn pick(&self, hash: u32, clock: u64) -> Vec<usize> {
        pick::pick(self.config.processors(), &self.weights, self.config.mode(), hash, clock)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
