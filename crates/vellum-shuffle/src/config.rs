//! Shuffle configuration: an ordered processor list plus a top-N selection
//! policy, validated once and then read-only.

/// One routable processor. `min_clock`/`max_clock` of `0` mean "unset" on
/// that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Processor {
    #[serde(default)]
    pub min_clock: u64,
    #[serde(default)]
    pub max_clock: u64,
}

/// The top-N selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Select exactly one of the top-`K` candidates.
    ChooseFrom(usize),
    /// Return all eligible candidates among the top-`K`.
    BroadcastTo(usize),
}

impl Mode {
    pub fn cardinality(self) -> usize {
        match self {
            Mode::ChooseFrom(k) | Mode::BroadcastTo(k) => k,
        }
    }
}

/// Errors rejecting a [`Config`]. `Display` text matches the fixed strings
/// this engine's test suite has always asserted verbatim.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ConfigError {
    #[error("expected at least one Processor")]
    NoProcessors,
    #[error("Processors[0] cannot have clock bounds")]
    PrivilegedProcessorHasBounds,
    #[error("invalid min/max clocks")]
    InvalidClockBounds,
    #[error("expected one of ChooseFrom or BroadcastTo to be non-zero")]
    NoCardinality,
}

/// A validated, immutable shuffle configuration.
#[derive(Debug, Clone)]
pub struct Config {
    processors: Vec<Processor>,
    mode: Mode,
}

impl Config {
    /// Validate `processors`/`mode` per spec: at least one processor;
    /// processor 0 carries no clock bounds; every processor with both
    /// bounds set has `min_clock <= max_clock`; the selection cardinality
    /// is non-zero.
    pub fn validate(processors: Vec<Processor>, mode: Mode) -> Result<Config, ConfigError> {
        let first = processors.first().ok_or(ConfigError::NoProcessors)?;
        if first.min_clock != 0 || first.max_clock != 0 {
            return Err(ConfigError::PrivilegedProcessorHasBounds);
        }
        for p in &processors {
            if p.min_clock != 0 && p.max_clock != 0 && p.min_clock > p.max_clock {
                return Err(ConfigError::InvalidClockBounds);
            }
        }
        if mode.cardinality() == 0 {
            return Err(ConfigError::NoCardinality);
        }
        Ok(Config { processors, mode })
    }

    /// Parse and validate a configuration from a JSON object of the shape
    /// `{"processors": [...], "mode": {"choose_from": K} | {"broadcast_to": K}}`.
    pub fn from_json(bytes: &[u8]) -> Result<Config, ConfigFromJsonError> {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            processors: Vec<Processor>,
            mode: Mode,
        }
        let raw: Raw = serde_json::from_slice(bytes)?;
        Ok(Config::validate(raw.processors, raw.mode)?)
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Errors building a [`Config`] from a JSON blob: either the JSON itself is
/// malformed, or it is well-formed but fails [`Config::validate`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigFromJsonError {
    #[error("shuffle configuration is not well-formed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validation_error_strings() {
        assert_eq!(
            Config::validate(vec![], Mode::BroadcastTo(1))
                .unwrap_err()
                .to_string(),
            "expected at least one Processor"
        );

        assert_eq!(
            Config::validate(
                vec![Processor { min_clock: 1, max_clock: 0 }],
                Mode::BroadcastTo(1),
            )
            .unwrap_err()
            .to_string(),
            "Processors[0] cannot have clock bounds"
        );

        assert_eq!(
            Config::validate(
                vec![
                    Processor { min_clock: 0, max_clock: 0 },
                    Processor { min_clock: 10, max_clock: 5 },
                ],
                Mode::BroadcastTo(1),
            )
            .unwrap_err()
            .to_string(),
            "invalid min/max clocks"
        );

        assert_eq!(
            Config::validate(
                vec![Processor { min_clock: 0, max_clock: 0 }],
                Mode::BroadcastTo(0),
            )
            .unwrap_err()
            .to_string(),
            "expected one of ChooseFrom or BroadcastTo to be non-zero"
        );
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_json(
            br#"{"processors":[{"min_clock":0,"max_clock":0},{"min_clock":100,"max_clock":200}],"mode":{"broadcast_to":2}}"#,
        )
        .unwrap();
        assert_eq!(config.processors().len(), 2);
        assert_eq!(config.mode(), Mode::BroadcastTo(2));
    }
}
