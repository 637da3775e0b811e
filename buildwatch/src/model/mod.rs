//! Outlier model for build feature vectors.
//!
//! The model is an isolation forest: an ensemble of random binary trees
//! where atypical rows isolate in fewer splits than typical ones. The
//! hyperparameters live in [`ForestConfig`]; the detector uses the defaults
//! (100 trees, contamination 0.1, seed 42) so that repeated training runs
//! over the same data produce identical scores.

mod forest;

pub use forest::IsolationForest;

use thiserror::Error;

/// Hyperparameters for the isolation forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub n_estimators: usize,
    /// Rows subsampled per tree, capped at the training-set size.
    pub max_samples: usize,
    /// Expected share of outliers in the training data, in (0, 0.5].
    pub contamination: f64,
    /// Seed for the tree-building RNG.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Sets the number of trees.
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the per-tree subsample cap.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Sets the expected outlier share.
    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.contamination = contamination;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates the hyperparameters.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidConfiguration {
                message: "n_estimators must be at least 1".to_string(),
            });
        }
        if self.max_samples < 2 {
            return Err(ModelError::InvalidConfiguration {
                message: "max_samples must be at least 2".to_string(),
            });
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ModelError::InvalidConfiguration {
                message: format!(
                    "contamination must be in (0, 0.5], got {}",
                    self.contamination
                ),
            });
        }
        Ok(())
    }
}

/// Errors raised when fitting the model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A hyperparameter is out of range.
    #[error("Invalid model configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Fit was called with no rows.
    #[error("Cannot fit on an empty training set")]
    EmptyTrainingSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ForestConfig::default();
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.max_samples, 256);
        assert_eq!(config.contamination, 0.1);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builders() {
        let config = ForestConfig::default()
            .with_n_estimators(50)
            .with_max_samples(128)
            .with_contamination(0.05)
            .with_seed(7);

        assert_eq!(config.n_estimators, 50);
        assert_eq!(config.max_samples, 128);
        assert_eq!(config.contamination, 0.05);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_config_validation_rejects_out_of_range() {
        assert!(ForestConfig::default()
            .with_n_estimators(0)
            .validate()
            .is_err());
        assert!(ForestConfig::default()
            .with_max_samples(1)
            .validate()
            .is_err());
        assert!(ForestConfig::default()
            .with_contamination(0.0)
            .validate()
            .is_err());
        assert!(ForestConfig::default()
            .with_contamination(0.6)
            .validate()
            .is_err());
        assert!(ForestConfig::default()
            .with_contamination(0.5)
            .validate()
            .is_ok());
    }
}
