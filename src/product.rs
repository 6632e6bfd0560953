//! Product iteration.
//!
//! Evaluates the family expression once per concrete product configuration,
//! either sequentially or fanned out over the rayon worker pool. Each
//! configuration's evaluation is an independent, stateless unit of work over
//! read-only shared state, so the parallel path needs no locks.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use rayon::prelude::*;

use crate::encoder::FamilyExpression;
use crate::error::Error;

/// How the product iterator schedules configuration evaluations.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConcurrencyStrategy {
    /// One configuration at a time, one shared parsed expression.
    Sequential,
    /// One rayon task per configuration; no completion-order guarantee.
    Parallel,
}

/// A concrete product: the set of selected feature names.
///
/// Set semantics; two configurations selecting the same features compare
/// equal regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Configuration {
    features: BTreeSet<String>,
}

impl Configuration {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Configuration {
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{feature}")?;
        }
        write!(f, "}}")
    }
}

/// A configuration whose evaluation failed.
#[derive(Debug)]
pub struct EvaluationFailure {
    pub configuration: Configuration,
    pub error: Error,
}

/// Per-configuration reliabilities plus per-configuration failure records.
///
/// A failing configuration aborts only its own unit of work; the run still
/// yields values for every other configuration.
#[derive(Debug, Default)]
pub struct ReliabilityResults {
    values: HashMap<Configuration, f64>,
    failures: Vec<EvaluationFailure>,
}

impl ReliabilityResults {
    pub fn get(&self, configuration: &Configuration) -> Option<f64> {
        self.values.get(configuration).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = (&Configuration, f64)> {
        self.values.iter().map(|(c, &v)| (c, v))
    }

    pub fn failures(&self) -> &[EvaluationFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn record(&mut self, configuration: Configuration, outcome: Result<f64, Error>) {
        match outcome {
            Ok(value) => {
                self.values.insert(configuration, value);
            }
            Err(error) => {
                log::warn!("evaluation of {configuration} failed: {error}");
                self.failures.push(EvaluationFailure {
                    configuration,
                    error,
                });
            }
        }
    }
}

/// Evaluate the family expression for every configuration.
pub fn evaluate_products(
    family: &FamilyExpression,
    configurations: impl IntoIterator<Item = Configuration>,
    strategy: ConcurrencyStrategy,
) -> ReliabilityResults {
    let mut results = ReliabilityResults::default();
    match strategy {
        ConcurrencyStrategy::Sequential => {
            for configuration in configurations {
                log::trace!("evaluating {configuration}");
                let outcome = family.evaluate(&configuration);
                results.record(configuration, outcome);
            }
        }
        ConcurrencyStrategy::Parallel => {
            let configurations: Vec<Configuration> = configurations.into_iter().collect();
            let outcomes: Vec<(Configuration, Result<f64, Error>)> = configurations
                .into_par_iter()
                .map(|configuration| {
                    let outcome = family.evaluate(&configuration);
                    (configuration, outcome)
                })
                .collect();
            for (configuration, outcome) in outcomes {
                results.record(configuration, outcome);
            }
        }
    }
    results
}
