// src/models/model.rs
use crate::error::{validation::*, PricingError, PricingResult};
use ndarray::Array2;
use rand::RngCore;

/// Strictly increasing exercise times `0 < t1 < ... < tN`
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSchedule {
    dates: Vec<f64>,
}

impl ExerciseSchedule {
    pub fn new(dates: Vec<f64>) -> PricingResult<Self> {
        if dates.is_empty() {
            return Err(PricingError::InvalidConfiguration {
                field: "exercise_dates".to_string(),
                reason: "at least one exercise date is required".to_string(),
            });
        }
        let mut previous = 0.0;
        for &t in &dates {
            validate_finite("exercise_date", t)?;
            if t <= previous {
                return Err(PricingError::InvalidParameters {
                    parameter: "exercise_date".to_string(),
                    value: t,
                    constraint: format!("must be strictly greater than {}", previous),
                });
            }
            previous = t;
        }
        Ok(Self { dates })
    }

    /// `n` equally spaced dates `T/n, 2T/n, ..., T`
    pub fn uniform(maturity: f64, n: usize) -> PricingResult<Self> {
        validate_positive("maturity", maturity)?;
        if n == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "exercise_dates".to_string(),
                reason: "at least one exercise date is required".to_string(),
            });
        }
        Self::new((1..=n).map(|i| maturity * i as f64 / n as f64).collect())
    }

    pub fn dates(&self) -> &[f64] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn maturity(&self) -> f64 {
        self.dates[self.dates.len() - 1]
    }

    /// Year fraction between date `i` and the previous date (or today for `i = 0`)
    pub fn step(&self, i: usize) -> f64 {
        if i == 0 {
            self.dates[0]
        } else {
            self.dates[i] - self.dates[i - 1]
        }
    }
}

/// Simulated prices: one `(paths × assets)` table per exercise date
#[derive(Debug, Clone)]
pub struct PathSet {
    tables: Vec<Array2<f64>>,
    independent_paths: usize,
}

impl PathSet {
    /// `independent_paths` is the number of paths driven by fresh draws
    /// (half the rows under antithetic sampling).
    pub fn new(tables: Vec<Array2<f64>>, independent_paths: usize) -> PricingResult<Self> {
        let first = tables.first().ok_or_else(|| PricingError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: "a path set needs at least one date".to_string(),
        })?;
        let dim = first.dim();
        for table in &tables {
            validate_same_len("path set rows", dim.0, table.nrows())?;
            validate_same_len("path set assets", dim.1, table.ncols())?;
        }
        Ok(Self {
            tables,
            independent_paths,
        })
    }

    pub fn at(&self, date_index: usize) -> &Array2<f64> {
        &self.tables[date_index]
    }

    pub fn tables(&self) -> &[Array2<f64>] {
        &self.tables
    }

    pub fn num_dates(&self) -> usize {
        self.tables.len()
    }

    pub fn num_paths(&self) -> usize {
        self.tables[0].nrows()
    }

    pub fn num_assets(&self) -> usize {
        self.tables[0].ncols()
    }

    pub fn independent_paths(&self) -> usize {
        self.independent_paths
    }

    /// True when rows `n..2n` mirror rows `0..n`
    pub fn is_antithetic(&self) -> bool {
        self.num_paths() == 2 * self.independent_paths
    }
}

/// A model that simulates asset prices at a fixed set of future dates.
///
/// Randomness comes exclusively from the stream passed in, so one stream per
/// worker gives reproducible parallel runs.
pub trait DiffusionModel: Send + Sync {
    /// Number of simulated assets
    fn dimension(&self) -> usize;

    /// Seed the owning engine should use for its stream
    fn seed(&self) -> u64;

    /// Simulate `num_paths` paths (`2 * num_paths` rows when `antithetic`)
    fn diffuse(
        &self,
        schedule: &ExerciseSchedule,
        num_paths: usize,
        antithetic: bool,
        rng: &mut dyn RngCore,
    ) -> PricingResult<PathSet>;
}
