//! Statistical tests available for comparing one column across datasets,
//! and the rule that picks a test for a column.
use crate::constants::{
    BINARY_UNIQUE_LIMIT, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_PVALUE_THRESHOLD, LARGE_SAMPLE_LIMIT,
    NUMERICAL_UNIQUE_LIMIT, WASSERSTEIN_MIN_STD,
};
use crate::data::Column;
use crate::drift::stats::{chi_square_gof, jensen_shannon_distance, ks_2samp, proportions_z_test, wasserstein_distance};
use crate::errors::DriftError;
use crate::mapping::FeatureKind;
use crate::utils::{items_to_strings, std_dev};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};
use std::str::FromStr;

const HISTOGRAM_BINS: usize = 10;
/// Replaces empty bins so distances stay finite.
const EMPTY_BIN_SHARE: f64 = 0.0001;

/// Whether a score is a p-value (drift below threshold) or a distance
/// (drift at or above threshold).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    PValue,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatTest {
    #[serde(rename = "ks")]
    KolmogorovSmirnov,
    #[serde(rename = "wasserstein")]
    Wasserstein,
    #[serde(rename = "chisquare")]
    ChiSquare,
    #[serde(rename = "jensenshannon")]
    JensenShannon,
    #[serde(rename = "z")]
    ZTest,
}

impl FromStr for StatTest {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ks" => Ok(StatTest::KolmogorovSmirnov),
            "wasserstein" => Ok(StatTest::Wasserstein),
            "chisquare" => Ok(StatTest::ChiSquare),
            "jensenshannon" => Ok(StatTest::JensenShannon),
            "z" => Ok(StatTest::ZTest),
            _ => Err(DriftError::ParseString(
                s.to_string(),
                "StatTest".to_string(),
                items_to_strings(vec!["ks", "wasserstein", "chisquare", "jensenshannon", "z"]),
            )),
        }
    }
}

impl Display for StatTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl StatTest {
    pub fn name(&self) -> &'static str {
        match self {
            StatTest::KolmogorovSmirnov => "K-S p_value",
            StatTest::Wasserstein => "Wasserstein distance (normed)",
            StatTest::ChiSquare => "chi-square p_value",
            StatTest::JensenShannon => "Jensen-Shannon distance",
            StatTest::ZTest => "Z-test p_value",
        }
    }

    pub fn score_kind(&self) -> ScoreKind {
        match self {
            StatTest::KolmogorovSmirnov | StatTest::ChiSquare | StatTest::ZTest => ScoreKind::PValue,
            StatTest::Wasserstein | StatTest::JensenShannon => ScoreKind::Distance,
        }
    }

    pub fn default_threshold(&self) -> f64 {
        match self.score_kind() {
            ScoreKind::PValue => DEFAULT_PVALUE_THRESHOLD,
            ScoreKind::Distance => DEFAULT_DISTANCE_THRESHOLD,
        }
    }

    pub fn is_drift(&self, score: f64, threshold: f64) -> bool {
        match self.score_kind() {
            ScoreKind::PValue => score < threshold,
            ScoreKind::Distance => score >= threshold,
        }
    }

    /// Default test for a column given its role, the reference size and the
    /// number of unique reference values.
    pub fn select(kind: FeatureKind, reference_size: usize, n_unique: usize) -> StatTest {
        let small = reference_size <= LARGE_SAMPLE_LIMIT;
        match kind {
            FeatureKind::Numerical => match (small, n_unique <= NUMERICAL_UNIQUE_LIMIT) {
                (true, true) => StatTest::ChiSquare,
                (true, false) => StatTest::KolmogorovSmirnov,
                (false, true) => StatTest::JensenShannon,
                (false, false) => StatTest::Wasserstein,
            },
            FeatureKind::Categorical => {
                if !small {
                    StatTest::JensenShannon
                } else if n_unique <= BINARY_UNIQUE_LIMIT {
                    StatTest::ZTest
                } else {
                    StatTest::ChiSquare
                }
            }
        }
    }

    /// Score the current sample against the reference sample. `None` when
    /// the test needs numeric values and the column has none, or when a
    /// Z-test meets more than two categories.
    pub fn score(&self, reference: &Sample, current: &Sample) -> Option<f64> {
        match self {
            StatTest::KolmogorovSmirnov => {
                let (r, c) = (reference.numeric.as_ref()?, current.numeric.as_ref()?);
                Some(ks_2samp(r, c).1)
            }
            StatTest::Wasserstein => {
                let (r, c) = (reference.numeric.as_ref()?, current.numeric.as_ref()?);
                let norm = std_dev(r).unwrap_or(0.0).max(WASSERSTEIN_MIN_STD);
                Some(wasserstein_distance(r, c) / norm)
            }
            StatTest::ChiSquare => {
                let (r, c) = category_counts(reference, current);
                let k_norm = current.len() as f64 / reference.len() as f64;
                let expected: Vec<f64> = r.iter().map(|x| x * k_norm).collect();
                Some(chi_square_gof(&c, &expected).1)
            }
            StatTest::JensenShannon => {
                let (r, c) = match (&reference.numeric, &current.numeric) {
                    (Some(r), Some(c)) if reference.n_unique() > NUMERICAL_UNIQUE_LIMIT => histogram_counts(r, c),
                    _ => category_counts(reference, current),
                };
                Some(jensen_shannon_distance(&fill_empty(&r), &fill_empty(&c)))
            }
            StatTest::ZTest => {
                let (labels, r, c) = category_table(reference, current);
                match labels.len() {
                    0 | 1 => Some(1.0),
                    2 => Some(proportions_z_test(r[0], reference.len() as f64, c[0], current.len() as f64).1),
                    _ => None,
                }
            }
        }
    }
}

/// Non-missing values of one column, in the two shapes the tests consume.
#[derive(Debug, Clone)]
pub struct Sample {
    pub numeric: Option<Vec<f64>>,
    pub labels: Vec<String>,
}

impl Sample {
    pub fn from_column(column: &Column) -> Self {
        Sample {
            numeric: column.numeric_values(),
            labels: column.category_values(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_unique(&self) -> usize {
        self.labels.iter().collect::<BTreeSet<_>>().len()
    }
}

/// Sorted union of labels with per-dataset counts.
fn category_table(reference: &Sample, current: &Sample) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let mut counts: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for l in &reference.labels {
        counts.entry(l.as_str()).or_default().0 += 1.0;
    }
    for l in &current.labels {
        counts.entry(l.as_str()).or_default().1 += 1.0;
    }
    let labels = counts.keys().map(|k| k.to_string()).collect();
    let (r, c) = counts.values().copied().unzip();
    (labels, r, c)
}

fn category_counts(reference: &Sample, current: &Sample) -> (Vec<f64>, Vec<f64>) {
    let (_, r, c) = category_table(reference, current);
    (r, c)
}

/// Equal width histogram over the combined range of both samples.
fn histogram_counts(reference: &[f64], current: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let all = reference.iter().chain(current);
    let lo = all.clone().copied().fold(f64::INFINITY, f64::min);
    let hi = all.copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (hi - lo) / HISTOGRAM_BINS as f64;
    let bin = |x: f64| {
        if width <= 0.0 {
            0
        } else {
            (((x - lo) / width) as usize).min(HISTOGRAM_BINS - 1)
        }
    };
    let mut r = vec![0.0; HISTOGRAM_BINS];
    let mut c = vec![0.0; HISTOGRAM_BINS];
    reference.iter().for_each(|&x| r[bin(x)] += 1.0);
    current.iter().for_each(|&x| c[bin(x)] += 1.0);
    (r, c)
}

fn fill_empty(counts: &[f64]) -> Vec<f64> {
    let total: f64 = counts.iter().sum();
    counts
        .iter()
        .map(|&x| if x == 0.0 || total == 0.0 { EMPTY_BIN_SHARE } else { x / total })
        .collect()
}
