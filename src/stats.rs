//! Descriptive statistics for the standard deviation and margin-of-error calculators

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// z-score for a two-sided 95% confidence interval
pub const Z_95: f64 = 1.96;

/// Divisor convention for the variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceMode {
    /// Divide by n - 1
    #[default]
    Sample,
    /// Divide by n
    Population,
}

/// Ordered observations and the variance convention to apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSet {
    pub values: Vec<f64>,
    #[serde(default)]
    pub mode: VarianceMode,
}

impl SampleSet {
    pub fn new(values: Vec<f64>, mode: VarianceMode) -> Self {
        Self { values, mode }
    }

    /// Parse comma/whitespace separated numbers as typed into a text area
    pub fn parse(text: &str, mode: VarianceMode) -> CalcResult<Self> {
        let values = text
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|_| CalcError::invalid_input("values", token, "not a number"))
            })
            .collect::<CalcResult<Vec<_>>>()?;
        Ok(Self { values, mode })
    }
}

/// Summary statistics of a sample set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Description {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub variance: f64,
    pub std_dev: f64,
    /// 1.96 * std_dev / sqrt(n)
    pub margin_of_error_95: f64,
}

fn validate(samples: &SampleSet) -> CalcResult<()> {
    let n = samples.values.len();
    if n == 0 {
        return Err(CalcError::invalid_input("values", n, "at least one value is required"));
    }
    if samples.mode == VarianceMode::Sample && n < 2 {
        return Err(CalcError::invalid_input(
            "values",
            n,
            "sample variance needs at least two values",
        ));
    }
    if let Some(bad) = samples.values.iter().find(|v| !v.is_finite()) {
        return Err(CalcError::invalid_input("values", bad, "must be a finite number"));
    }
    Ok(())
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Describe a sample set
pub fn describe(samples: &SampleSet) -> CalcResult<Description> {
    validate(samples)?;

    let values = &samples.values;
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;

    let divisor = match samples.mode {
        VarianceMode::Sample => n - 1.0,
        VarianceMode::Population => n,
    };
    let squared: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    let variance = squared / divisor;
    let std_dev = variance.sqrt();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Finite samples near f64::MAX can still overflow the accumulators
    let accumulators = [
        ("sum", sum),
        ("mean", mean),
        ("variance", variance),
        ("range", max - min),
    ];
    for (field, value) in accumulators {
        if !value.is_finite() {
            return Err(CalcError::invalid_input(
                field,
                value,
                "overflows; values are too large to summarise",
            ));
        }
    }

    debug!("{} values ({:?}): mean {}, sd {}", values.len(), samples.mode, mean, std_dev);

    Ok(Description {
        count: values.len(),
        sum,
        mean,
        median: median(values),
        min,
        max,
        range: max - min,
        variance,
        std_dev,
        margin_of_error_95: Z_95 * std_dev / n.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const REFERENCE: [f64; 8] = [10.0, 12.0, 23.0, 23.0, 16.0, 23.0, 21.0, 16.0];

    #[test]
    fn test_sample_reference() {
        let d = describe(&SampleSet::new(REFERENCE.to_vec(), VarianceMode::Sample)).unwrap();

        assert_eq!(d.count, 8);
        assert_abs_diff_eq!(d.sum, 144.0);
        assert_abs_diff_eq!(d.mean, 18.0);
        assert_abs_diff_eq!(d.variance, 192.0 / 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.std_dev, 5.237, epsilon = 5e-4);
        assert_abs_diff_eq!(
            d.margin_of_error_95,
            1.96 * d.std_dev / 8f64.sqrt(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(d.median, 18.5);
        assert_eq!(d.min, 10.0);
        assert_eq!(d.max, 23.0);
        assert_eq!(d.range, 13.0);
    }

    #[test]
    fn test_population_reference() {
        let d = describe(&SampleSet::new(REFERENCE.to_vec(), VarianceMode::Population)).unwrap();

        assert_abs_diff_eq!(d.variance, 24.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.std_dev, 24f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_value_population() {
        let d = describe(&SampleSet::new(vec![42.0], VarianceMode::Population)).unwrap();

        assert_eq!(d.variance, 0.0);
        assert_eq!(d.median, 42.0);
        assert_eq!(d.margin_of_error_95, 0.0);
    }

    #[test]
    fn test_sample_mode_rejects_single_value() {
        let err = describe(&SampleSet::new(vec![42.0], VarianceMode::Sample)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert!(describe(&SampleSet::new(vec![], VarianceMode::Population)).is_err());
        assert!(describe(&SampleSet::new(vec![1.0, f64::NAN], VarianceMode::Sample)).is_err());
    }

    #[test]
    fn test_rejects_overflowing_samples() {
        let huge = SampleSet::new(vec![1e308, 1e308], VarianceMode::Sample);
        assert_eq!(describe(&huge).unwrap_err().error_code(), "INVALID_INPUT");

        let spread = SampleSet::new(vec![-1e308, 1e308], VarianceMode::Population);
        assert_eq!(describe(&spread).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_variance_non_negative() {
        let sets = [
            vec![1e9, 1e9 + 1.0, 1e9 + 2.0],
            vec![-5.0, -5.0, -5.0],
            vec![0.1, 0.2, 0.3, 0.4],
        ];
        for values in sets {
            for mode in [VarianceMode::Sample, VarianceMode::Population] {
                let d = describe(&SampleSet::new(values.clone(), mode)).unwrap();
                assert!(d.variance >= 0.0);
            }
        }
    }

    #[test]
    fn test_parse_text() {
        let set = SampleSet::parse("10, 12 23\n23;16", VarianceMode::Sample).unwrap();
        assert_eq!(set.values, vec![10.0, 12.0, 23.0, 23.0, 16.0]);

        assert!(SampleSet::parse("1, two, 3", VarianceMode::Sample).is_err());
    }
}
