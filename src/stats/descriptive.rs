use std::collections::HashMap;

use serde::Serialize;

use super::{proportion, Measure};

/// Percentiles reported for length and GC distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    /// 5th percentile.
    pub p5: Measure,
    /// 10th percentile.
    pub p10: Measure,
    /// 25th percentile.
    pub p25: Measure,
    /// 50th percentile.
    pub p50: Measure,
    /// 75th percentile.
    pub p75: Measure,
    /// 90th percentile.
    pub p90: Measure,
    /// 95th percentile.
    pub p95: Measure,
}

/// Descriptive statistics of a sample.
///
/// Variance and standard deviation are population statistics (ddof = 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthSummary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: Measure,
    /// Median.
    pub median: Measure,
    /// Most frequent value; ties go to the value seen first.
    pub mode: Measure,
    /// Population standard deviation.
    pub std_dev: Measure,
    /// Population variance.
    pub variance: Measure,
    /// Smallest value.
    pub min: Measure,
    /// Largest value.
    pub max: Measure,
    /// `max - min`.
    pub range: Measure,
    /// Selected percentiles.
    pub percentiles: Percentiles,
    /// `p75 - p25`.
    pub iqr: Measure,
    /// `std_dev / mean * 100`.
    pub coefficient_of_variation: Measure,
}

/// Percentile `p` (0..=100) of an ascending-sorted sample, linear
/// interpolation between closest ranks.
pub fn percentile(sorted: &[f64], p: f64) -> Measure {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return Measure::Undefined;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Measure::from_f64(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn mode(values: &[f64]) -> Measure {
    let mut seen: HashMap<u64, (usize, usize)> = HashMap::new();
    for (idx, value) in values.iter().enumerate() {
        seen.entry(value.to_bits()).or_insert((0, idx)).0 += 1;
    }
    seen.into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(bits, _)| Measure::from_f64(f64::from_bits(bits)))
        .unwrap_or(Measure::Undefined)
}

/// Summarize a sample. An empty sample yields `count == 0` with every
/// statistic undefined.
pub fn summarize(values: &[f64]) -> LengthSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let mean = Measure::ratio(sorted.iter().sum(), n);
    let variance = match mean {
        Measure::Value(m) => Measure::ratio(sorted.iter().map(|x| (x - m) * (x - m)).sum(), n),
        Measure::Undefined => Measure::Undefined,
    };
    let std_dev = variance.map(f64::sqrt);
    let min = sorted.first().copied().map_or(Measure::Undefined, Measure::from_f64);
    let max = sorted.last().copied().map_or(Measure::Undefined, Measure::from_f64);

    let percentiles = Percentiles {
        p5: percentile(&sorted, 5.0),
        p10: percentile(&sorted, 10.0),
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
    };

    let coefficient_of_variation = match (std_dev, mean) {
        (Measure::Value(sd), Measure::Value(m)) if m > 0.0 => Measure::Value(sd / m * 100.0),
        _ => Measure::Undefined,
    };

    LengthSummary {
        count: sorted.len(),
        mean,
        median: percentiles.p50,
        mode: mode(values),
        std_dev,
        variance,
        min,
        max,
        range: difference(max, min),
        percentiles,
        iqr: difference(percentiles.p75, percentiles.p25),
        coefficient_of_variation,
    }
}

fn difference(a: Measure, b: Measure) -> Measure {
    match (a, b) {
        (Measure::Value(a), Measure::Value(b)) => Measure::Value(a - b),
        _ => Measure::Undefined,
    }
}

/// Tukey fences at 1.5 × IQR and the observations outside them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierSummary {
    /// `p25 - 1.5 * iqr`.
    pub lower_fence: Measure,
    /// `p75 + 1.5 * iqr`.
    pub upper_fence: Measure,
    /// Observations below the lower fence.
    pub low: usize,
    /// Observations above the upper fence.
    pub high: usize,
    /// Outliers as a share of all observations.
    pub percent: Measure,
}

impl OutlierSummary {
    /// Detect outliers in `values` using the quartiles of `summary`.
    pub fn detect(values: &[f64], summary: &LengthSummary) -> Self {
        const MULTIPLIER: f64 = 1.5;
        let (lower_fence, upper_fence) = match (
            summary.percentiles.p25,
            summary.percentiles.p75,
            summary.iqr,
        ) {
            (Measure::Value(q1), Measure::Value(q3), Measure::Value(iqr)) => (
                Measure::Value(q1 - MULTIPLIER * iqr),
                Measure::Value(q3 + MULTIPLIER * iqr),
            ),
            _ => (Measure::Undefined, Measure::Undefined),
        };

        let low = lower_fence
            .value()
            .map_or(0, |fence| values.iter().filter(|&&v| v < fence).count());
        let high = upper_fence
            .value()
            .map_or(0, |fence| values.iter().filter(|&&v| v > fence).count());

        Self {
            lower_fence,
            upper_fence,
            low,
            high,
            percent: proportion(low + high, values.len()),
        }
    }

    /// Total outliers on both sides.
    pub fn total(&self) -> usize {
        self.low + self.high
    }
}

/// Coarse CDS length classes in base pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    /// Under 300 bp (< 100 aa).
    VerySmall,
    /// 300 to 599 bp.
    Small,
    /// 600 to 1199 bp.
    Medium,
    /// 1200 to 2399 bp.
    Large,
    /// 2400 bp and longer (> 800 aa).
    VeryLarge,
}

impl SizeClass {
    /// Every class, smallest first.
    pub const ALL: [SizeClass; 5] = [
        SizeClass::VerySmall,
        SizeClass::Small,
        SizeClass::Medium,
        SizeClass::Large,
        SizeClass::VeryLarge,
    ];

    /// Class of a length in base pairs.
    pub fn of(length: usize) -> Self {
        match length {
            0..=299 => SizeClass::VerySmall,
            300..=599 => SizeClass::Small,
            600..=1199 => SizeClass::Medium,
            1200..=2399 => SizeClass::Large,
            _ => SizeClass::VeryLarge,
        }
    }

    /// Human-readable bounds.
    pub fn label(self) -> &'static str {
        match self {
            SizeClass::VerySmall => "<300 bp",
            SizeClass::Small => "300-600 bp",
            SizeClass::Medium => "600-1200 bp",
            SizeClass::Large => "1200-2400 bp",
            SizeClass::VeryLarge => ">=2400 bp",
        }
    }
}

/// Number of CDS per [`SizeClass`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeClassCounts {
    /// Under 300 bp.
    pub very_small: usize,
    /// 300 to 599 bp.
    pub small: usize,
    /// 600 to 1199 bp.
    pub medium: usize,
    /// 1200 to 2399 bp.
    pub large: usize,
    /// 2400 bp and longer.
    pub very_large: usize,
}

impl SizeClassCounts {
    /// Bin every length.
    pub fn from_lengths(lengths: impl IntoIterator<Item = usize>) -> Self {
        let mut counts = Self::default();
        for length in lengths {
            *counts.slot(SizeClass::of(length)) += 1;
        }
        counts
    }

    fn slot(&mut self, class: SizeClass) -> &mut usize {
        match class {
            SizeClass::VerySmall => &mut self.very_small,
            SizeClass::Small => &mut self.small,
            SizeClass::Medium => &mut self.medium,
            SizeClass::Large => &mut self.large,
            SizeClass::VeryLarge => &mut self.very_large,
        }
    }

    /// Count for one class.
    pub fn get(&self, class: SizeClass) -> usize {
        match class {
            SizeClass::VerySmall => self.very_small,
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
            SizeClass::VeryLarge => self.very_large,
        }
    }

    /// Sum over every class.
    pub fn total(&self) -> usize {
        SizeClass::ALL.into_iter().map(|class| self.get(class)).sum()
    }

    /// Share of each class in the total, percent rounded to two decimals.
    pub fn shares(&self) -> SizeClassShares {
        let total = self.total();
        let share = |class| proportion(self.get(class), total).rounded();
        SizeClassShares {
            very_small: share(SizeClass::VerySmall),
            small: share(SizeClass::Small),
            medium: share(SizeClass::Medium),
            large: share(SizeClass::Large),
            very_large: share(SizeClass::VeryLarge),
        }
    }
}

/// Percent of CDS per [`SizeClass`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeClassShares {
    /// Under 300 bp.
    pub very_small: Measure,
    /// 300 to 599 bp.
    pub small: Measure,
    /// 600 to 1199 bp.
    pub medium: Measure,
    /// 1200 to 2399 bp.
    pub large: Measure,
    /// 2400 bp and longer.
    pub very_large: Measure,
}

impl SizeClassShares {
    /// Share for one class.
    pub fn get(&self, class: SizeClass) -> Measure {
        match class {
            SizeClass::VerySmall => self.very_small,
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
            SizeClass::VeryLarge => self.very_large,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_sample() {
        let s = summarize(&[3.0, 1.0, 2.0, 4.0, 2.0]);
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, Measure::Value(2.4));
        assert_eq!(s.median, Measure::Value(2.0));
        assert_eq!(s.mode, Measure::Value(2.0));
        assert_eq!(s.min, Measure::Value(1.0));
        assert_eq!(s.max, Measure::Value(4.0));
        assert_eq!(s.range, Measure::Value(3.0));
        assert_eq!(s.percentiles.p25, Measure::Value(2.0));
        assert_eq!(s.percentiles.p75, Measure::Value(3.0));
        assert_eq!(s.iqr, Measure::Value(1.0));
        let var = s.variance.value().unwrap();
        assert!((var - 1.04).abs() < 1e-12);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 50.0), Measure::Value(25.0));
        assert_eq!(percentile(&sorted, 0.0), Measure::Value(10.0));
        assert_eq!(percentile(&sorted, 100.0), Measure::Value(40.0));
        assert_eq!(percentile(&[], 50.0), Measure::Undefined);
    }

    #[test]
    fn empty_sample_is_undefined() {
        let s = summarize(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, Measure::Undefined);
        assert_eq!(s.std_dev, Measure::Undefined);
        assert_eq!(s.mode, Measure::Undefined);
        assert_eq!(s.coefficient_of_variation, Measure::Undefined);
    }

    #[test]
    fn mode_ties_go_to_first_seen() {
        assert_eq!(summarize(&[5.0, 1.0, 1.0, 5.0]).mode, Measure::Value(5.0));
    }

    #[test]
    fn outliers_use_tukey_fences() {
        let values = [10.0, 11.0, 12.0, 13.0, 100.0];
        let summary = summarize(&values);
        let outliers = OutlierSummary::detect(&values, &summary);
        assert_eq!(outliers.low, 0);
        assert_eq!(outliers.high, 1);
        assert_eq!(outliers.total(), 1);
        assert_eq!(outliers.percent, Measure::Value(20.0));
    }

    #[test]
    fn size_classes_bin_by_bounds() {
        let counts = SizeClassCounts::from_lengths([299, 300, 599, 600, 1200, 2399, 2400]);
        assert_eq!(counts.very_small, 1);
        assert_eq!(counts.small, 2);
        assert_eq!(counts.medium, 1);
        assert_eq!(counts.large, 2);
        assert_eq!(counts.very_large, 1);
        assert_eq!(counts.get(SizeClass::Small), 2);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn size_class_shares_are_rounded_percentages() {
        let shares = SizeClassCounts::from_lengths([100, 200, 400]).shares();
        assert_eq!(shares.very_small, Measure::Value(66.67));
        assert_eq!(shares.small, Measure::Value(33.33));
        assert_eq!(shares.get(SizeClass::VeryLarge), Measure::Value(0.0));
        let empty = SizeClassCounts::default().shares();
        assert_eq!(empty.medium, Measure::Undefined);
    }
}
