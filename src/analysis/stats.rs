//! Descriptive statistics over amount columns

/// Summary of a numeric column, matching the usual `describe` table
#[derive(Debug, Clone, PartialEq)]
pub struct AmountStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    /// Sample standard deviation; undefined below two values
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Computes the describe table; `None` for an empty column
pub fn describe(values: &[f64]) -> Option<AmountStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(AmountStats {
        count: values.len(),
        sum: values.iter().sum(),
        mean: mean(values)?,
        std: sample_std(values),
        min: sorted[0],
        q1: quantile(&sorted, 0.25)?,
        median: quantile(&sorted, 0.5)?,
        q3: quantile(&sorted, 0.75)?,
        max: sorted[sorted.len() - 1],
    })
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile of already-sorted values with linear interpolation
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Pearson correlation coefficient
///
/// Undefined with fewer than two pairs, mismatched lengths, or when either
/// side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }

    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Rounds to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_describe() {
        let stats = describe(&[4.0, 1.0, 3.0, 2.0]).unwrap();

        assert_eq!(stats.count, 4);
        assert!(approx(stats.sum, 10.0));
        assert!(approx(stats.mean, 2.5));
        assert!(approx(stats.min, 1.0));
        assert!(approx(stats.max, 4.0));
        assert!(approx(stats.q1, 1.75));
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.q3, 3.25));
        assert!(approx(stats.std.unwrap(), 1.2909944487358056));
    }

    #[test]
    fn test_describe_single_value() {
        let stats = describe(&[7.0]).unwrap();
        assert_eq!(stats.std, None);
        assert!(approx(stats.median, 7.0));
        assert!(approx(stats.q1, 7.0));
    }

    #[test]
    fn test_describe_empty() {
        assert!(describe(&[]).is_none());
    }

    #[test]
    fn test_quantile_odd_length() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx(quantile(&sorted, 0.5).unwrap(), 3.0));
        assert!(approx(quantile(&sorted, 0.25).unwrap(), 2.0));
        assert!(quantile(&sorted, 1.5).is_none());
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!(approx(r, 1.0));

        let r = pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).unwrap();
        assert!(approx(r, -1.0));

        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(pearson(&[1.0, 2.0], &[2.0]).is_none());
    }

    #[test]
    fn test_round2() {
        assert!(approx(round2(1.234), 1.23));
        assert!(approx(round2(1.235_1), 1.24));
        assert!(approx(round2(-0.004), -0.0));
    }
}
