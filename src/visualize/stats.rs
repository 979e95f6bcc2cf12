use super::HistogramBin;

/// Splits `[min, max]` of `values` into `bins` equal-width bins.
///
/// The last bin is closed on the right so `max` is counted. When every
/// value is equal a single bin `[v, v + 1)` holds them all.
pub fn histogram(values: &[i64], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    if min == max {
        return vec![HistogramBin {
            lower: min as f64,
            upper: min as f64 + 1.0,
            count: values.len(),
        }];
    }

    let (min, max) = (min as f64, max as f64);
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &value in values {
        let index = ((value as f64 - min) / width) as usize;
        counts[index.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count,
        })
        .collect()
}

/// Pearson correlation coefficient of two equally long series.
///
/// `None` when undefined: fewer than two samples or a constant series.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let mean = |s: &[f64]| s[..n].iter().sum::<f64>() / n as f64;
    let (mx, my) = (mean(x), mean(y));

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let (dx, dy) = (x[i] - mx, y[i] - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
