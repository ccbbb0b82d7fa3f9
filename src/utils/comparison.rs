use std::cmp::Ordering;

/// Safe comparison of floating point numbers, handling NaN values
pub fn safe_float_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Sort latency samples ascending in place
pub fn sort_samples(samples: &mut [f64]) {
    samples.sort_by(|a, b| safe_float_cmp(*a, *b));
}
