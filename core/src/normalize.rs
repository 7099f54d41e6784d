/// Outcome of rescaling an array into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Normalization {
    /// Values were spread over `[0, 1]`, with the minimum at 0 and the maximum at 1.
    Scaled,
    /// Every value was equal, so the array was filled with zeros.
    Constant,
    /// The array held no values.
    Empty,
}

/// Rescales `values` in place so the minimum maps to 0 and the maximum to 1.
///
/// A constant array has no range to divide by and becomes all zeros instead
/// of NaN. Callers decide whether that outcome is worth reporting. Every
/// input must be finite; any finite input stays inside `[0, 1]`.
pub fn normalize_min_max(values: &mut [f64]) -> Normalization {
    let Some(&first) = values.first() else {
        return Normalization::Empty;
    };

    let (min, max) = values
        .iter()
        .fold((first, first), |(min, max), &value| {
            (min.min(value), max.max(value))
        });
    // Halving first keeps `max - min` finite for opposite-signed extremes.
    let half_min = min * 0.5;
    let half_range = max * 0.5 - half_min;

    if half_range == 0.0 {
        values.fill(0.0);
        return Normalization::Constant;
    }

    for value in values.iter_mut() {
        *value = (*value * 0.5 - half_min) / half_range;
    }
    Normalization::Scaled
}
