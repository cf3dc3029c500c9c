/// Tolerance used when deciding whether a heat demand has been met.
pub const FLOAT_TOLERANCE: f64 = 1e-5;

pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Restrict `value` to `[lower, upper]`. Unlike `f64::clamp` this does not panic when the
/// bounds are infinite or equal.
pub(crate) fn clamp_between(value: f64, lower: f64, upper: f64) -> f64 {
    max_of_2(lower, min_of_2(value, upper))
}

pub(crate) fn is_negligible(value: f64) -> bool {
    value.abs() <= FLOAT_TOLERANCE
}
