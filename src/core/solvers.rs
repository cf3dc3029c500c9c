use crate::errors::RootFindingError;
use roots::{find_root_brent, SimpleConvergency};

const ROOT_TOLERANCE: f64 = 1e-10;
const ROOT_MAX_ITERATIONS: usize = 100;
const INITIAL_BRACKET_HALF_WIDTH: f64 = 5.;
const MAX_BRACKET_EXPANSIONS: u32 = 16;

const QUAD_TOLERANCE: f64 = 1.49e-8;
const QUAD_MAX_DEPTH: u32 = 40;
const QUAD_INITIAL_PANELS: usize = 8;

/// Find a root of a univariate function, starting from an initial guess.
///
/// The bracket around `x0` is widened (doubling each time) until the function changes sign,
/// then the root is located with Brent's method.
pub(crate) fn root(fun: impl Fn(f64) -> f64, x0: f64) -> Result<f64, RootFindingError> {
    let f0 = fun(x0);
    if f0.is_nan() {
        return Err(RootFindingError::new(format!(
            "function is not defined at initial guess {x0}"
        )));
    }
    if f0 == 0. {
        return Ok(x0);
    }

    let mut half_width = INITIAL_BRACKET_HALF_WIDTH;
    for _ in 0..=MAX_BRACKET_EXPANSIONS {
        let (lower, upper) = (x0 - half_width, x0 + half_width);
        let (f_lower, f_upper) = (fun(lower), fun(upper));

        let bracket = if f_upper * f0 <= 0. {
            Some((x0, upper))
        } else if f_lower * f0 <= 0. {
            Some((lower, x0))
        } else {
            None
        };

        if let Some((a, b)) = bracket {
            let mut convergency = SimpleConvergency {
                eps: ROOT_TOLERANCE,
                max_iter: ROOT_MAX_ITERATIONS,
            };
            return find_root_brent::<f64, _>(a, b, &fun, &mut convergency)
                .map_err(|e| RootFindingError::new(e.to_string()));
        }

        half_width *= 2.;
    }

    Err(RootFindingError::new(format!(
        "no sign change found within ±{} of initial guess {x0}",
        half_width / 2.
    )))
}

/// Integrate a function over `[a, b]` with adaptive Simpson quadrature.
pub(crate) fn quad(fun: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    let panel_width = (b - a) / QUAD_INITIAL_PANELS as f64;

    (0..QUAD_INITIAL_PANELS)
        .map(|panel| {
            let start = a + panel as f64 * panel_width;
            let end = start + panel_width;
            let (f_start, f_end) = (fun(start), fun(end));
            let (mid, f_mid, whole) = simpson(&fun, start, f_start, end, f_end);
            let eps = QUAD_TOLERANCE * whole.abs().max(1.);
            adaptive_simpson(
                &fun,
                SimpsonPanel {
                    start,
                    f_start,
                    end,
                    f_end,
                    mid,
                    f_mid,
                    whole,
                },
                eps,
                QUAD_MAX_DEPTH,
            )
        })
        .sum()
}

struct SimpsonPanel {
    start: f64,
    f_start: f64,
    end: f64,
    f_end: f64,
    mid: f64,
    f_mid: f64,
    whole: f64,
}

fn simpson(fun: &impl Fn(f64) -> f64, a: f64, fa: f64, b: f64, fb: f64) -> (f64, f64, f64) {
    let m = 0.5 * (a + b);
    let fm = fun(m);
    (m, fm, (b - a) / 6. * (fa + 4. * fm + fb))
}

fn adaptive_simpson(fun: &impl Fn(f64) -> f64, panel: SimpsonPanel, eps: f64, depth: u32) -> f64 {
    let (left_mid, f_left_mid, left) =
        simpson(fun, panel.start, panel.f_start, panel.mid, panel.f_mid);
    let (right_mid, f_right_mid, right) =
        simpson(fun, panel.mid, panel.f_mid, panel.end, panel.f_end);
    let delta = left + right - panel.whole;

    if depth == 0 || delta.abs() <= 15. * eps {
        return left + right + delta / 15.;
    }

    adaptive_simpson(
        fun,
        SimpsonPanel {
            start: panel.start,
            f_start: panel.f_start,
            end: panel.mid,
            f_end: panel.f_mid,
            mid: left_mid,
            f_mid: f_left_mid,
            whole: left,
        },
        eps / 2.,
        depth - 1,
    ) + adaptive_simpson(
        fun,
        SimpsonPanel {
            start: panel.mid,
            f_start: panel.f_mid,
            end: panel.end,
            f_end: panel.f_end,
            mid: right_mid,
            f_mid: f_right_mid,
            whole: right,
        },
        eps / 2.,
        depth - 1,
    )
}
