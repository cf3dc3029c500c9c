// This module provides the temperature control curve bounding the conditioned cabin temperature

use serde::{Deserialize, Serialize};

/// A breakpoint of a control curve: (environment temperature, setpoint temperature), both in deg C.
pub type ControlPoint = (f64, f64);

/// Heating and cooling setpoints as piecewise-linear functions of the environment temperature.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemperatureControlCurve {
    pub heating: Vec<ControlPoint>,
    pub cooling: Vec<ControlPoint>,
}

pub trait SetpointBehaviour {
    /// Cabin temperature below which the cabin is heated, in deg C
    fn heating_setpnt(&self, temp_environment: f64) -> f64;
    /// Cabin temperature above which the cabin is cooled, in deg C
    fn cooling_setpnt(&self, temp_environment: f64) -> f64;
}

impl TemperatureControlCurve {
    pub fn new(heating: Vec<ControlPoint>, cooling: Vec<ControlPoint>) -> Self {
        let mut curve = Self { heating, cooling };
        curve.sort_points();
        curve
    }

    /// Constant heating and cooling setpoints regardless of environment temperature.
    pub fn constant(temp_heating: f64, temp_cooling: f64) -> Self {
        Self::new(vec![(0., temp_heating)], vec![(0., temp_cooling)])
    }

    /// Sort both lists of breakpoints ascending by environment temperature.
    pub(crate) fn sort_points(&mut self) {
        self.heating.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.cooling.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
}

impl SetpointBehaviour for TemperatureControlCurve {
    fn heating_setpnt(&self, temp_environment: f64) -> f64 {
        interpolate_setpoint(&self.heating, temp_environment).unwrap_or(f64::NEG_INFINITY)
    }

    fn cooling_setpnt(&self, temp_environment: f64) -> f64 {
        interpolate_setpoint(&self.cooling, temp_environment).unwrap_or(f64::INFINITY)
    }
}

/// Linear interpolation between sorted breakpoints, holding the first/last setpoint outside
/// their range. Returns None for an empty curve.
fn interpolate_setpoint(points: &[ControlPoint], temp_environment: f64) -> Option<f64> {
    let (first, last) = (points.first()?, points.last()?);

    if temp_environment <= first.0 {
        return Some(first.1);
    }
    if temp_environment >= last.0 {
        return Some(last.1);
    }

    points
        .windows(2)
        .find(|segment| segment[0].0 <= temp_environment && temp_environment <= segment[1].0)
        .map(|segment| {
            let ((x0, y0), (x1, y1)) = (segment[0], segment[1]);
            if x1 == x0 {
                y1
            } else {
                y0 + (y1 - y0) * (temp_environment - x0) / (x1 - x0)
            }
        })
}
