use crate::compare_floats::{max_of_2, min_of_2};

/// Resistive heater converting electricity to heat one to one. It never cools.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResistiveHeater {
    rated_power_in_kw: f64,
}

impl ResistiveHeater {
    pub fn new(rated_power_in_kw: f64) -> Self {
        Self { rated_power_in_kw }
    }

    /// Heat delivered, in kW, which equals the electricity drawn
    pub fn demand_heat(&self, heat_demand: f64) -> f64 {
        min_of_2(max_of_2(heat_demand, 0.), self.rated_power_in_kw)
    }
}
