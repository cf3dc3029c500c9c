use crate::compare_floats::is_negligible;
use crate::core::units::celsius_to_kelvin;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Coefficient of performance standing in for an ideal heat pump with no temperature lift.
pub(crate) const INFINITE_EFFICIENCY: f64 = 1e12;

/// This module provides the heat pump model used for both heating and cooling the cabin.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HeatPump {
    pub name: String,
    /// Maximum electric power input, in kW
    #[validate(minimum = 0.)]
    pub electric_power_max: f64,
    /// Efficiency relative to an ideal Carnot heat pump
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub exergy_efficiency: f64,
    /// Whether the heat pump can heat the cabin
    pub heating: bool,
    /// Whether the heat pump can cool the cabin
    pub cooling: bool,
}

/// Ideal (Carnot) coefficients of performance between cabin and ambient air.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarnotCops {
    pub heating: f64,
    pub cooling: f64,
}

impl CarnotCops {
    /// Arguments
    /// * `temp_cabin` - in deg C
    /// * `temp_ambient` - in deg C
    pub fn new(temp_cabin: f64, temp_ambient: f64) -> Self {
        let temp_cabin_k = celsius_to_kelvin(temp_cabin);
        let temp_ambient_k = celsius_to_kelvin(temp_ambient);
        let temp_lift = (temp_cabin_k - temp_ambient_k).abs();

        if is_negligible(temp_lift) {
            return Self {
                heating: INFINITE_EFFICIENCY,
                cooling: INFINITE_EFFICIENCY,
            };
        }

        Self {
            heating: temp_cabin_k / temp_lift,
            cooling: temp_ambient_k / temp_lift,
        }
    }
}

impl HeatPump {
    pub fn cop_heating(&self, carnot_cops: &CarnotCops) -> f64 {
        self.exergy_efficiency * carnot_cops.heating
    }

    pub fn cop_cooling(&self, carnot_cops: &CarnotCops) -> f64 {
        self.exergy_efficiency * carnot_cops.cooling
    }

    /// Largest heat flow the heat pump can deliver to the cabin, in kW
    pub fn heating_capacity(&self, carnot_cops: &CarnotCops) -> f64 {
        if self.heating {
            self.electric_power_max * self.cop_heating(carnot_cops)
        } else {
            0.
        }
    }

    /// Largest heat flow the heat pump can extract from the cabin, in kW
    pub fn cooling_capacity(&self, carnot_cops: &CarnotCops) -> f64 {
        if self.cooling {
            self.electric_power_max * self.cop_cooling(carnot_cops)
        } else {
            0.
        }
    }
}
