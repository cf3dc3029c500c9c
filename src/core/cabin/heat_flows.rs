use crate::core::units::{celsius_to_kelvin, watts_to_kilowatts};
use crate::input::Vehicle;

const GRAVITATIONAL_ACCELERATION: f64 = 9.81; // m/s2
const SPECIFIC_HEAT_CAPACITY_AIR: f64 = 1004.; // J/(kg.K), at 20 deg C and 1050 hPa
const DENSITY_AIR: f64 = 1.275; // kg/m3, at 20 deg C and 1050 hPa
const HEAT_PER_PASSENGER: f64 = 116.; // W, seated
const DOOR_DISCHARGE_COEFFICIENT: f64 = 0.6;

/// Heat flows into the cabin, in kW. Positive values are gains, negative values losses.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeatFlows {
    pub solar_absorption: f64,
    pub passengers: f64,
    pub auxiliary: f64,
    pub convection: f64,
    pub ventilation: f64,
    pub doors: f64,
}

impl HeatFlows {
    pub fn sum(&self) -> f64 {
        self.solar_absorption
            + self.passengers
            + self.auxiliary
            + self.convection
            + self.ventilation
            + self.doors
    }
}

/// Passive heat balance of a cabin in an operating situation that does not depend on the
/// cabin temperature.
#[derive(Clone, Copy, Debug)]
pub struct PassiveHeatFlowModel<'a> {
    vehicle: &'a Vehicle,
    passenger_number: f64,
}

impl<'a> PassiveHeatFlowModel<'a> {
    pub fn new(vehicle: &'a Vehicle, passenger_number: f64) -> Self {
        Self {
            vehicle,
            passenger_number,
        }
    }

    /// Shell area exchanging heat with ambient air, in m2
    fn area_convection(&self) -> f64 {
        let vehicle = self.vehicle;
        2. * vehicle.length * vehicle.height
            + 2. * vehicle.width * vehicle.height
            + (2. - vehicle.fraction_obstruction_roof - vehicle.fraction_obstruction_floor)
                * vehicle.length
                * vehicle.width
    }

    /// Arguments
    /// * `temp_cabin` - in deg C
    /// * `temp_ambient` - in deg C
    /// * `solar_absorption` - absorbed solar heat, in kW
    pub fn heat_flows(&self, temp_cabin: f64, temp_ambient: f64, solar_absorption: f64) -> HeatFlows {
        let vehicle = self.vehicle;
        let temp_diff = temp_ambient - temp_cabin;

        let convection = watts_to_kilowatts(
            self.area_convection() * vehicle.heat_transfer_coefficient_chassis * temp_diff,
        );
        let ventilation = watts_to_kilowatts(
            vehicle.volume_flow_rate_ventilation * DENSITY_AIR * SPECIFIC_HEAT_CAPACITY_AIR * temp_diff,
        );
        // buoyancy-driven exchange through open doors
        let doors = watts_to_kilowatts(
            DENSITY_AIR * SPECIFIC_HEAT_CAPACITY_AIR / 3.
                * (GRAVITATIONAL_ACCELERATION * vehicle.door_height.powi(3)).sqrt()
                * (temp_diff.abs() / celsius_to_kelvin(temp_ambient)).sqrt()
                * temp_diff
                * vehicle.door_width_total
                * vehicle.time_fraction_door_open
                * DOOR_DISCHARGE_COEFFICIENT,
        );

        HeatFlows {
            solar_absorption,
            passengers: watts_to_kilowatts(self.passenger_number * HEAT_PER_PASSENGER),
            auxiliary: vehicle.heating_power_auxiliary,
            convection,
            ventilation,
            doors,
        }
    }
}
