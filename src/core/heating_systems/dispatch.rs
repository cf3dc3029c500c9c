//! Allocation of a cabin's heating or cooling demand to its devices.

use crate::compare_floats::{min_of_2, FLOAT_TOLERANCE};
use crate::core::heating_systems::heat_pump::{CarnotCops, HeatPump};
use crate::core::heating_systems::resistive_heater::ResistiveHeater;
use crate::input::HeatingCoolingDevices;

/// Electricity drawn by one heat pump, in kW.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatPumpElectricity {
    /// Position of the heat pump in the vehicle's list of heat pumps
    pub index: usize,
    pub electricity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DispatchResult {
    /// Electricity drawn by the resistive heater, in kW
    pub resistive_heater: f64,
    /// One entry per heat pump, in the order the heat pumps were dispatched
    pub heat_pumps: Vec<HeatPumpElectricity>,
    /// Demand left over once every device has been used, in kW (positive for heating)
    pub unmet_demand: f64,
    pub heating_satisfied: bool,
    pub cooling_satisfied: bool,
}

impl DispatchResult {
    /// Electricity per device: resistive heater first, then heat pumps in dispatch order.
    pub fn electricity_vector(&self) -> Vec<f64> {
        std::iter::once(self.resistive_heater)
            .chain(self.heat_pumps.iter().map(|pump| pump.electricity))
            .collect()
    }

    pub fn dispatch_order(&self) -> Vec<usize> {
        self.heat_pumps.iter().map(|pump| pump.index).collect()
    }

    pub fn heat_pump_electricity(&self) -> f64 {
        self.heat_pumps.iter().map(|pump| pump.electricity).sum()
    }

    pub fn total_electricity(&self) -> f64 {
        self.resistive_heater + self.heat_pump_electricity()
    }
}

/// Dispatches heat pumps greedily from the highest exergy efficiency down, then covers any
/// remaining heating demand with the resistive heater.
#[derive(Clone, Debug)]
pub struct DeviceDispatcher<'a> {
    resistive_heater: ResistiveHeater,
    heat_pumps: Vec<(usize, &'a HeatPump)>,
}

impl<'a> DeviceDispatcher<'a> {
    pub fn new(devices: &'a HeatingCoolingDevices) -> Self {
        let mut heat_pumps: Vec<(usize, &HeatPump)> = devices.heat_pumps.iter().enumerate().collect();
        // stable, so equally efficient heat pumps keep their listed order
        heat_pumps.sort_by(|(_, a), (_, b)| b.exergy_efficiency.total_cmp(&a.exergy_efficiency));

        Self {
            resistive_heater: ResistiveHeater::new(devices.resistive_heating_power_max),
            heat_pumps,
        }
    }

    /// Arguments
    /// * `heat_demand` - net thermal demand of the cabin, in kW (positive for heating,
    ///                   negative for cooling)
    /// * `temp_ambient` - in deg C
    /// * `temp_cabin` - in deg C
    pub fn dispatch(&self, heat_demand: f64, temp_ambient: f64, temp_cabin: f64) -> DispatchResult {
        let mut heat_pumps = self
            .heat_pumps
            .iter()
            .map(|(index, _)| HeatPumpElectricity {
                index: *index,
                electricity: 0.,
            })
            .collect::<Vec<_>>();

        if heat_demand == 0. {
            return DispatchResult {
                resistive_heater: 0.,
                heat_pumps,
                unmet_demand: 0.,
                heating_satisfied: true,
                cooling_satisfied: true,
            };
        }

        let carnot_cops = CarnotCops::new(temp_cabin, temp_ambient);
        let heating = heat_demand > 0.;
        // magnitude of the demand still to be met
        let mut remaining = heat_demand.abs();

        for ((_, heat_pump), output) in self.heat_pumps.iter().zip(heat_pumps.iter_mut()) {
            let (capacity, cop) = if heating {
                (
                    heat_pump.heating_capacity(&carnot_cops),
                    heat_pump.cop_heating(&carnot_cops),
                )
            } else {
                (
                    heat_pump.cooling_capacity(&carnot_cops),
                    heat_pump.cop_cooling(&carnot_cops),
                )
            };
            if capacity <= 0. {
                continue;
            }

            let heat = min_of_2(remaining, capacity);
            remaining -= heat;
            output.electricity = heat / cop;
        }

        let resistive_heater = if heating {
            let heat = self.resistive_heater.demand_heat(remaining);
            remaining -= heat;
            heat
        } else {
            0.
        };

        let unmet_demand = if heating { remaining } else { -remaining };

        DispatchResult {
            resistive_heater,
            heat_pumps,
            unmet_demand,
            heating_satisfied: unmet_demand <= FLOAT_TOLERANCE,
            cooling_satisfied: unmet_demand >= -FLOAT_TOLERANCE,
        }
    }
}
