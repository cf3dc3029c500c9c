use crate::compare_floats::clamp_between;
use crate::core::cabin::heat_flows::{HeatFlows, PassiveHeatFlowModel};
use crate::core::controls::temperature_control::SetpointBehaviour;
use crate::core::solvers::root;
use crate::errors::RootFindingError;

/// Conditioned state of the cabin for one operating hour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CabinState {
    /// in deg C
    pub temp_cabin: f64,
    /// Unconditioned equilibrium temperature, in deg C
    pub temp_equilibrium: f64,
    pub heat_flows: HeatFlows,
    /// Net heat the devices must supply, in kW (positive for heating, negative for cooling)
    pub heat_demand: f64,
}

impl CabinState {
    /// Heating share of the demand, in kW (zero or positive)
    pub fn heating_demand(&self) -> f64 {
        self.heat_demand.max(0.)
    }

    /// Cooling share of the demand, in kW (zero or negative)
    pub fn cooling_demand(&self) -> f64 {
        self.heat_demand.min(0.)
    }
}

pub struct CabinTemperatureSolver<'a, C: SetpointBehaviour> {
    heat_flow_model: PassiveHeatFlowModel<'a>,
    control: &'a C,
}

impl<'a, C: SetpointBehaviour> CabinTemperatureSolver<'a, C> {
    pub fn new(heat_flow_model: PassiveHeatFlowModel<'a>, control: &'a C) -> Self {
        Self {
            heat_flow_model,
            control,
        }
    }

    /// Find the temperature at which the passive heat flows balance, then hold the cabin
    /// within the setpoints of the control curve.
    ///
    /// Arguments
    /// * `temp_ambient` - in deg C
    /// * `solar_absorption` - absorbed solar heat, in kW
    pub fn solve(
        &self,
        temp_ambient: f64,
        solar_absorption: f64,
    ) -> Result<CabinState, RootFindingError> {
        let temp_equilibrium = root(
            |temp_cabin| {
                self.heat_flow_model
                    .heat_flows(temp_cabin, temp_ambient, solar_absorption)
                    .sum()
            },
            temp_ambient,
        )?;

        let temp_cabin = clamp_between(
            temp_equilibrium,
            self.control.heating_setpnt(temp_ambient),
            self.control.cooling_setpnt(temp_ambient),
        );
        let heat_flows = self
            .heat_flow_model
            .heat_flows(temp_cabin, temp_ambient, solar_absorption);

        Ok(CabinState {
            temp_cabin,
            temp_equilibrium,
            heat_flows,
            heat_demand: -heat_flows.sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::temperature_control::TemperatureControlCurve;
    use crate::input::tests::minibus;
    use crate::input::Vehicle;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn comfort() -> TemperatureControlCurve {
        TemperatureControlCurve::new(vec![(0., 18.)], vec![(0., 24.)])
    }

    #[rstest]
    fn should_float_between_setpoints(minibus: Vehicle, comfort: TemperatureControlCurve) {
        let model = PassiveHeatFlowModel::new(&minibus, 0.);
        // gains hold the cabin a little above ambient
        let state = CabinTemperatureSolver::new(model, &comfort)
            .solve(19., 0.)
            .unwrap();

        assert!(state.temp_cabin > 19. && state.temp_cabin < 24.);
        assert_eq!(state.temp_cabin, state.temp_equilibrium);
        assert_relative_eq!(state.heat_demand, 0., epsilon = 1e-8);
    }

    #[rstest]
    fn should_hold_cabin_at_heating_setpoint(minibus: Vehicle, comfort: TemperatureControlCurve) {
        let model = PassiveHeatFlowModel::new(&minibus, 5.);
        let state = CabinTemperatureSolver::new(model, &comfort)
            .solve(-5., 0.)
            .unwrap();

        assert!(state.temp_equilibrium < 18.);
        assert_eq!(state.temp_cabin, 18.);
        assert!(state.heat_demand > 0.);
        assert_relative_eq!(
            state.heat_demand,
            -model.heat_flows(18., -5., 0.).sum(),
            max_relative = 1e-12
        );
        assert_eq!(state.cooling_demand(), 0.);
    }

    #[rstest]
    fn should_hold_cabin_at_cooling_setpoint(minibus: Vehicle, comfort: TemperatureControlCurve) {
        let model = PassiveHeatFlowModel::new(&minibus, 30.);
        let state = CabinTemperatureSolver::new(model, &comfort)
            .solve(32., 4.)
            .unwrap();

        assert!(state.temp_equilibrium > 24.);
        assert_eq!(state.temp_cabin, 24.);
        assert!(state.heat_demand < 0.);
        assert_eq!(state.heating_demand(), 0.);
    }

    #[rstest]
    #[case(-20.)]
    #[case(0.)]
    #[case(21.)]
    #[case(38.)]
    fn should_pin_cabin_to_identical_setpoints(minibus: Vehicle, #[case] temp_ambient: f64) {
        let constant = TemperatureControlCurve::constant(21., 21.);
        let model = PassiveHeatFlowModel::new(&minibus, 12.);
        let state = CabinTemperatureSolver::new(model, &constant)
            .solve(temp_ambient, 2.)
            .unwrap();
        assert_eq!(state.temp_cabin, 21.);
    }

    #[rstest]
    fn should_fail_when_heat_cannot_leave_cabin(mut minibus: Vehicle) {
        minibus.heat_transfer_coefficient_chassis = 0.;
        minibus.volume_flow_rate_ventilation = 0.;
        minibus.time_fraction_door_open = 0.;
        let model = PassiveHeatFlowModel::new(&minibus, 10.);
        let curve = TemperatureControlCurve::constant(18., 24.);

        assert!(CabinTemperatureSolver::new(model, &curve).solve(10., 1.).is_err());
    }
}
