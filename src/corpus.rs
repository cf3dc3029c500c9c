//! Annual simulation of every vehicle version in operation, for each operating hour of a
//! typical day in each month.

use crate::core::cabin::cabin_temperature::CabinTemperatureSolver;
use crate::core::cabin::heat_flows::{HeatFlows, PassiveHeatFlowModel};
use crate::core::cabin::solar_absorption::{SolarAbsorptionCache, SolarAbsorptionEstimator};
use crate::core::heating_systems::dispatch::DeviceDispatcher;
use crate::core::units::{month_name, watts_to_kilowatts, HOURS_PER_DAY, MONTHS_PER_YEAR};
use crate::errors::{ConfigurationError, SimulationError};
use crate::external_conditions::LocationClimate;
use crate::input::{Input, OperationSchedule, Specification};
use crate::operation_calendar::OperationCalendar;
use crate::vehicle_versions::VehicleVersion;
use crate::ProjectFlags;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// Result of simulating one vehicle version for one operating hour of a typical day.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlyResultRow {
    pub schedule: Arc<str>,
    pub vehicle: Arc<str>,
    pub version: Arc<str>,
    /// Parameter set of the version, as `{Name: value, ...}`
    pub version_label: Arc<str>,
    pub month: u32,
    pub hour: u32,
    /// in deg C
    pub temp_ambient: f64,
    /// as given in the climate grid, in W/m2
    pub irradiance: f64,
    /// in deg C
    pub temp_cabin: f64,
    pub heat_flows: HeatFlows,
    /// in kW, positive for heating
    pub heat_demand: f64,
    /// in kW
    pub electricity_resistive_heater: f64,
    /// Electricity per heat pump in kW, labelled by heat pump name, in dispatch order
    pub electricity_heat_pumps: Vec<(Arc<str>, f64)>,
    pub heating_satisfied: bool,
    pub cooling_satisfied: bool,
    pub operation_days: u32,
    /// Fraction of the hour in operation
    pub operation_hours: f64,
    pub vehicle_count: u32,
    /// per kWh
    pub cost_electricity: f64,
}

impl HourlyResultRow {
    pub fn heating_demand(&self) -> f64 {
        self.heat_demand.max(0.)
    }

    pub fn cooling_demand(&self) -> f64 {
        self.heat_demand.min(0.)
    }

    /// Resistive heater first, then heat pumps in dispatch order, in kW.
    pub fn electricity_vector(&self) -> Vec<f64> {
        std::iter::once(self.electricity_resistive_heater)
            .chain(self.electricity_heat_pumps.iter().map(|(_, power)| *power))
            .collect()
    }

    fn electricity_heat_pumps_total(&self) -> f64 {
        self.electricity_heat_pumps
            .iter()
            .map(|(_, power)| power)
            .sum()
    }

    /// in kW
    pub fn electric_power_total(&self) -> f64 {
        self.electricity_resistive_heater + self.electricity_heat_pumps_total()
    }

    /// in kW
    pub fn electric_power_heating(&self) -> f64 {
        if self.heat_demand > 0. {
            self.electricity_resistive_heater + self.electricity_heat_pumps_total()
        } else {
            self.electricity_resistive_heater
        }
    }

    /// in kW
    pub fn electric_power_cooling(&self) -> f64 {
        if self.heat_demand > 0. {
            0.
        } else {
            self.electricity_heat_pumps_total()
        }
    }
}

/// Hours in one month for which a vehicle version's demand exceeded its device capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct UnmetDemandOccurrence {
    pub schedule: Arc<str>,
    pub vehicle: Arc<str>,
    pub version: Arc<str>,
    pub version_label: Arc<str>,
    pub month: u32,
    pub heating_hours: Vec<u32>,
    pub cooling_hours: Vec<u32>,
}

/// Every unmet demand occurrence of a run, consolidated into a single message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnmetDemandWarning {
    pub(crate) occurrences: Vec<UnmetDemandOccurrence>,
}

impl UnmetDemandWarning {
    /// Collect unsatisfied hours from rows, keyed by schedule, vehicle, version and month.
    /// Returns `None` when every hour was satisfied.
    pub fn from_rows(rows: &[HourlyResultRow]) -> Option<Self> {
        let mut occurrences: IndexMap<(&str, &str, &str, u32), UnmetDemandOccurrence> =
            Default::default();

        for row in rows
            .iter()
            .filter(|row| !row.heating_satisfied || !row.cooling_satisfied)
        {
            let occurrence = occurrences
                .entry((&*row.schedule, &*row.vehicle, &*row.version, row.month))
                .or_insert_with(|| UnmetDemandOccurrence {
                    schedule: row.schedule.clone(),
                    vehicle: row.vehicle.clone(),
                    version: row.version.clone(),
                    version_label: row.version_label.clone(),
                    month: row.month,
                    heating_hours: vec![],
                    cooling_hours: vec![],
                });
            if !row.heating_satisfied {
                occurrence.heating_hours.push(row.hour);
            }
            if !row.cooling_satisfied {
                occurrence.cooling_hours.push(row.hour);
            }
        }

        (!occurrences.is_empty()).then(|| Self {
            occurrences: occurrences.into_values().collect(),
        })
    }

    pub fn occurrences(&self) -> &[UnmetDemandOccurrence] {
        &self.occurrences
    }

    fn write_section(
        &self,
        f: &mut Formatter<'_>,
        title: &str,
        hours: impl Fn(&UnmetDemandOccurrence) -> &[u32],
    ) -> std::fmt::Result {
        let mut occurrences = self
            .occurrences
            .iter()
            .filter(|occurrence| !hours(occurrence).is_empty())
            .peekable();
        if occurrences.peek().is_none() {
            return Ok(());
        }

        write!(f, "\n- Time steps with unsatisfied {title} demand:")?;
        let mut previous: Option<&UnmetDemandOccurrence> = None;
        for occurrence in occurrences {
            let same_schedule = previous.is_some_and(|p| p.schedule == occurrence.schedule);
            let same_version = same_schedule
                && previous.is_some_and(|p| {
                    p.vehicle == occurrence.vehicle && p.version == occurrence.version
                });

            if !same_schedule {
                write!(f, "\n\t- {}", occurrence.schedule)?;
            }
            if same_version {
                write!(f, ", ")?;
            } else {
                write!(
                    f,
                    "\n\t\t- {} {}: ",
                    occurrence.vehicle, occurrence.version_label
                )?;
            }
            write!(
                f,
                "{} ({} o'clock)",
                month_name(occurrence.month),
                hours(occurrence)
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;

            previous = Some(occurrence);
        }

        Ok(())
    }
}

impl Display for UnmetDemandWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "For at least one operation schedule, vehicle and hour the heating or cooling demand \
             was not satisfied, as the maximum power of the heating or cooling devices did not \
             suffice. The displayed vehicle temperature, heat flows and electricity consumption \
             for the respective entries are not valid. Please check the vehicle configuration \
             or the operation schedule and consider increasing the heating or cooling device \
             maximum power."
        )?;
        self.write_section(f, "heating", |occurrence| occurrence.heating_hours.as_slice())?;
        self.write_section(f, "cooling", |occurrence| occurrence.cooling_hours.as_slice())
    }
}

#[derive(Debug)]
pub struct SimulationResults {
    /// Ordered by schedule, vehicle, version, month and hour
    pub rows: Vec<HourlyResultRow>,
    pub unmet_demand_warning: Option<UnmetDemandWarning>,
}

/// One vehicle version operating on one schedule.
struct SimulationTask<'a> {
    schedule_name: &'a str,
    schedule: &'a OperationSchedule,
    calendar: &'a OperationCalendar,
    climate: &'a LocationClimate,
    vehicle_name: &'a str,
    vehicle_count: u32,
    version: &'a VehicleVersion,
}

pub struct Corpus {
    specification: Specification,
    flags: ProjectFlags,
}

impl Corpus {
    pub fn from_inputs(input: Input, flags: &ProjectFlags) -> Result<Self, ConfigurationError> {
        Ok(Self::new(Specification::try_from(input)?, flags))
    }

    pub fn new(specification: Specification, flags: &ProjectFlags) -> Self {
        Self {
            specification,
            flags: *flags,
        }
    }

    pub fn specification(&self) -> &Specification {
        &self.specification
    }

    /// Simulate every operating hour of every vehicle version in operation. Stops at the first
    /// hour whose cabin temperature cannot be solved.
    #[instrument(skip_all)]
    pub fn run(&self) -> Result<SimulationResults, SimulationError> {
        let calendars = self
            .specification
            .operation_schedules
            .values()
            .map(OperationSchedule::calendar)
            .collect::<Vec<_>>();
        let tasks = self.tasks(&calendars)?;
        info!(
            "Simulating {} vehicle versions across {} operation schedules",
            tasks.len(),
            calendars.len()
        );

        let rows = tasks
            .par_iter()
            .map(|task| self.simulate_task(task))
            .collect::<Result<Vec<_>, SimulationError>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        info!("Simulated {} hourly results", rows.len());

        let unmet_demand_warning = UnmetDemandWarning::from_rows(&rows);
        if let Some(warning) = &unmet_demand_warning {
            warn!("{warning}");
        }

        Ok(SimulationResults {
            rows,
            unmet_demand_warning,
        })
    }

    fn tasks<'a>(
        &'a self,
        calendars: &'a [OperationCalendar],
    ) -> Result<Vec<SimulationTask<'a>>, ConfigurationError> {
        let mut tasks = vec![];

        for ((schedule_name, schedule), calendar) in self
            .specification
            .operation_schedules
            .iter()
            .zip(calendars)
        {
            let climate = self
                .specification
                .location_data
                .get(&schedule.location)
                .ok_or_else(|| ConfigurationError::UnknownLocation {
                    schedule: schedule_name.clone(),
                    location: schedule.location.clone(),
                })?;

            for (vehicle_name, vehicle_count) in schedule.vehicles_operating() {
                for version in self.specification.versions_of(vehicle_name) {
                    tasks.push(SimulationTask {
                        schedule_name,
                        schedule,
                        calendar,
                        climate,
                        vehicle_name,
                        vehicle_count,
                        version,
                    });
                }
            }
        }

        Ok(tasks)
    }

    fn simulate_task(&self, task: &SimulationTask) -> Result<Vec<HourlyResultRow>, SimulationError> {
        let SimulationTask {
            schedule_name,
            schedule,
            calendar,
            climate,
            vehicle_name,
            vehicle_count,
            version,
        } = *task;
        let vehicle = &version.vehicle;

        let control_curve = self
            .specification
            .temperature_control_curves
            .get(&vehicle.temperature_control_curve)
            .ok_or_else(|| ConfigurationError::UnknownTemperatureControlCurve {
                vehicle: vehicle_name.to_string(),
                curve: vehicle.temperature_control_curve.clone(),
            })?;

        let solar_estimator = SolarAbsorptionEstimator::new(
            vehicle,
            &version.name,
            schedule.obstacle_distance,
            schedule.obstacle_height,
        );
        let solver = CabinTemperatureSolver::new(
            PassiveHeatFlowModel::new(vehicle, schedule.passenger_number),
            control_curve,
        );
        let dispatcher = DeviceDispatcher::new(&vehicle.heating_cooling_devices);
        let mut solar_cache = SolarAbsorptionCache::new();

        let schedule_label: Arc<str> = schedule_name.into();
        let vehicle_label: Arc<str> = vehicle_name.into();
        let version_name: Arc<str> = version.name.as_str().into();
        let version_label: Arc<str> = version.label().into();
        let heat_pump_names: Vec<Arc<str>> = vehicle
            .heating_cooling_devices
            .heat_pumps
            .iter()
            .map(|heat_pump| heat_pump.name.as_str().into())
            .collect();

        let mut rows = vec![];

        for month in 1..=MONTHS_PER_YEAR {
            let operation_days = calendar.days_in_month(month);
            if operation_days == 0 {
                continue;
            }

            for hour in 0..HOURS_PER_DAY {
                let operation_hours = calendar.hour_weight(hour);
                if operation_hours <= 0. {
                    continue;
                }

                let temp_ambient = climate.air_temp(month, hour);
                let solar_absorption = if self.flags.contains(ProjectFlags::EXCLUDE_SOLAR_GAINS) {
                    0.
                } else {
                    watts_to_kilowatts(solar_estimator.absorbed_power(
                        &climate.solar_position(month, hour),
                        &climate.irradiance_components(month, hour),
                        &mut solar_cache,
                    ))
                };

                let state = solver
                    .solve(temp_ambient, solar_absorption)
                    .map_err(|err| {
                        err.in_context(schedule_name, vehicle_name, &version.name, month, hour)
                    })?;
                let dispatch =
                    dispatcher.dispatch(state.heat_demand, temp_ambient, state.temp_cabin);
                trace!(
                    schedule = schedule_name,
                    vehicle = vehicle_name,
                    version = %version.name,
                    month,
                    hour,
                    temp_cabin = state.temp_cabin,
                    heat_demand = state.heat_demand,
                    electricity = dispatch.total_electricity(),
                );

                rows.push(HourlyResultRow {
                    schedule: schedule_label.clone(),
                    vehicle: vehicle_label.clone(),
                    version: version_name.clone(),
                    version_label: version_label.clone(),
                    month,
                    hour,
                    temp_ambient,
                    irradiance: climate.irradiance(month, hour),
                    temp_cabin: state.temp_cabin,
                    heat_flows: state.heat_flows,
                    heat_demand: state.heat_demand,
                    electricity_resistive_heater: dispatch.resistive_heater,
                    electricity_heat_pumps: dispatch
                        .heat_pumps
                        .iter()
                        .map(|pump| (heat_pump_names[pump.index].clone(), pump.electricity))
                        .collect(),
                    heating_satisfied: dispatch.heating_satisfied,
                    cooling_satisfied: dispatch.cooling_satisfied,
                    operation_days,
                    operation_hours,
                    vehicle_count,
                    cost_electricity: schedule.cost_electricity,
                });
            }
        }

        debug!(
            "Simulated {} hours for {} ({}) on {}; {} solar absorption values computed, {} reused",
            rows.len(),
            vehicle_name,
            version.name,
            schedule_name,
            solar_cache.len(),
            solar_cache.hits()
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_conditions::tests::constant_climate;
    use crate::external_conditions::IrradianceMeasurement;
    use crate::input::tests::{input, minibus};
    use crate::input::{HeatingCoolingDevices, Vehicle};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn run(input: Input, flags: ProjectFlags) -> SimulationResults {
        Corpus::from_inputs(input, &flags).unwrap().run().unwrap()
    }

    #[rstest]
    fn should_simulate_each_operating_hour_of_each_version(input: Input) {
        let results = run(input, ProjectFlags::empty());

        // two versions, twelve months, 06:00 to 22:00
        assert_eq!(results.rows.len(), 2 * 12 * 16);
        let first = &results.rows[0];
        assert_eq!(
            (&*first.version, first.month, first.hour),
            ("default", 1, 6)
        );
        let last = results.rows.last().unwrap();
        assert_eq!(
            (&*last.version, last.month, last.hour),
            ("alternative_1", 12, 21)
        );
        assert_eq!(&*last.version_label, "{Temperature Control Curve: eco}");
        assert!(results
            .rows
            .iter()
            .all(|row| row.vehicle_count == 10 && row.operation_hours == 1.));
    }

    #[rstest]
    fn should_skip_vehicles_not_in_operation(mut input: Input, minibus: Vehicle) {
        input.vehicles.insert("coach".to_string(), minibus);
        input.operation_schedules["city line"]
            .vehicles_in_operation
            .insert("coach".to_string(), 0);

        let results = run(input, ProjectFlags::empty());
        assert!(results.rows.iter().all(|row| &*row.vehicle == "minibus"));
    }

    #[rstest]
    fn should_only_simulate_months_in_date_range(mut input: Input) {
        let schedule = &mut input.operation_schedules["city line"];
        schedule.date_begin = "12-20".parse().unwrap();
        schedule.date_end = "01-10".parse().unwrap();

        let results = run(input, ProjectFlags::empty());
        let months = results
            .rows
            .iter()
            .map(|row| (row.month, row.operation_days))
            .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(months.into_iter().collect::<Vec<_>>(), vec![(1, 10), (12, 12)]);
    }

    #[rstest]
    fn should_exclude_solar_gains_when_flagged(input: Input) {
        let with_sun = run(input.clone(), ProjectFlags::empty());
        let without_sun = run(input, ProjectFlags::EXCLUDE_SOLAR_GAINS);

        assert!(with_sun
            .rows
            .iter()
            .any(|row| row.heat_flows.solar_absorption > 0.));
        assert!(without_sun
            .rows
            .iter()
            .all(|row| row.heat_flows.solar_absorption == 0.));
    }

    #[rstest]
    fn should_absorb_solar_heat_from_horizontal_irradiance(mut input: Input) {
        let normal = run(input.clone(), ProjectFlags::empty());
        input.location_data["Vienna"].irradiance_measurement =
            IrradianceMeasurement::DirectHorizontal;
        let horizontal = run(input.clone(), ProjectFlags::empty());
        let excluded = run(input, ProjectFlags::EXCLUDE_SOLAR_GAINS);

        assert_eq!(horizontal.rows.len(), normal.rows.len());
        assert!(horizontal
            .rows
            .iter()
            .all(|row| row.heat_flows.solar_absorption >= 0.));
        assert!(horizontal
            .rows
            .iter()
            .any(|row| row.heat_flows.solar_absorption > 0.));
        assert!(horizontal
            .rows
            .iter()
            .zip(&normal.rows)
            .any(|(horizontal, normal)| {
                horizontal.heat_flows.solar_absorption != normal.heat_flows.solar_absorption
            }));
        assert!(excluded
            .rows
            .iter()
            .all(|row| row.heat_flows.solar_absorption == 0.));
    }

    #[rstest]
    fn should_label_heat_pump_electricity(input: Input) {
        let results = run(input, ProjectFlags::empty());
        let row = &results.rows[0];

        assert_eq!(row.electricity_heat_pumps.len(), 1);
        assert_eq!(&*row.electricity_heat_pumps[0].0, "roof unit");
        assert_eq!(row.electricity_vector().len(), 2);
        assert_relative_eq!(
            row.electric_power_total(),
            row.electric_power_heating() + row.electric_power_cooling()
        );
    }

    #[rstest]
    fn should_collect_unmet_heating_demand(mut input: Input) {
        input.vehicles["minibus"].heating_cooling_devices = HeatingCoolingDevices {
            resistive_heating_power_max: 0.,
            heat_pumps: vec![],
        };
        input.operation_schedules["city line"].date_end = "01-31".parse().unwrap();
        input.operation_schedules["city line"].time_begin = "20:00".parse().unwrap();
        input.vehicle_parameter_alternatives.clear();
        input.scenarios.clear();
        input.location_data["Vienna"] = constant_climate(48.2, -10., 0.);

        let results = run(input, ProjectFlags::empty());
        let warning = results.unmet_demand_warning.unwrap();

        assert_eq!(warning.occurrences().len(), 1);
        assert_eq!(warning.occurrences()[0].heating_hours, vec![20, 21]);
        assert!(warning.occurrences()[0].cooling_hours.is_empty());
        let text = warning.to_string();
        assert!(text.ends_with(
            "\n- Time steps with unsatisfied heating demand:\
             \n\t- city line\
             \n\t\t- minibus {}: January (20, 21 o'clock)"
        ));
        assert!(!text.contains("cooling demand:"));
    }

    #[rstest]
    fn should_not_warn_when_demand_is_met(input: Input) {
        let results = run(input, ProjectFlags::empty());
        assert!(results.rows.iter().all(|row| row.heating_satisfied));
        assert_eq!(results.unmet_demand_warning, None);
    }

    #[rstest]
    fn should_fail_run_when_cabin_temperature_does_not_converge(mut input: Input) {
        let vehicle = &mut input.vehicles["minibus"];
        vehicle.heat_transfer_coefficient_chassis = 0.;
        vehicle.volume_flow_rate_ventilation = 0.;
        vehicle.time_fraction_door_open = 0.;

        let result = Corpus::from_inputs(input, &ProjectFlags::empty())
            .unwrap()
            .run();

        match result {
            Err(SimulationError::NumericalNonConvergence(err)) => {
                assert_eq!(err.schedule, "city line");
                assert_eq!(err.vehicle, "minibus");
                assert_eq!((err.month, err.hour), (1, 6));
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }

    fn occurrence(
        schedule: &str,
        version_label: &str,
        month: u32,
        heating_hours: Vec<u32>,
        cooling_hours: Vec<u32>,
    ) -> UnmetDemandOccurrence {
        UnmetDemandOccurrence {
            schedule: schedule.into(),
            vehicle: "minibus".into(),
            version: version_label.into(),
            version_label: version_label.into(),
            month,
            heating_hours,
            cooling_hours,
        }
    }

    #[rstest]
    fn should_group_warning_text_by_schedule_and_version() {
        let warning = UnmetDemandWarning {
            occurrences: vec![
                occurrence("early", "{}", 1, vec![6, 7], vec![]),
                occurrence("early", "{}", 2, vec![6], vec![]),
                occurrence("early", "{Length: 9.0}", 7, vec![], vec![14, 15]),
                occurrence("late", "{}", 12, vec![22], vec![]),
            ],
        };

        let text = warning.to_string();
        let details = &text[text.find("\n-").unwrap()..];
        assert_eq!(
            details,
            "\n- Time steps with unsatisfied heating demand:\
             \n\t- early\
             \n\t\t- minibus {}: January (6, 7 o'clock), February (6 o'clock)\
             \n\t- late\
             \n\t\t- minibus {}: December (22 o'clock)\
             \n- Time steps with unsatisfied cooling demand:\
             \n\t- early\
             \n\t\t- minibus {Length: 9.0}: July (14, 15 o'clock)"
        );
    }
}
