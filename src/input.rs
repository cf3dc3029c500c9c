use crate::core::controls::temperature_control::TemperatureControlCurve;
use crate::core::heating_systems::heat_pump::HeatPump;
use crate::core::units::check_above_absolute_zero;
use crate::errors::ConfigurationError;
use crate::external_conditions::LocationClimate;
use crate::operation_calendar::{MonthDay, OperationCalendar, TimeOfDay};
use crate::vehicle_versions::{
    generate_vehicle_versions, VehicleParameterAlternative, VehicleVersion,
};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};
use tracing::debug;

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

/// Climate data keyed by location name, as supplied separately from a specification.
pub fn ingest_location_data(
    json: impl Read,
) -> Result<IndexMap<String, LocationClimate>, anyhow::Error> {
    Ok(serde_json::from_reader(BufReader::new(json))?)
}

/// A complete specification as written by the user, before validation.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Input {
    pub temperature_control_curves: IndexMap<String, TemperatureControlCurve>,
    pub vehicles: IndexMap<String, Vehicle>,
    #[serde(default)]
    pub vehicle_parameter_alternatives: Vec<VehicleParameterAlternative>,
    /// Explicit versions per vehicle; generated from the parameter alternatives when absent
    #[serde(default)]
    pub vehicle_versions: Option<IndexMap<String, Vec<VehicleVersion>>>,
    pub operation_schedules: IndexMap<String, OperationSchedule>,
    #[serde(default)]
    pub scenarios: IndexMap<String, ScenarioInput>,
    #[serde(default)]
    pub scenario_reference: Option<String>,
    #[serde(default)]
    pub location_data: IndexMap<String, LocationClimate>,
}

/// Selected version (by name or parameter-set label) per "{schedule} - {vehicle}" key.
pub type ScenarioInput = IndexMap<String, Option<String>>;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Vehicle {
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub length: f64,
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub width: f64,
    /// in m
    #[validate(exclusive_minimum = 0.)]
    pub height: f64,
    /// Total window area on the front and back, in m2
    #[validate(minimum = 0.)]
    pub area_windows_front: f64,
    /// Total window area on both sides, in m2
    #[validate(minimum = 0.)]
    pub area_windows_side: f64,
    /// in m
    #[validate(minimum = 0.)]
    pub door_height: f64,
    /// Sum of the widths of all doors, in m
    #[validate(minimum = 0.)]
    pub door_width_total: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub time_fraction_door_open: f64,
    /// U-value of the cabin shell, in W/(m2.K)
    #[validate(minimum = 0.)]
    pub heat_transfer_coefficient_chassis: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub cabin_absorptivity: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub window_transmissivity: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub fraction_obstruction_roof: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub fraction_obstruction_floor: f64,
    /// in m3/s
    #[validate(minimum = 0.)]
    pub volume_flow_rate_ventilation: f64,
    /// Heat given off by on-board devices, in kW
    pub heating_power_auxiliary: f64,
    /// Name of the temperature control curve
    pub temperature_control_curve: String,
    #[validate]
    pub heating_cooling_devices: HeatingCoolingDevices,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HeatingCoolingDevices {
    /// in kW
    #[validate(minimum = 0.)]
    pub resistive_heating_power_max: f64,
    #[serde(default)]
    #[validate]
    pub heat_pumps: Vec<HeatPump>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperationSchedule {
    pub location: String,
    pub date_begin: MonthDay,
    pub date_end: MonthDay,
    pub time_begin: TimeOfDay,
    pub time_end: TimeOfDay,
    /// Average number of passengers on board
    pub passenger_number: f64,
    /// Distance to surrounding obstacles casting shade, in m
    pub obstacle_distance: f64,
    /// in m
    pub obstacle_height: f64,
    /// Electricity cost per kWh
    pub cost_electricity: f64,
    /// Number of vehicles of each kind in operation
    pub vehicles_in_operation: IndexMap<String, u32>,
}

impl OperationSchedule {
    pub fn calendar(&self) -> OperationCalendar {
        OperationCalendar::new(
            self.date_begin,
            self.date_end,
            self.time_begin,
            self.time_end,
        )
    }

    /// Vehicles with a non-zero count, in input order.
    pub fn vehicles_operating(&self) -> impl Iterator<Item = (&str, u32)> {
        self.vehicles_in_operation
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(name, count)| (name.as_str(), *count))
    }
}

pub fn scenario_key(schedule: &str, vehicle: &str) -> String {
    format!("{schedule} - {vehicle}")
}

pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: Input = serde_json::from_reader(reader)?;

        Ok(Self { input })
    }

    pub fn from_input(input: Input) -> Self {
        Self { input }
    }

    /// Add climate data for further locations, replacing any embedded data of the same name.
    pub fn merge_location_data(
        &mut self,
        location_data: IndexMap<String, LocationClimate>,
    ) -> &Self {
        self.input.location_data.extend(location_data);
        self
    }

    pub fn finalize(self) -> Input {
        self.input
    }
}

/// A validated specification, ready for simulation.
#[derive(Clone, Debug)]
pub struct Specification {
    pub temperature_control_curves: IndexMap<String, TemperatureControlCurve>,
    pub vehicles: IndexMap<String, Vehicle>,
    pub vehicle_versions: IndexMap<String, Vec<VehicleVersion>>,
    pub operation_schedules: IndexMap<String, OperationSchedule>,
    /// Selected version name per scenario key, for every schedule/vehicle pair in operation
    pub scenarios: IndexMap<String, IndexMap<String, String>>,
    pub scenario_reference: Option<String>,
    pub location_data: IndexMap<String, LocationClimate>,
}

impl TryFrom<Input> for Specification {
    type Error = ConfigurationError;

    fn try_from(input: Input) -> Result<Self, Self::Error> {
        let Input {
            mut temperature_control_curves,
            vehicles,
            vehicle_parameter_alternatives,
            vehicle_versions,
            operation_schedules,
            scenarios,
            scenario_reference,
            location_data,
        } = input;

        validate_temperature_control_curves(&mut temperature_control_curves)?;
        validate_vehicles(&vehicles, &temperature_control_curves)?;
        validate_location_data(&location_data)?;
        validate_operation_schedules(&operation_schedules, &vehicles, &location_data)?;

        let vehicle_versions = match vehicle_versions {
            Some(versions) => versions,
            None => vehicles
                .iter()
                .map(|(name, vehicle)| {
                    generate_vehicle_versions(name, vehicle, &vehicle_parameter_alternatives)
                        .map(|versions| (name.clone(), versions))
                })
                .collect::<Result<_, _>>()?,
        };
        validate_vehicle_versions(
            &vehicle_versions,
            &vehicles,
            &temperature_control_curves,
            &operation_schedules,
        )?;

        let scenarios = resolve_scenarios(scenarios, &operation_schedules, &vehicle_versions)?;
        if !scenarios.is_empty() {
            match &scenario_reference {
                None => return Err(ConfigurationError::MissingReferenceScenario),
                Some(reference) if !scenarios.contains_key(reference) => {
                    return Err(ConfigurationError::UnknownReferenceScenario(
                        reference.clone(),
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            temperature_control_curves,
            vehicles,
            vehicle_versions,
            operation_schedules,
            scenarios,
            scenario_reference,
            location_data,
        })
    }
}

impl Specification {
    pub fn versions_of(&self, vehicle: &str) -> &[VehicleVersion] {
        self.vehicle_versions
            .get(vehicle)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn validate_temperature_control_curves(
    curves: &mut IndexMap<String, TemperatureControlCurve>,
) -> Result<(), ConfigurationError> {
    for (name, curve) in curves.iter_mut() {
        if curve.heating.is_empty() {
            return Err(ConfigurationError::EmptyHeatingCurve(name.clone()));
        }
        if curve.cooling.is_empty() {
            return Err(ConfigurationError::EmptyCoolingCurve(name.clone()));
        }
        curve.sort_points();
    }
    Ok(())
}

fn validate_vehicle(
    name: &str,
    vehicle: &Vehicle,
    curves: &IndexMap<String, TemperatureControlCurve>,
) -> Result<(), ConfigurationError> {
    vehicle
        .validate()
        .map_err(|errors| ConfigurationError::InvalidParameters {
            name: name.to_string(),
            message: errors.to_string(),
        })?;
    if !curves.contains_key(&vehicle.temperature_control_curve) {
        return Err(ConfigurationError::UnknownTemperatureControlCurve {
            vehicle: name.to_string(),
            curve: vehicle.temperature_control_curve.clone(),
        });
    }
    Ok(())
}

fn validate_vehicles(
    vehicles: &IndexMap<String, Vehicle>,
    curves: &IndexMap<String, TemperatureControlCurve>,
) -> Result<(), ConfigurationError> {
    if vehicles.is_empty() {
        return Err(ConfigurationError::NoVehicles);
    }
    for (name, vehicle) in vehicles {
        validate_vehicle(name, vehicle, curves)?;
    }
    Ok(())
}

fn validate_vehicle_versions(
    vehicle_versions: &IndexMap<String, Vec<VehicleVersion>>,
    vehicles: &IndexMap<String, Vehicle>,
    curves: &IndexMap<String, TemperatureControlCurve>,
    schedules: &IndexMap<String, OperationSchedule>,
) -> Result<(), ConfigurationError> {
    for (vehicle, versions) in vehicle_versions {
        if !vehicles.contains_key(vehicle) {
            return Err(ConfigurationError::InvalidParameters {
                name: vehicle.clone(),
                message: "versions were given for a vehicle that does not exist".to_string(),
            });
        }
        for version in versions {
            validate_vehicle(
                &format!("{vehicle} ({})", version.name),
                &version.vehicle,
                curves,
            )?;
        }
        if let Some(version) = versions
            .iter()
            .map(|version| version.name.as_str())
            .duplicates()
            .next()
        {
            return Err(ConfigurationError::DuplicateVehicleVersion {
                vehicle: vehicle.clone(),
                version: version.to_string(),
            });
        }
    }
    for (schedule_name, schedule) in schedules {
        for (vehicle, _) in schedule.vehicles_operating() {
            if vehicle_versions
                .get(vehicle)
                .map_or(true, |versions| versions.is_empty())
            {
                return Err(ConfigurationError::MissingVehicleVersions {
                    schedule: schedule_name.clone(),
                    vehicle: vehicle.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_location_data(
    location_data: &IndexMap<String, LocationClimate>,
) -> Result<(), ConfigurationError> {
    for (location, climate) in location_data {
        let invalid = |message: String| ConfigurationError::InvalidParameters {
            name: location.clone(),
            message,
        };
        climate.validate().map_err(|errors| invalid(errors.to_string()))?;
        for temperature in climate.temperature.iter().flatten() {
            check_above_absolute_zero(*temperature).map_err(|err| invalid(err.to_string()))?;
        }
    }
    Ok(())
}

fn validate_operation_schedules(
    schedules: &IndexMap<String, OperationSchedule>,
    vehicles: &IndexMap<String, Vehicle>,
    location_data: &IndexMap<String, LocationClimate>,
) -> Result<(), ConfigurationError> {
    if schedules.is_empty() {
        return Err(ConfigurationError::NoOperationSchedules);
    }
    for (name, schedule) in schedules {
        if schedule.vehicles_in_operation.is_empty() {
            return Err(ConfigurationError::NoVehiclesInOperation(name.clone()));
        }
        if let Some(vehicle) = schedule
            .vehicles_in_operation
            .keys()
            .find(|vehicle| !vehicles.contains_key(*vehicle))
        {
            return Err(ConfigurationError::UnknownVehicle {
                schedule: name.clone(),
                vehicle: vehicle.clone(),
            });
        }
        if !location_data.contains_key(&schedule.location) {
            return Err(ConfigurationError::UnknownLocation {
                schedule: name.clone(),
                location: schedule.location.clone(),
            });
        }
        if schedule.obstacle_distance <= 0. {
            return Err(ConfigurationError::NonPositiveObstacleDistance(name.clone()));
        }
        if schedule.passenger_number < 0. {
            return Err(ConfigurationError::InvalidParameters {
                name: name.clone(),
                message: "the number of passengers must not be negative".to_string(),
            });
        }
    }
    Ok(())
}

fn resolve_scenarios(
    scenarios: IndexMap<String, ScenarioInput>,
    schedules: &IndexMap<String, OperationSchedule>,
    vehicle_versions: &IndexMap<String, Vec<VehicleVersion>>,
) -> Result<IndexMap<String, IndexMap<String, String>>, ConfigurationError> {
    scenarios
        .into_iter()
        .map(|(scenario, mut selections)| {
            let mut resolved = IndexMap::new();
            for (schedule_name, schedule) in schedules {
                for (vehicle, _) in schedule.vehicles_operating() {
                    let key = scenario_key(schedule_name, vehicle);
                    let selection = selections.swap_remove(&key).flatten().ok_or_else(|| {
                        ConfigurationError::MissingScenarioSelection {
                            scenario: scenario.clone(),
                            key: key.clone(),
                        }
                    })?;
                    let version = vehicle_versions
                        .get(vehicle)
                        .and_then(|versions| {
                            versions
                                .iter()
                                .find(|version| version.is_selected_by(&selection))
                        })
                        .ok_or_else(|| ConfigurationError::UnknownVehicleVersion {
                            scenario: scenario.clone(),
                            key: key.clone(),
                            selection: selection.clone(),
                        })?;
                    resolved.insert(key, version.name.clone());
                }
            }
            for key in selections.keys() {
                debug!("Scenario '{scenario}' selects a version for '{key}', which is not in operation; ignoring");
            }
            Ok::<_, ConfigurationError>((scenario, resolved))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::external_conditions::tests::constant_climate;
    use crate::vehicle_versions::{ParameterValue, VehicleParameter};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    #[fixture]
    pub(crate) fn minibus() -> Vehicle {
        Vehicle {
            length: 7.,
            width: 2.2,
            height: 2.6,
            area_windows_front: 3.,
            area_windows_side: 8.,
            door_height: 1.9,
            door_width_total: 1.2,
            time_fraction_door_open: 0.1,
            heat_transfer_coefficient_chassis: 3.,
            cabin_absorptivity: 0.6,
            window_transmissivity: 0.7,
            fraction_obstruction_roof: 0.1,
            fraction_obstruction_floor: 0.2,
            volume_flow_rate_ventilation: 0.2,
            heating_power_auxiliary: 0.5,
            temperature_control_curve: "comfort".to_string(),
            heating_cooling_devices: HeatingCoolingDevices {
                resistive_heating_power_max: 8.,
                heat_pumps: vec![HeatPump {
                    name: "roof unit".to_string(),
                    electric_power_max: 4.,
                    exergy_efficiency: 0.3,
                    heating: true,
                    cooling: true,
                }],
            },
        }
    }

    #[fixture]
    pub(crate) fn input(minibus: Vehicle) -> Input {
        Input {
            temperature_control_curves: IndexMap::from([
                (
                    "comfort".to_string(),
                    TemperatureControlCurve::new(
                        vec![(20., 18.), (-10., 20.)],
                        vec![(20., 24.), (35., 26.)],
                    ),
                ),
                (
                    "eco".to_string(),
                    TemperatureControlCurve::constant(16., 28.),
                ),
            ]),
            vehicles: IndexMap::from([("minibus".to_string(), minibus)]),
            vehicle_parameter_alternatives: vec![VehicleParameterAlternative {
                vehicle: "minibus".to_string(),
                parameter: VehicleParameter::TemperatureControlCurve,
                values: vec![ParameterValue::Text("eco".to_string())],
            }],
            vehicle_versions: None,
            operation_schedules: IndexMap::from([(
                "city line".to_string(),
                OperationSchedule {
                    location: "Vienna".to_string(),
                    date_begin: "01-01".parse().unwrap(),
                    date_end: "12-31".parse().unwrap(),
                    time_begin: "06:00".parse().unwrap(),
                    time_end: "22:00".parse().unwrap(),
                    passenger_number: 12.,
                    obstacle_distance: 15.,
                    obstacle_height: 10.,
                    cost_electricity: 0.25,
                    vehicles_in_operation: IndexMap::from([
                        ("minibus".to_string(), 10),
                    ]),
                },
            )]),
            scenarios: IndexMap::from([
                (
                    "today".to_string(),
                    IndexMap::from([(
                        "city line - minibus".to_string(),
                        Some("default".to_string()),
                    )]),
                ),
                (
                    "eco fleet".to_string(),
                    IndexMap::from([(
                        "city line - minibus".to_string(),
                        Some("{Temperature Control Curve: eco}".to_string()),
                    )]),
                ),
            ]),
            scenario_reference: Some("today".to_string()),
            location_data: IndexMap::from([(
                "Vienna".to_string(),
                constant_climate(48.2, 5., 300.),
            )]),
        }
    }

    #[rstest]
    fn should_validate_and_resolve_scenarios(input: Input) {
        let specification = Specification::try_from(input).unwrap();

        assert_eq!(specification.versions_of("minibus").len(), 2);
        assert_eq!(
            specification.scenarios["today"]["city line - minibus"],
            "default"
        );
        assert_eq!(
            specification.scenarios["eco fleet"]["city line - minibus"],
            "alternative_1"
        );
    }

    #[rstest]
    fn should_sort_control_curve_points(input: Input) {
        let specification = Specification::try_from(input).unwrap();
        assert_eq!(
            specification.temperature_control_curves["comfort"].heating,
            vec![(-10., 20.), (20., 18.)]
        );
    }

    #[rstest]
    fn should_reject_empty_heating_curve(mut input: Input) {
        input.temperature_control_curves["eco"].heating.clear();
        assert_eq!(
            Specification::try_from(input).unwrap_err(),
            ConfigurationError::EmptyHeatingCurve("eco".to_string())
        );
    }

    #[rstest]
    fn should_reject_unknown_control_curve(mut input: Input) {
        input.vehicles["minibus"].temperature_control_curve = "arctic".to_string();
        assert!(matches!(
            Specification::try_from(input),
            Err(ConfigurationError::UnknownTemperatureControlCurve { .. })
        ));
    }

    #[rstest]
    fn should_reject_unknown_location(mut input: Input) {
        input.location_data.clear();
        assert!(matches!(
            Specification::try_from(input),
            Err(ConfigurationError::UnknownLocation { .. })
        ));
    }

    #[rstest]
    fn should_reject_unknown_vehicle_in_schedule(mut input: Input) {
        input.operation_schedules["city line"]
            .vehicles_in_operation
            .insert("tram".to_string(), 2);
        assert_eq!(
            Specification::try_from(input).unwrap_err(),
            ConfigurationError::UnknownVehicle {
                schedule: "city line".to_string(),
                vehicle: "tram".to_string(),
            }
        );
    }

    #[rstest]
    fn should_reject_missing_scenario_selection(mut input: Input) {
        input.scenarios["today"]["city line - minibus"] = None;
        assert!(matches!(
            Specification::try_from(input),
            Err(ConfigurationError::MissingScenarioSelection { .. })
        ));
    }

    #[rstest]
    fn should_reject_unknown_version_selection(mut input: Input) {
        input.scenarios["today"]["city line - minibus"] = Some("alternative_7".to_string());
        assert!(matches!(
            Specification::try_from(input),
            Err(ConfigurationError::UnknownVehicleVersion { .. })
        ));
    }

    #[rstest]
    fn should_reject_duplicate_version_names(mut input: Input, minibus: Vehicle) {
        let mut longer = minibus.clone();
        longer.length = 12.;
        input.vehicle_versions = Some(IndexMap::from([(
            "minibus".to_string(),
            vec![
                VehicleVersion::default_for(&minibus),
                VehicleVersion::default_for(&longer),
            ],
        )]));
        assert_eq!(
            Specification::try_from(input).unwrap_err(),
            ConfigurationError::DuplicateVehicleVersion {
                vehicle: "minibus".to_string(),
                version: "default".to_string(),
            }
        );
    }

    #[rstest]
    #[case(IndexMap::new())]
    #[case(IndexMap::from([("minibus".to_string(), vec![])]))]
    fn should_reject_vehicle_in_operation_without_versions(
        mut input: Input,
        #[case] vehicle_versions: IndexMap<String, Vec<VehicleVersion>>,
    ) {
        input.vehicle_versions = Some(vehicle_versions);
        input.scenarios.clear();
        input.scenario_reference = None;
        assert_eq!(
            Specification::try_from(input).unwrap_err(),
            ConfigurationError::MissingVehicleVersions {
                schedule: "city line".to_string(),
                vehicle: "minibus".to_string(),
            }
        );
    }

    #[rstest]
    fn should_accept_explicit_versions(mut input: Input, minibus: Vehicle) {
        input.vehicle_versions = Some(IndexMap::from([(
            "minibus".to_string(),
            vec![VehicleVersion::default_for(&minibus)],
        )]));
        input.scenarios.shift_remove("eco fleet");
        let specification = Specification::try_from(input).unwrap();
        assert_eq!(specification.versions_of("minibus").len(), 1);
    }

    #[rstest]
    fn should_not_need_selection_for_vehicles_not_in_operation(mut input: Input) {
        input.operation_schedules["city line"].vehicles_in_operation["minibus"] = 0;
        input.scenarios["today"].clear();
        input.scenarios["eco fleet"].clear();
        let specification = Specification::try_from(input).unwrap();
        assert!(specification.scenarios["today"].is_empty());
    }

    #[rstest]
    fn should_require_reference_scenario(mut input: Input) {
        input.scenario_reference = None;
        assert_eq!(
            Specification::try_from(input.clone()).unwrap_err(),
            ConfigurationError::MissingReferenceScenario
        );
        input.scenario_reference = Some("tomorrow".to_string());
        assert_eq!(
            Specification::try_from(input).unwrap_err(),
            ConfigurationError::UnknownReferenceScenario("tomorrow".to_string())
        );
    }

    #[rstest]
    fn should_reject_out_of_range_parameters(mut input: Input) {
        input.vehicles["minibus"].cabin_absorptivity = 1.5;
        assert!(matches!(
            Specification::try_from(input),
            Err(ConfigurationError::InvalidParameters { .. })
        ));
    }

    #[rstest]
    fn should_reject_invalid_heat_pump(mut input: Input) {
        input.vehicles["minibus"].heating_cooling_devices.heat_pumps[0].exergy_efficiency = -0.1;
        assert!(matches!(
            Specification::try_from(input),
            Err(ConfigurationError::InvalidParameters { .. })
        ));
    }

    #[rstest]
    fn should_reject_non_positive_obstacle_distance(mut input: Input) {
        input.operation_schedules["city line"].obstacle_distance = 0.;
        assert_eq!(
            Specification::try_from(input).unwrap_err(),
            ConfigurationError::NonPositiveObstacleDistance("city line".to_string())
        );
    }

    #[rstest]
    fn should_ingest_json() {
        let json = json!({
            "temperature_control_curves": {
                "constant": {"heating": [[0, 18]], "cooling": [[0, 24]]}
            },
            "vehicles": {
                "bus": {
                    "length": 12, "width": 2.5, "height": 3,
                    "area_windows_front": 4, "area_windows_side": 15,
                    "door_height": 2, "door_width_total": 3.6, "time_fraction_door_open": 0.15,
                    "heat_transfer_coefficient_chassis": 2.5,
                    "cabin_absorptivity": 0.5, "window_transmissivity": 0.75,
                    "fraction_obstruction_roof": 0.2, "fraction_obstruction_floor": 0.1,
                    "volume_flow_rate_ventilation": 0.5, "heating_power_auxiliary": 1,
                    "temperature_control_curve": "constant",
                    "heating_cooling_devices": {"resistive_heating_power_max": 20}
                }
            },
            "operation_schedules": {
                "line 1": {
                    "location": "Graz",
                    "date_begin": "12-20", "date_end": "01-10",
                    "time_begin": "22:00", "time_end": "02:00",
                    "passenger_number": 20, "obstacle_distance": 10, "obstacle_height": 5,
                    "cost_electricity": 0.3,
                    "vehicles_in_operation": {"bus": 3}
                }
            }
        });
        let mut input =
            ingest_for_processing(serde_json::to_string(&json).unwrap().as_bytes()).unwrap();
        input.merge_location_data(IndexMap::from([(
            "Graz".to_string(),
            constant_climate(47., 0., 0.),
        )]));
        let specification = Specification::try_from(input.finalize()).unwrap();

        assert!(specification.scenarios.is_empty());
        assert_eq!(specification.versions_of("bus").len(), 1);
        let calendar = specification.operation_schedules["line 1"].calendar();
        assert_eq!(calendar.days_in_month(12), 12);
        assert_eq!(calendar.days_in_month(1), 10);
    }

    #[rstest]
    fn should_reject_unknown_fields() {
        let json = r#"{"heating": [], "cooling": [], "steps": 3}"#;
        assert!(serde_json::from_str::<TemperatureControlCurve>(json).is_err());
    }
}
