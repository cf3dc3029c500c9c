//! Vehicle versions: named variants of a vehicle with some of its parameters overridden.

use crate::errors::ConfigurationError;
use crate::input::Vehicle;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum_macros::Display as StrumDisplay;

pub const DEFAULT_VERSION_NAME: &str = "default";
const ALTERNATIVE_VERSION_PREFIX: &str = "alternative_";

/// Vehicle parameters that can take alternative values.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize, StrumDisplay)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum VehicleParameter {
    Length,
    Width,
    Height,
    #[strum(to_string = "Front Window Area")]
    AreaWindowsFront,
    #[strum(to_string = "Side Window Area")]
    AreaWindowsSide,
    #[strum(to_string = "Door Height")]
    DoorHeight,
    #[strum(to_string = "Total Door Width")]
    DoorWidthTotal,
    #[strum(to_string = "Door Opening Time Fraction")]
    TimeFractionDoorOpen,
    #[strum(to_string = "Chassis Heat Transfer Coefficient")]
    HeatTransferCoefficientChassis,
    #[strum(to_string = "Cabin Absorptivity")]
    CabinAbsorptivity,
    #[strum(to_string = "Window Transmissivity")]
    WindowTransmissivity,
    #[strum(to_string = "Roof Obstruction Fraction")]
    FractionObstructionRoof,
    #[strum(to_string = "Floor Obstruction Fraction")]
    FractionObstructionFloor,
    #[strum(to_string = "Ventilation Flow Rate")]
    VolumeFlowRateVentilation,
    #[strum(to_string = "Auxiliary Heating Power")]
    HeatingPowerAuxiliary,
    #[strum(to_string = "Resistive Heating Power")]
    ResistiveHeatingPowerMax,
    #[strum(to_string = "Temperature Control Curve")]
    TemperatureControlCurve,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl Display for ParameterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            // debug formatting keeps the decimal point on whole numbers
            ParameterValue::Number(value) => write!(f, "{value:?}"),
            ParameterValue::Text(value) => write!(f, "{value}"),
        }
    }
}

impl VehicleParameter {
    fn number_field_mut(self, vehicle: &mut Vehicle) -> Option<&mut f64> {
        Some(match self {
            VehicleParameter::Length => &mut vehicle.length,
            VehicleParameter::Width => &mut vehicle.width,
            VehicleParameter::Height => &mut vehicle.height,
            VehicleParameter::AreaWindowsFront => &mut vehicle.area_windows_front,
            VehicleParameter::AreaWindowsSide => &mut vehicle.area_windows_side,
            VehicleParameter::DoorHeight => &mut vehicle.door_height,
            VehicleParameter::DoorWidthTotal => &mut vehicle.door_width_total,
            VehicleParameter::TimeFractionDoorOpen => &mut vehicle.time_fraction_door_open,
            VehicleParameter::HeatTransferCoefficientChassis => {
                &mut vehicle.heat_transfer_coefficient_chassis
            }
            VehicleParameter::CabinAbsorptivity => &mut vehicle.cabin_absorptivity,
            VehicleParameter::WindowTransmissivity => &mut vehicle.window_transmissivity,
            VehicleParameter::FractionObstructionRoof => &mut vehicle.fraction_obstruction_roof,
            VehicleParameter::FractionObstructionFloor => &mut vehicle.fraction_obstruction_floor,
            VehicleParameter::VolumeFlowRateVentilation => {
                &mut vehicle.volume_flow_rate_ventilation
            }
            VehicleParameter::HeatingPowerAuxiliary => &mut vehicle.heating_power_auxiliary,
            VehicleParameter::ResistiveHeatingPowerMax => {
                &mut vehicle.heating_cooling_devices.resistive_heating_power_max
            }
            VehicleParameter::TemperatureControlCurve => return None,
        })
    }

    /// Current value of this parameter on the vehicle.
    pub fn value_of(self, vehicle: &Vehicle) -> ParameterValue {
        let number = match self {
            VehicleParameter::Length => vehicle.length,
            VehicleParameter::Width => vehicle.width,
            VehicleParameter::Height => vehicle.height,
            VehicleParameter::AreaWindowsFront => vehicle.area_windows_front,
            VehicleParameter::AreaWindowsSide => vehicle.area_windows_side,
            VehicleParameter::DoorHeight => vehicle.door_height,
            VehicleParameter::DoorWidthTotal => vehicle.door_width_total,
            VehicleParameter::TimeFractionDoorOpen => vehicle.time_fraction_door_open,
            VehicleParameter::HeatTransferCoefficientChassis => {
                vehicle.heat_transfer_coefficient_chassis
            }
            VehicleParameter::CabinAbsorptivity => vehicle.cabin_absorptivity,
            VehicleParameter::WindowTransmissivity => vehicle.window_transmissivity,
            VehicleParameter::FractionObstructionRoof => vehicle.fraction_obstruction_roof,
            VehicleParameter::FractionObstructionFloor => vehicle.fraction_obstruction_floor,
            VehicleParameter::VolumeFlowRateVentilation => vehicle.volume_flow_rate_ventilation,
            VehicleParameter::HeatingPowerAuxiliary => vehicle.heating_power_auxiliary,
            VehicleParameter::ResistiveHeatingPowerMax => {
                vehicle.heating_cooling_devices.resistive_heating_power_max
            }
            VehicleParameter::TemperatureControlCurve => {
                return ParameterValue::Text(vehicle.temperature_control_curve.clone())
            }
        };
        ParameterValue::Number(number)
    }

    /// Override this parameter on the vehicle. Fails if the value has the wrong kind.
    pub fn apply(
        self,
        vehicle: &mut Vehicle,
        value: &ParameterValue,
    ) -> Result<(), ParameterKindMismatch> {
        match value {
            ParameterValue::Number(number) => {
                *self
                    .number_field_mut(vehicle)
                    .ok_or(ParameterKindMismatch::ExpectedText)? = *number;
            }
            ParameterValue::Text(_) if self != VehicleParameter::TemperatureControlCurve => {
                return Err(ParameterKindMismatch::ExpectedNumber);
            }
            ParameterValue::Text(text) => vehicle.temperature_control_curve = text.clone(),
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ParameterKindMismatch {
    #[error("a number was expected")]
    ExpectedNumber,
    #[error("the name of a temperature control curve was expected")]
    ExpectedText,
}

/// Alternative values to explore for one parameter of one vehicle.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleParameterAlternative {
    pub vehicle: String,
    pub parameter: VehicleParameter,
    pub values: Vec<ParameterValue>,
}

pub type ParameterSet = IndexMap<VehicleParameter, ParameterValue>;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleVersion {
    pub name: String,
    pub vehicle: Vehicle,
    #[serde(default)]
    pub parameter_set: ParameterSet,
}

impl VehicleVersion {
    pub fn default_for(vehicle: &Vehicle) -> Self {
        Self {
            name: DEFAULT_VERSION_NAME.to_string(),
            vehicle: vehicle.clone(),
            parameter_set: Default::default(),
        }
    }

    /// The parameter set rendered as `{Display Name: value, ...}`.
    pub fn label(&self) -> String {
        parameter_set_label(&self.parameter_set)
    }

    /// Whether a scenario selection refers to this version, by name or by label.
    pub fn is_selected_by(&self, selection: &str) -> bool {
        self.name == selection || self.label() == selection
    }
}

pub fn parameter_set_label(parameter_set: &ParameterSet) -> String {
    format!(
        "{{{}}}",
        parameter_set
            .iter()
            .map(|(parameter, value)| format!("{parameter}: {value}"))
            .join(", ")
    )
}

/// Generate the versions of a vehicle from the parameter alternatives that apply to it.
///
/// The first version is always the vehicle itself. Every combination of alternative values
/// that differs from the vehicle's own values becomes a further version, numbered in the
/// order the combinations are enumerated. When several alternatives name the same parameter
/// the last one wins.
pub fn generate_vehicle_versions(
    vehicle_name: &str,
    vehicle: &Vehicle,
    alternatives: &[VehicleParameterAlternative],
) -> Result<Vec<VehicleVersion>, ConfigurationError> {
    let mut alternative_values: IndexMap<VehicleParameter, &[ParameterValue]> = IndexMap::new();
    for alternative in alternatives
        .iter()
        .filter(|alternative| alternative.vehicle == vehicle_name)
    {
        alternative_values.insert(alternative.parameter, &alternative.values);
    }

    let mut default_version = VehicleVersion::default_for(vehicle);
    if alternative_values.is_empty() {
        return Ok(vec![default_version]);
    }

    let default_values: Vec<ParameterValue> = alternative_values
        .keys()
        .map(|parameter| parameter.value_of(vehicle))
        .collect();
    default_version.parameter_set = alternative_values
        .keys()
        .copied()
        .zip(default_values.iter().cloned())
        .collect();

    let mut versions = vec![default_version];
    let combinations = alternative_values
        .values()
        .map(|values| values.iter())
        .multi_cartesian_product();

    for combination in combinations {
        if combination.iter().copied().eq(default_values.iter()) {
            continue;
        }

        let mut version_vehicle = vehicle.clone();
        let mut parameter_set = ParameterSet::new();
        for (parameter, value) in alternative_values.keys().zip(combination) {
            parameter.apply(&mut version_vehicle, value).map_err(|err| {
                ConfigurationError::InvalidParameterAlternative {
                    vehicle: vehicle_name.to_string(),
                    parameter: parameter.to_string(),
                    reason: err.to_string(),
                }
            })?;
            parameter_set.insert(*parameter, value.clone());
        }

        versions.push(VehicleVersion {
            name: format!("{ALTERNATIVE_VERSION_PREFIX}{}", versions.len()),
            vehicle: version_vehicle,
            parameter_set,
        });
    }

    Ok(versions)
}
