//! Roll hourly results up into annual totals per vehicle version and per scenario.

use crate::corpus::HourlyResultRow;
use crate::input::{scenario_key, Specification};
use indexmap::IndexMap;
use std::ops::{AddAssign, Mul};
use std::sync::Arc;
use strum_macros::Display;
use tracing::{debug, warn};

/// Annual electricity and its cost. Energies in kWh.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergyTotals {
    pub electric_energy: f64,
    pub electric_energy_heating: f64,
    pub electric_energy_cooling: f64,
    pub electricity_cost: f64,
}

impl EnergyTotals {
    /// Energy of one row over all the days and hour fractions it stands for.
    pub fn of_row(row: &HourlyResultRow) -> Self {
        let operating_time = row.operation_hours * row.operation_days as f64;
        let electric_energy = row.electric_power_total() * operating_time;

        Self {
            electric_energy,
            electric_energy_heating: row.electric_power_heating() * operating_time,
            electric_energy_cooling: row.electric_power_cooling() * operating_time,
            electricity_cost: electric_energy * row.cost_electricity,
        }
    }
}

impl AddAssign for EnergyTotals {
    fn add_assign(&mut self, other: Self) {
        self.electric_energy += other.electric_energy;
        self.electric_energy_heating += other.electric_energy_heating;
        self.electric_energy_cooling += other.electric_energy_cooling;
        self.electricity_cost += other.electricity_cost;
    }
}

impl Mul<f64> for EnergyTotals {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self {
            electric_energy: self.electric_energy * factor,
            electric_energy_heating: self.electric_energy_heating * factor,
            electric_energy_cooling: self.electric_energy_cooling * factor,
            electricity_cost: self.electricity_cost * factor,
        }
    }
}

/// Totals for a single vehicle of one version operating on one schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionTotals {
    pub schedule: Arc<str>,
    pub vehicle: Arc<str>,
    pub version: Arc<str>,
    pub version_label: Arc<str>,
    pub vehicle_count: u32,
    pub totals: EnergyTotals,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioTotals {
    pub scenario: String,
    pub totals: EnergyTotals,
    /// Difference in total energy to the reference scenario, in percent
    pub comparison_to_reference: Option<f64>,
    pub is_reference: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateTotals {
    pub version_totals: Vec<VersionTotals>,
    pub scenario_totals: Vec<ScenarioTotals>,
}

pub fn aggregate(rows: &[HourlyResultRow], specification: &Specification) -> AggregateTotals {
    let version_totals = aggregate_version_totals(rows);
    let scenario_totals = aggregate_scenario_totals(&version_totals, specification);

    AggregateTotals {
        version_totals,
        scenario_totals,
    }
}

/// Sum rows per schedule, vehicle, version and vehicle count, in order of first appearance.
pub fn aggregate_version_totals(rows: &[HourlyResultRow]) -> Vec<VersionTotals> {
    let mut grouped: IndexMap<(&str, &str, &str, u32), VersionTotals> = Default::default();

    for row in rows {
        grouped
            .entry((&*row.schedule, &*row.vehicle, &*row.version, row.vehicle_count))
            .or_insert_with(|| VersionTotals {
                schedule: row.schedule.clone(),
                vehicle: row.vehicle.clone(),
                version: row.version.clone(),
                version_label: row.version_label.clone(),
                vehicle_count: row.vehicle_count,
                totals: Default::default(),
            })
            .totals += EnergyTotals::of_row(row);
    }

    grouped.into_values().collect()
}

/// Fleet totals of each scenario, with the change in total energy relative to the reference
/// scenario.
pub fn aggregate_scenario_totals(
    version_totals: &[VersionTotals],
    specification: &Specification,
) -> Vec<ScenarioTotals> {
    let by_version: IndexMap<(&str, &str, &str), &VersionTotals> = version_totals
        .iter()
        .map(|totals| {
            (
                (&*totals.schedule, &*totals.vehicle, &*totals.version),
                totals,
            )
        })
        .collect();

    let mut scenario_totals = specification
        .scenarios
        .iter()
        .map(|(scenario, selections)| {
            let mut totals = EnergyTotals::default();

            for (schedule_name, schedule) in &specification.operation_schedules {
                for (vehicle_name, vehicle_count) in schedule.vehicles_operating() {
                    let Some(version) = selections.get(&scenario_key(schedule_name, vehicle_name))
                    else {
                        continue;
                    };
                    match by_version.get(&(schedule_name.as_str(), vehicle_name, version.as_str())) {
                        Some(version_totals) => {
                            totals += version_totals.totals * vehicle_count as f64;
                        }
                        None => debug!(
                            "No results for {vehicle_name} ({version}) on {schedule_name} in scenario {scenario}"
                        ),
                    }
                }
            }

            ScenarioTotals {
                scenario: scenario.clone(),
                totals,
                comparison_to_reference: None,
                is_reference: specification.scenario_reference.as_ref() == Some(scenario),
            }
        })
        .collect::<Vec<_>>();

    let reference_energy = scenario_totals
        .iter()
        .find(|totals| totals.is_reference)
        .map(|totals| totals.totals.electric_energy);

    match reference_energy {
        Some(reference_energy) if reference_energy == 0. => {
            warn!("The reference scenario uses no electricity, so no scenario can be compared to it");
        }
        Some(reference_energy) => {
            for totals in scenario_totals.iter_mut().filter(|totals| !totals.is_reference) {
                totals.comparison_to_reference = Some(
                    100. * (totals.totals.electric_energy - reference_energy) / reference_energy,
                );
            }
        }
        None => {}
    }

    scenario_totals
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum EnergyUnit {
    #[strum(serialize = "kWh")]
    KilowattHours,
    #[strum(serialize = "MWh")]
    MegawattHours,
    #[strum(serialize = "GWh")]
    GigawattHours,
    #[strum(serialize = "TWh")]
    TerawattHours,
    #[strum(serialize = "PWh")]
    PetawattHours,
}

impl EnergyUnit {
    /// The largest unit in which the given energy in kWh is at least one.
    fn for_energy(energy: f64) -> (Self, f64) {
        if energy < 1e3 {
            (Self::KilowattHours, 1.)
        } else if energy < 1e6 {
            (Self::MegawattHours, 1e-3)
        } else if energy < 1e9 {
            (Self::GigawattHours, 1e-6)
        } else if energy < 1e12 {
            (Self::TerawattHours, 1e-9)
        } else {
            (Self::PetawattHours, 1e-12)
        }
    }
}

/// Express scenario energies in a unit chosen from the largest scenario total. Costs and
/// comparisons are left as they are.
pub fn scale_scenario_totals(scenario_totals: &[ScenarioTotals]) -> (Vec<ScenarioTotals>, EnergyUnit) {
    let max_energy = scenario_totals
        .iter()
        .map(|totals| totals.totals.electric_energy)
        .fold(0., f64::max);
    let (unit, factor) = EnergyUnit::for_energy(max_energy);

    let scaled = scenario_totals
        .iter()
        .map(|totals| ScenarioTotals {
            totals: EnergyTotals {
                electric_energy: totals.totals.electric_energy * factor,
                electric_energy_heating: totals.totals.electric_energy_heating * factor,
                electric_energy_cooling: totals.totals.electric_energy_cooling * factor,
                ..totals.totals
            },
            ..totals.clone()
        })
        .collect();

    (scaled, unit)
}
