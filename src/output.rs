use crate::aggregation::{EnergyUnit, ScenarioTotals, VersionTotals};
use crate::corpus::{HourlyResultRow, UnmetDemandWarning};
use crate::core::units::month_name;
use anyhow::anyhow;
use csv::WriterBuilder;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug + Sync + Send {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    /// The file template takes two placeholders: the location key, then the file extension.
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|err| anyhow!("Could not build output file name for {location_key}: {err:?}"))?;

        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

fn round(value: f64, rounding_digits: u32) -> String {
    let factor = 10f64.powi(rounding_digits as i32);
    let rounded = (value * factor).round() / factor;
    // avoid writing "-0"
    if rounded == 0. {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn optional(value: Option<f64>, rounding_digits: u32) -> String {
    value
        .map(|value| round(value, rounding_digits))
        .unwrap_or_default()
}

pub(crate) fn write_vehicle_operation_totals(
    writer: impl Write,
    version_totals: &[VersionTotals],
    rounding_digits: u32,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record([
        "operation_schedule",
        "vehicle_name",
        "vehicle_version",
        "vehicle_version_parameter_set",
        "number_of_vehicles",
        "electric_energy_vehicle_operation_total [kWh]",
        "electric_energy_vehicle_operation_heating_total [kWh]",
        "electric_energy_vehicle_operation_cooling_total [kWh]",
        "electricity_cost_vehicle_operation_total",
    ])?;
    for version in version_totals {
        writer.write_record([
            version.schedule.to_string(),
            version.vehicle.to_string(),
            version.version.to_string(),
            version.version_label.to_string(),
            version.vehicle_count.to_string(),
            round(version.totals.electric_energy, rounding_digits),
            round(version.totals.electric_energy_heating, rounding_digits),
            round(version.totals.electric_energy_cooling, rounding_digits),
            round(version.totals.electricity_cost, rounding_digits),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_scenario_totals(
    writer: impl Write,
    scenario_totals: &[ScenarioTotals],
    unit: EnergyUnit,
    rounding_digits: u32,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record([
        "scenario_name".to_string(),
        format!("electric_energy_scenario_total [{unit}]"),
        format!("electric_energy_scenario_heating_total [{unit}]"),
        format!("electric_energy_scenario_cooling_total [{unit}]"),
        "electricity_cost_scenario_total".to_string(),
        "comparison_to_reference [%]".to_string(),
        "reference_scenario".to_string(),
    ])?;
    for scenario in scenario_totals {
        writer.write_record([
            scenario.scenario.clone(),
            round(scenario.totals.electric_energy, rounding_digits),
            round(scenario.totals.electric_energy_heating, rounding_digits),
            round(scenario.totals.electric_energy_cooling, rounding_digits),
            round(scenario.totals.electricity_cost, rounding_digits),
            optional(scenario.comparison_to_reference, rounding_digits),
            scenario.is_reference.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_hourly_results(
    writer: impl Write,
    rows: &[HourlyResultRow],
    rounding_digits: u32,
) -> anyhow::Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record([
        "operation_schedule",
        "vehicle_name",
        "vehicle_version",
        "vehicle_version_parameter_set",
        "month_name",
        "hour",
        "temperature_environment [deg C]",
        "irradiation [W/m2]",
        "temperature_vehicle [deg C]",
        "power_solar_absorption [kW]",
        "power_passengers [kW]",
        "power_auxiliary [kW]",
        "power_convection [kW]",
        "power_ventilation [kW]",
        "power_doors [kW]",
        "demand_heating [kW]",
        "demand_cooling [kW]",
        "electric_power_vehicle [kW]",
        "electric_power_vehicle_heating [kW]",
        "electric_power_vehicle_cooling [kW]",
        "electric_power_resistive_heating [kW]",
        "electric_power_heat_pumps [kW]",
        "heating_satisfied",
        "cooling_satisfied",
        "operation_days",
        "operation_hours",
        "number_of_vehicles",
        "unit_cost_electricity",
    ])?;
    for row in rows {
        let heat_pumps = format!(
            "{{{}}}",
            row.electricity_heat_pumps
                .iter()
                .map(|(name, power)| format!("{name}: {}", round(*power, rounding_digits)))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let flows = &row.heat_flows;

        writer.write_record([
            row.schedule.to_string(),
            row.vehicle.to_string(),
            row.version.to_string(),
            row.version_label.to_string(),
            month_name(row.month).to_string(),
            row.hour.to_string(),
            round(row.temp_ambient, rounding_digits),
            round(row.irradiance, rounding_digits),
            round(row.temp_cabin, rounding_digits),
            round(flows.solar_absorption, rounding_digits),
            round(flows.passengers, rounding_digits),
            round(flows.auxiliary, rounding_digits),
            round(flows.convection, rounding_digits),
            round(flows.ventilation, rounding_digits),
            round(flows.doors, rounding_digits),
            round(row.heating_demand(), rounding_digits),
            round(row.cooling_demand(), rounding_digits),
            round(row.electric_power_total(), rounding_digits),
            round(row.electric_power_heating(), rounding_digits),
            round(row.electric_power_cooling(), rounding_digits),
            round(row.electricity_resistive_heater, rounding_digits),
            heat_pumps,
            row.heating_satisfied.to_string(),
            row.cooling_satisfied.to_string(),
            row.operation_days.to_string(),
            round(row.operation_hours, rounding_digits),
            row.vehicle_count.to_string(),
            row.cost_electricity.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub(crate) fn write_warning(mut writer: impl Write, warning: &UnmetDemandWarning) -> anyhow::Result<()> {
    writeln!(writer, "{warning}")?;
    writer.flush()?;
    Ok(())
}
