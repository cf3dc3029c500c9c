pub mod aggregation;
mod compare_floats;
pub mod core;
pub mod corpus;
pub mod errors;
pub mod external_conditions;
pub mod input;
pub mod operation_calendar;
pub mod output;
pub mod vehicle_versions;


use crate::aggregation::{aggregate, scale_scenario_totals, AggregateTotals};
use crate::corpus::{Corpus, HourlyResultRow, UnmetDemandWarning};
use crate::external_conditions::LocationClimate;
use crate::input::ingest_for_processing;
use crate::output::{
    write_hourly_results, write_scenario_totals, write_vehicle_operation_totals, write_warning,
    Output,
};
use bitflags::bitflags;
use indexmap::IndexMap;
use std::io::Read;
use tracing::{info, instrument};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u32 {
        /// Leave absorbed solar heat out of the cabin heat balance.
        const EXCLUDE_SOLAR_GAINS = 0b1;
        /// Write a row for every simulated hour as well as the totals.
        const WRITE_HOURLY_RESULTS = 0b10;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// Number of decimal digits floats are rounded to when written out
    pub rounding_digits: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { rounding_digits: 3 }
    }
}

#[derive(Debug)]
pub struct RunResults {
    pub rows: Vec<HourlyResultRow>,
    pub totals: AggregateTotals,
    pub unmet_demand_warning: Option<UnmetDemandWarning>,
}

/// Read a specification, simulate a year of operation for every vehicle version and write out
/// the totals.
///
/// Arguments
/// * `input` - JSON specification
/// * `output` - where result files go
/// * `location_data` - climate data per location, overriding data embedded in the specification
/// * `flags`
/// * `options`
#[instrument(skip_all)]
pub fn run_project(
    input: impl Read,
    output: impl Output,
    location_data: Option<IndexMap<String, LocationClimate>>,
    flags: &ProjectFlags,
    options: &RunOptions,
) -> Result<RunResults, anyhow::Error> {
    let mut input_for_processing = ingest_for_processing(input)?;

    if let Some(location_data) = location_data {
        input_for_processing.merge_location_data(location_data);
    }

    let input = input_for_processing.finalize();

    let corpus = Corpus::from_inputs(input, flags)?;
    let simulation = corpus.run()?;
    let totals = aggregate(&simulation.rows, corpus.specification());
    info!(
        "Aggregated {} vehicle versions into {} scenarios",
        totals.version_totals.len(),
        totals.scenario_totals.len()
    );

    let results = RunResults {
        rows: simulation.rows,
        totals,
        unmet_demand_warning: simulation.unmet_demand_warning,
    };

    if !output.is_noop() {
        write_results(&output, &results, flags, options)?;
    }

    Ok(results)
}

fn write_results(
    output: &impl Output,
    results: &RunResults,
    flags: &ProjectFlags,
    options: &RunOptions,
) -> anyhow::Result<()> {
    let rounding_digits = options.rounding_digits;

    write_vehicle_operation_totals(
        output.writer_for_location_key("vehicle_operation_totals", "csv")?,
        &results.totals.version_totals,
        rounding_digits,
    )?;

    let (scenario_totals, unit) = scale_scenario_totals(&results.totals.scenario_totals);
    write_scenario_totals(
        output.writer_for_location_key("scenario_totals", "csv")?,
        &scenario_totals,
        unit,
        rounding_digits,
    )?;

    if flags.contains(ProjectFlags::WRITE_HOURLY_RESULTS) {
        write_hourly_results(
            output.writer_for_location_key("hourly_results", "csv")?,
            &results.rows,
            rounding_digits,
        )?;
    }

    if let Some(warning) = &results.unmet_demand_warning {
        write_warning(output.writer_for_location_key("warnings", "txt")?, warning)?;
    }

    Ok(())
}
