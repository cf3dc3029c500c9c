use cabin_energy::input::ingest_location_data;
use cabin_energy::output::FileOutput;
use cabin_energy::{run_project, ProjectFlags, RunOptions};
use clap::Parser;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CabinEnergyArgs {
    #[arg(help = "Path to specification file in .json format")]
    input_file: String,
    #[arg(
        long,
        short,
        help = "Path to climate data file in .json format, keyed by location name"
    )]
    climate_file: Option<String>,
    #[arg(
        long,
        short,
        help = "Directory to write results to (defaults to <input file stem>__results)"
    )]
    output_dir: Option<String>,
    #[clap(
        long,
        default_value_t = false,
        help = "Whether to output results for every simulated hour"
    )]
    hourly_results: bool,
    #[clap(
        long,
        default_value_t = false,
        help = "Leave absorbed solar heat out of the cabin heat balance"
    )]
    exclude_solar_gains: bool,
    #[clap(
        long,
        default_value_t = 3,
        help = "Number of decimal digits written out"
    )]
    rounding_digits: u32,
    #[clap(long, default_value_t = tracing::Level::INFO, help = "Maximum level to log at")]
    log_level: tracing::Level,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = CabinEnergyArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(args.log_level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let output_path = match &args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => {
            let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
            let input_file_stem = match input_file_ext {
                Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
                None => input_file,
            };
            PathBuf::from(format!("{input_file_stem}__results"))
        }
    };
    fs::create_dir_all(&output_path)?;
    let input_file_name = Path::new(input_file)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("cabin_energy");
    let file_output = FileOutput::new(
        output_path.clone(),
        format!("{input_file_name}__{{}}.{{}}"),
    );

    let location_data = args
        .climate_file
        .as_ref()
        .map(|file| ingest_location_data(BufReader::new(File::open(file)?)))
        .transpose()?;

    let project_flags = (&args).into();
    let options = RunOptions {
        rounding_digits: args.rounding_digits,
    };

    let results = run_project(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        location_data,
        &project_flags,
        &options,
    )?;

    if results.unmet_demand_warning.is_some() {
        warn!("Some demand was not met; see the warnings file for the affected hours");
    }
    info!("Results written to {}", output_path.display());

    Ok(())
}

impl From<&CabinEnergyArgs> for ProjectFlags {
    fn from(args: &CabinEnergyArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if args.hourly_results {
            flags.insert(ProjectFlags::WRITE_HOURLY_RESULTS);
        }
        if args.exclude_solar_gains {
            flags.insert(ProjectFlags::EXCLUDE_SOLAR_GAINS);
        }

        flags
    }
}
