use thiserror::Error;

/// Top-level error for a simulation run. Capacity shortfalls are not errors; they are
/// recorded on result rows and surfaced as an [`crate::corpus::UnmetDemandWarning`].
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Specification is incomplete or invalid: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Numerical failure during simulation: {0}")]
    NumericalNonConvergence(#[from] NumericalNonConvergenceError),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("For temperature control curve '{0}', no heating temperatures were specified. Please add at least one heating temperature point.")]
    EmptyHeatingCurve(String),
    #[error("For temperature control curve '{0}', no cooling temperatures were specified. Please add at least one cooling temperature point.")]
    EmptyCoolingCurve(String),
    #[error("Vehicle '{vehicle}' references temperature control curve '{curve}', which does not exist.")]
    UnknownTemperatureControlCurve { vehicle: String, curve: String },
    #[error("No vehicles were specified. Please add at least one vehicle.")]
    NoVehicles,
    #[error("No operation schedules were specified. Please add at least one operation schedule.")]
    NoOperationSchedules,
    #[error("For operation schedule '{0}', no vehicles were specified. Please add at least one vehicle to the operation schedule.")]
    NoVehiclesInOperation(String),
    #[error("Operation schedule '{schedule}' references vehicle '{vehicle}', which does not exist.")]
    UnknownVehicle { schedule: String, vehicle: String },
    #[error("No climate data is available for location '{location}' of operation schedule '{schedule}'.")]
    UnknownLocation { schedule: String, location: String },
    #[error("For scenario '{scenario}', no vehicle version was selected for '{key}'.")]
    MissingScenarioSelection { scenario: String, key: String },
    #[error("For scenario '{scenario}', the selection '{selection}' for '{key}' does not match any vehicle version.")]
    UnknownVehicleVersion {
        scenario: String,
        key: String,
        selection: String,
    },
    #[error("No reference scenario was specified. Please select a reference scenario.")]
    MissingReferenceScenario,
    #[error("Reference scenario '{0}' does not exist.")]
    UnknownReferenceScenario(String),
    #[error("Parameter alternative for vehicle '{vehicle}' has an invalid value for '{parameter}': {reason}")]
    InvalidParameterAlternative {
        vehicle: String,
        parameter: String,
        reason: String,
    },
    #[error("Vehicle '{vehicle}' has more than one version named '{version}'.")]
    DuplicateVehicleVersion { vehicle: String, version: String },
    #[error("Vehicle '{vehicle}' is in operation in schedule '{schedule}', but no vehicle versions were given for it.")]
    MissingVehicleVersions { schedule: String, vehicle: String },
    #[error("'{0}' is not a valid month-day (expected MM-DD in a non-leap year).")]
    InvalidDate(String),
    #[error("'{0}' is not a valid time of day (expected HH:MM between 00:00 and 24:00).")]
    InvalidTime(String),
    #[error("For operation schedule '{0}', the obstacle distance must be greater than zero.")]
    NonPositiveObstacleDistance(String),
    #[error("Invalid parameters for '{name}': {message}")]
    InvalidParameters { name: String, message: String },
}

/// Raised when the equilibrium cabin temperature cannot be found. Fatal for the whole run.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("Equilibrium cabin temperature did not converge for operation schedule '{schedule}', vehicle '{vehicle}' ({version}), month {month}, hour {hour}: {reason}")]
pub struct NumericalNonConvergenceError {
    pub schedule: String,
    pub vehicle: String,
    pub version: String,
    pub month: u32,
    pub hour: u32,
    pub reason: String,
}

/// A root-find failure that has not yet been attributed to a point in the enumeration.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct RootFindingError(pub(crate) String);

impl RootFindingError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub(crate) fn in_context(
        self,
        schedule: &str,
        vehicle: &str,
        version: &str,
        month: u32,
        hour: u32,
    ) -> NumericalNonConvergenceError {
        NumericalNonConvergenceError {
            schedule: schedule.to_string(),
            vehicle: vehicle.to_string(),
            version: version.to_string(),
            month,
            hour,
            reason: self.0,
        }
    }
}
