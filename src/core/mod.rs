pub mod cabin;
pub mod controls;
pub mod heating_systems;
pub(crate) mod solvers;
pub mod units;
