pub mod cabin_temperature;
pub mod heat_flows;
pub mod solar_absorption;
