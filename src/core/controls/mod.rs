pub mod temperature_control;
