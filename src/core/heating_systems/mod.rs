pub mod dispatch;
pub mod heat_pump;
pub mod resistive_heater;
