use crate::compare_floats::{clamp_between, max_of_2};
use crate::core::units::{HOURS_PER_DAY, MONTHS_PER_YEAR, MONTH_DAYS_MID};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::f64::consts::PI;

// Direct normal irradiance never exceeds this value, in W/m2
const NORMAL_DIRECT_IRRADIANCE_UPPER_BOUND: f64 = 1000.;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IrradianceMeasurement {
    /// Irradiance was measured on a plane normal to the solar beam
    #[default]
    DirectNormal,
    /// Irradiance was measured on a horizontal plane
    DirectHorizontal,
}

/// Climate of a location as typical hourly values for each month.
///
/// Grids are indexed `[month - 1][hour]`, months 1 to 12 and hours 0 to 23.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LocationClimate {
    /// Latitude, in degrees (northern hemisphere positive)
    #[validate(minimum = -90.)]
    #[validate(maximum = 90.)]
    pub latitude: f64,
    /// Ambient air temperature, in deg C
    pub temperature: [[f64; 24]; 12],
    /// Direct solar irradiance, in W/m2
    pub irradiance: [[f64; 24]; 12],
    #[serde(default)]
    pub irradiance_measurement: IrradianceMeasurement,
}

impl LocationClimate {
    pub fn air_temp(&self, month: u32, hour: u32) -> f64 {
        self.temperature[month_idx(month)][hour_idx(hour)]
    }

    pub fn irradiance(&self, month: u32, hour: u32) -> f64 {
        self.irradiance[month_idx(month)][hour_idx(hour)]
    }

    pub fn solar_position(&self, month: u32, hour: u32) -> SolarPosition {
        SolarPosition::new(self.latitude, month, hour)
    }

    /// Horizontal and vertical irradiance components for the given hour of a typical day
    /// in the month.
    pub fn irradiance_components(&self, month: u32, hour: u32) -> IrradianceComponents {
        IrradianceComponents::new(
            self.irradiance_measurement,
            self.irradiance(month, hour),
            &self.solar_position(month, hour),
        )
    }
}

fn month_idx(month: u32) -> usize {
    debug_assert!((1..=MONTHS_PER_YEAR).contains(&month));
    (month - 1) as usize
}

fn hour_idx(hour: u32) -> usize {
    debug_assert!(hour < HOURS_PER_DAY);
    hour as usize
}

/// Position of the sun at the middle of a month for a given hour. All angles in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarPosition {
    pub zenith: f64,
    pub altitude: f64,
    /// Azimuth in [0, 2π), π when the sun is due south
    pub azimuth: f64,
}

impl SolarPosition {
    pub fn new(latitude: f64, month: u32, hour: u32) -> Self {
        let declination = solar_declination(MONTH_DAYS_MID[month_idx(month)]);
        let hour_angle = solar_hour_angle(hour);
        let latitude = latitude.to_radians();

        let trig_arg = clamp_between(
            latitude.cos() * declination.cos() * hour_angle.cos()
                + latitude.sin() * declination.sin(),
            -1.,
            1.,
        );
        let zenith = trig_arg.acos();
        let altitude = trig_arg.asin();

        Self {
            zenith,
            altitude,
            azimuth: solar_azimuth(latitude, declination, hour_angle, zenith),
        }
    }
}

fn solar_declination(day_of_year: u32) -> f64 {
    23.45_f64.to_radians() * (2. * PI / 365. * (284 + day_of_year) as f64).sin()
}

fn solar_hour_angle(hour: u32) -> f64 {
    (15. * (hour as f64 - 12.)).to_radians()
}

fn solar_azimuth(latitude: f64, declination: f64, hour_angle: f64, zenith: f64) -> f64 {
    let denominator = zenith.sin() * latitude.cos();
    let arg = if denominator == 0. {
        1.
    } else {
        clamp_between(
            (zenith.cos() * latitude.sin() - declination.sin()) / denominator,
            -1.,
            1.,
        )
    };

    // measured from south, mornings negative
    let azimuth_south = sign(hour_angle) * arg.acos();

    (PI - azimuth_south).rem_euclid(2. * PI)
}

// f64::signum returns 1 for zero, solar noon needs 0
fn sign(value: f64) -> f64 {
    if value == 0. {
        0.
    } else {
        value.signum()
    }
}

/// Irradiance split into the components falling on horizontal and vertical surfaces, in W/m2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IrradianceComponents {
    pub horizontal: f64,
    pub vertical: f64,
}

impl IrradianceComponents {
    pub fn new(
        measurement: IrradianceMeasurement,
        irradiance: f64,
        position: &SolarPosition,
    ) -> Self {
        match measurement {
            IrradianceMeasurement::DirectNormal => Self {
                horizontal: max_of_2(0., position.altitude.cos()) * irradiance,
                vertical: max_of_2(0., position.altitude.sin()) * irradiance,
            },
            IrradianceMeasurement::DirectHorizontal => {
                let tan_zenith = max_of_2(0., position.zenith.tan());
                let irradiance_normal = irradiance / max_of_2(1e-10, position.zenith.cos());

                if irradiance_normal > NORMAL_DIRECT_IRRADIANCE_UPPER_BOUND {
                    let scaling = NORMAL_DIRECT_IRRADIANCE_UPPER_BOUND / irradiance_normal;
                    let horizontal = irradiance * scaling;
                    Self {
                        horizontal,
                        vertical: tan_zenith * horizontal * scaling,
                    }
                } else {
                    Self {
                        horizontal: irradiance,
                        vertical: tan_zenith * irradiance,
                    }
                }
            }
        }
    }

    pub fn none() -> Self {
        Self {
            horizontal: 0.,
            vertical: 0.,
        }
    }
}
