//! Solar heat absorbed by a vehicle cabin, averaged over every horizontal orientation of the
//! vehicle relative to the sun.

use crate::core::solvers::quad;
use crate::external_conditions::{IrradianceComponents, SolarPosition};
use crate::input::Vehicle;
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::f64::consts::PI;

// Steepness of the smoothed step at the obstacle shading threshold
const SHADING_THRESHOLD_STEEPNESS: f64 = 1e3;

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct SolarAbsorptionKey {
    version: String,
    obstacle_distance: OrderedFloat<f64>,
    obstacle_height: OrderedFloat<f64>,
    altitude: OrderedFloat<f64>,
    azimuth: OrderedFloat<f64>,
    irradiance_horizontal: OrderedFloat<f64>,
    irradiance_vertical: OrderedFloat<f64>,
}

/// Memo of orientation-averaged absorbed solar power. Owned by a single simulation task.
#[derive(Debug, Default)]
pub struct SolarAbsorptionCache {
    entries: HashMap<SolarAbsorptionKey, f64>,
    hits: usize,
}

impl SolarAbsorptionCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SolarAbsorptionEstimator<'a> {
    vehicle: &'a Vehicle,
    version: &'a str,
    obstacle_distance: f64,
    obstacle_height: f64,
}

impl<'a> SolarAbsorptionEstimator<'a> {
    /// Arguments
    /// * `vehicle` - geometry and optical properties of the vehicle version
    /// * `version` - identifies the vehicle version in the cache
    /// * `obstacle_distance` - distance to obstacles casting shade, in m (must be positive)
    /// * `obstacle_height` - height of those obstacles, in m
    pub fn new(
        vehicle: &'a Vehicle,
        version: &'a str,
        obstacle_distance: f64,
        obstacle_height: f64,
    ) -> Self {
        Self {
            vehicle,
            version,
            obstacle_distance,
            obstacle_height,
        }
    }

    /// Absorbed solar power averaged over orientations in [0, π], in W.
    pub fn absorbed_power(
        &self,
        position: &SolarPosition,
        irradiance: &IrradianceComponents,
        cache: &mut SolarAbsorptionCache,
    ) -> f64 {
        let key = SolarAbsorptionKey {
            version: self.version.to_string(),
            obstacle_distance: self.obstacle_distance.into(),
            obstacle_height: self.obstacle_height.into(),
            altitude: position.altitude.into(),
            azimuth: position.azimuth.into(),
            irradiance_horizontal: irradiance.horizontal.into(),
            irradiance_vertical: irradiance.vertical.into(),
        };

        if let Some(absorbed) = cache.entries.get(&key) {
            cache.hits += 1;
            return *absorbed;
        }

        let integral = quad(
            |orientation| self.absorbed_power_for_orientation(orientation, position, irradiance),
            0.,
            PI,
        );
        let absorbed = (integral / PI).abs();
        cache.entries.insert(key, absorbed);

        absorbed
    }

    /// Absorbed solar power for one orientation of the vehicle's long axis, in W.
    pub(crate) fn absorbed_power_for_orientation(
        &self,
        orientation: f64,
        position: &SolarPosition,
        irradiance: &IrradianceComponents,
    ) -> f64 {
        let vehicle = self.vehicle;
        let relative_azimuth = position.azimuth - orientation;

        // smoothed step: close to 0 while the sun is below the obstacles, close to 1 above
        let altitude_min = ((self.obstacle_height - vehicle.height) * relative_azimuth.sin()
            / self.obstacle_distance)
            .atan()
            .abs();
        let exposure =
            ((position.altitude - altitude_min) * SHADING_THRESHOLD_STEEPNESS).atan() / PI + 0.5;

        let projection_length = relative_azimuth.sin().abs();
        let projection_width = relative_azimuth.cos().abs();

        let area_roof = vehicle.length * vehicle.width * (1. - vehicle.fraction_obstruction_roof);
        let absorption_roof = vehicle.cabin_absorptivity * area_roof * irradiance.horizontal;

        let area_front_shell = vehicle.width * vehicle.height - vehicle.area_windows_front;
        let absorption_front = projection_width
            * (vehicle.cabin_absorptivity * area_front_shell
                + vehicle.window_transmissivity * vehicle.area_windows_front)
            * irradiance.vertical;

        let area_side_shell = vehicle.length * vehicle.height - vehicle.area_windows_side;
        let absorption_side = projection_length
            * (vehicle.cabin_absorptivity * area_side_shell
                + vehicle.window_transmissivity * vehicle.area_windows_side)
            * irradiance.vertical;

        exposure * (absorption_roof + absorption_front + absorption_side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tests::minibus;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn sun_high_in_south() -> SolarPosition {
        SolarPosition {
            zenith: PI / 6.,
            altitude: PI / 3.,
            azimuth: PI,
        }
    }

    #[rstest]
    fn should_absorb_nothing_without_irradiance(minibus: Vehicle) {
        let estimator = SolarAbsorptionEstimator::new(&minibus, "default", 15., 10.);
        let absorbed = estimator.absorbed_power(
            &sun_high_in_south(),
            &IrradianceComponents::none(),
            &mut SolarAbsorptionCache::new(),
        );
        assert_eq!(absorbed, 0.);
    }

    #[rstest]
    fn should_average_roof_and_wall_absorption_for_unshaded_sun(mut minibus: Vehicle) {
        minibus.height = 3.;
        // obstacles as high as the vehicle never cast shade on it
        let estimator = SolarAbsorptionEstimator::new(&minibus, "default", 15., 3.);
        let irradiance = IrradianceComponents {
            horizontal: 400.,
            vertical: 600.,
        };
        let position = sun_high_in_south();
        let exposure = ((PI / 3.) * SHADING_THRESHOLD_STEEPNESS).atan() / PI + 0.5;

        // |sin| and |cos| both average to 2/π over half a turn
        let roof = 0.6 * 7. * 2.2 * 0.9 * 400.;
        let front = 2. / PI * (0.6 * (2.2 * 3. - 3.) + 0.7 * 3.) * 600.;
        let side = 2. / PI * (0.6 * (7. * 3. - 8.) + 0.7 * 8.) * 600.;

        let absorbed =
            estimator.absorbed_power(&position, &irradiance, &mut SolarAbsorptionCache::new());
        assert_relative_eq!(absorbed, exposure * (roof + front + side), max_relative = 1e-7);
    }

    #[rstest]
    fn should_block_sun_below_obstacle_threshold(minibus: Vehicle) {
        // sun barely above the horizon, behind tall nearby buildings
        let estimator = SolarAbsorptionEstimator::new(&minibus, "default", 5., 40.);
        let position = SolarPosition {
            zenith: PI / 2. - 0.05,
            altitude: 0.05,
            azimuth: PI / 2.,
        };
        let irradiance = IrradianceComponents {
            horizontal: 500.,
            vertical: 25.,
        };
        let shaded =
            estimator.absorbed_power(&position, &irradiance, &mut SolarAbsorptionCache::new());

        let open = SolarAbsorptionEstimator::new(&minibus, "default", 5., minibus.height)
            .absorbed_power(&position, &irradiance, &mut SolarAbsorptionCache::new());

        assert!(shaded < 0.5 * open, "shaded {shaded} W, open {open} W");
    }

    #[rstest]
    fn should_reuse_cached_value(minibus: Vehicle) {
        let estimator = SolarAbsorptionEstimator::new(&minibus, "default", 15., 10.);
        let irradiance = IrradianceComponents {
            horizontal: 300.,
            vertical: 500.,
        };
        let mut cache = SolarAbsorptionCache::new();

        let first = estimator.absorbed_power(&sun_high_in_south(), &irradiance, &mut cache);
        let second = estimator.absorbed_power(&sun_high_in_south(), &irradiance, &mut cache);

        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[rstest]
    fn should_keep_versions_apart_in_cache(minibus: Vehicle) {
        let mut longer = minibus.clone();
        longer.length = 12.;
        let irradiance = IrradianceComponents {
            horizontal: 300.,
            vertical: 500.,
        };
        let mut cache = SolarAbsorptionCache::new();

        let short = SolarAbsorptionEstimator::new(&minibus, "default", 15., 10.)
            .absorbed_power(&sun_high_in_south(), &irradiance, &mut cache);
        let long = SolarAbsorptionEstimator::new(&longer, "alternative_1", 15., 10.)
            .absorbed_power(&sun_high_in_south(), &irradiance, &mut cache);

        assert!(long > short);
        assert_eq!(cache.len(), 2);
    }
}
