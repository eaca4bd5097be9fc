//! Path generator parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Deserialize;
use toml::value::Table;

// Internal
use crate::path_generator::{
    create_path_generator, PathError, PathGenerator, DEFAULT_S_STEP,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for creating a path generator
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    /// Label of the interpolation strategy, e.g. `"linear"`.
    #[serde(default = "default_interpolator")]
    pub interpolator: String,

    /// Finite difference step in the curve parameter used to estimate the
    /// direction of travel.
    #[serde(default = "default_step")]
    pub s_step: f64,

    /// If true the orientation also pitches to follow the path.
    #[serde(default)]
    pub full_dof: bool,

    /// Start time of the mission. Defaults to 0 s.
    ///
    /// Units: seconds
    #[serde(default)]
    pub start_time_s: Option<f64>,

    /// Duration of the mission. If not given the duration is the length of
    /// the path divided by the mean of the waypoint speeds. A negative value
    /// means the mission has no time limit.
    ///
    /// Units: seconds
    #[serde(default)]
    pub duration_s: Option<f64>,

    /// Step in the curve parameter used for coarse sampling of the path.
    #[serde(default = "default_step")]
    pub sample_step: f64,

    /// Strategy specific parameters, passed to `set_parameters`.
    #[serde(default)]
    pub strategy: Table,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeneratorParams {
    /// Create the generator described by these parameters.
    ///
    /// The returned generator still needs waypoints and initialisation.
    pub fn build_generator(&self) -> Result<Box<dyn PathGenerator + Send>, PathError> {
        let mut generator = create_path_generator(&self.interpolator)?;

        generator.set_s_step(self.s_step)?;
        generator.set_full_dof(self.full_dof);

        if let Some(t) = self.start_time_s {
            generator.set_start_time(t)?;
        }

        if let Some(d) = self.duration_s {
            generator.set_duration(d)?;
        }

        generator.set_parameters(&self.strategy)?;

        debug!("Created \"{}\" path generator", generator.label());

        Ok(generator)
    }
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            interpolator: default_interpolator(),
            s_step: DEFAULT_S_STEP,
            full_dof: false,
            start_time_s: None,
            duration_s: None,
            sample_step: DEFAULT_S_STEP,
            strategy: Table::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_interpolator() -> String {
    String::from(crate::LinearInterpolator::LABEL)
}

fn default_step() -> f64 {
    DEFAULT_S_STEP
}
