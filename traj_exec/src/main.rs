//! Trajectory generation executable.
//!
//! Compiles a waypoint mission into a continuous path and archives it:
//!
//!     - Initialise the session and logging
//!     - Load the generator parameters and the waypoints
//!     - Build and initialise the path generator
//!     - Coarse sampling of the path positions (`path_samples.csv`)
//!     - Sampling of the full pose reference at the controller rate over the
//!       mission duration (`reference.csv`)
//!     - Save a summary of the mission (`mission_summary.json`)

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use traj_lib::{GeneratorParams, MissionDuration, PathGenerator, WaypointSet};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter, LogSettings, TargetLevel},
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "traj_exec", about = "Sample a waypoint mission into a reference trajectory")]
struct Opts {
    /// Path to the waypoint file
    #[structopt(parse(from_os_str))]
    waypoints: PathBuf,

    /// Generator parameter file, relative to the params directory
    #[structopt(short, long, default_value = "traj_gen.toml")]
    params: String,

    /// Rate at which the pose reference is sampled
    ///
    /// Units: Hz
    #[structopt(short, long, default_value = "10.0")]
    rate_hz: f64,

    /// Include debug messages in the log
    #[structopt(short, long)]
    verbose: bool,

    /// Log level for a single target, as `target=level`, for instance
    /// `traj_lib::path_generator=trace` to follow the orientation fallbacks
    #[structopt(short = "t", long = "log-target", number_of_values = 1)]
    log_targets: Vec<TargetLevel>,
}

/// Summary of a sampled mission.
#[derive(Debug, Serialize)]
struct MissionSummary {
    interpolator: &'static str,
    num_waypoints: usize,
    total_length_m: f64,
    start_time_s: Option<f64>,
    duration: Option<MissionDuration>,
    num_path_samples: usize,
    num_reference_points: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "traj_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    let log_settings = LogSettings {
        base_level: match opts.verbose {
            true => LevelFilter::Debug,
            false => LevelFilter::Info
        },
        overrides: opts.log_targets.clone(),
    };
    logger_init(&log_settings, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Trajectory Generation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    if !(opts.rate_hz > 0.0) {
        return Err(eyre!("The sampling rate must be positive, found {} Hz", opts.rate_hz));
    }

    // ---- LOAD PARAMETERS ----

    let gen_params: GeneratorParams = params::load(&opts.params)
        .wrap_err("Could not load the generator params")?;

    let waypoints = WaypointSet::load(&opts.waypoints)
        .wrap_err_with(|| format!("Could not load waypoints from {:?}", opts.waypoints))?;

    info!(
        "Loaded {} waypoints, {:.3} m of path",
        waypoints.num_waypoints(),
        waypoints.total_length()
    );

    // ---- INITIALISE GENERATOR ----

    let mut generator = gen_params
        .build_generator()
        .wrap_err("Failed to create the path generator")?;

    generator
        .init_waypoints(waypoints.clone())
        .wrap_err("Failed to set the waypoints")?;
    generator
        .init_interpolator()
        .wrap_err("Failed to initialise the path generator")?;

    info!("Path generator \"{}\" initialised\n", generator.label());

    // ---- COARSE PATH SAMPLES ----

    let mut arch_samples = Archiver::from_path(&session, "path_samples.csv")
        .map_err(|e| eyre!("Could not create the path samples archive: {}", e))?;

    let samples = generator
        .get_samples(None, gen_params.sample_step)
        .wrap_err("Failed to sample the path")?;

    debug!(
        "Sampling the path every {} in s, {} samples",
        samples.step(),
        samples.count_total()
    );

    let mut num_path_samples = 0;
    for pnt in samples {
        arch_samples
            .serialise(pnt.to_record())
            .map_err(|e| eyre!("Could not archive a path sample: {}", e))?;
        num_path_samples += 1;
    }

    info!("Archived {} path samples", num_path_samples);

    // ---- POSE REFERENCE ----

    let mut num_reference_points = 0;
    let start_time_s = generator.start_time().unwrap_or(0.0);

    match generator.duration() {
        Some(MissionDuration::Finite(duration_s)) => {
            let mut arch_reference = Archiver::from_path(&session, "reference.csv")
                .map_err(|e| eyre!("Could not create the reference archive: {}", e))?;

            let num_steps = (duration_s * opts.rate_hz).floor() as usize;

            for i in 0..=num_steps {
                let t = start_time_s + i as f64 / opts.rate_hz;

                let pnt = generator
                    .generate_reference(t)
                    .wrap_err_with(|| format!("Failed to generate the reference at {:.3} s", t))?;

                arch_reference
                    .serialise(pnt.to_record())
                    .map_err(|e| eyre!("Could not archive a reference point: {}", e))?;
                num_reference_points += 1;
            }

            info!(
                "Archived {} reference points over {:.3} s at {} Hz",
                num_reference_points, duration_s, opts.rate_hz
            );
        }
        _ => warn!("The mission has no time limit, no pose reference will be archived"),
    }

    // ---- SUMMARY ----

    let summary = MissionSummary {
        interpolator: generator.label(),
        num_waypoints: waypoints.num_waypoints(),
        total_length_m: waypoints.total_length(),
        start_time_s: generator.start_time(),
        duration: generator.duration(),
        num_path_samples,
        num_reference_points,
    };

    session
        .save("mission_summary.json", &summary)
        .wrap_err("Could not save the mission summary")?;

    info!("Mission sampled");

    Ok(())
}
