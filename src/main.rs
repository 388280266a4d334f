//! `skyx` - command-line client for the TheSkyX script server
//!
//! # Usage
//!
//! ```bash
//! skyx find M42
//! skyx target "ISS" --json
//! skyx --host observatory.local camera exposure 30
//! skyx telescope slew 83.82 -5.39 --track 0 0
//! skyx send --file focus.js
//! ```
//!
//! Settings come from `skyx.toml` (or `--config`), then `SKYX_*` environment
//! variables, then the command-line flags below.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skyx_remote::config::SkyxConfig;
use skyx_remote::logging;
use skyx_remote::skyx_core::ScriptTransport;
use skyx_remote::skyx_devices::{
    Camera, Epoch, FrameType, SkyxAction, TargetInformation, Telescope,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "skyx")]
#[command(about = "Remote control for TheSkyX over its TCP script server", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = skyx_remote::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the configured host
    #[arg(long, global = true)]
    host: Option<String>,

    /// Override the configured port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a raw script and print the reply
    Send {
        /// Script text
        #[arg(required_unless_present = "file")]
        script: Option<String>,

        /// Read the script from a file instead
        #[arg(long, conflicts_with = "script")]
        file: Option<PathBuf>,
    },

    /// Center the star chart on a target
    Find {
        /// Target name, e.g. "M42" or "Saturn"
        target: String,
    },

    /// Run a toolbar action such as TARGETFIND or MOVE_UP
    Action {
        /// Action identifier
        name: String,
    },

    /// Look up a target's position and rates
    Target {
        /// Target name or satellite designator
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read one property of the current target by numeric id
    Property {
        /// Property id
        id: u32,
    },

    /// Print the current target's RA/Dec
    CurrentTarget {
        /// Epoch of the coordinates (now or 2000)
        #[arg(long, default_value = "now")]
        epoch: Epoch,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Camera commands
    #[command(subcommand)]
    Camera(CameraCommand),

    /// Telescope mount commands
    #[command(subcommand)]
    Telescope(TelescopeCommand),
}

#[derive(Subcommand)]
enum CameraCommand {
    /// Connect the camera
    Connect {
        /// Use asynchronous exposures
        #[arg(long = "async")]
        asynchronous: bool,
    },
    /// Disconnect the camera
    Disconnect,
    /// Get, or set when SECONDS is given, the exposure time
    Exposure { seconds: Option<f64> },
    /// Get, or set when FACTOR is given, NxN binning
    Binning { factor: Option<u32> },
    /// Get, or set when FRAME is given, the frame type (light, bias, dark, flat_field)
    Frame { frame: Option<FrameType> },
    /// Start an exposure
    TakeImage,
    /// Print the path of the last saved image
    LastImage,
    /// Print the sensor temperature
    Temperature,
    /// Get, or set when given, automatic saving
    AutoSave { enabled: Option<bool> },
}

#[derive(Subcommand)]
enum TelescopeCommand {
    /// Connect the mount
    Connect,
    /// Disconnect the mount
    Disconnect,
    /// Slew to RA/Dec in degrees
    Slew {
        ra: f64,
        #[arg(allow_hyphen_values = true)]
        dec: f64,
        /// Start tracking at RA_RATE DEC_RATE (arcsec/s) after the slew
        #[arg(long, num_args = 2, value_names = ["RA_RATE", "DEC_RATE"], allow_hyphen_values = true)]
        track: Option<Vec<f64>>,
    },
    /// Print the tracking rates
    Rates,
    /// Track at custom rates in arcseconds per second
    Track {
        #[arg(allow_hyphen_values = true)]
        ra_rate: f64,
        #[arg(allow_hyphen_values = true)]
        dec_rate: f64,
    },
    /// Track at the sidereal rate
    Sidereal,
    /// Print the current pointing RA/Dec
    Pointing,
    /// Find a satellite, slew to it and track it
    Satellite { designator: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SkyxConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(host) = cli.host {
        config.connection.host = host;
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.validate()?;
    logging::init_from_config(&config)?;

    let conn = config.connection.build()?;
    tracing::debug!(endpoint = %conn.endpoint(), "Using TheSkyX endpoint");
    let transport = conn.transport();

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Send { script, file } => run_send(transport, script, file).await,
        Commands::Find { target } => {
            TargetInformation::new(transport).find(&target).await?;
            println!("Found {target}");
            Ok(())
        }
        Commands::Action { name } => {
            SkyxAction::new(transport).execute(&name).await?;
            Ok(())
        }
        Commands::Target { name, json } => {
            let properties = TargetInformation::new(transport).resolve(&name).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&properties)?);
            } else {
                for (key, value) in properties.iter() {
                    println!("{key:<18} {value}");
                }
            }
            Ok(())
        }
        Commands::Property { id } => {
            println!("{}", TargetInformation::new(transport).property(id).await?);
            Ok(())
        }
        Commands::CurrentTarget { epoch } => {
            let (ra, dec) = TargetInformation::new(transport)
                .current_target_ra_dec(epoch)
                .await?;
            println!("RA {ra}  Dec {dec}  ({epoch})");
            Ok(())
        }
        Commands::Camera(command) => run_camera(transport, command).await,
        Commands::Telescope(command) => run_telescope(transport, command).await,
    }
}

async fn run_send(
    transport: Arc<dyn ScriptTransport>,
    script: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let script = match (script, file) {
        (Some(script), None) => script,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        _ => bail!("give either a script or --file"),
    };
    let reply = SkyxAction::new(transport).run_script(&script).await?;
    println!("{reply}");
    Ok(())
}

async fn run_camera(transport: Arc<dyn ScriptTransport>, command: CameraCommand) -> Result<()> {
    if let CameraCommand::Connect { asynchronous } = command {
        Camera::connect_with(transport, asynchronous).await?;
        return Ok(());
    }

    let camera = Camera::connect(transport).await?;
    match command {
        CameraCommand::Connect { .. } => {}
        CameraCommand::Disconnect => camera.disconnect().await?,
        CameraCommand::Exposure { seconds: None } => {
            println!("{}", camera.exposure_time().await?);
        }
        CameraCommand::Exposure {
            seconds: Some(seconds),
        } => {
            println!("{}", camera.set_exposure_time(seconds).await?);
        }
        CameraCommand::Binning { factor: None } => println!("{}", camera.binning().await?),
        CameraCommand::Binning {
            factor: Some(factor),
        } => println!("{}", camera.set_binning(factor).await?),
        CameraCommand::Frame { frame: None } => println!("{}", camera.frame_type().await?),
        CameraCommand::Frame { frame: Some(frame) } => {
            println!("{}", camera.set_frame_type(frame).await?);
        }
        CameraCommand::TakeImage => camera.take_image().await?,
        CameraCommand::LastImage => println!("{}", camera.last_image_file_name().await?),
        CameraCommand::Temperature => println!("{}", camera.temperature().await?),
        CameraCommand::AutoSave { enabled: None } => println!("{}", camera.auto_save().await?),
        CameraCommand::AutoSave {
            enabled: Some(enabled),
        } => camera.set_auto_save(enabled).await?,
    }
    Ok(())
}

async fn run_telescope(
    transport: Arc<dyn ScriptTransport>,
    command: TelescopeCommand,
) -> Result<()> {
    let telescope = Telescope::connect(transport).await?;
    match command {
        TelescopeCommand::Connect => {}
        TelescopeCommand::Disconnect => telescope.disconnect().await?,
        TelescopeCommand::Slew { ra, dec, track } => match track.as_deref() {
            Some([ra_rate, dec_rate]) => {
                telescope
                    .slew_to_ra_dec_and_track(ra, dec, *ra_rate, *dec_rate)
                    .await?;
            }
            Some(_) => bail!("--track takes exactly two rates"),
            None => telescope.slew_to_ra_dec(ra, dec).await?,
        },
        TelescopeCommand::Rates => {
            let (ra_rate, dec_rate) = telescope.tracking_rates().await?;
            println!("RA {ra_rate} arcsec/s  Dec {dec_rate} arcsec/s");
        }
        TelescopeCommand::Track { ra_rate, dec_rate } => {
            telescope.set_tracking_rates(ra_rate, dec_rate).await?;
        }
        TelescopeCommand::Sidereal => telescope.sidereal_tracking().await?,
        TelescopeCommand::Pointing => {
            let (ra, dec) = telescope.pointing_ra_dec().await?;
            println!("RA {ra}  Dec {dec}");
        }
        TelescopeCommand::Satellite { designator } => {
            telescope.slew_and_track_satellite(&designator).await?;
        }
    }
    Ok(())
}
