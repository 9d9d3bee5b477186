use anyhow::Context;
use blockyard_author::placement_target;
use blockyard_common::{BlockCoord, Material};
use blockyard_frame::{Session, SessionConfig};
use blockyard_input::Key;
use blockyard_kernel::BlockRegistry;
use blockyard_kernel::terrain::splitmix64;
use blockyard_render::{DebugTextRenderer, Renderer};
use blockyard_tools::WorldInspector;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blockyard-cli", about = "Headless driver for the block world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// World options shared by the commands that build a session.
#[derive(clap::Args)]
struct WorldArgs {
    /// JSON session config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// World generation seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// World side length in blocks
    #[arg(long)]
    size: Option<i32>,
}

impl WorldArgs {
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SessionConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(size) = self.size {
            config.world.size = size;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and default tunables
    Info,
    /// Run a number of frames headless and print the outcome
    Simulate {
        #[command(flatten)]
        world: WorldArgs,
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Hold the forward key for the whole run
        #[arg(long)]
        walk: bool,
        /// Press jump every N frames
        #[arg(long)]
        jump_every: Option<u32>,
    },
    /// Cast a pick ray from an eye position and report the struck face
    Pick {
        #[command(flatten)]
        world: WorldArgs,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f32,
        #[arg(long, default_value = "2.1", allow_hyphen_values = true)]
        y: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: f32,
        /// Heading in degrees; -90 looks down -Z
        #[arg(long, default_value = "-90", allow_hyphen_values = true)]
        yaw: f32,
        /// Elevation in degrees, clamped to +-89
        #[arg(long, default_value = "-45", allow_hyphen_values = true)]
        pitch: f32,
    },
    /// Apply seeded random edits, then rebuild the world from its change log
    Replay {
        #[command(flatten)]
        world: WorldArgs,
        /// Number of edit attempts
        #[arg(short, long, default_value = "200")]
        edits: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => info(),
        Commands::Simulate {
            world,
            frames,
            dt,
            walk,
            jump_every,
        } => simulate(world.session_config()?, frames, dt, walk, jump_every)?,
        Commands::Pick {
            world,
            x,
            y,
            z,
            yaw,
            pitch,
        } => pick(world.session_config()?, Vec3::new(x, y, z), yaw, pitch)?,
        Commands::Replay { world, edits } => replay(world.session_config()?, edits)?,
    }

    Ok(())
}

fn info() {
    let config = SessionConfig::default();
    let physics = &config.physics;
    println!("blockyard-cli v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "world: size={} depth={} seed={} trees={}",
        config.world.size, config.world.depth, config.world.seed, config.world.trees
    );
    println!(
        "physics: gravity={} jump={} friction={} accel={} -> top speed {:.2}, jump height {:.2}",
        physics.gravity,
        physics.jump_impulse,
        physics.friction,
        physics.acceleration,
        physics.terminal_speed(),
        physics.jump_height()
    );
    println!("reach: {}  block size: {}", config.reach, config.block_size);
    let materials: Vec<&str> = Material::ALL.iter().map(|m| m.name()).collect();
    println!("materials: {}", materials.join(", "));
}

fn simulate(
    config: SessionConfig,
    frames: u32,
    dt: f32,
    walk: bool,
    jump_every: Option<u32>,
) -> anyhow::Result<()> {
    let mut session = Session::new(config)?;
    let mut backend = DebugTextRenderer::new();

    if walk {
        session.input_mut().key_down(Key::Forward);
    }

    for i in 0..frames {
        if let Some(n) = jump_every.filter(|n| *n > 0) {
            if i % n == 0 {
                session.input_mut().key_down(Key::Jump);
            } else {
                session.input_mut().key_up(Key::Jump);
            }
        }
        let report = session.frame(dt, &mut backend);
        if report.frame % 30 == 0 || i + 1 == frames {
            println!(
                "frame {:>5}: pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2}) {:?} synced={}",
                report.frame,
                report.position.x,
                report.position.y,
                report.position.z,
                report.velocity.x,
                report.velocity.y,
                report.velocity.z,
                report.state,
                report.changes_applied
            );
        }
    }

    println!("{}", WorldInspector::summary(session.registry(), session.body()));
    print!("{}", backend.render(&session.render_view()));
    Ok(())
}

fn pick(config: SessionConfig, eye: Vec3, yaw: f32, pitch: f32) -> anyhow::Result<()> {
    let eye_height = config.physics.eye_height;
    let mut session = Session::new(config)?;
    session.body_mut().position = eye - Vec3::Y * eye_height;
    session.set_view(yaw.to_radians(), pitch.to_radians());

    let forward = session.forward();
    println!(
        "ray: origin=({:.2}, {:.2}, {:.2}) dir=({:.3}, {:.3}, {:.3}) reach={}",
        eye.x,
        eye.y,
        eye.z,
        forward.x,
        forward.y,
        forward.z,
        session.config().reach
    );

    match session.target() {
        Some(hit) => {
            let material = session
                .registry()
                .material(hit.coord)
                .map_or("?", |m| m.name());
            println!(
                "hit {} {} handle={} distance={:.3} normal=({}, {}, {})",
                hit.coord, material, hit.handle, hit.distance, hit.normal.x, hit.normal.y, hit.normal.z
            );
            let target = placement_target(session.registry().grid(), hit.point, hit.normal);
            println!("place target: {target}");
        }
        None => println!("no hit"),
    }
    Ok(())
}

fn replay(config: SessionConfig, edits: u32) -> anyhow::Result<()> {
    let extent = config.world.extent();
    let span = (extent.end() - extent.start() + 1).max(1) as u64;
    let low = 1 - config.world.depth.max(1);
    let height = (config.world.max_bump + config.world.trunk_height + 2 - low).max(1) as u64;
    let mut state = config.world.seed ^ 0x6564_6974; // "edit"

    let mut session = Session::new(config.clone())?;
    let (mut placed, mut broken, mut rejected) = (0u32, 0u32, 0u32);

    for i in 0..edits {
        let mut roll = || {
            state = splitmix64(state);
            state
        };
        let coord = BlockCoord::new(
            extent.start() + (roll() % span) as i32,
            low + (roll() % height) as i32,
            extent.start() + (roll() % span) as i32,
        );
        let occupant = session.registry().get(coord).map(|b| b.handle);
        let result = match occupant {
            Some(handle) => session.break_handle(handle).map(|_| broken += 1),
            None => {
                let slot = (i as usize % Material::ALL.len()) + 1;
                if let Some(material) = Material::from_slot(slot) {
                    session.select_material(material);
                }
                session.place_at(coord).map(|_| placed += 1)
            }
        };
        if let Err(e) = result {
            tracing::debug!("edit {i} rejected: {e}");
            rejected += 1;
        }
    }

    let undone = (0..edits / 10)
        .filter(|_| matches!(session.undo(), Ok(true)))
        .count();

    let original = session.registry();
    let rebuilt = BlockRegistry::replay(original.grid(), original.changes());
    println!(
        "edits: placed={placed} broken={broken} rejected={rejected} undone={undone} log={}",
        original.changes().len()
    );
    println!(
        "original: blocks={} hash={:#x}",
        original.len(),
        original.state_hash()
    );
    println!(
        "replayed: blocks={} hash={:#x}",
        rebuilt.len(),
        rebuilt.state_hash()
    );
    let matches = rebuilt.state_hash() == original.state_hash();
    println!("Match: {}", if matches { "OK" } else { "MISMATCH" });
    anyhow::ensure!(matches, "replayed world differs from the original");
    Ok(())
}
