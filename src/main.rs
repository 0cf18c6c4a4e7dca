//! Grove - headless garden demo
//!
//! Plants a few trees on a synthetic floor, fast-forwards one, and lets the
//! scheduler run for a while before printing the garden as JSON.
//!
//! Usage: grove [--config <file.json>] [--secs <seconds>] [--models <manifest.json>]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};
use tokio::sync::{mpsc, oneshot};

use grove::core::{logging, Clock, Result, SystemClock};
use grove::garden::{drive, Command, Garden};
use grove::placement::{DetectedSurface, SurfaceClass, SurfaceId};
use grove::scene::SceneGraph;
use grove::sim::SimConfig;
use grove::streaming::{ModelLibrary, ModelLoader};

const MAX_CONCURRENT_LOADS: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_config_arg(&args) {
        Some(path) => {
            log::info!("Loading config from: {}", path.display());
            SimConfig::from_json_file(&path)?
        }
        None => SimConfig::default(),
    };
    let secs = parse_secs_arg(&args).unwrap_or(15.0);
    let library = match parse_models_arg(&args) {
        Some(path) => ModelLibrary::from_manifest_file(&path)?,
        None => ModelLibrary::with_defaults(),
    };

    let loader = ModelLoader::with_handle(
        Arc::new(library),
        MAX_CONCURRENT_LOADS,
        &tokio::runtime::Handle::current(),
    );
    let garden = Garden::new(config, Box::new(SceneGraph::new()), loader)?;
    let mut events = garden.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            log::debug!("event: {:?}", event);
        }
    });

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (tx, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(garden, clock, rx, Duration::from_millis(16)));

    let floor = DetectedSurface {
        id: SurfaceId(1),
        transform: Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)),
        extent: Vec2::new(2.0, 2.0),
        class: SurfaceClass::Floor,
    };
    let script = [
        Command::SurfaceDetected(floor),
        Command::PlantWithTransform(Mat4::from_translation(Vec3::new(-0.4, 0.0, -1.0))),
        Command::PlantWithTransform(Mat4::from_translation(Vec3::new(0.4, 0.0, -1.0))),
        // too close to the second tree, rejected
        Command::PlantWithTransform(Mat4::from_translation(Vec3::new(0.42, 0.0, -1.0))),
        Command::AccelerateCurrent,
        Command::PlantAt(Vec2::new(0.5, 0.6)),
    ];
    for cmd in script {
        if tx.send(cmd).is_err() {
            break;
        }
    }

    log::info!("Running for {secs}s");
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;

    let (reply, trees) = oneshot::channel();
    if tx.send(Command::Snapshot(reply)).is_ok() {
        if let Ok(trees) = trees.await {
            println!("{}", serde_json::to_string_pretty(&trees)?);
        }
    }
    let _ = tx.send(Command::Teardown);

    if let Ok(garden) = driver.await {
        let agg = garden.aggregates(SystemClock.now());
        log::info!(
            "{} trees, {:.1} kg CO₂, {} credits",
            agg.tree_count,
            agg.co2_kg,
            garden.wallet().credits()
        );
    }
    Ok(())
}

/// Parse --config argument (JSON config override file)
fn parse_config_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if args[i] == "--config" || args[i] == "-c" {
            if let Some(path) = args.get(i + 1) {
                return Some(PathBuf::from(path));
            }
        }
    }
    None
}

/// Parse --secs argument (how long to let the garden run)
fn parse_secs_arg(args: &[String]) -> Option<f64> {
    for i in 0..args.len() {
        if args[i] == "--secs" || args[i] == "-s" {
            if let Some(secs) = args.get(i + 1) {
                return secs.parse().ok();
            }
        }
    }
    None
}

/// Parse --models argument (model manifest)
fn parse_models_arg(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--models")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}
