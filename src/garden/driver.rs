//! Async driver: owns a [`Garden`] inside one task and serializes host
//! commands with timer work.

use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec2};
use tokio::sync::{mpsc, oneshot};

use crate::core::{Clock, Result, Timestamp};
use crate::economy::StoreItem;
use crate::placement::DetectedSurface;
use crate::sim::{Species, Tree, TreeId};
use super::owner::Garden;

/// Host requests delivered to the driver task.
#[derive(Debug)]
pub enum Command {
    PlantAt(Vec2),
    PlantWithTransform(Mat4),
    SelectAt(Vec2),
    Select(TreeId),
    Water(TreeId),
    WaterAllOverdue,
    AccelerateCurrent,
    Purchase(StoreItem),
    SelectSpecies(Species),
    Rename(TreeId, String),
    SurfaceDetected(DetectedSurface),
    /// Reply with a copy of every tree.
    Snapshot(oneshot::Sender<Vec<Tree>>),
    Teardown,
}

/// Run the garden until the command channel closes or a `Teardown` arrives.
///
/// Wakes at least once per `frame` so scene animations advance smoothly, and
/// earlier when a timer or toast is due. Rejected actions are logged.
pub async fn drive(
    mut garden: Garden,
    clock: Arc<dyn Clock>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    frame: Duration,
) -> Garden {
    garden.start(clock.now());

    loop {
        let now = clock.now();
        let wait = match garden.next_wakeup() {
            Some(due) => Duration::from_secs_f64(due.saturating_elapsed(now)).min(frame),
            None => frame,
        };

        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                let now = clock.now();
                // bring timers up to date before the action observes state
                garden.step(now);
                if !handle(&mut garden, cmd, now) {
                    break;
                }
            }
            _ = tokio::time::sleep(wait) => {
                garden.step(clock.now());
            }
        }
    }

    garden.teardown();
    log::info!("garden driver stopped");
    garden
}

/// Apply one command. Returns false when the driver should stop.
fn handle(garden: &mut Garden, cmd: Command, now: Timestamp) -> bool {
    let result: Result<()> = match cmd {
        Command::PlantAt(screen) => garden.plant_at(screen, now).map(|id| {
            if id.is_none() {
                log::debug!("tap at {screen} hit no surface");
            }
        }),
        Command::PlantWithTransform(hit) => garden.plant_with_transform(hit, now).map(|_| ()),
        Command::SelectAt(screen) => {
            garden.select_at(screen);
            Ok(())
        }
        Command::Select(id) => garden.select(id),
        Command::Water(id) => garden.water(id, now).map(|_| ()),
        Command::WaterAllOverdue => {
            garden.water_all_overdue(now);
            Ok(())
        }
        Command::AccelerateCurrent => garden.accelerate_current(now).map(|_| ()),
        Command::Purchase(item) => garden.purchase(item),
        Command::SelectSpecies(species) => garden.select_species(species),
        Command::Rename(id, name) => garden.rename(id, &name),
        Command::SurfaceDetected(surface) => {
            garden.on_surface_detected(&surface);
            Ok(())
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(garden.trees().cloned().collect());
            Ok(())
        }
        Command::Teardown => return false,
    };
    if let Err(e) = result {
        log::info!("action rejected: {e}");
    }
    true
}
