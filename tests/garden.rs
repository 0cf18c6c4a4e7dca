//! End-to-end garden behavior driven through `Garden::step` with a manual
//! clock and the inline model loader.

use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};

use grove::core::{Clock, Error, ManualClock, Timestamp};
use grove::economy::StoreItem;
use grove::events::{GardenEvent, NotificationKind, Recorder};
use grove::garden::{Garden, METRIC_CO2_OFFSET};
use grove::placement::{DetectedSurface, SurfaceClass, SurfaceId};
use grove::scene::SceneGraph;
use grove::sim::{Health, SimConfig, Species, Stage, TreeId, DRY_MODEL, SAPLING_MODEL};
use grove::streaming::{ModelLibrary, ModelLoader};

/// Midnight, so short tests never cross a calendar day by accident.
const T0: f64 = 86_400.0 * 100.0;

struct Rig {
    garden: Garden,
    clock: ManualClock,
    recorder: Recorder,
    library: Arc<ModelLibrary>,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    fn with_config(config: SimConfig) -> Self {
        let library = Arc::new(ModelLibrary::with_defaults());
        let recorder = Recorder::new();
        let loader = ModelLoader::inline(library.clone());
        let mut garden = Garden::new(config, Box::new(SceneGraph::new()), loader)
            .unwrap()
            .with_notifier(Box::new(recorder.clone()))
            .with_score_sink(Box::new(recorder.clone()));
        let clock = ManualClock::new(Timestamp(T0));
        garden.start(clock.now());
        Self { garden, clock, recorder, library }
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Advance in one-second steps.
    fn run_for(&mut self, secs: u32) {
        for _ in 0..secs {
            let now = self.clock.advance(1.0);
            self.garden.step(now);
        }
    }

    /// Jump straight to `T0 + secs` with a single step.
    fn jump_to(&mut self, secs: f64) {
        self.clock.set(Timestamp(T0 + secs));
        self.garden.step(self.clock.now());
    }

    fn plant(&mut self, x: f32) -> TreeId {
        let now = self.now();
        self.garden
            .plant_with_transform(Mat4::from_translation(Vec3::new(x, 0.0, -1.0)), now)
            .unwrap()
    }

    fn progress(&self, id: TreeId) -> f64 {
        self.garden.tree(id).unwrap().growth_progress
    }

    fn shown_model(&self, id: TreeId) -> Option<String> {
        self.garden.synchronizer().record(id)?.cached_asset.clone()
    }
}

#[test]
fn test_growth_scenario() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);

    rig.run_for(197);
    assert_eq!(rig.garden.tree(id).unwrap().stage, Stage::Sapling);
    // the breakpoint itself (t = 198, progress 0.33) is already medium
    rig.run_for(1);
    assert_eq!(rig.garden.tree(id).unwrap().stage, Stage::Medium);
    rig.run_for(2);
    let tree = rig.garden.tree(id).unwrap();
    assert!((tree.growth_progress - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(tree.stage, Stage::Medium);

    rig.run_for(400);
    let tree = rig.garden.tree(id).unwrap();
    assert_eq!(tree.growth_progress, 1.0);
    assert_eq!(tree.stage, Stage::Full);
    assert_eq!(tree.full_grown_at, Some(Timestamp(T0 + 600.0)));
}

#[test]
fn test_progress_monotonic_while_healthy() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    let mut last = rig.progress(id);
    for _ in 0..120 {
        rig.run_for(5);
        let p = rig.progress(id);
        assert!(p >= last);
        last = p;
    }
}

#[test]
fn test_dry_tree_freezes_and_recovers() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.jump_to(100.0);
    let frozen = rig.progress(id);
    assert!((frozen - 100.0 / 600.0).abs() < 1e-9);

    rig.jump_to(172_801.0);
    assert!(rig.garden.tree(id).unwrap().is_dry());
    assert_eq!(rig.progress(id), frozen);

    rig.jump_to(172_900.0);
    rig.jump_to(173_000.0);
    assert_eq!(rig.progress(id), frozen);
    // one notification per transition, not per tick
    assert_eq!(rig.recorder.count(NotificationKind::Dry), 1);
    assert!(rig.garden.tree(id).unwrap().has_played_dry_sound);

    rig.garden.water(id, rig.now()).unwrap();
    rig.jump_to(173_001.0);
    let tree = rig.garden.tree(id).unwrap();
    assert_eq!(tree.health, Health::Healthy);
    assert!(!tree.has_played_dry_sound);
    assert_eq!(tree.growth_progress, 1.0);
}

#[test]
fn test_dry_tree_swaps_to_dry_model() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.run_for(1);
    assert_eq!(rig.shown_model(id).as_deref(), Some(SAPLING_MODEL));

    rig.jump_to(172_801.0);
    // the swap requested by this reconcile lands on the next step
    rig.jump_to(172_802.0);
    assert_eq!(rig.shown_model(id).as_deref(), Some(DRY_MODEL));
}

#[test]
fn test_acceleration_scenario() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.jump_to(300.0);
    assert!((rig.progress(id) - 0.5).abs() < 1e-9);

    let now = rig.now();
    rig.garden.water(id, now).unwrap();
    assert!(rig.garden.accelerate_current(now).unwrap());
    let accel = rig.garden.tree(id).unwrap().acceleration.unwrap();
    assert_eq!(accel.base_progress, 0.5);

    rig.jump_to(305.0);
    assert!((rig.progress(id) - 0.75).abs() < 1e-9);
    rig.jump_to(310.0);
    assert_eq!(rig.progress(id), 1.0);
    rig.jump_to(320.0);
    assert_eq!(rig.progress(id), 1.0);
    assert_eq!(rig.recorder.count(NotificationKind::Accelerated), 1);
}

#[test]
fn test_accelerated_tree_dries_quickly() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    assert!(rig.garden.accelerate_current(rig.now()).unwrap());
    rig.jump_to(121.0);
    assert!(rig.garden.tree(id).unwrap().is_dry());
    // dry trees cannot be accelerated again, and already are
    assert!(!rig.garden.accelerate_current(rig.now()).unwrap());
}

#[test]
fn test_water_cap_and_day_rollover() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    let now = rig.now();
    for _ in 0..7 {
        rig.garden.water(id, now).unwrap();
    }
    assert_eq!(rig.garden.tree(id).unwrap().water_count_today, 5);

    let tomorrow = now.offset(86_400.0);
    let watered = rig.garden.water(id, tomorrow).unwrap();
    assert_eq!(watered.count_today, 1);
}

#[test]
fn test_tree_hugger_earned_at_daily_cap() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    let after_plant = rig.garden.wallet().credits();
    let now = rig.now();
    for _ in 0..5 {
        rig.garden.water(id, now).unwrap();
    }
    rig.run_for(10);
    assert_eq!(rig.garden.wallet().credits(), after_plant + 5);
}

#[test]
fn test_badges_awarded_once() {
    let mut rig = Rig::new();
    let mut rx = rig.garden.subscribe();
    rig.plant(0.0);
    rig.run_for(60);

    let mut green_thumb = 0;
    while let Ok(event) = rx.try_recv() {
        if let GardenEvent::BadgeEarned { badge, .. } = event {
            if badge == grove::badges::Badge::GreenThumb {
                green_thumb += 1;
            }
        }
    }
    assert_eq!(green_thumb, 1);
    assert_eq!(rig.recorder.count(NotificationKind::BadgeEarned), 1);
    assert_eq!(rig.garden.wallet().credits(), 10);
}

#[test]
fn test_seed_sower_for_quick_plantings() {
    let mut rig = Rig::new();
    rig.plant(-0.5);
    rig.plant(0.0);
    rig.plant(0.5);
    // Green Thumb + Seed Sower
    assert_eq!(rig.garden.wallet().credits(), 15);
    assert!(rig.garden.badges().is_achieved(grove::badges::Badge::SeedSower));
}

#[test]
fn test_stats_tick_reports_co2() {
    let mut rig = Rig::new();
    rig.plant(0.0);
    rig.run_for(60);
    assert_eq!(rig.garden.history().len(), 6);
    let latest = rig.garden.history().latest().unwrap();
    assert!((latest.co2_kg - 5.0).abs() < 1e-9);
    assert!(rig
        .recorder
        .scores()
        .iter()
        .any(|(metric, value)| metric == METRIC_CO2_OFFSET && (*value - 500).abs() <= 1));
}

#[test]
fn test_planting_collision() {
    let mut rig = Rig::new();
    rig.plant(0.0);
    let now = rig.now();
    let err = rig
        .garden
        .plant_with_transform(Mat4::from_translation(Vec3::new(0.05, 0.0, -1.0)), now);
    assert!(matches!(err, Err(Error::PlantingCollision { .. })));
    assert_eq!(rig.garden.store().len(), 1);
    assert_eq!(rig.garden.synchronizer().len(), 1);

    rig.plant(0.2);
    assert_eq!(rig.garden.store().len(), 2);
    assert_eq!(rig.garden.synchronizer().len(), 2);
}

#[test]
fn test_failed_load_retried_next_tick() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.run_for(1);
    rig.library.set_failing("maple.usdz", true);

    rig.jump_to(200.0);
    assert_eq!(rig.garden.tree(id).unwrap().stage, Stage::Medium);
    rig.run_for(3);
    // the sapling stays visible while the swap keeps failing
    assert_eq!(rig.shown_model(id).as_deref(), Some(SAPLING_MODEL));
    let entity = rig.garden.synchronizer().record(id).unwrap().entity.unwrap();
    assert!(rig.garden.scene().unwrap().entity_scale(entity).is_some());

    rig.library.set_failing("maple.usdz", false);
    rig.run_for(3);
    assert_eq!(rig.shown_model(id).as_deref(), Some("maple.usdz"));
    let swapped = rig.garden.synchronizer().record(id).unwrap().entity.unwrap();
    assert_ne!(swapped, entity);
    // the old entity is gone from the scene
    assert!(rig.garden.scene().unwrap().entity_scale(entity).is_none());
}

#[test]
fn test_swap_animates_from_fraction_of_target() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.run_for(1);
    // attached this step; the tween has not consumed any time yet
    let first = record_entity(&rig, id);
    let initial = SimConfig::default().render.initial_scale;
    assert_eq!(rig.garden.scene().unwrap().entity_scale(first), Some(initial));
    rig.run_for(1);
    let sapling = Species::Maple.scale_for(Stage::Sapling, Health::Healthy);
    assert_eq!(rig.garden.scene().unwrap().entity_scale(first), Some(sapling));

    rig.jump_to(200.0);
    rig.jump_to(200.0);
    let target = Species::Maple.scale_for(Stage::Medium, Health::Healthy);
    let scale = rig.garden.scene().unwrap().entity_scale(record_entity(&rig, id)).unwrap();
    assert!((scale - target * 0.8).abs() < 1e-6);

    rig.jump_to(200.25);
    let scale = rig.garden.scene().unwrap().entity_scale(record_entity(&rig, id)).unwrap();
    assert!(scale > target * 0.8 && scale < target);

    rig.jump_to(201.0);
    let scale = rig.garden.scene().unwrap().entity_scale(record_entity(&rig, id)).unwrap();
    assert_eq!(scale, target);
}

fn record_entity(rig: &Rig, id: TreeId) -> grove::scene::EntityHandle {
    rig.garden.synchronizer().record(id).unwrap().entity.unwrap()
}

#[test]
fn test_teardown_discards_inflight_loads() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    assert!(rig.garden.teardown().is_some());

    rig.run_for(5);
    assert!(rig.garden.synchronizer().record(id).unwrap().entity.is_none());
    assert!(!rig.garden.is_running());

    // actions keep working without a scene
    rig.garden.water(id, rig.now()).unwrap();
    assert!(!rig.garden.accelerate_current(rig.now()).unwrap());
    assert!(matches!(rig.garden.plant_at(Vec2::splat(0.5), rig.now()), Err(Error::SceneUnavailable)));
}

#[test]
fn test_worker_loader_discards_after_teardown() {
    let library = Arc::new(ModelLibrary::with_defaults().with_latency(Duration::from_millis(30)));
    let loader = ModelLoader::new(library, 2).unwrap();
    let mut garden = Garden::new(SimConfig::default(), Box::new(SceneGraph::new()), loader).unwrap();
    let hit = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
    let id = garden.plant_with_transform(hit, Timestamp(T0)).unwrap();
    garden.teardown();
    garden.settle_loads(Duration::from_secs(2));
    assert!(garden.synchronizer().record(id).unwrap().entity.is_none());
}

#[test]
fn test_worker_loader_attaches_model() {
    let library = Arc::new(ModelLibrary::with_defaults().with_latency(Duration::from_millis(5)));
    let loader = ModelLoader::new(library, 2).unwrap();
    let mut garden = Garden::new(SimConfig::default(), Box::new(SceneGraph::new()), loader).unwrap();
    let hit = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
    let id = garden.plant_with_transform(hit, Timestamp(T0)).unwrap();
    garden.settle_loads(Duration::from_secs(2));
    let record = garden.synchronizer().record(id).unwrap();
    assert!(record.entity.is_some());
    assert_eq!(record.cached_asset.as_deref(), Some(SAPLING_MODEL));
}

#[test]
fn test_reminder_for_overdue_accelerated_tree() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.garden.accelerate_current(rig.now()).unwrap();

    rig.run_for(59);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 0);
    rig.run_for(1);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 1);
    let name = rig.garden.tree(id).unwrap().name.clone();
    assert!(rig.garden.toasts().iter().any(|t| t.message.contains(&name)));

    let watered = rig.garden.water_all_overdue(rig.now());
    assert_eq!(watered, vec![id]);
    assert!(rig.garden.water_all_overdue(rig.now()).is_empty());
}

#[test]
fn test_reminder_scans_on_start() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.garden.accelerate_current(rig.now()).unwrap();
    rig.garden.stop();

    rig.clock.set(Timestamp(T0 + 90.0));
    rig.garden.start(rig.now());
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 0);
    rig.jump_to(90.0);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 1);
    let name = rig.garden.tree(id).unwrap().name.clone();
    assert!(rig.garden.toasts().iter().any(|t| t.message.contains(&name)));
}

#[test]
fn test_selection_change_rescans_reminders() {
    let mut rig = Rig::new();
    let first = rig.plant(0.0);
    rig.garden.accelerate_current(rig.now()).unwrap();
    let second = rig.plant(1.0);
    assert_eq!(rig.garden.current(), Some(second));

    rig.run_for(60);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 1);
    rig.run_for(1);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 1);

    // the periodic scan is a minute away; changing selection rescans now
    rig.garden.select(first).unwrap();
    rig.run_for(1);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 2);
    rig.run_for(1);
    assert_eq!(rig.recorder.count(NotificationKind::WaterReminder), 2);
}

#[test]
fn test_selection_does_not_restart_stopped_timers() {
    let mut rig = Rig::new();
    rig.garden.stop();
    rig.plant(0.0);
    assert!(!rig.garden.is_running());
}

#[test]
fn test_tap_to_plant_and_select() {
    let mut rig = Rig::new();
    let table = DetectedSurface {
        id: SurfaceId(7),
        transform: Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0)),
        extent: Vec2::new(2.0, 2.0),
        class: SurfaceClass::Table,
    };
    assert_eq!(rig.garden.on_surface_detected(&table), 0);

    let id = rig.garden.plant_at(Vec2::splat(0.5), rig.now()).unwrap().unwrap();
    assert_eq!(rig.garden.current(), Some(id));
    rig.run_for(2);

    rig.garden.clear_selection();
    assert_eq!(rig.garden.select_at(Vec2::splat(0.02)), None);
    assert_eq!(rig.garden.current(), None);
    assert_eq!(rig.garden.select_at(Vec2::splat(0.5)), Some(id));
    assert_eq!(rig.garden.current(), Some(id));
}

#[test]
fn test_floor_decorations_attach() {
    let mut rig = Rig::new();
    let floor = DetectedSurface {
        id: SurfaceId(1),
        transform: Mat4::IDENTITY,
        extent: Vec2::new(1.0, 1.0),
        class: SurfaceClass::Floor,
    };
    let requested = rig.garden.on_surface_detected(&floor);
    assert!((5..=8).contains(&requested));
    rig.run_for(1);
    assert_eq!(rig.garden.placement().decoration_count(), requested);
}

#[test]
fn test_store_purchases() {
    let mut rig = Rig::new();
    assert!(matches!(
        rig.garden.purchase(StoreItem::Species(Species::Bamboo)),
        Err(Error::InsufficientCredits { price: 20, available: 0 })
    ));
    rig.garden.grant_credits(25);
    rig.garden.purchase(StoreItem::Species(Species::Bamboo)).unwrap();
    assert!(matches!(
        rig.garden.purchase(StoreItem::Species(Species::Bamboo)),
        Err(Error::AlreadyPurchased(_))
    ));
    assert_eq!(rig.garden.wallet().credits(), 5);
    rig.garden.select_species(Species::Bamboo).unwrap();
    assert_eq!(rig.recorder.count(NotificationKind::Purchased), 1);
}

#[test]
fn test_growth_booster_halves_duration() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    assert!(rig.garden.apply_growth_booster(None).unwrap());
    assert_eq!(rig.garden.tuning().total_growth_duration_secs(), 300.0);
    rig.jump_to(150.0);
    assert!((rig.progress(id) - 0.5).abs() < 1e-9);
}

#[test]
fn test_rename_rejects_duplicates() {
    let mut rig = Rig::new();
    let a = rig.plant(0.0);
    let b = rig.plant(0.5);
    rig.garden.rename(a, "  Fern ").unwrap();
    assert_eq!(rig.garden.tree(a).unwrap().name, "Fern");
    assert!(matches!(rig.garden.rename(b, "Fern"), Err(Error::DuplicateName(_))));
    assert!(matches!(rig.garden.rename(b, "   "), Err(Error::EmptyName)));
}

#[test]
fn test_custom_name_survives_stage_change() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.garden.rename(id, "Fern").unwrap();
    rig.jump_to(300.0);
    let tree = rig.garden.tree(id).unwrap();
    assert_eq!(tree.stage, Stage::Medium);
    assert_eq!(tree.name, "Fern");
}

#[test]
fn test_growth_runs_before_reconcile_due_same_instant() {
    let mut config = SimConfig::default();
    config.schedule.growth_period_secs = 0.5;
    config.schedule.reconcile_period_secs = 1.0;
    config.growth.default_growth_duration_secs = 2.0;
    let mut rig = Rig::with_config(config);
    let id = rig.plant(0.0);

    rig.jump_to(0.5);
    rig.jump_to(1.0);
    assert_eq!(rig.garden.tree(id).unwrap().stage, Stage::Medium);
    // the reconcile at t = 1.0 already saw the medium stage
    let medium = Species::Maple.model_for(Stage::Medium, Health::Healthy);
    let record = rig.garden.synchronizer().record(id).unwrap();
    let requested = record.pending.as_ref().map(|p| p.asset.clone());
    assert!(requested.as_ref() == Some(&medium) || record.cached_asset.as_ref() == Some(&medium));

    rig.jump_to(1.0);
    assert_eq!(rig.shown_model(id), Some(medium));
}

#[test]
fn test_stop_cancels_schedules() {
    let mut rig = Rig::new();
    let id = rig.plant(0.0);
    rig.garden.stop();
    rig.jump_to(300.0);
    assert_eq!(rig.progress(id), 0.0);
    assert!(rig.garden.next_wakeup().map_or(true, |t| t.0 > T0 + 300.0));
}
