//! The garden: single owner of every tree, record, timer and collaborator.
//!
//! All simulation ticks, user actions and load completions run through
//! `&mut Garden`, one at a time, so tree state needs no locks. Within a
//! [`Garden::step`] the growth tick always runs before a reconcile or stats
//! sample that is due at the same instant, whatever the configured periods,
//! so readers only ever see the state a whole growth tick left behind.

use glam::{Mat4, Vec2};
use tokio::sync::broadcast;

use crate::badges::{BadgeAward, BadgeEvaluator, BadgeThresholds};
use crate::core::{Error, Result, Timestamp};
use crate::economy::{StoreItem, Wallet};
use crate::events::{
    EventBus, GardenEvent, LogNotifier, LogScoreSink, NotificationKind, Notifier, ScoreSink, Toast,
    ToastBoard,
};
use crate::placement::{DetectedSurface, PlacementEngine};
use crate::scene::SceneProvider;
use crate::schedule::{TimerKind, TimerQueue};
use crate::sim::{
    self, accelerate, Aggregates, GrowthEvent, GrowthSimulator, GrowthTuning, ImpactHistory,
    SimConfig, Species, Tree, TreeId, TreeStore, Watered,
};
use crate::streaming::{LoadCompletion, ModelLoader};
use crate::sync::{Applied, EntitySynchronizer, ReconcileReport};

pub const PLANTED_MESSAGE: &str =
    "Thank you for planting a new tree 🌱! Check Your Impact to view your CO₂ stats.";

/// Score metric names reported to the leaderboard sink.
pub const METRIC_TREES_PLANTED: &str = "treesPlanted";
pub const METRIC_CO2_OFFSET: &str = "co2Offset";

pub struct Garden {
    config: SimConfig,
    tuning: GrowthTuning,
    store: TreeStore,
    sync: EntitySynchronizer,
    placement: PlacementEngine,
    badges: BadgeEvaluator,
    wallet: Wallet,
    history: ImpactHistory,
    timers: TimerQueue,
    toasts: ToastBoard,
    bus: EventBus,
    scene: Option<Box<dyn SceneProvider>>,
    loader: ModelLoader,
    notifier: Box<dyn Notifier>,
    scores: Box<dyn ScoreSink>,
    selected_species: Species,
    current: Option<TreeId>,
    last_step: Option<Timestamp>,
}

impl Garden {
    pub fn new(config: SimConfig, scene: Box<dyn SceneProvider>, loader: ModelLoader) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tuning: GrowthTuning::from_config(&config.growth),
            store: TreeStore::new(),
            sync: EntitySynchronizer::new(config.render.clone()),
            placement: PlacementEngine::new(config.placement.clone()),
            badges: BadgeEvaluator::new(BadgeThresholds {
                daily_water_cap: config.water.daily_cap,
            }),
            wallet: Wallet::new(),
            history: ImpactHistory::new(config.impact.history_cap),
            timers: TimerQueue::new(),
            toasts: ToastBoard::new(config.schedule.toast_lifetime_secs),
            bus: EventBus::default(),
            scene: Some(scene),
            loader,
            notifier: Box::new(LogNotifier),
            scores: Box::new(LogScoreSink),
            selected_species: Species::default(),
            current: None,
            last_step: None,
            config,
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_score_sink(mut self, scores: Box<dyn ScoreSink>) -> Self {
        self.scores = scores;
        self
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// Arm the four periodic schedules. Growth, reconcile and stats first
    /// fire one period from now; the reminder scan runs on the next step.
    pub fn start(&mut self, now: Timestamp) {
        let s = &self.config.schedule;
        self.timers.start(
            now,
            &[
                (TimerKind::GrowthTick, s.growth_period_secs),
                (TimerKind::Reconcile, s.reconcile_period_secs),
                (TimerKind::StatsSample, s.stats_period_secs),
            ],
        );
        self.timers.schedule(now, TimerKind::ReminderScan);
        self.last_step = Some(now);
        log::info!("garden started");
    }

    /// Cancel every pending timer. Actions keep working.
    pub fn stop(&mut self) {
        self.timers.clear();
    }

    pub fn is_running(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Run one serialized step: advance scene animations, apply finished
    /// loads, expire toasts and run every due timer in order.
    pub fn step(&mut self, now: Timestamp) {
        // tweens started below must not absorb time that passed before them
        if let Some(last) = self.last_step {
            let dt = now.saturating_elapsed(last) as f32;
            if let Some(scene) = self.scene.as_deref_mut() {
                scene.advance(dt);
            }
        }
        self.last_step = Some(now);

        self.drain_loads();

        for id in self.toasts.expire(now) {
            self.bus.publish(GardenEvent::ToastDismissed { id });
        }

        while let Some(timer) = self.timers.pop_due(now) {
            match timer.kind {
                TimerKind::GrowthTick => self.growth_tick(now),
                TimerKind::Reconcile => {
                    self.reconcile();
                }
                TimerKind::ReminderScan => {
                    let delay = self.reminder_scan(now);
                    self.timers.schedule(now.offset(delay), TimerKind::ReminderScan);
                    continue;
                }
                TimerKind::StatsSample => self.stats_sample(now),
            }
            let period = self.period(timer.kind);
            self.timers.schedule(next_phase(timer.due, period, now), timer.kind);
        }
    }

    /// Earliest instant at which `step` has work to do.
    pub fn next_wakeup(&self) -> Option<Timestamp> {
        match (self.timers.next_due(), self.toasts.next_expiry()) {
            (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    fn period(&self, kind: TimerKind) -> f64 {
        let s = &self.config.schedule;
        match kind {
            TimerKind::GrowthTick => s.growth_period_secs,
            TimerKind::Reconcile => s.reconcile_period_secs,
            TimerKind::ReminderScan => s.reminder_period_secs,
            TimerKind::StatsSample => s.stats_period_secs,
        }
    }

    fn growth_tick(&mut self, now: Timestamp) {
        let events = GrowthSimulator::new(&self.config, &self.tuning).tick(&mut self.store, now);
        for event in events {
            match event {
                GrowthEvent::Dried(id) => {
                    self.notify(NotificationKind::Dry);
                    self.bus.publish(GardenEvent::TreeDried { id });
                }
                GrowthEvent::Recovered(id) => self.bus.publish(GardenEvent::TreeRecovered { id }),
                GrowthEvent::StageChanged { id, from, to } => {
                    self.bus.publish(GardenEvent::StageChanged { id, from, to })
                }
                GrowthEvent::Renamed { id, from, to } => {
                    self.bus.publish(GardenEvent::TreeRenamed { id, from, to })
                }
                GrowthEvent::FullyGrown(id) => log::info!("tree {id} is fully grown"),
            }
        }
    }

    /// Run a reconcile pass now. Does nothing once the scene is torn down.
    pub fn reconcile(&mut self) -> ReconcileReport {
        match self.scene.as_deref_mut() {
            Some(scene) => self.sync.reconcile(&self.store, scene, &mut self.loader),
            None => ReconcileReport::default(),
        }
    }

    /// Scan for overdue trees, raise a reminder if any, and return the delay
    /// until the next scan.
    fn reminder_scan(&mut self, now: Timestamp) -> f64 {
        let scan = sim::scan_overdue(&self.store, &self.config.water, now);
        if let Some(message) = scan.reminder_message() {
            log::info!("{} tree(s) need water", scan.ids.len());
            self.notify(NotificationKind::WaterReminder);
            self.toast(message, now);
        }
        sim::next_reminder_delay(&scan, self.config.schedule.reminder_period_secs)
    }

    fn stats_sample(&mut self, now: Timestamp) {
        let agg = self.aggregates(now);
        self.history.record(now, &agg);
        if let Err(e) = self.scores.report_count(METRIC_CO2_OFFSET, agg.co2_score()) {
            log::warn!("score sink rejected {METRIC_CO2_OFFSET}: {e}");
        }
        self.evaluate_badges(&agg, now);
    }

    fn evaluate_badges(&mut self, agg: &Aggregates, now: Timestamp) -> Vec<BadgeAward> {
        let awards = self.badges.evaluate(agg);
        for award in &awards {
            self.wallet.earn(award.credits);
            self.notify(NotificationKind::BadgeEarned);
            self.toast(award.message(), now);
            self.bus.publish(GardenEvent::BadgeEarned {
                badge: award.badge,
                credits: award.credits,
            });
        }
        if !awards.is_empty() {
            self.bus.publish(GardenEvent::CreditsChanged { credits: self.wallet.credits() });
        }
        awards
    }

    /// Apply every finished model load.
    fn drain_loads(&mut self) {
        let completions = self.loader.poll_results();
        self.apply_loads(completions);
    }

    /// Block until in-flight loads land (worker loaders only) and apply them.
    /// Not for use inside an async task.
    pub fn settle_loads(&mut self, timeout: std::time::Duration) {
        let completions = if self.loader.is_inline() {
            self.loader.poll_results()
        } else {
            self.loader.wait_for_results(timeout)
        };
        self.apply_loads(completions);
    }

    /// Route completions to whoever requested them. Nothing is applied once
    /// the scene is gone.
    fn apply_loads(&mut self, completions: Vec<LoadCompletion>) {
        let generation = self.sync.generation();
        for completion in completions {
            let Some(scene) = self.scene.as_deref_mut() else {
                log::debug!("scene gone, dropping load of {}", completion.name);
                continue;
            };
            if self.sync.owns_ticket(completion.ticket) {
                if let Applied::Swapped { id, entity } =
                    self.sync.apply_completion(completion, &self.store, scene)
                {
                    log::debug!("tree {id} now shows entity {:?}", entity);
                }
            } else if self.placement.owns_ticket(completion.ticket) {
                self.placement.apply_completion(completion, scene, generation);
            } else {
                log::debug!("dropping superseded load of {}", completion.name);
            }
        }
    }

    /// Stop all timers, invalidate in-flight loads and unregister the scene.
    /// Returns the scene provider. Trees and actions stay usable.
    pub fn teardown(&mut self) -> Option<Box<dyn SceneProvider>> {
        self.timers.clear();
        self.sync.bump_generation();
        self.placement.cancel_pending();
        log::info!("scene torn down");
        self.scene.take()
    }

    pub fn is_live(&self) -> bool {
        self.scene.is_some()
    }

    // ---------------------------------------------------------------------
    // Actions
    // ---------------------------------------------------------------------

    /// Plant the selected species where a screen tap hits a surface.
    /// `Ok(None)` when the tap hits no surface.
    pub fn plant_at(&mut self, screen: Vec2, now: Timestamp) -> Result<Option<TreeId>> {
        let scene = self.scene.as_deref().ok_or(Error::SceneUnavailable)?;
        match scene.raycast(screen) {
            Some(hit) => self.plant_with_transform(hit, now).map(Some),
            None => Ok(None),
        }
    }

    /// Plant the selected species at a world transform.
    pub fn plant_with_transform(&mut self, hit: Mat4, now: Timestamp) -> Result<TreeId> {
        let species = self.selected_species;
        if !self.wallet.is_unlocked(species) {
            return Err(Error::SpeciesLocked(species));
        }
        let scene = self.scene.as_deref_mut().ok_or(Error::SceneUnavailable)?;
        let id = self
            .placement
            .plant(hit, species, now, &mut self.store, &mut self.sync, &mut *scene)?;

        if let Some(tree) = self.store.get(id) {
            let mut report = ReconcileReport::default();
            self.sync.reconcile_tree(tree, scene, &mut self.loader, &mut report);
            log::info!("planted {}", tree.name);
            self.bus.publish(GardenEvent::TreePlanted { id, name: tree.name.clone() });
        }
        self.notify(NotificationKind::Planted);
        self.toast(PLANTED_MESSAGE, now);
        if let Err(e) = self.scores.report_count(METRIC_TREES_PLANTED, self.store.len() as i64) {
            log::warn!("score sink rejected {METRIC_TREES_PLANTED}: {e}");
        }
        self.set_current(Some(id));

        let agg = self.aggregates(now);
        self.evaluate_badges(&agg, now);
        Ok(id)
    }

    /// Select the tree whose entity is under a screen point. Misses keep the
    /// current selection.
    pub fn select_at(&mut self, screen: Vec2) -> Option<TreeId> {
        let entity = self.scene.as_deref()?.hit_entity(screen)?;
        let id = self.placement.select(entity, &self.sync)?;
        self.set_current(Some(id));
        Some(id)
    }

    pub fn select(&mut self, id: TreeId) -> Result<()> {
        if !self.store.contains(id) {
            return Err(Error::TreeNotFound(id));
        }
        self.set_current(Some(id));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.set_current(None);
    }

    fn set_current(&mut self, id: Option<TreeId>) {
        if self.current != id {
            self.current = id;
            self.bus.publish(GardenEvent::SelectionChanged { id });
            // rescan reminders on the next step
            if self.timers.is_armed(TimerKind::ReminderScan) {
                let due = self.last_step.unwrap_or_default();
                self.timers.cancel(TimerKind::ReminderScan);
                self.timers.schedule(due, TimerKind::ReminderScan);
            }
        }
    }

    pub fn water(&mut self, id: TreeId, now: Timestamp) -> Result<Watered> {
        let watered = sim::water_tree(&mut self.store, id, &self.config, now)?;
        self.notify(NotificationKind::Watered);
        self.bus.publish(GardenEvent::TreeWatered { id, count_today: watered.count_today });
        Ok(watered)
    }

    /// Water every tree that is currently overdue.
    pub fn water_all_overdue(&mut self, now: Timestamp) -> Vec<TreeId> {
        let watered = sim::water_all_overdue(&mut self.store, &self.config, now);
        if !watered.is_empty() {
            self.notify(NotificationKind::Watered);
        }
        for &id in &watered {
            let count_today = self.store.get(id).map_or(0, |t| t.water_count_today);
            self.bus.publish(GardenEvent::TreeWatered { id, count_today });
        }
        watered
    }

    /// Fast-forward the selected tree. `Ok(false)` when it is already
    /// accelerated, dry, or the scene session has ended.
    pub fn accelerate_current(&mut self, now: Timestamp) -> Result<bool> {
        let id = self.current.ok_or(Error::NoSelection)?;
        let tree = self.store.get_mut(id).ok_or(Error::TreeNotFound(id))?;
        if self.scene.is_none() || !accelerate(tree, &self.tuning, now) {
            return Ok(false);
        }
        log::info!("accelerated {}", tree.name);
        self.notify(NotificationKind::Accelerated);
        self.bus.publish(GardenEvent::Accelerated { id });
        Ok(true)
    }

    /// Tree the booster targets: the given one, else the selection, else
    /// the first tree.
    fn booster_target(&self, tree: Option<TreeId>) -> Result<TreeId> {
        tree.or(self.current)
            .or_else(|| self.store.first().map(Tree::id))
            .ok_or(Error::NoSelection)
    }

    /// Halve the default growth duration for every non-accelerated tree.
    /// `Ok(false)` when the target tree is dry.
    pub fn apply_growth_booster(&mut self, tree: Option<TreeId>) -> Result<bool> {
        let id = self.booster_target(tree)?;
        let target = self.store.get(id).ok_or(Error::TreeNotFound(id))?;
        if target.is_dry() {
            return Ok(false);
        }
        self.tuning.apply_booster();
        log::info!(
            "growth booster applied, duration now {}s",
            self.tuning.total_growth_duration_secs()
        );
        Ok(true)
    }

    /// Buy a store item. Nothing changes when the purchase is rejected.
    pub fn purchase(&mut self, item: StoreItem) -> Result<()> {
        let booster_target = match item {
            StoreItem::GrowthBooster => Some(self.booster_target(None)?),
            StoreItem::Species(_) => None,
        };
        self.wallet.purchase(item)?;
        if let Some(id) = booster_target {
            self.apply_growth_booster(Some(id))?;
        }
        self.notify(NotificationKind::Purchased);
        self.bus.publish(GardenEvent::CreditsChanged { credits: self.wallet.credits() });
        Ok(())
    }

    pub fn select_species(&mut self, species: Species) -> Result<()> {
        if !self.wallet.is_unlocked(species) {
            return Err(Error::SpeciesLocked(species));
        }
        self.selected_species = species;
        Ok(())
    }

    pub fn rename(&mut self, id: TreeId, new_name: &str) -> Result<()> {
        let from = self.store.rename(id, new_name)?;
        let to = self.store.get(id).map(|t| t.name.clone()).unwrap_or_default();
        log::info!("renamed {from} to {to}");
        self.bus.publish(GardenEvent::TreeRenamed { id, from, to });
        Ok(())
    }

    /// Feed a surface from the detector.
    pub fn on_surface_detected(&mut self, surface: &DetectedSurface) -> usize {
        let generation = self.sync.generation();
        match self.scene.as_deref_mut() {
            Some(scene) => self
                .placement
                .on_surface_detected(surface, scene, &mut self.loader, generation),
            None => 0,
        }
    }

    /// Credit the wallet directly, e.g. from an external reward.
    pub fn grant_credits(&mut self, amount: u32) {
        self.wallet.earn(amount);
        self.bus.publish(GardenEvent::CreditsChanged { credits: self.wallet.credits() });
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.store.iter()
    }

    pub fn tree(&self, id: TreeId) -> Option<&Tree> {
        self.store.get(id)
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Mutable store access for hosts restoring or scripting state.
    pub fn store_mut(&mut self) -> &mut TreeStore {
        &mut self.store
    }

    pub fn aggregates(&self, now: Timestamp) -> Aggregates {
        Aggregates::compute(&self.store, &self.config, now)
    }

    pub fn current(&self) -> Option<TreeId> {
        self.current
    }

    pub fn selected_species(&self) -> Species {
        self.selected_species
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tuning(&self) -> &GrowthTuning {
        &self.tuning
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn badges(&self) -> &BadgeEvaluator {
        &self.badges
    }

    pub fn history(&self) -> &ImpactHistory {
        &self.history
    }

    pub fn toasts(&self) -> &[Toast] {
        self.toasts.active()
    }

    pub fn synchronizer(&self) -> &EntitySynchronizer {
        &self.sync
    }

    pub fn placement(&self) -> &PlacementEngine {
        &self.placement
    }

    pub fn scene(&self) -> Option<&dyn SceneProvider> {
        self.scene.as_deref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GardenEvent> {
        self.bus.subscribe()
    }

    fn notify(&mut self, kind: NotificationKind) {
        if let Err(e) = self.notifier.notify(kind) {
            log::debug!("notifier failed for {:?}: {}", kind, e);
        }
    }

    fn toast(&mut self, message: impl Into<String>, now: Timestamp) {
        let message = message.into();
        let id = self.toasts.push(message.clone(), now);
        self.bus.publish(GardenEvent::Toast { id, message });
    }
}

/// Next firing of a periodic timer that was due at `due`, keeping its phase
/// and skipping any periods already missed by `now`.
fn next_phase(due: Timestamp, period: f64, now: Timestamp) -> Timestamp {
    let next = due.offset(period);
    if next.0 > now.0 {
        return next;
    }
    let missed = (now.saturating_elapsed(due) / period).floor() + 1.0;
    due.offset(missed * period)
}
