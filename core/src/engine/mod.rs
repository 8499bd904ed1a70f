//! Event dispatch
//!
//! [`GuideEngine`] is the single owner of guide state. Inbound events are gated
//! on `enabled` and on a guide being loaded, resolved to a trigger key, looked
//! up in the active guide, and handed to the executor. Zone loads bypass the
//! gates: they always drop every pending timer and swap the guide.


use std::sync::Arc;
use std::time::Duration;

use warden_types::{DebugFlags, GuideConfig};

use crate::events::{EffectSink, GuideEvent, SpeechBackend};
use crate::executor::{ActionExecutor, ExecutorSettings, Job, TextHandler};
use crate::guide::{GuideSource, GuideTable};
use crate::timers::{TimerKey, TimerRegistry};
use crate::trigger::{health_percent, resolve, trigger_source, TriggerKind};
use crate::world::{EntityLookup, EntityRef, GameId, MobClass};

/// Point-in-time view of engine state for the operator surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub enabled: bool,
    pub debug: DebugFlags,
    pub zone: Option<u32>,
    pub guide_found: bool,
    pub guide_entries: usize,
    pub pending_timers: usize,
    pub speech_available: bool,
}

/// Whether a trigger of `kind` raised by (or on) `class` gets an info trace.
pub fn traces_trigger(flags: &DebugFlags, kind: TriggerKind, class: &MobClass) -> bool {
    match kind {
        TriggerKind::Skill => flags.traces_skill(class.template_id),
        TriggerKind::MobAbnormality
        | TriggerKind::AmbientAbnormality
        | TriggerKind::TargetAbnormality => flags.traces_abnormal(),
        TriggerKind::Health => flags.traces_hp(),
    }
}

pub struct GuideEngine {
    enabled: bool,
    debug: DebugFlags,

    zone: Option<u32>,
    active_guide: Arc<GuideTable>,
    guide_found: bool,

    timers: TimerRegistry<Job>,
    settings: ExecutorSettings,

    source: Box<dyn GuideSource + Send>,
    sink: Box<dyn EffectSink + Send>,
    speech: Option<Box<dyn SpeechBackend + Send>>,
}

impl GuideEngine {
    pub fn new(
        config: &GuideConfig,
        source: Box<dyn GuideSource + Send>,
        sink: Box<dyn EffectSink + Send>,
    ) -> Self {
        Self {
            enabled: config.enabled,
            debug: config.debug,
            zone: None,
            active_guide: Arc::new(GuideTable::new()),
            guide_found: false,
            timers: TimerRegistry::new(),
            settings: ExecutorSettings {
                chat_name: config.chat_name.clone(),
                speech_available: false,
            },
            source,
            sink,
            speech: None,
        }
    }

    /// Attach a speech backend (or None if the probe found nothing).
    pub fn with_speech(mut self, speech: Option<Box<dyn SpeechBackend + Send>>) -> Self {
        self.settings.speech_available = speech.is_some();
        self.speech = speech;
        self
    }

    // --- Operator controls ---

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip `enabled`, returning the new value.
    pub fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn debug_flags(&self) -> DebugFlags {
        self.debug
    }

    /// Flip a named debug flag. None if there is no flag by that name.
    pub fn toggle_debug(&mut self, name: &str) -> Option<bool> {
        self.debug.toggle(name)
    }

    // --- Accessors ---

    pub fn zone(&self) -> Option<u32> {
        self.zone
    }

    pub fn guide_found(&self) -> bool {
        self.guide_found
    }

    pub fn active_guide(&self) -> &GuideTable {
        &self.active_guide
    }

    pub fn timers(&self) -> &TimerRegistry<Job> {
        &self.timers
    }

    /// Engine clock: time of the last [`GuideEngine::advance_to`] (or fired timer).
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            enabled: self.enabled,
            debug: self.debug,
            zone: self.zone,
            guide_found: self.guide_found,
            guide_entries: self.active_guide.len(),
            pending_timers: self.timers.len(),
            speech_available: self.settings.speech_available,
        }
    }

    // --- Event handling ---

    pub fn handle_event(&mut self, event: &GuideEvent, world: &dyn EntityLookup) {
        match *event {
            GuideEvent::SkillCast {
                source,
                skill,
                speed,
            } => self.on_skill_cast(source, skill, speed, world),
            GuideEvent::AbnormalityBegin {
                target,
                source,
                abnormality_id,
            }
            | GuideEvent::AbnormalityRefresh {
                target,
                source,
                abnormality_id,
            } => self.on_abnormality(target, source, abnormality_id, world),
            GuideEvent::BossGauge { id, cur_hp, max_hp } => {
                self.on_boss_gauge(id, cur_hp, max_hp, world)
            }
            GuideEvent::ZoneLoaded { zone } => self.load_zone(zone),
        }
    }

    fn active(&self) -> bool {
        self.enabled && self.guide_found
    }

    fn on_skill_cast(&mut self, source: GameId, skill: u64, speed: f32, world: &dyn EntityLookup) {
        if !self.active() {
            return;
        }
        let Some(mob) = world.find_mob(source) else {
            return;
        };
        let skill_id = world.resolve_skill_id(skill);
        self.trigger(&mob, skill_id, TriggerKind::Skill, f64::from(speed));
    }

    fn on_abnormality(
        &mut self,
        target: GameId,
        source: Option<GameId>,
        abnormality_id: u32,
        world: &dyn EntityLookup,
    ) {
        if !self.active() {
            return;
        }
        let empty = world.empty_source();
        let source = source.unwrap_or(empty);
        let on_me = world.is_local_player(target);

        // A mob put it on me
        if on_me && let Some(source_mob) = world.find_mob(source) {
            self.trigger(&source_mob, abnormality_id, TriggerKind::MobAbnormality, 1.0);
        }

        // Nothing put it on me
        if on_me && source == empty {
            self.trigger(
                &EntityRef::ambient(),
                abnormality_id,
                TriggerKind::AmbientAbnormality,
                1.0,
            );
        }

        // A mob got it
        if let Some(target_mob) = world.find_mob(target) {
            self.trigger(&target_mob, abnormality_id, TriggerKind::TargetAbnormality, 1.0);
        }
    }

    fn on_boss_gauge(&mut self, id: GameId, cur_hp: u64, max_hp: u64, world: &dyn EntityLookup) {
        if !self.active() {
            return;
        }
        let Some(mob) = world.find_mob(id) else {
            return;
        };
        let Some(percent) = health_percent(cur_hp, max_hp) else {
            return;
        };
        self.trigger(&mob, percent, TriggerKind::Health, 1.0);
    }

    fn trigger(&mut self, entity: &EntityRef, event_id: u32, kind: TriggerKind, speed: f64) {
        let key = resolve(&entity.class, event_id, kind);
        if traces_trigger(&self.debug, kind, &entity.class) {
            tracing::info!(
                target: "guide",
                category = kind.category(),
                event_id,
                started_by = %trigger_source(&entity.class, kind),
                key = %key,
                "Trigger"
            );
        }

        let guide = Arc::clone(&self.active_guide);
        let Some(actions) = guide.get(&key) else {
            return;
        };
        ActionExecutor::new(&mut self.timers, &self.settings).execute(actions, entity, speed);
    }

    /// Enter `zone`: cancel every pending timer, then reload its guide.
    ///
    /// Runs regardless of `enabled`.
    pub fn load_zone(&mut self, zone: u32) {
        let cancelled = self.timers.clear();
        self.zone = Some(zone);

        if self.debug.debug {
            tracing::info!(target: "guide", zone, cancelled, "Entered zone");
        }

        match self.source.reload(zone) {
            Ok(table) => {
                tracing::debug!(target: "guide", zone, entries = table.len(), "Guide active");
                self.active_guide = table;
                self.guide_found = true;
            }
            Err(e) => {
                if e.is_not_found() {
                    tracing::debug!(target: "guide", zone, "No guide for zone");
                } else {
                    tracing::warn!(target: "guide", zone, error = %e, "Failed to load guide");
                }
                self.active_guide = Arc::new(GuideTable::new());
                self.guide_found = false;
            }
        }
    }

    /// Re-run the zone load for the current zone, if any.
    pub fn reload_zone(&mut self) -> bool {
        match self.zone {
            Some(zone) => {
                self.load_zone(zone);
                true
            }
            None => false,
        }
    }

    // --- Timer firing ---

    /// Fire every timer due at or before `now`, in due order. Returns how many fired.
    ///
    /// Jobs that schedule new timers (callbacks) see the clock at their own
    /// due time; anything they schedule that is already due fires in this
    /// same call, after them.
    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some((key, job)) = self.timers.pop_due(now) {
            self.fire(key, job);
            fired += 1;
        }
        self.timers.advance_clock(now);
        fired
    }

    fn fire(&mut self, key: TimerKey, job: Job) {
        match job {
            Job::Emit(effect) => self.sink.emit(effect),
            Job::Speak(text) => {
                if let Some(speech) = self.speech.as_mut() {
                    speech.speak(&text);
                }
            }
            Job::Invoke {
                callback,
                action,
                entity,
                speed,
            } => {
                tracing::trace!(target: "guide", timer = %key, callback = callback.name(), "Invoking callback");
                let executor = ActionExecutor::new(&mut self.timers, &self.settings);
                let mut handler = TextHandler::new(executor, speed);
                callback.call(&mut handler, &action, &entity);
            }
        }
    }
}
