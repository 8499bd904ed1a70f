//! Action execution
//!
//! The executor turns matched [`Action`]s into pending [`Job`]s in the timer
//! registry. Nothing here touches the outbound sink directly: jobs only
//! produce effects when the engine fires them.

use std::time::Duration;

use crate::events::{Effect, EVENT_MESSAGE_KIND, NOTIFICATION_CHANNEL};
use crate::guide::{
    Action, CallbackAction, GuideFn, SoundAction, SpawnAction, StopTimerAction, TextAction,
    TextKind,
};
use crate::timers::{TimerKey, TimerRegistry};
use crate::world::EntityRef;

/// What a timer does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Send an effect to the outbound sink
    Emit(Effect),
    /// Read text through the speech backend
    Speak(String),
    /// Run guide code
    Invoke {
        callback: GuideFn,
        action: CallbackAction,
        entity: EntityRef,
        speed: f64,
    },
}

/// Settings the executor needs that don't change per trigger.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Author name on chat notifications
    pub chat_name: String,
    /// Whether a speech backend is present
    pub speech_available: bool,
}

/// Scale an authored delay (ms) by the trigger's speed.
///
/// Non-finite or non-positive speeds are treated as 1.0.
pub fn scale_delay(delay_ms: u64, speed: f64) -> Duration {
    let speed = if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    };
    let nanos = (delay_ms as f64 * 1_000_000.0 / speed).round();
    Duration::from_nanos(nanos as u64)
}

pub struct ActionExecutor<'a> {
    timers: &'a mut TimerRegistry<Job>,
    settings: &'a ExecutorSettings,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(timers: &'a mut TimerRegistry<Job>, settings: &'a ExecutorSettings) -> Self {
        Self { timers, settings }
    }

    /// Schedule a matched sequence in order.
    pub fn execute(&mut self, actions: &[Action], entity: &EntityRef, speed: f64) {
        for action in actions {
            self.run(action, entity, speed);
        }
    }

    pub fn run(&mut self, action: &Action, entity: &EntityRef, speed: f64) {
        match action {
            Action::Spawn(spawn) => self.spawn(spawn, entity, speed),
            Action::Text(text) => self.text(text, speed),
            Action::Sound(sound) => self.sound(sound),
            Action::StopTimer(stop) => self.stop_timer(stop),
            Action::Callback(callback) => self.callback(callback, entity, speed),
        }
    }

    fn spawn(&mut self, spawn: &SpawnAction, entity: &EntityRef, speed: f64) {
        let object_id = self.timers.allocate_id();

        let mut location = spawn.position.unwrap_or(entity.location);
        location.w = entity.location.w + spawn.offset;
        location.apply_distance(spawn.distance);

        self.timers.schedule(
            TimerKey::Engine(object_id),
            scale_delay(spawn.delay, speed),
            Job::Emit(Effect::SpawnObject {
                object_id,
                item_id: spawn.item_id,
                amount: 1,
                location,
            }),
        );

        self.timers.schedule_engine(
            scale_delay(spawn.sub_delay, speed),
            Job::Emit(Effect::DespawnObject {
                object_id,
                collected: false,
            }),
        );
    }

    fn text(&mut self, text: &TextAction, speed: f64) {
        let job = match text.kind {
            TextKind::Message => Job::Emit(Effect::EventMessage {
                message: text.message.clone(),
                kind: EVENT_MESSAGE_KIND,
            }),
            TextKind::Notification => Job::Emit(Effect::ChatNotification {
                channel: NOTIFICATION_CHANNEL,
                author: self.settings.chat_name.clone(),
                message: text.message.clone(),
            }),
            TextKind::Speech => {
                if !self.settings.speech_available {
                    return;
                }
                Job::Speak(text.message.clone())
            }
        };

        self.schedule_keyed(text.id, scale_delay(text.delay, speed), job);
    }

    fn sound(&mut self, sound: &SoundAction) {
        self.timers.schedule(
            TimerKey::Author(sound.sound_id),
            Duration::ZERO,
            Job::Emit(Effect::PlaySound {
                sound_id: sound.sound_id,
            }),
        );
    }

    fn stop_timer(&mut self, stop: &StopTimerAction) {
        let key = TimerKey::Author(stop.timer_id);
        if !self.timers.cancel(&key) {
            tracing::debug!(target: "guide", timer = %key, "No active timer to stop");
        }
    }

    fn callback(&mut self, callback: &CallbackAction, entity: &EntityRef, speed: f64) {
        let job = Job::Invoke {
            callback: callback.callback.clone(),
            action: callback.clone(),
            entity: *entity,
            speed,
        };
        self.schedule_keyed(callback.id, scale_delay(callback.delay, speed), job);
    }

    fn schedule_keyed(&mut self, id: Option<u32>, delay: Duration, job: Job) -> TimerKey {
        match id {
            Some(id) => self.timers.schedule(TimerKey::Author(id), delay, job),
            None => self.timers.schedule_engine(delay, job),
        }
    }
}

/// Handle given to guide callbacks for composing further text actions.
pub struct TextHandler<'a> {
    executor: ActionExecutor<'a>,
    speed: f64,
}

impl<'a> TextHandler<'a> {
    pub fn new(executor: ActionExecutor<'a>, speed: f64) -> Self {
        Self { executor, speed }
    }

    /// Speed of the trigger that scheduled the callback.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Schedule a text action at the triggering speed.
    pub fn schedule(&mut self, text: &TextAction) {
        self.executor.text(text, self.speed);
    }

    /// Schedule a text action at an explicit speed.
    pub fn schedule_at(&mut self, text: &TextAction, speed: f64) {
        self.executor.text(text, speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Location, MobClass};

    fn settings(speech_available: bool) -> ExecutorSettings {
        ExecutorSettings {
            chat_name: "Guide".to_string(),
            speech_available,
        }
    }

    fn boss() -> EntityRef {
        EntityRef::new(MobClass::new(3026, 1000), Location::new(100.0, 200.0, 10.0, 0.0))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_scale_delay() {
        assert_eq!(scale_delay(1000, 1.0), ms(1000));
        assert_eq!(scale_delay(1000, 2.0), ms(500));
        assert_eq!(scale_delay(1000, 0.5), ms(2000));
        assert_eq!(scale_delay(0, 3.0), Duration::ZERO);
    }

    #[test]
    fn test_scale_delay_bad_speed_falls_back() {
        assert_eq!(scale_delay(800, 0.0), ms(800));
        assert_eq!(scale_delay(800, -2.0), ms(800));
        assert_eq!(scale_delay(800, f64::NAN), ms(800));
        assert_eq!(scale_delay(800, f64::INFINITY), ms(800));
    }

    #[test]
    fn test_doubling_speed_halves_delay() {
        for delay in [0u64, 1, 250, 1000, 4096, 123_456] {
            for speed in [0.25, 0.5, 1.0, 1.5, 3.0, 8.0] {
                let slow = scale_delay(delay, speed).as_nanos() as i128;
                let fast = scale_delay(delay, speed * 2.0).as_nanos() as i128;
                // Rounding to whole nanoseconds can cost at most one unit
                assert!((slow - 2 * fast).abs() <= 1, "delay={delay} speed={speed}");
            }
        }
    }

    #[test]
    fn test_spawn_schedules_independent_spawn_and_despawn() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        let spawn = SpawnAction {
            item_id: 42,
            delay: 0,
            sub_delay: 5000,
            offset: 0.0,
            distance: 50.0,
            position: None,
        };

        ActionExecutor::new(&mut timers, &settings).run(&Action::Spawn(spawn), &boss(), 1.0);
        assert_eq!(timers.len(), 2);

        let (spawn_key, job) = timers.pop_due(ms(0)).unwrap();
        let Job::Emit(Effect::SpawnObject {
            object_id,
            item_id,
            location,
            ..
        }) = job
        else {
            panic!("expected spawn, got {job:?}");
        };
        assert_eq!(spawn_key, TimerKey::Engine(object_id));
        assert_eq!(item_id, 42);
        assert!((location.x - 150.0).abs() < 1e-3);
        assert!((location.y - 200.0).abs() < 1e-3);

        assert_eq!(timers.next_deadline(), Some(ms(5000)));
        let (_, job) = timers.pop_due(ms(5000)).unwrap();
        assert_eq!(
            job,
            Job::Emit(Effect::DespawnObject {
                object_id,
                collected: false
            })
        );
    }

    #[test]
    fn test_spawn_cancelling_one_timer_keeps_the_other() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        let spawn = SpawnAction {
            item_id: 1,
            delay: 1000,
            sub_delay: 3000,
            offset: 0.0,
            distance: 0.0,
            position: None,
        };
        ActionExecutor::new(&mut timers, &settings).run(&Action::Spawn(spawn), &boss(), 1.0);

        let spawn_key = timers
            .keys()
            .copied()
            .find(|k| timers.due(k) == Some(ms(1000)))
            .unwrap();
        assert!(timers.cancel(&spawn_key));
        assert_eq!(timers.len(), 1);
        assert!(matches!(
            timers.pop_due(ms(3000)),
            Some((_, Job::Emit(Effect::DespawnObject { .. })))
        ));
    }

    #[test]
    fn test_spawn_explicit_position_keeps_offset_heading() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        let spawn = SpawnAction {
            item_id: 1,
            delay: 0,
            sub_delay: 100,
            offset: std::f32::consts::PI,
            distance: 10.0,
            position: Some(Location::new(0.0, 0.0, 0.0, 0.0)),
        };
        ActionExecutor::new(&mut timers, &settings).run(&Action::Spawn(spawn), &boss(), 1.0);

        let Some((_, Job::Emit(Effect::SpawnObject { location, .. }))) = timers.pop_due(ms(0))
        else {
            panic!("expected spawn");
        };
        assert!((location.x + 10.0).abs() < 1e-3);
        assert!(location.y.abs() < 1e-3);
        assert!((location.w - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_text_uses_author_id_when_given() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        let mut text = TextAction::new(TextKind::Notification, "Enrage", 1000);
        text.id = Some(12);

        ActionExecutor::new(&mut timers, &settings).run(&Action::Text(text), &boss(), 2.0);

        assert_eq!(timers.due(&TimerKey::Author(12)), Some(ms(500)));
        assert_eq!(
            timers.get(&TimerKey::Author(12)),
            Some(&Job::Emit(Effect::ChatNotification {
                channel: NOTIFICATION_CHANNEL,
                author: "Guide".to_string(),
                message: "Enrage".to_string(),
            }))
        );
    }

    #[test]
    fn test_speech_without_backend_schedules_nothing() {
        let text = Action::Text(TextAction::new(TextKind::Speech, "Move out", 0));

        let without = settings(false);
        let mut timers = TimerRegistry::new();
        ActionExecutor::new(&mut timers, &without).run(&text, &boss(), 1.0);
        assert!(timers.is_empty());

        let with = settings(true);
        ActionExecutor::new(&mut timers, &with).run(&text, &boss(), 1.0);
        assert_eq!(
            timers.pop_due(ms(0)).map(|(_, job)| job),
            Some(Job::Speak("Move out".to_string()))
        );
    }

    #[test]
    fn test_sound_keys_on_sound_id_and_ignores_speed() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        ActionExecutor::new(&mut timers, &settings).run(
            &Action::Sound(SoundAction { sound_id: 7 }),
            &boss(),
            4.0,
        );
        assert_eq!(timers.due(&TimerKey::Author(7)), Some(Duration::ZERO));
    }

    #[test]
    fn test_stop_timer_missing_id_leaves_others() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        let mut exec = ActionExecutor::new(&mut timers, &settings);
        let mut text = TextAction::new(TextKind::Message, "a", 100);
        text.id = Some(1);
        exec.run(&Action::Text(text), &boss(), 1.0);
        exec.run(&Action::StopTimer(StopTimerAction { timer_id: 2 }), &boss(), 1.0);

        assert_eq!(timers.len(), 1);
        assert!(timers.contains(&TimerKey::Author(1)));
    }

    #[test]
    fn test_stop_timer_cancels_author_timer() {
        let settings = settings(false);
        let mut timers = TimerRegistry::new();
        let mut exec = ActionExecutor::new(&mut timers, &settings);
        let mut text = TextAction::new(TextKind::Message, "a", 100);
        text.id = Some(1);
        exec.run(&Action::Text(text), &boss(), 1.0);
        exec.run(&Action::StopTimer(StopTimerAction { timer_id: 1 }), &boss(), 1.0);

        assert!(timers.is_empty());
    }
}
