//! Outbound side effects.
//!
//! Everything a guide ends up doing is expressed as an [`Effect`] handed to an
//! [`EffectSink`]. Sends are fire-and-forget: the engine never observes whether
//! the client accepted them.

use tokio::sync::mpsc::UnboundedSender;

use crate::world::Location;

/// Chat channel used for guide notifications.
pub const NOTIFICATION_CHANNEL: u32 = 21;

/// Event-message style used for on-screen guide messages.
pub const EVENT_MESSAGE_KIND: u32 = 41;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Place a marker object in the world
    SpawnObject {
        object_id: u64,
        item_id: u32,
        amount: u32,
        location: Location,
    },
    /// Remove a previously spawned marker
    DespawnObject { object_id: u64, collected: bool },
    PlaySound { sound_id: u32 },
    /// Centered on-screen message
    EventMessage { message: String, kind: u32 },
    /// Chat line on the notification channel
    ChatNotification {
        channel: u32,
        author: String,
        message: String,
    },
}

/// Destination for outbound effects.
pub trait EffectSink {
    fn emit(&mut self, effect: Effect);
}

impl EffectSink for UnboundedSender<Effect> {
    fn emit(&mut self, effect: Effect) {
        if self.send(effect).is_err() {
            tracing::debug!(target: "guide", "Effect receiver dropped, discarding effect");
        }
    }
}

impl EffectSink for Vec<Effect> {
    fn emit(&mut self, effect: Effect) {
        self.push(effect);
    }
}

/// Optional local text-to-speech.
pub trait SpeechBackend {
    fn speak(&mut self, text: &str);
}
