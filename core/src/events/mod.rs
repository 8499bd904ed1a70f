pub mod effect;
pub mod signal;

pub use effect::{Effect, EffectSink, SpeechBackend, EVENT_MESSAGE_KIND, NOTIFICATION_CHANNEL};
pub use signal::GuideEvent;
