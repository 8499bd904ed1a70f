pub mod engine;
pub mod events;
pub mod executor;
pub mod guide;
pub mod runner;
pub mod timers;
pub mod trigger;
pub mod world;

// Re-exports for convenience
pub use engine::{EngineStatus, GuideEngine};
pub use events::{Effect, EffectSink, GuideEvent, SpeechBackend};
pub use executor::{ActionExecutor, Job, TextHandler};
pub use guide::{CallbackRegistry, DirectoryGuideSource, GuideError, GuideSource, GuideTable};
pub use runner::{Control, Runner, RunnerInput};
pub use timers::{TimerKey, TimerRegistry};
pub use trigger::{resolve, TriggerKey, TriggerKind};
pub use world::{EntityLookup, EntityRef, GameId, Location, MobClass};
