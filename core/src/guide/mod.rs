//! Guide definitions
//!
//! A guide is a per-zone table mapping trigger keys to ordered action lists.
//!
//! ```text
//! <zone>.toml ──▶ GuideDocument (untyped values) ──▶ GuideTable (typed Action)
//!                                                        │
//!                                       GuideEngine looks up TriggerKey
//! ```

pub mod action;
pub mod callbacks;
pub mod source;
pub mod table;

pub use action::{
    Action, ActionError, ActionSpec, CallbackAction, SoundAction, SpawnAction, StopTimerAction,
    TextAction, TextKind,
};
pub use callbacks::{CallbackFn, CallbackRegistry, GuideFn};
pub use source::{
    default_builtin_dir, default_user_dir, load_file, resolve_guide_dir, DirectoryGuideSource,
    GuideError, GuideSource,
};
pub use table::{GuideDocument, GuideTable};
