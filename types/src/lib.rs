//! Shared configuration types for warden.
//!
//! These live in their own crate so the engine and the operator CLI agree on
//! one serialized shape for the config file.

pub mod config;

pub use config::{DebugFlags, GuideConfig, DEFAULT_CHAT_NAME};
