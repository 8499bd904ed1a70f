//! Engine configuration as stored on disk.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Author name used for chat notifications when the config doesn't set one.
pub const DEFAULT_CHAT_NAME: &str = "Guide";

/// Top-level configuration for the guide engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Whether triggers schedule anything at all
    pub enabled: bool,

    /// Per-category trace switches
    pub debug: DebugFlags,

    /// Author name shown on chat notifications
    #[serde(rename = "chat-name", alias = "chat_name")]
    pub chat_name: String,

    /// Directory holding `<zone>.toml` guides (None = platform default)
    pub guide_dir: Option<PathBuf>,

    /// Game id of the local player, used by the CLI's entity table
    pub local_player: u64,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: DebugFlags::default(),
            chat_name: DEFAULT_CHAT_NAME.to_string(),
            guide_dir: None,
            local_player: 0,
        }
    }
}

/// Named debug switches, toggled individually by the operator.
///
/// `debug` is the catch-all: when set, every trigger category is traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    pub debug: bool,
    pub skill: bool,
    pub boss: bool,
    pub abnormal: bool,
    pub hp: bool,
}

impl DebugFlags {
    /// Flag names accepted by [`DebugFlags::get`] and [`DebugFlags::toggle`].
    pub const NAMES: [&'static str; 5] = ["debug", "skill", "boss", "abnormal", "hp"];

    fn slot(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "debug" => Some(&mut self.debug),
            "skill" => Some(&mut self.skill),
            "boss" => Some(&mut self.boss),
            "abnormal" => Some(&mut self.abnormal),
            "hp" => Some(&mut self.hp),
            _ => None,
        }
    }

    /// Look up a flag by name.
    pub fn get(&self, name: &str) -> Option<bool> {
        let mut flags = *self;
        flags.slot(name).map(|flag| *flag)
    }

    /// Flip a flag by name, returning its new value (None = unknown flag).
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let flag = self.slot(name)?;
        *flag = !*flag;
        Some(*flag)
    }

    /// Skill casts are traced for any mob when `skill` is set, and for boss
    /// templates (template id divisible by 1000) when `boss` is set.
    pub fn traces_skill(&self, template_id: u32) -> bool {
        self.debug || self.skill || (self.boss && template_id % 1000 == 0)
    }

    pub fn traces_abnormal(&self) -> bool {
        self.debug || self.abnormal
    }

    pub fn traces_hp(&self) -> bool {
        self.debug || self.hp
    }
}
