//! Trigger key resolution.
//!
//! A trigger key is `prefix-huntingZoneId-templateId-eventId`. The prefix
//! separates trigger categories so a skill and an abnormality with the same
//! numeric id never collide.

use std::fmt;

use crate::world::MobClass;

/// Which kind of event produced a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// A mob cast a skill
    Skill,
    /// A mob applied an abnormality to the local player
    MobAbnormality,
    /// An abnormality with no source landed on the local player
    AmbientAbnormality,
    /// A mob received an abnormality
    TargetAbnormality,
    /// A boss health bar crossed a whole percent
    Health,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 5] = [
        Self::Skill,
        Self::MobAbnormality,
        Self::AmbientAbnormality,
        Self::TargetAbnormality,
        Self::Health,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Skill => "s",
            Self::MobAbnormality => "am",
            Self::AmbientAbnormality => "ae",
            Self::TargetAbnormality => "ab",
            Self::Health => "h",
        }
    }

    /// Category label used in trigger traces.
    pub fn category(self) -> &'static str {
        match self {
            Self::Skill => "Skill",
            Self::MobAbnormality | Self::AmbientAbnormality | Self::TargetAbnormality => {
                "Abnormality"
            }
            Self::Health => "Health",
        }
    }
}

/// Canonical lookup key into a guide table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerKey(String);

impl TriggerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The `prefix-huntingZoneId-templateId` part identifying who triggered.
pub fn trigger_source(class: &MobClass, kind: TriggerKind) -> String {
    format!(
        "{}-{}-{}",
        kind.prefix(),
        class.hunting_zone_id,
        class.template_id
    )
}

/// Build the lookup key for `event_id` raised by (or on) a mob of `class`.
pub fn resolve(class: &MobClass, event_id: u32, kind: TriggerKind) -> TriggerKey {
    TriggerKey(format!("{}-{}", trigger_source(class, kind), event_id))
}

/// Whole health percent, `floor(cur / max * 100)`, clamped to 100.
/// Returns None for an empty health bar (`max_hp == 0`).
pub fn health_percent(cur_hp: u64, max_hp: u64) -> Option<u32> {
    if max_hp == 0 {
        return None;
    }
    let percent = (cur_hp as u128 * 100) / max_hp as u128;
    Some(percent.min(100) as u32)
}
