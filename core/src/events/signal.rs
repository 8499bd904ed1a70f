use crate::world::GameId;

/// Inbound events the engine reacts to.
///
/// These are the already-decoded protocol messages; the engine never sees
/// wire data. Each variant carries exactly the fields trigger resolution needs.
#[derive(Debug, Clone, PartialEq)]
pub enum GuideEvent {
    // Combat
    SkillCast {
        source: GameId,
        /// Raw skill field, resolved through `EntityLookup::resolve_skill_id`
        skill: u64,
        /// Animation speed of the cast; scales every delay it triggers
        speed: f32,
    },

    // Abnormalities
    AbnormalityBegin {
        target: GameId,
        /// None when the protocol omitted the source
        source: Option<GameId>,
        abnormality_id: u32,
    },
    AbnormalityRefresh {
        target: GameId,
        source: Option<GameId>,
        abnormality_id: u32,
    },

    // Boss health bar
    BossGauge {
        id: GameId,
        cur_hp: u64,
        max_hp: u64,
    },

    // Area transitions
    ZoneLoaded {
        zone: u32,
    },
}

impl GuideEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SkillCast { .. } => "skill_cast",
            Self::AbnormalityBegin { .. } => "abnormality_begin",
            Self::AbnormalityRefresh { .. } => "abnormality_refresh",
            Self::BossGauge { .. } => "boss_gauge",
            Self::ZoneLoaded { .. } => "zone_loaded",
        }
    }
}
