//! Entity model boundary.
//!
//! The engine never owns entity state. It reads mob identity and position
//! through [`EntityLookup`], which the embedding application implements on
//! top of whatever world model it keeps.

use serde::{Deserialize, Serialize};

/// Server-assigned identifier of a live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    /// Sentinel meaning "no entity" (server-originated effects carry it as source).
    pub const NONE: GameId = GameId(0);
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a mob class: which hunting zone it belongs to and its template.
///
/// This is all the trigger key cares about; two mobs of the same class are
/// indistinguishable to a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MobClass {
    pub hunting_zone_id: u32,
    pub template_id: u32,
}

impl MobClass {
    /// Stand-in for triggers with no mob behind them.
    pub const AMBIENT: MobClass = MobClass {
        hunting_zone_id: 0,
        template_id: 0,
    };

    pub fn new(hunting_zone_id: u32, template_id: u32) -> Self {
        Self {
            hunting_zone_id,
            template_id,
        }
    }

    /// Template ids that are exact multiples of 1000 are bosses by convention.
    pub fn is_boss(&self) -> bool {
        self.template_id % 1000 == 0
    }
}

/// World position plus heading `w` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub w: f32,
}

impl Location {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Move `distance` units along the current heading.
    pub fn apply_distance(&mut self, distance: f32) {
        self.x += self.w.cos() * distance;
        self.y += self.w.sin() * distance;
    }
}

/// A mob as seen by the engine at the moment a trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntityRef {
    pub class: MobClass,
    pub location: Location,
}

impl EntityRef {
    pub fn new(class: MobClass, location: Location) -> Self {
        Self { class, location }
    }

    /// The synthetic `{0, 0}` entity used for server-applied abnormalities.
    pub fn ambient() -> Self {
        Self::new(MobClass::AMBIENT, Location::default())
    }
}

/// Read-only view of the external entity model.
pub trait EntityLookup {
    /// Find a tracked mob by id. Players and unknown ids return None.
    fn find_mob(&self, id: GameId) -> Option<EntityRef>;

    /// Whether `id` is the local player.
    fn is_local_player(&self, id: GameId) -> bool;

    /// Map the raw skill field of a cast event to the skill id guides key on.
    fn resolve_skill_id(&self, raw_skill: u64) -> u32;

    /// The id an abnormality carries as source when nothing applied it.
    fn empty_source(&self) -> GameId {
        GameId::NONE
    }
}
