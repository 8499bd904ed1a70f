//! Entity table backing the REPL.
//!
//! Mobs are registered by hand with the `mob` command; there is no world
//! model behind them beyond id, class and position.

use hashbrown::HashMap;
use warden_core::{EntityLookup, EntityRef, GameId};

#[derive(Debug, Default)]
pub struct MobTable {
    mobs: HashMap<GameId, EntityRef>,
    local_player: GameId,
}

impl MobTable {
    pub fn new(local_player: GameId) -> Self {
        Self {
            mobs: HashMap::new(),
            local_player,
        }
    }

    pub fn insert(&mut self, id: GameId, entity: EntityRef) -> Option<EntityRef> {
        self.mobs.insert(id, entity)
    }

    pub fn remove(&mut self, id: GameId) -> Option<EntityRef> {
        self.mobs.remove(&id)
    }

    /// Forget every mob. The `zone` command does this before loading.
    pub fn clear(&mut self) {
        self.mobs.clear();
    }

    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }
}

impl EntityLookup for MobTable {
    fn find_mob(&self, id: GameId) -> Option<EntityRef> {
        self.mobs.get(&id).copied()
    }

    fn is_local_player(&self, id: GameId) -> bool {
        id == self.local_player
    }

    /// Skill ids on the wire carry a type tag in the upper bits.
    fn resolve_skill_id(&self, raw_skill: u64) -> u32 {
        (raw_skill & 0x0FFF_FFFF) as u32
    }
}
