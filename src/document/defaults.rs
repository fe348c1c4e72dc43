use crate::types::{Arena, Entity, EntityKind, Motion, Vec2};

use super::ids::IdGenerator;
use super::{Document, EditSettings, SimulationState};

pub const ENTITY_PREFIX: &str = "ent";
pub const AOE_PREFIX: &str = "aoe";
pub const ACTION_PREFIX: &str = "act";

pub fn create_entity(ids: &mut IdGenerator, kind: EntityKind, position: Vec2, z_index: i64) -> Entity {
    Entity {
        id: ids.next_id(ENTITY_PREFIX),
        kind,
        position,
        z_index,
        motion: Motion::None,
    }
}

/// Starter scene: a boss in the middle of the arena, two players south of it.
pub fn default_entities(ids: &mut IdGenerator) -> Vec<Entity> {
    vec![
        create_entity(ids, EntityKind::Boss, Vec2::ORIGIN, 1),
        create_entity(ids, EntityKind::Player, Vec2::new(-80.0, 160.0), 2),
        create_entity(ids, EntityKind::Player, Vec2::new(80.0, 160.0), 3),
    ]
}

pub fn default_document(ids: &mut IdGenerator, settings: &EditSettings) -> Document {
    Document {
        arena: Arena::default(),
        entities: default_entities(ids),
        aoes: Vec::new(),
        actions: Vec::new(),
        timeline_duration_ms: settings.default_timeline_duration_ms,
        simulation: SimulationState::default(),
    }
}
