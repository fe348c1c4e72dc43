//! Shared data contract for the arena timeline.
//!
//! This module defines everything the document stores and the engine reads:
//! - authored content: `Arena`, `Entity`, `Aoe`, `BossAction`
//! - the time-dependent pieces they carry: `Motion`, `AoeTiming`
//!
//! Field names serialize in camelCase so exported documents stay readable by
//! other tools working on the same format.

use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::engine::math::{
    MAX_SECTOR_DEG, MIN_DIMENSION, MIN_RADIUS, MIN_RING_GAP, MIN_SECTOR_DEG, clamp, finite_or,
};

// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ORIGIN: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Replace non-finite components with the matching component of `fallback`.
    pub fn finite_or(self, fallback: Vec2) -> Vec2 {
        Vec2 {
            x: finite_or(self.x, fallback.x),
            y: finite_or(self.y, fallback.y),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

pub const DEFAULT_ARENA_RADIUS: f64 = 320.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum Arena {
    Circle { radius: f64 },
    Rect { width: f64, height: f64 },
}

impl Default for Arena {
    fn default() -> Self {
        Arena::Circle {
            radius: DEFAULT_ARENA_RADIUS,
        }
    }
}

impl Arena {
    /// Clamp dimensions to positive minima.
    pub fn sanitized(&self) -> Arena {
        match *self {
            Arena::Circle { radius } => Arena::Circle {
                radius: at_least(radius, MIN_RADIUS),
            },
            Arena::Rect { width, height } => Arena::Rect {
                width: at_least(width, MIN_DIMENSION),
                height: at_least(height, MIN_DIMENSION),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntityKind {
    Boss,
    Player,
    Item,
    Marker {
        #[serde(default)]
        label: String,
    },
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Boss => "boss",
            EntityKind::Player => "player",
            EntityKind::Item => "item",
            EntityKind::Marker { .. } => "marker",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub kind: EntityKind,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default)]
    pub motion: Motion,
}

impl Entity {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EntityKind::Boss)
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// How an entity moves over time. A path with no points behaves as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Motion {
    #[default]
    None,
    Path(PathMotion),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMotion {
    #[serde(default)]
    pub points: Vec<PathPoint>,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    /// Orientation hint for whoever draws the entity; the engine never reads it.
    #[serde(default)]
    pub align_rotation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub at_ms: f64,
}

impl PathPoint {
    pub const fn new(x: f64, y: f64, at_ms: f64) -> Self {
        PathPoint { x, y, at_ms }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.at_ms.is_finite()
    }
}

// ---------------------------------------------------------------------------
// AoEs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "shape",
    content = "shapeParams",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum AoeShape {
    Circle { radius: f64 },
    Semicircle { radius: f64 },
    Sector { radius: f64, angle_deg: f64 },
    Rect { width: f64, height: f64 },
    Line { length: f64, width: f64 },
    Ring { inner_radius: f64, outer_radius: f64 },
}

impl AoeShape {
    pub fn name(&self) -> &'static str {
        match self {
            AoeShape::Circle { .. } => "circle",
            AoeShape::Semicircle { .. } => "semicircle",
            AoeShape::Sector { .. } => "sector",
            AoeShape::Rect { .. } => "rect",
            AoeShape::Line { .. } => "line",
            AoeShape::Ring { .. } => "ring",
        }
    }

    /// Clamp every dimension to its positive minimum so no degenerate shape
    /// ever reaches the document.
    pub fn sanitized(&self) -> AoeShape {
        match *self {
            AoeShape::Circle { radius } => AoeShape::Circle {
                radius: at_least(radius, MIN_RADIUS),
            },
            AoeShape::Semicircle { radius } => AoeShape::Semicircle {
                radius: at_least(radius, MIN_RADIUS),
            },
            AoeShape::Sector { radius, angle_deg } => AoeShape::Sector {
                radius: at_least(radius, MIN_RADIUS),
                angle_deg: clamp(finite_or(angle_deg, MAX_SECTOR_DEG), MIN_SECTOR_DEG, MAX_SECTOR_DEG),
            },
            AoeShape::Rect { width, height } => AoeShape::Rect {
                width: at_least(width, MIN_DIMENSION),
                height: at_least(height, MIN_DIMENSION),
            },
            AoeShape::Line { length, width } => AoeShape::Line {
                length: at_least(length, MIN_DIMENSION),
                width: at_least(width, MIN_DIMENSION),
            },
            AoeShape::Ring {
                inner_radius,
                outer_radius,
            } => {
                let inner = at_least(inner_radius, MIN_RADIUS);
                AoeShape::Ring {
                    inner_radius: inner,
                    outer_radius: at_least(outer_radius, inner + MIN_RING_GAP),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AoeTiming {
    #[serde(default)]
    pub start_at_ms: f64,
    #[serde(default)]
    pub delay_ms: f64,
    #[serde(default)]
    pub duration_ms: f64,
}

impl AoeTiming {
    pub fn visible_from(&self) -> f64 {
        self.start_at_ms + self.delay_ms
    }

    pub fn visible_until(&self) -> f64 {
        self.visible_from() + self.duration_ms
    }

    /// Both ends of the visibility window are inclusive.
    pub fn is_visible_at(&self, time_ms: f64) -> bool {
        time_ms >= self.visible_from() && time_ms <= self.visible_until()
    }

    pub fn sanitized(&self) -> AoeTiming {
        AoeTiming {
            start_at_ms: finite_or(self.start_at_ms, 0.0).max(0.0),
            delay_ms: finite_or(self.delay_ms, 0.0).max(0.0),
            duration_ms: finite_or(self.duration_ms, 0.0).max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aoe {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub shape: AoeShape,
    #[serde(default)]
    pub position: Vec2,
    /// Degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub timing: AoeTiming,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_action_id: Option<String>,
}

impl Aoe {
    /// Derived AoEs are produced by fired actions and owned by the scheduler.
    pub fn is_derived(&self) -> bool {
        self.source_action_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Scheduled boss actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossAction {
    #[serde(default)]
    pub id: String,
    pub at_ms: f64,
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Engine state, never authored: true once the action has spawned its AoE.
    #[serde(default)]
    pub executed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ActionKind {
    #[serde(rename = "spawnAoE")]
    SpawnAoe(SpawnAoe),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionMode {
    /// Spawn at the absolute `position`.
    #[default]
    Position,
    /// Spawn at the boss position plus `offset`.
    Offset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnAoe {
    #[serde(flatten)]
    pub shape: AoeShape,
    #[serde(default)]
    pub position_mode: PositionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Vec2>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub delay_ms: f64,
    #[serde(default)]
    pub duration_ms: f64,
}

fn at_least(v: f64, min: f64) -> f64 {
    finite_or(v, min).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aoe_visibility_window_is_inclusive() {
        let timing = AoeTiming {
            start_at_ms: 1000.0,
            delay_ms: 200.0,
            duration_ms: 500.0,
        };
        assert!(!timing.is_visible_at(1199.0));
        assert!(timing.is_visible_at(1200.0));
        assert!(timing.is_visible_at(1450.0));
        assert!(timing.is_visible_at(1700.0));
        assert!(!timing.is_visible_at(1701.0));
    }

    #[test]
    fn degenerate_shapes_are_clamped() {
        let ring = AoeShape::Ring {
            inner_radius: -5.0,
            outer_radius: 0.0,
        }
        .sanitized();
        assert_eq!(
            ring,
            AoeShape::Ring {
                inner_radius: MIN_RADIUS,
                outer_radius: MIN_RADIUS + MIN_RING_GAP,
            }
        );

        let sector = AoeShape::Sector {
            radius: f64::NAN,
            angle_deg: 720.0,
        }
        .sanitized();
        assert_eq!(
            sector,
            AoeShape::Sector {
                radius: MIN_RADIUS,
                angle_deg: MAX_SECTOR_DEG,
            }
        );
    }

    #[test]
    fn entity_json_uses_flat_type_tag() {
        let json = r#"{"id":"ent-1","type":"marker","label":"A","position":{"x":1,"y":2}}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.kind, EntityKind::Marker { label: "A".into() });
        assert_eq!(entity.motion, Motion::None);
        assert_eq!(entity.z_index, 0);
    }

    #[test]
    fn action_json_carries_payload_shape_params() {
        let json = r#"{
            "id": "act-1",
            "atMs": 500,
            "type": "spawnAoE",
            "payload": {
                "shape": "circle",
                "shapeParams": {"radius": 40},
                "positionMode": "offset",
                "offset": {"x": 10, "y": 0},
                "durationMs": 1000
            }
        }"#;
        let action: BossAction = serde_json::from_str(json).unwrap();
        let ActionKind::SpawnAoe(spawn) = &action.kind;
        assert_eq!(spawn.shape, AoeShape::Circle { radius: 40.0 });
        assert_eq!(spawn.position_mode, PositionMode::Offset);
        assert_eq!(spawn.offset, Some(Vec2::new(10.0, 0.0)));
        assert!(!action.executed);
    }
}
