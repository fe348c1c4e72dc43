//! What a renderer needs to draw one instant of the document.

use crate::document::Document;
use crate::document::keyframes::keyframe_near;
use crate::types::{Aoe, Arena, Entity, Motion, PathPoint, Vec2};

use super::math::bearing;
use super::motion::{evaluate, sorted};

/// AoEs visible at `time_ms`, in list order.
pub fn visible_aoes(aoes: &[Aoe], time_ms: f64) -> impl Iterator<Item = &Aoe> {
    aoes.iter().filter(move |aoe| aoe.timing.is_visible_at(time_ms))
}

/// Direction of travel in degrees at `time_ms` for paths flagged
/// `align_rotation`; `None` when the entity does not align or is not moving
/// along a segment.
pub fn facing(motion: &Motion, time_ms: f64) -> Option<f64> {
    let Motion::Path(path) = motion else {
        return None;
    };
    if !path.align_rotation || path.points.len() < 2 {
        return None;
    }
    let points = sorted(&path.points);
    let first = points.first()?;
    let last = points.last()?;
    let span = last.at_ms - first.at_ms;
    let t = if path.looping && span > 0.0 && time_ms >= last.at_ms {
        first.at_ms + (time_ms - first.at_ms) % span
    } else {
        time_ms.max(first.at_ms).min(last.at_ms)
    };
    points
        .windows(2)
        .find(|w| w[0].at_ms <= t && t <= w[1].at_ms && w[0].at_ms < w[1].at_ms)
        .and_then(|w| bearing(w[0].position(), w[1].position()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityView<'a> {
    pub entity: &'a Entity,
    pub position: Vec2,
    /// Heading in degrees when the entity's path aligns rotation.
    pub facing: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeHandle {
    pub index: usize,
    pub point: PathPoint,
    /// The keyframe a path-edit drag would move right now.
    pub active: bool,
}

/// A snapshot of the scene at the document's current time. Entities and AoEs
/// come back-to-front by z-index.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView<'a> {
    pub time_ms: f64,
    pub arena: &'a Arena,
    pub entities: Vec<EntityView<'a>>,
    pub aoes: Vec<&'a Aoe>,
    pub handles: Vec<KeyframeHandle>,
}

impl<'a> FrameView<'a> {
    pub fn build(doc: &'a Document, selected: Option<&str>, tolerance_ms: f64) -> Self {
        let time_ms = doc.simulation.time_ms;

        let mut entities: Vec<EntityView<'a>> = doc
            .entities
            .iter()
            .map(|entity| EntityView {
                entity,
                position: evaluate(&entity.motion, entity.position, time_ms),
                facing: facing(&entity.motion, time_ms),
            })
            .collect();
        entities.sort_by_key(|view| view.entity.z_index);

        let mut aoes: Vec<&Aoe> = visible_aoes(&doc.aoes, time_ms).collect();
        aoes.sort_by_key(|aoe| aoe.z_index);

        let handles = selected
            .and_then(|id| doc.entity(id))
            .map(|entity| {
                let points = entity.motion.points();
                let active = keyframe_near(points, time_ms, tolerance_ms);
                points
                    .iter()
                    .enumerate()
                    .map(|(index, point)| KeyframeHandle {
                        index,
                        point: *point,
                        active: active == Some(index),
                    })
                    .collect()
            })
            .unwrap_or_default();

        FrameView {
            time_ms,
            arena: &doc.arena,
            entities,
            aoes,
            handles,
        }
    }

    pub fn entity(&self, id: &str) -> Option<&EntityView<'a>> {
        self.entities.iter().find(|view| view.entity.id == id)
    }
}
