//! Path keyframe editing.
//!
//! Every edit re-sorts the keyframes afterwards, so an index handed out
//! before an edit may point somewhere else after it.

use crate::engine::math::finite_or;
use crate::error::EditError;
use crate::types::{Entity, Motion, PathMotion, PathPoint, Vec2};

use super::Document;

/// How a drag on an entity is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Move the entity's resting position.
    Free,
    /// Shape the entity's path: edit the keyframe near the current time, or
    /// add one.
    PathEdit,
}

/// Index of the keyframe closest to `time_ms`, if one lies within
/// `tolerance_ms`. Ties go to the earlier keyframe.
pub fn keyframe_near(points: &[PathPoint], time_ms: f64, tolerance_ms: f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p.at_ms - time_ms).abs()))
        .filter(|&(_, distance)| distance <= tolerance_ms)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

fn edit_points(
    doc: &Document,
    id: &str,
    edit: impl FnOnce(&mut Entity) -> Result<(), EditError>,
) -> Result<Document, EditError> {
    let mut next = doc.clone();
    let entity = next.entity_mut(id)?;
    edit(entity)?;
    entity.motion = entity.motion.normalized();
    Ok(next)
}

/// Add a keyframe, turning a motionless entity into a path follower.
pub fn insert_keyframe(doc: &Document, id: &str, point: PathPoint) -> Result<Document, EditError> {
    edit_points(doc, id, |entity| {
        match entity.motion {
            Motion::Path(ref mut path) => path.points.push(point),
            Motion::None => {
                entity.motion = Motion::Path(PathMotion {
                    points: vec![point],
                    ..PathMotion::default()
                })
            }
        }
        Ok(())
    })
}

/// Replace the keyframe at `index` (time included) and re-sort.
pub fn update_keyframe(
    doc: &Document,
    id: &str,
    index: usize,
    point: PathPoint,
) -> Result<Document, EditError> {
    edit_points(doc, id, |entity| {
        let slot = keyframe_slot(entity, index)?;
        *slot = PathPoint {
            x: finite_or(point.x, slot.x),
            y: finite_or(point.y, slot.y),
            at_ms: finite_or(point.at_ms, slot.at_ms),
        };
        Ok(())
    })
}

pub fn delete_keyframe(doc: &Document, id: &str, index: usize) -> Result<Document, EditError> {
    edit_points(doc, id, |entity| {
        keyframe_slot(entity, index)?;
        if let Motion::Path(path) = &mut entity.motion {
            path.points.remove(index);
        }
        Ok(())
    })
}

/// Replace an entity's motion wholesale.
pub fn set_motion(doc: &Document, id: &str, motion: Motion) -> Result<Document, EditError> {
    edit_points(doc, id, |entity| {
        entity.motion = motion;
        Ok(())
    })
}

/// Drag an entity to `to` at the document's current simulation time.
///
/// In `PathEdit` mode on an entity that follows a path, the keyframe within
/// `tolerance_ms` of the current time is moved in place; with none in range a
/// new keyframe is inserted at the current time. Otherwise the resting
/// position moves.
pub fn drag_entity(
    doc: &Document,
    id: &str,
    to: Vec2,
    mode: DragMode,
    tolerance_ms: f64,
) -> Result<Document, EditError> {
    let now = doc.simulation.time_ms;
    edit_points(doc, id, |entity| {
        let to = to.finite_or(entity.position);
        match (&mut entity.motion, mode) {
            (Motion::Path(path), DragMode::PathEdit) => {
                match keyframe_near(&path.points, now, tolerance_ms) {
                    Some(i) => {
                        path.points[i].x = to.x;
                        path.points[i].y = to.y;
                    }
                    None => path.points.push(PathPoint::new(to.x, to.y, now)),
                }
            }
            (Motion::Path(_), DragMode::Free) | (Motion::None, _) => entity.position = to,
        }
        Ok(())
    })
}

fn keyframe_slot(entity: &mut Entity, index: usize) -> Result<&mut PathPoint, EditError> {
    let entity_id = entity.id.clone();
    match &mut entity.motion {
        Motion::Path(path) if index < path.points.len() => Ok(&mut path.points[index]),
        Motion::Path(_) | Motion::None => Err(EditError::KeyframeOutOfRange {
            entity: entity_id,
            index,
        }),
    }
}
