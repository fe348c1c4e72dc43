//! Entity reducers. Each takes the current document and returns the next one;
//! on error the caller keeps the document it already had.

use crate::error::EditError;
use crate::types::{Entity, EntityKind, Motion, Vec2};

use super::defaults::create_entity;
use super::ids::IdGenerator;
use super::Document;

/// Place a new entity in front of everything else.
pub fn add_entity(
    doc: &Document,
    ids: &mut IdGenerator,
    kind: EntityKind,
    position: Vec2,
) -> (Document, String) {
    let mut next = doc.clone();
    let entity = create_entity(ids, kind, position.finite_or(Vec2::ORIGIN), doc.front_z());
    let id = entity.id.clone();
    next.entities.push(entity);
    (next, id)
}

/// Apply `edit` to one entity. The id cannot be changed, non-finite positions
/// are rejected in favour of the previous value, and the motion is
/// re-normalized afterwards.
pub fn update_entity(
    doc: &Document,
    id: &str,
    edit: impl FnOnce(&mut Entity),
) -> Result<Document, EditError> {
    let mut next = doc.clone();
    let entity = next.entity_mut(id)?;
    let before = entity.position;
    edit(entity);
    entity.id = id.to_string();
    entity.position = entity.position.finite_or(before);
    entity.motion = entity.motion.normalized();
    Ok(next)
}

pub fn delete_entity(doc: &Document, id: &str) -> Result<Document, EditError> {
    let mut next = doc.clone();
    let index = next.entity_index(id)?;
    next.entities.remove(index);
    Ok(next)
}

/// Copy an entity under a new id, shifted by `offset` (path keyframes
/// included) and brought to the front.
pub fn duplicate_entity(
    doc: &Document,
    ids: &mut IdGenerator,
    id: &str,
    offset: Vec2,
) -> Result<(Document, String), EditError> {
    let source = doc
        .entity(id)
        .ok_or_else(|| EditError::not_found("entity", id))?;

    let mut copy = create_entity(ids, source.kind.clone(), source.position + offset, doc.front_z());
    copy.motion = match &source.motion {
        Motion::None => Motion::None,
        Motion::Path(path) => {
            let mut path = path.clone();
            for point in &mut path.points {
                point.x += offset.x;
                point.y += offset.y;
            }
            Motion::Path(path)
        }
    };

    let copy_id = copy.id.clone();
    let mut next = doc.clone();
    next.entities.push(copy);
    Ok((next, copy_id))
}

pub fn bring_entity_to_front(doc: &Document, id: &str) -> Result<Document, EditError> {
    let z = doc.front_z();
    let mut next = doc.clone();
    next.entity_mut(id)?.z_index = z;
    Ok(next)
}
