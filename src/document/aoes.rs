//! Reducers for user-placed AoEs.
//!
//! Derived AoEs (those with a `source_action_id`) belong to the scheduler and
//! are refused here; edit the action that spawns them instead.

use crate::error::EditError;
use crate::types::{Aoe, AoeShape, AoeTiming, Vec2};

use super::defaults::AOE_PREFIX;
use super::ids::IdGenerator;
use super::Document;

pub fn add_aoe(
    doc: &Document,
    ids: &mut IdGenerator,
    shape: AoeShape,
    position: Vec2,
    timing: AoeTiming,
) -> (Document, String) {
    let aoe = Aoe {
        id: ids.next_id(AOE_PREFIX),
        shape: shape.sanitized(),
        position: position.finite_or(Vec2::ORIGIN),
        rotation: 0.0,
        timing: timing.sanitized(),
        z_index: doc.front_z(),
        source_action_id: None,
    };
    let id = aoe.id.clone();
    let mut next = doc.clone();
    next.aoes.push(aoe);
    (next, id)
}

/// Apply `edit` to a user-placed AoE, then clamp shape and timing back into
/// valid ranges.
pub fn update_aoe(doc: &Document, id: &str, edit: impl FnOnce(&mut Aoe)) -> Result<Document, EditError> {
    let mut next = doc.clone();
    let aoe = authored_mut(&mut next, id)?;
    let (position, rotation) = (aoe.position, aoe.rotation);
    edit(aoe);
    aoe.id = id.to_string();
    aoe.source_action_id = None;
    aoe.shape = aoe.shape.sanitized();
    aoe.timing = aoe.timing.sanitized();
    aoe.position = aoe.position.finite_or(position);
    if !aoe.rotation.is_finite() {
        aoe.rotation = rotation;
    }
    Ok(next)
}

pub fn delete_aoe(doc: &Document, id: &str) -> Result<Document, EditError> {
    let mut next = doc.clone();
    authored_mut(&mut next, id)?;
    next.aoes.retain(|aoe| aoe.id != id);
    Ok(next)
}

pub fn duplicate_aoe(
    doc: &Document,
    ids: &mut IdGenerator,
    id: &str,
    offset: Vec2,
) -> Result<(Document, String), EditError> {
    let mut next = doc.clone();
    let mut copy = authored_mut(&mut next, id)?.clone();
    copy.id = ids.next_id(AOE_PREFIX);
    copy.position = copy.position + offset;
    copy.z_index = doc.front_z();
    let copy_id = copy.id.clone();
    next.aoes.push(copy);
    Ok((next, copy_id))
}

pub fn bring_aoe_to_front(doc: &Document, id: &str) -> Result<Document, EditError> {
    let z = doc.front_z();
    let mut next = doc.clone();
    authored_mut(&mut next, id)?.z_index = z;
    Ok(next)
}

fn authored_mut<'a>(doc: &'a mut Document, id: &str) -> Result<&'a mut Aoe, EditError> {
    let aoe = doc
        .aoes
        .iter_mut()
        .find(|aoe| aoe.id == id)
        .ok_or_else(|| EditError::not_found("aoe", id))?;
    if let Some(action) = &aoe.source_action_id {
        return Err(EditError::DerivedAoe {
            aoe: id.to_string(),
            action: action.clone(),
        });
    }
    Ok(aoe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{EditSettings, defaults::default_document};

    fn fixture() -> (Document, IdGenerator) {
        let mut ids = IdGenerator::new();
        let doc = default_document(&mut ids, &EditSettings::default());
        (doc, ids)
    }

    fn timing() -> AoeTiming {
        AoeTiming {
            start_at_ms: 1000.0,
            delay_ms: 200.0,
            duration_ms: 500.0,
        }
    }

    #[test]
    fn added_aoe_is_sanitized_and_in_front() {
        let (doc, mut ids) = fixture();
        let (next, id) = add_aoe(&doc, &mut ids, AoeShape::Circle { radius: 0.0 }, Vec2::ORIGIN, timing());
        let aoe = next.aoe(&id).unwrap();
        assert_eq!(aoe.shape, AoeShape::Circle { radius: 1.0 });
        assert_eq!(aoe.z_index, 4);
        assert!(!aoe.is_derived());
    }

    #[test]
    fn update_cannot_forge_derived_state() {
        let (doc, mut ids) = fixture();
        let (doc, id) = add_aoe(&doc, &mut ids, AoeShape::Rect { width: 10.0, height: 10.0 }, Vec2::ORIGIN, timing());
        let next = update_aoe(&doc, &id, |aoe| {
            aoe.source_action_id = Some("act-1".into());
            aoe.timing.duration_ms = -3.0;
            aoe.rotation = f64::INFINITY;
        })
        .unwrap();
        let aoe = next.aoe(&id).unwrap();
        assert!(!aoe.is_derived());
        assert_eq!(aoe.timing.duration_ms, 0.0);
        assert_eq!(aoe.rotation, 0.0);
    }

    #[test]
    fn derived_aoes_are_refused() {
        let (mut doc, _) = fixture();
        doc.aoes.push(Aoe {
            id: "act-9/aoe".into(),
            shape: AoeShape::Circle { radius: 5.0 },
            position: Vec2::ORIGIN,
            rotation: 0.0,
            timing: timing(),
            z_index: 1,
            source_action_id: Some("act-9".into()),
        });
        let refused = EditError::DerivedAoe {
            aoe: "act-9/aoe".into(),
            action: "act-9".into(),
        };
        assert_eq!(delete_aoe(&doc, "act-9/aoe"), Err(refused.clone()));
        assert_eq!(bring_aoe_to_front(&doc, "act-9/aoe"), Err(refused));
    }

    #[test]
    fn duplicate_gets_new_identity() {
        let (doc, mut ids) = fixture();
        let (doc, id) = add_aoe(&doc, &mut ids, AoeShape::Line { length: 50.0, width: 5.0 }, Vec2::new(1.0, 1.0), timing());
        let (next, copy) = duplicate_aoe(&doc, &mut ids, &id, Vec2::new(24.0, 24.0)).unwrap();
        assert_ne!(copy, id);
        let copy = next.aoe(&copy).unwrap();
        assert_eq!(copy.position, Vec2::new(25.0, 25.0));
        assert_eq!(copy.z_index, 5);
        assert_eq!(copy.timing, timing());
    }
}
