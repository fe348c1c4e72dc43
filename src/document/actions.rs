//! Reducers for scheduled boss actions.
//!
//! Any change to the action list re-derives the scheduling state at the
//! current simulation time, so fired flags and derived AoEs always match the
//! actions as they now read.

use crate::engine::scheduler::{SceneRef, reconcile, rewind};
use crate::error::EditError;
use crate::types::{ActionKind, BossAction, SpawnAoe, Vec2};

use super::defaults::ACTION_PREFIX;
use super::ids::IdGenerator;
use super::Document;

pub fn add_action(doc: &Document, ids: &mut IdGenerator, at_ms: f64, spawn: SpawnAoe) -> (Document, String) {
    let action = sanitized(BossAction {
        id: ids.next_id(ACTION_PREFIX),
        at_ms,
        kind: ActionKind::SpawnAoe(spawn),
        executed: false,
    });
    let id = action.id.clone();
    let mut next = doc.clone();
    next.actions.push(action);
    (rederive(&next), id)
}

/// Apply `edit` to an action. `id` and `executed` are not editable.
pub fn update_action(
    doc: &Document,
    id: &str,
    edit: impl FnOnce(&mut BossAction),
) -> Result<Document, EditError> {
    let mut next = doc.clone();
    let action = next
        .actions
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| EditError::not_found("action", id))?;
    let mut edited = action.clone();
    edit(&mut edited);
    edited.id = id.to_string();
    if !edited.at_ms.is_finite() {
        edited.at_ms = action.at_ms;
    }
    *action = sanitized(edited);
    Ok(rederive(&next))
}

/// Remove an action together with the AoE it spawned.
pub fn delete_action(doc: &Document, id: &str) -> Result<Document, EditError> {
    let mut next = doc.clone();
    let index = next
        .actions
        .iter()
        .position(|a| a.id == id)
        .ok_or_else(|| EditError::not_found("action", id))?;
    next.actions.remove(index);
    Ok(rederive(&next))
}

/// Rebuild fired flags and derived AoEs from scratch at the current time.
pub fn rederive(doc: &Document) -> Document {
    let (actions, aoes) = rewind(&doc.actions, &doc.aoes);
    let out = reconcile(
        doc.simulation.time_ms,
        SceneRef {
            actions: &actions,
            aoes: &aoes,
            entities: &doc.entities,
        },
    );
    let mut next = doc.clone();
    next.actions = out.actions;
    next.aoes = out.aoes;
    next
}

/// Clamp an action into the ranges the scheduler expects and clear its fired
/// flag.
pub(super) fn sanitized(mut action: BossAction) -> BossAction {
    action.at_ms = non_negative(action.at_ms);
    action.executed = false;
    match &mut action.kind {
        ActionKind::SpawnAoe(spawn) => sanitize_spawn(spawn),
    }
    action
}

fn sanitize_spawn(spawn: &mut SpawnAoe) {
    spawn.shape = spawn.shape.sanitized();
    spawn.position = spawn.position.map(|p| p.finite_or(Vec2::ORIGIN));
    spawn.offset = spawn.offset.map(|o| o.finite_or(Vec2::ORIGIN));
    spawn.delay_ms = non_negative(spawn.delay_ms);
    spawn.duration_ms = non_negative(spawn.duration_ms);
    if !spawn.rotation.is_finite() {
        spawn.rotation = 0.0;
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
