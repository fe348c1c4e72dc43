//! Action scheduler: keeps fired actions and the AoEs they spawned in step
//! with the simulation clock.
//!
//! An action is *fired* (`executed = true`) exactly when one derived AoE with
//! its id as `source_action_id` exists. `reconcile` only ever moves forward;
//! going back in time is `rewind` followed by `reconcile`, which makes the
//! derived state at time T independent of how the clock got there.

use crate::types::{ActionKind, Aoe, AoeTiming, BossAction, Entity, PositionMode, SpawnAoe, Vec2};

use super::math::front_z;
use super::motion::evaluate;

/// The slices of a document the scheduler reads.
#[derive(Debug, Clone, Copy)]
pub struct SceneRef<'a> {
    pub actions: &'a [BossAction],
    pub aoes: &'a [Aoe],
    pub entities: &'a [Entity],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub actions: Vec<BossAction>,
    pub aoes: Vec<Aoe>,
    /// Ids of the actions fired by this call, in firing order.
    pub fired: Vec<String>,
}

/// The boss is the first entity of type boss in list order. With several
/// bosses the later ones are ignored.
pub fn find_boss(entities: &[Entity]) -> Option<&Entity> {
    entities.iter().find(|e| e.is_boss())
}

/// Where the boss stands at `time_ms`; the origin when there is no boss.
pub fn boss_position_at(entities: &[Entity], time_ms: f64) -> Vec2 {
    find_boss(entities).map_or(Vec2::ORIGIN, |boss| {
        evaluate(&boss.motion, boss.position, time_ms)
    })
}

/// Id given to the AoE spawned by `action_id`. Deterministic so replays
/// produce identical derived sets.
pub fn derived_aoe_id(action_id: &str) -> String {
    format!("{action_id}/aoe")
}

/// Fire every unfired action due at or before `target_ms`, in list order.
///
/// Pairs that disagree on entry (a fired action without its AoE, or a derived
/// AoE whose action is gone or unfired) are repaired first. Calling this again
/// on its own output with the same target changes nothing.
pub fn reconcile(target_ms: f64, scene: SceneRef<'_>) -> Reconciled {
    let mut actions = scene.actions.to_vec();
    let mut aoes: Vec<Aoe> = scene
        .aoes
        .iter()
        .filter(|aoe| match &aoe.source_action_id {
            None => true,
            Some(source) => actions.iter().any(|a| &a.id == source && a.executed),
        })
        .cloned()
        .collect();
    for action in &mut actions {
        if action.executed && !aoes.iter().any(|aoe| aoe.source_action_id.as_ref() == Some(&action.id)) {
            action.executed = false;
        }
    }

    let base_z = front_z(aoes.iter().filter(|aoe| !aoe.is_derived()).map(|aoe| aoe.z_index));
    let mut fired = Vec::new();
    for (index, action) in actions.iter_mut().enumerate() {
        if action.executed || action.at_ms > target_ms {
            continue;
        }
        let aoe = match &action.kind {
            ActionKind::SpawnAoe(spawn) => {
                synthesize(action, spawn, scene.entities, base_z + index as i64)
            }
        };
        tracing::debug!(action = %action.id, at_ms = action.at_ms, aoe = %aoe.id, "action fired");
        aoes.push(aoe);
        action.executed = true;
        fired.push(action.id.clone());
    }

    Reconciled { actions, aoes, fired }
}

/// Build the AoE an action spawns. The position is a snapshot of where the
/// boss stands at the action's trigger time.
pub fn synthesize(action: &BossAction, spawn: &SpawnAoe, entities: &[Entity], z_index: i64) -> Aoe {
    let position = match spawn.position_mode {
        PositionMode::Position => spawn.position.unwrap_or(Vec2::ORIGIN),
        PositionMode::Offset => {
            boss_position_at(entities, action.at_ms) + spawn.offset.unwrap_or(Vec2::ORIGIN)
        }
    };

    Aoe {
        id: derived_aoe_id(&action.id),
        shape: spawn.shape.clone(),
        position,
        rotation: spawn.rotation,
        timing: AoeTiming {
            start_at_ms: action.at_ms,
            delay_ms: spawn.delay_ms,
            duration_ms: spawn.duration_ms,
        },
        z_index,
        source_action_id: Some(action.id.clone()),
    }
}

/// Un-fire every action and drop every derived AoE.
pub fn rewind(actions: &[BossAction], aoes: &[Aoe]) -> (Vec<BossAction>, Vec<Aoe>) {
    let actions = actions
        .iter()
        .cloned()
        .map(|mut action| {
            action.executed = false;
            action
        })
        .collect();
    let aoes = aoes.iter().filter(|aoe| !aoe.is_derived()).cloned().collect();
    (actions, aoes)
}
