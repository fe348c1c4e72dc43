//! JSON import/export.
//!
//! Export writes authored content only: derived AoEs are left out and every
//! action is written unfired. Import is all-or-nothing and fills in whatever
//! the input is missing; derived state found in a file is never trusted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ImportError;
use crate::types::{Aoe, Arena, BossAction, Entity};

use super::actions::sanitized;
use super::defaults::{ACTION_PREFIX, AOE_PREFIX, ENTITY_PREFIX, default_entities};
use super::ids::IdGenerator;
use super::{Document, EditSettings, SimulationState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDocument {
    pub arena: Arena,
    pub entities: Vec<Entity>,
    pub aoes: Vec<Aoe>,
    pub actions: Vec<BossAction>,
    pub timeline_duration_ms: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedDocument {
    #[serde(default)]
    arena: Option<Arena>,
    #[serde(default)]
    entities: Option<Vec<Entity>>,
    #[serde(default)]
    aoes: Vec<Aoe>,
    #[serde(default)]
    actions: Vec<BossAction>,
    #[serde(default)]
    timeline_duration_ms: Option<f64>,
}

pub fn export_document(doc: &Document) -> ExportedDocument {
    ExportedDocument {
        arena: doc.arena.clone(),
        entities: doc.entities.clone(),
        aoes: doc.aoes.iter().filter(|aoe| !aoe.is_derived()).cloned().collect(),
        actions: doc
            .actions
            .iter()
            .cloned()
            .map(|mut action| {
                action.executed = false;
                action
            })
            .collect(),
        timeline_duration_ms: doc.timeline_duration_ms,
    }
}

pub fn export_json(doc: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export_document(doc))
}

/// Parse a document. Every id found is fed to `ids` so that ids handed out
/// afterwards cannot collide with imported ones; objects without an id get a
/// fresh one. The clock starts at zero, paused, with nothing fired: the same
/// state a simulation reset leaves behind.
pub fn import_json(json: &str, ids: &mut IdGenerator, settings: &EditSettings) -> Result<Document, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ImportError::NotAnObject {
            found: json_kind(&value),
        });
    }
    let imported: ImportedDocument = serde_json::from_value(value)?;

    // Only touch the generator once the whole input has parsed.
    let mut scratch = ids.clone();
    let entities = match imported.entities {
        Some(entities) => entities,
        None => default_entities(&mut scratch),
    };

    let mut doc = Document {
        arena: imported.arena.unwrap_or_default().sanitized(),
        entities: entities
            .into_iter()
            .map(|mut entity| {
                entity.motion = entity.motion.normalized();
                entity
            })
            .collect(),
        aoes: imported
            .aoes
            .into_iter()
            .filter(|aoe| !aoe.is_derived())
            .map(|mut aoe| {
                aoe.shape = aoe.shape.sanitized();
                aoe.timing = aoe.timing.sanitized();
                aoe
            })
            .collect(),
        actions: imported
            .actions
            .into_iter()
            .map(sanitized)
            .collect(),
        timeline_duration_ms: imported
            .timeline_duration_ms
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .unwrap_or(settings.default_timeline_duration_ms),
        simulation: SimulationState::default(),
    };

    for id in doc
        .entities
        .iter()
        .map(|e| &e.id)
        .chain(doc.aoes.iter().map(|a| &a.id))
        .chain(doc.actions.iter().map(|a| &a.id))
    {
        scratch.observe(id);
    }

    // Missing and repeated ids get fresh ones; the first holder of an id
    // keeps it.
    let mut seen = HashSet::new();
    for entity in &mut doc.entities {
        reissue_if_taken(&mut entity.id, &mut seen, &mut scratch, ENTITY_PREFIX);
    }
    for aoe in &mut doc.aoes {
        reissue_if_taken(&mut aoe.id, &mut seen, &mut scratch, AOE_PREFIX);
    }
    for action in &mut doc.actions {
        reissue_if_taken(&mut action.id, &mut seen, &mut scratch, ACTION_PREFIX);
    }
    *ids = scratch;

    Ok(doc)
}

fn reissue_if_taken(id: &mut String, seen: &mut HashSet<String>, ids: &mut IdGenerator, prefix: &str) {
    if id.is_empty() || seen.contains(id.as_str()) {
        let fresh = ids.next_id(prefix);
        tracing::debug!(old = %id, new = %fresh, "reissued imported id");
        *id = fresh;
    }
    seen.insert(id.clone());
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityKind, Motion, Vec2};

    fn import(json: &str) -> Result<Document, ImportError> {
        import_json(json, &mut IdGenerator::new(), &EditSettings::default())
    }

    #[test]
    fn empty_object_gets_default_scene() {
        let doc = import("{}").unwrap();
        assert_eq!(doc.arena, Arena::Circle { radius: 320.0 });
        assert_eq!(doc.entities.len(), 3);
        assert!(doc.entities[0].is_boss());
        assert_eq!(doc.entities[0].position, Vec2::ORIGIN);
        assert!(
            doc.entities[1..]
                .iter()
                .all(|e| e.kind == EntityKind::Player)
        );
        assert_eq!(doc.timeline_duration_ms, 60_000.0);
    }

    #[test]
    fn derived_state_in_files_is_discarded() {
        let json = r#"{
            "entities": [{"id": "ent-7", "type": "boss", "position": {"x": 0, "y": 0}}],
            "aoes": [
                {"id": "aoe-1", "shape": "circle", "shapeParams": {"radius": 10},
                 "timing": {"startAtMs": 0, "delayMs": 0, "durationMs": 100}},
                {"id": "act-1/aoe", "shape": "circle", "shapeParams": {"radius": 10},
                 "sourceActionId": "act-1"}
            ],
            "actions": [{
                "id": "act-1", "atMs": 5000, "type": "spawnAoE", "executed": true,
                "payload": {"shape": "ring", "shapeParams": {"innerRadius": 50, "outerRadius": 120}}
            }]
        }"#;
        let doc = import(json).unwrap();
        assert_eq!(doc.entities[0].motion, Motion::None);
        assert_eq!(doc.aoes.len(), 1);
        assert_eq!(doc.aoes[0].id, "aoe-1");
        assert!(!doc.actions[0].executed);
    }

    #[test]
    fn malformed_input_does_not_touch_the_generator() {
        let mut ids = IdGenerator::new();
        let before = ids.clone();
        assert!(import_json("{\"entities\": [", &mut ids, &EditSettings::default()).is_err());
        assert!(matches!(
            import_json("[1, 2]", &mut ids, &EditSettings::default()),
            Err(ImportError::NotAnObject { found: "an array" })
        ));
        assert_eq!(ids, before);
    }

    #[test]
    fn missing_ids_are_generated() {
        let json = r#"{"aoes": [{"shape": "line", "shapeParams": {"length": 0, "width": 8}}]}"#;
        let doc = import(json).unwrap();
        assert_eq!(doc.aoes[0].id, "aoe-4");
        assert_eq!(doc.aoes[0].shape, crate::types::AoeShape::Line { length: 1.0, width: 8.0 });
    }

    #[test]
    fn imported_ids_are_not_reissued() {
        let mut ids = IdGenerator::new();
        let json = r#"{"entities": [{"id": "ent-40", "type": "player"}]}"#;
        import_json(json, &mut ids, &EditSettings::default()).unwrap();
        assert_eq!(ids.next_id("ent"), "ent-41");
    }

    #[test]
    fn actions_due_at_zero_stay_unfired() {
        let json = r#"{"actions": [{
            "id": "act-1", "atMs": 0, "type": "spawnAoE",
            "payload": {"shape": "circle", "shapeParams": {"radius": 30}}
        }]}"#;
        let doc = import(json).unwrap();
        assert!(!doc.actions[0].executed);
        assert!(doc.aoes.iter().all(|a| !a.is_derived()));
        assert_eq!(doc.simulation, SimulationState::default());
    }

    #[test]
    fn repeated_ids_are_reissued() {
        let mut ids = IdGenerator::new();
        let json = r#"{
            "entities": [{"id": "ent-1", "type": "boss"}],
            "actions": [
                {"id": "act-2", "atMs": 1000, "type": "spawnAoE",
                 "payload": {"shape": "circle", "shapeParams": {"radius": 30}}},
                {"id": "act-2", "atMs": 2000, "type": "spawnAoE",
                 "payload": {"shape": "circle", "shapeParams": {"radius": 30}}}
            ]
        }"#;
        let doc = import_json(json, &mut ids, &EditSettings::default()).unwrap();
        assert_eq!(doc.actions[0].id, "act-2");
        assert_eq!(doc.actions[1].id, "act-3");
        assert_eq!(doc.actions[1].at_ms, 2000.0);
        assert_eq!(ids.next_id("aoe"), "aoe-4");
    }
}
