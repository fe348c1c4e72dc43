//! Document store — the canonical scene and every way to change it.
//!
//! The reducers in the submodules are pure: they read a `Document` and return
//! a new one (or an error, leaving the input untouched). `DocumentStore`
//! holds the committed snapshot plus the id generator and swaps in whatever a
//! reducer returns, so readers only ever see whole documents.

pub mod actions;
pub mod aoes;
pub mod defaults;
pub mod entities;
pub mod ids;
pub mod input;
pub mod io;
pub mod keyframes;

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::StudioConfig;
use crate::engine::clock::seek;
use crate::engine::math::{finite_or, front_z};
use crate::engine::scheduler::find_boss;
use crate::error::{EditError, ImportError};
use crate::types::{Aoe, AoeShape, AoeTiming, Arena, BossAction, Entity, EntityKind, Motion, PathPoint, SpawnAoe, Vec2};

use ids::IdGenerator;
use keyframes::DragMode;

/// Clock state carried by a document. Never exported.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationState {
    pub time_ms: f64,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub arena: Arena,
    pub entities: Vec<Entity>,
    pub aoes: Vec<Aoe>,
    pub actions: Vec<BossAction>,
    pub timeline_duration_ms: f64,
    pub simulation: SimulationState,
}

impl Document {
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn aoe(&self, id: &str) -> Option<&Aoe> {
        self.aoes.iter().find(|a| a.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&BossAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn boss(&self) -> Option<&Entity> {
        find_boss(&self.entities)
    }

    /// z-index one past everything drawn: entities and AoEs share one stack.
    pub fn front_z(&self) -> i64 {
        front_z(
            self.entities
                .iter()
                .map(|e| e.z_index)
                .chain(self.aoes.iter().map(|a| a.z_index)),
        )
    }

    pub(crate) fn entity_index(&self, id: &str) -> Result<usize, EditError> {
        self.entities
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EditError::not_found("entity", id))
    }

    pub(crate) fn entity_mut(&mut self, id: &str) -> Result<&mut Entity, EditError> {
        let index = self.entity_index(id)?;
        Ok(&mut self.entities[index])
    }
}

/// Arena edits clamp dimensions to positive minima.
pub fn set_arena(doc: &Document, arena: Arena) -> Document {
    let mut next = doc.clone();
    next.arena = arena.sanitized();
    next
}

/// Change the timeline length. The current time is pulled back inside the new
/// bounds through the normal seek path.
pub fn set_timeline_duration(doc: &Document, duration_ms: f64) -> Document {
    let mut next = doc.clone();
    next.timeline_duration_ms = finite_or(duration_ms, doc.timeline_duration_ms).max(0.0);
    let time_ms = next.simulation.time_ms;
    seek(&next, time_ms)
}

/// Knobs the reducers need from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditSettings {
    pub keyframe_tolerance_ms: f64,
    pub duplicate_offset: Vec2,
    pub default_timeline_duration_ms: f64,
}

impl Default for EditSettings {
    fn default() -> Self {
        StudioConfig::default().edit_settings()
    }
}

pub struct DocumentStore {
    document: Document,
    ids: IdGenerator,
    settings: EditSettings,
    revision: u64,
}

impl DocumentStore {
    /// A store holding the default scene.
    pub fn new(settings: EditSettings) -> Self {
        let mut ids = IdGenerator::new();
        let document = defaults::default_document(&mut ids, &settings);
        DocumentStore {
            document,
            ids,
            settings,
            revision: 0,
        }
    }

    pub fn open(path: &str, settings: EditSettings) -> Result<Self> {
        let mut store = Self::new(settings);
        if Path::new(path).exists() {
            let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
            store
                .import_json(&json)
                .with_context(|| format!("Failed to import {path}"))?;
        }
        Ok(store)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let json = self.export_json()?;
        std::fs::write(path, &json).with_context(|| format!("Failed to write {path}"))?;
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn simulation(&self) -> SimulationState {
        self.document.simulation
    }

    pub fn settings(&self) -> &EditSettings {
        &self.settings
    }

    /// Bumped on every commit that changed the document.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap in a new snapshot.
    pub fn commit(&mut self, next: Document) {
        if next != self.document {
            self.document = next;
            self.revision += 1;
        }
    }

    fn try_commit(&mut self, next: Result<Document, EditError>) -> Result<(), EditError> {
        match next {
            Ok(doc) => {
                self.commit(doc);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "edit refused");
                Err(e)
            }
        }
    }

    /// Replace the document with the default scene, clock at zero.
    pub fn reset(&mut self) {
        let next = defaults::default_document(&mut self.ids, &self.settings);
        self.commit(next);
    }

    // -----------------------------------------------------------------------
    // Import / export
    // -----------------------------------------------------------------------

    /// Replace the document with an imported one. On failure the current
    /// document is kept and the error is logged and returned.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        match io::import_json(json, &mut self.ids, &self.settings) {
            Ok(doc) => {
                self.commit(doc);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "import rejected, keeping current document");
                Err(e)
            }
        }
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        io::export_json(&self.document)
    }

    // -----------------------------------------------------------------------
    // Arena and timeline
    // -----------------------------------------------------------------------

    pub fn set_arena(&mut self, arena: Arena) {
        let next = set_arena(&self.document, arena);
        self.commit(next);
    }

    pub fn set_timeline_duration(&mut self, duration_ms: f64) {
        let next = set_timeline_duration(&self.document, duration_ms);
        self.commit(next);
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    pub fn add_entity(&mut self, kind: EntityKind, position: Vec2) -> String {
        let (next, id) = entities::add_entity(&self.document, &mut self.ids, kind, position);
        self.commit(next);
        id
    }

    pub fn update_entity(&mut self, id: &str, edit: impl FnOnce(&mut Entity)) -> Result<(), EditError> {
        let next = entities::update_entity(&self.document, id, edit);
        self.try_commit(next)
    }

    pub fn delete_entity(&mut self, id: &str) -> Result<(), EditError> {
        let next = entities::delete_entity(&self.document, id);
        self.try_commit(next)
    }

    pub fn duplicate_entity(&mut self, id: &str) -> Result<String, EditError> {
        let offset = self.settings.duplicate_offset;
        let (next, copy) = entities::duplicate_entity(&self.document, &mut self.ids, id, offset)?;
        self.commit(next);
        Ok(copy)
    }

    pub fn bring_entity_to_front(&mut self, id: &str) -> Result<(), EditError> {
        let next = entities::bring_entity_to_front(&self.document, id);
        self.try_commit(next)
    }

    pub fn drag_entity(&mut self, id: &str, to: Vec2, mode: DragMode) -> Result<(), EditError> {
        let tolerance = self.settings.keyframe_tolerance_ms;
        let next = keyframes::drag_entity(&self.document, id, to, mode, tolerance);
        self.try_commit(next)
    }

    pub fn insert_keyframe(&mut self, id: &str, point: PathPoint) -> Result<(), EditError> {
        let next = keyframes::insert_keyframe(&self.document, id, point);
        self.try_commit(next)
    }

    pub fn update_keyframe(&mut self, id: &str, index: usize, point: PathPoint) -> Result<(), EditError> {
        let next = keyframes::update_keyframe(&self.document, id, index, point);
        self.try_commit(next)
    }

    pub fn delete_keyframe(&mut self, id: &str, index: usize) -> Result<(), EditError> {
        let next = keyframes::delete_keyframe(&self.document, id, index);
        self.try_commit(next)
    }

    pub fn set_motion(&mut self, id: &str, motion: Motion) -> Result<(), EditError> {
        let next = keyframes::set_motion(&self.document, id, motion);
        self.try_commit(next)
    }

    // -----------------------------------------------------------------------
    // AoEs
    // -----------------------------------------------------------------------

    pub fn add_aoe(&mut self, shape: AoeShape, position: Vec2, timing: AoeTiming) -> String {
        let (next, id) = aoes::add_aoe(&self.document, &mut self.ids, shape, position, timing);
        self.commit(next);
        id
    }

    pub fn update_aoe(&mut self, id: &str, edit: impl FnOnce(&mut Aoe)) -> Result<(), EditError> {
        let next = aoes::update_aoe(&self.document, id, edit);
        self.try_commit(next)
    }

    pub fn delete_aoe(&mut self, id: &str) -> Result<(), EditError> {
        let next = aoes::delete_aoe(&self.document, id);
        self.try_commit(next)
    }

    pub fn duplicate_aoe(&mut self, id: &str) -> Result<String, EditError> {
        let offset = self.settings.duplicate_offset;
        let (next, copy) = aoes::duplicate_aoe(&self.document, &mut self.ids, id, offset)?;
        self.commit(next);
        Ok(copy)
    }

    pub fn bring_aoe_to_front(&mut self, id: &str) -> Result<(), EditError> {
        let next = aoes::bring_aoe_to_front(&self.document, id);
        self.try_commit(next)
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    pub fn add_action(&mut self, at_ms: f64, spawn: SpawnAoe) -> String {
        let (next, id) = actions::add_action(&self.document, &mut self.ids, at_ms, spawn);
        self.commit(next);
        id
    }

    pub fn update_action(&mut self, id: &str, edit: impl FnOnce(&mut BossAction)) -> Result<(), EditError> {
        let next = actions::update_action(&self.document, id, edit);
        self.try_commit(next)
    }

    pub fn delete_action(&mut self, id: &str) -> Result<(), EditError> {
        let next = actions::delete_action(&self.document, id);
        self.try_commit(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_holds_default_scene() {
        let store = DocumentStore::new(EditSettings::default());
        let doc = store.document();
        assert_eq!(doc.arena, Arena::default());
        assert_eq!(doc.entities.len(), 3);
        assert_eq!(doc.boss().map(|b| b.position), Some(Vec2::ORIGIN));
        assert_eq!(doc.simulation, SimulationState::default());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn revision_only_moves_on_change() {
        let mut store = DocumentStore::new(EditSettings::default());
        let id = store.add_entity(EntityKind::Marker { label: "A".into() }, Vec2::new(1.0, 1.0));
        assert_eq!(store.revision(), 1);

        store.update_entity(&id, |_| {}).unwrap();
        assert_eq!(store.revision(), 1);

        assert!(store.delete_entity("nope").is_err());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn shrinking_the_timeline_pulls_time_back() {
        let mut store = DocumentStore::new(EditSettings::default());
        let mut doc = store.document().clone();
        doc.simulation.time_ms = 5000.0;
        store.commit(doc);
        store.set_timeline_duration(3000.0);
        assert_eq!(store.simulation().time_ms, 3000.0);
        store.set_timeline_duration(f64::NAN);
        assert_eq!(store.document().timeline_duration_ms, 3000.0);
    }

    #[test]
    fn arena_edits_are_clamped() {
        let mut store = DocumentStore::new(EditSettings::default());
        store.set_arena(Arena::Rect {
            width: -10.0,
            height: 400.0,
        });
        assert_eq!(
            store.document().arena,
            Arena::Rect {
                width: 1.0,
                height: 400.0
            }
        );
    }

    #[test]
    fn open_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encounter.json");
        let path = path.to_str().unwrap();

        let mut store = DocumentStore::new(EditSettings::default());
        store.add_aoe(
            AoeShape::Circle { radius: 50.0 },
            Vec2::new(10.0, 0.0),
            AoeTiming {
                start_at_ms: 0.0,
                delay_ms: 0.0,
                duration_ms: 1000.0,
            },
        );
        store.save(path).unwrap();

        let reopened = DocumentStore::open(path, EditSettings::default()).unwrap();
        assert_eq!(reopened.document().aoes, store.document().aoes);
        assert_eq!(reopened.document().entities, store.document().entities);
    }

    #[test]
    fn infinite_action_time_saves_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encounter.json");
        let path = path.to_str().unwrap();

        let mut store = DocumentStore::new(EditSettings::default());
        let id = store.add_action(
            f64::INFINITY,
            SpawnAoe {
                shape: AoeShape::Circle { radius: 30.0 },
                position_mode: crate::types::PositionMode::Position,
                position: Some(Vec2::ORIGIN),
                offset: None,
                rotation: 0.0,
                delay_ms: 0.0,
                duration_ms: 500.0,
            },
        );
        assert_eq!(store.document().action(&id).unwrap().at_ms, 0.0);
        store.save(path).unwrap();

        let reopened = DocumentStore::open(path, EditSettings::default()).unwrap();
        assert_eq!(reopened.document().action(&id).unwrap().at_ms, 0.0);
    }
}
