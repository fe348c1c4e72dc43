use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::document::EditSettings;
use crate::types::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_keyframe_tolerance_ms")]
    pub keyframe_tolerance_ms: f64,
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: Vec2,
    #[serde(default = "default_timeline_duration_ms")]
    pub default_timeline_duration_ms: f64,
    #[serde(default = "default_scrub_step_ms")]
    pub scrub_step_ms: f64,
    /// Event poll interval of the terminal player.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_toggle_play")]
    pub toggle_play: String,
    #[serde(default = "default_scrub_back")]
    pub scrub_back: String,
    #[serde(default = "default_scrub_forward")]
    pub scrub_forward: String,
    #[serde(default = "default_jump_start")]
    pub jump_start: String,
    #[serde(default = "default_jump_end")]
    pub jump_end: String,
    #[serde(default = "default_reset")]
    pub reset: String,
    #[serde(default = "default_quit")]
    pub quit: String,
}

fn default_keyframe_tolerance_ms() -> f64 { 250.0 }
fn default_duplicate_offset() -> Vec2 { Vec2::new(24.0, 24.0) }
fn default_timeline_duration_ms() -> f64 { 60_000.0 }
fn default_scrub_step_ms() -> f64 { 100.0 }
fn default_frame_ms() -> u64 { 16 }

fn default_toggle_play() -> String { "Space".into() }
fn default_scrub_back() -> String { "Left".into() }
fn default_scrub_forward() -> String { "Right".into() }
fn default_jump_start() -> String { "Home".into() }
fn default_jump_end() -> String { "End".into() }
fn default_reset() -> String { "r".into() }
fn default_quit() -> String { "q".into() }

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            toggle_play: default_toggle_play(),
            scrub_back: default_scrub_back(),
            scrub_forward: default_scrub_forward(),
            jump_start: default_jump_start(),
            jump_end: default_jump_end(),
            reset: default_reset(),
            quit: default_quit(),
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            keyframe_tolerance_ms: default_keyframe_tolerance_ms(),
            duplicate_offset: default_duplicate_offset(),
            default_timeline_duration_ms: default_timeline_duration_ms(),
            scrub_step_ms: default_scrub_step_ms(),
            frame_ms: default_frame_ms(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl StudioConfig {
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::from_json(&json),
            Err(_) => Self::default(),
        }
    }

    fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "invalid studio config, using defaults");
                Self::default()
            }
        }
    }

    fn config_path() -> std::path::PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = std::path::PathBuf::from(home);
        path.push(".config");
        path.push("arena-timeline");
        path.push("config.json");
        path
    }

    pub fn edit_settings(&self) -> EditSettings {
        EditSettings {
            keyframe_tolerance_ms: self.keyframe_tolerance_ms.max(0.0),
            duplicate_offset: self.duplicate_offset.finite_or(default_duplicate_offset()),
            default_timeline_duration_ms: self.default_timeline_duration_ms.max(0.0),
        }
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(rest) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return rest
            .chars()
            .next()
            .is_some_and(|c| event.code == KeyCode::Char(c));
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event.modifiers.contains(KeyModifiers::CONTROL) || event.modifiers.contains(KeyModifiers::ALT) {
        return false;
    }

    match binding {
        "Right" => event.code == KeyCode::Right,
        "Left" => event.code == KeyCode::Left,
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Home" => event.code == KeyCode::Home,
        "End" => event.code == KeyCode::End,
        s => s.chars().next().is_some_and(|c| event.code == KeyCode::Char(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = StudioConfig::from_json(r#"{"scrub_step_ms": 50, "key_bindings": {"quit": "x"}}"#);
        assert_eq!(config.scrub_step_ms, 50.0);
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.toggle_play, "Space");
        assert_eq!(config.keyframe_tolerance_ms, 250.0);
    }

    #[test]
    fn invalid_config_falls_back() {
        assert_eq!(StudioConfig::from_json("{not json"), StudioConfig::default());
    }

    #[test]
    fn bindings_match_key_events() {
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(matches_binding("Space", &space));
        assert!(!matches_binding("r", &space));

        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(matches_binding("Ctrl-r", &ctrl_r));
        assert!(!matches_binding("r", &ctrl_r));
    }
}
