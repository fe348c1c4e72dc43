use crossterm::event::{Event, KeyEvent};

use crate::config::{KeyBindings, matches_binding};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Continue,
    Redraw,
    TogglePlay,
    /// Relative scrub in milliseconds.
    Scrub(f64),
    JumpStart,
    JumpEnd,
    Reset,
    Quit,
}

pub fn handle_event(bindings: &KeyBindings, scrub_step_ms: f64, event: Event) -> Command {
    match event {
        Event::Key(key) => handle_key(bindings, scrub_step_ms, &key),
        Event::Resize(_, _) => Command::Redraw,
        _ => Command::Continue,
    }
}

fn handle_key(bindings: &KeyBindings, scrub_step_ms: f64, key: &KeyEvent) -> Command {
    if matches_binding(&bindings.quit, key) || matches_binding("Esc", key) {
        Command::Quit
    } else if matches_binding(&bindings.toggle_play, key) {
        Command::TogglePlay
    } else if matches_binding(&bindings.scrub_back, key) {
        Command::Scrub(-scrub_step_ms)
    } else if matches_binding(&bindings.scrub_forward, key) {
        Command::Scrub(scrub_step_ms)
    } else if matches_binding(&bindings.jump_start, key) {
        Command::JumpStart
    } else if matches_binding(&bindings.jump_end, key) {
        Command::JumpEnd
    } else if matches_binding(&bindings.reset, key) {
        Command::Reset
    } else {
        Command::Continue
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn default_bindings_map_to_commands() {
        let bindings = KeyBindings::default();
        assert_eq!(handle_event(&bindings, 100.0, press(KeyCode::Char(' '))), Command::TogglePlay);
        assert_eq!(handle_event(&bindings, 100.0, press(KeyCode::Left)), Command::Scrub(-100.0));
        assert_eq!(handle_event(&bindings, 100.0, press(KeyCode::Right)), Command::Scrub(100.0));
        assert_eq!(handle_event(&bindings, 100.0, press(KeyCode::End)), Command::JumpEnd);
        assert_eq!(handle_event(&bindings, 100.0, press(KeyCode::Esc)), Command::Quit);
        assert_eq!(handle_event(&bindings, 100.0, press(KeyCode::Char('z'))), Command::Continue);
        assert_eq!(handle_event(&bindings, 100.0, Event::Resize(80, 24)), Command::Redraw);
    }
}
