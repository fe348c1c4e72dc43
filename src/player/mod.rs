//! Player — terminal playback of an encounter.
//!
//! Owns a `DocumentStore` and a `Clock` and drives them from crossterm
//! events. The screen is redrawn whenever the store's revision moves; the
//! player never edits authored content, it only moves the simulation time.

mod input;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::config::StudioConfig;
use crate::document::DocumentStore;
use crate::engine::clock::{Clock, FrameTicket};
use crate::engine::frame::FrameView;
use crate::menubar::print_menu_item;
use crate::types::{Arena, EntityKind, Vec2};

use input::Command;

/// Rows above the map: menu bar and status line.
const MAP_OFFSET: u16 = 2;
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 16;
/// Tallest map drawn, in rows. Columns are twice the rows.
const MAX_MAP_ROWS: usize = 25;

pub struct Player {
    store: DocumentStore,
    clock: Clock,
    config: StudioConfig,
    ticket: Option<FrameTicket>,
}

impl Player {
    pub fn new(store: DocumentStore, config: StudioConfig) -> Self {
        Self {
            store,
            clock: Clock::new(),
            config,
            ticket: None,
        }
    }

    /// Play the encounter in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        if term_w < MIN_WIDTH || term_h < MIN_HEIGHT {
            bail!("Terminal too small: need {MIN_WIDTH}x{MIN_HEIGHT}, have {term_w}x{term_h}");
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let poll = Duration::from_millis(self.config.frame_ms.max(1));
        let mut drawn: Option<u64> = None;

        loop {
            if drawn != Some(self.store.revision()) {
                self.render(stdout)?;
                drawn = Some(self.store.revision());
            }

            if event::poll(poll)? {
                let command = input::handle_event(
                    &self.config.key_bindings,
                    self.config.scrub_step_ms,
                    event::read()?,
                );
                match command {
                    Command::Quit => break,
                    Command::Continue => {}
                    Command::Redraw => {
                        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        drawn = None;
                    }
                    Command::TogglePlay => {
                        self.ticket = self.clock.toggle(&mut self.store, Instant::now());
                    }
                    Command::Scrub(delta_ms) => {
                        self.clock.set_simulation_time(&mut self.store, |t| t + delta_ms);
                    }
                    Command::JumpStart => self.clock.scrub_to(&mut self.store, 0.0),
                    Command::JumpEnd => {
                        let end = self.store.document().timeline_duration_ms;
                        self.clock.scrub_to(&mut self.store, end);
                    }
                    Command::Reset => {
                        self.clock.reset_simulation(&mut self.store);
                        self.ticket = None;
                    }
                }
            }

            if let Some(ticket) = self.ticket {
                self.ticket = self.clock.on_frame(&mut self.store, ticket, Instant::now());
                let doc = self.store.document();
                if self.ticket.is_some() && doc.simulation.time_ms >= doc.timeline_duration_ms {
                    self.clock.pause(&mut self.store);
                    self.ticket = None;
                }
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render(&self, stdout: &mut io::Stdout) -> Result<()> {
        let (_, term_h) = terminal::size()?;
        let rows = (term_h.saturating_sub(MAP_OFFSET) as usize).min(MAX_MAP_ROWS).max(3);
        let cols = rows * 2;

        let doc = self.store.document();
        let view = FrameView::build(doc, None, self.store.settings().keyframe_tolerance_ms);

        self.render_menubar(stdout)?;
        render_status(stdout, &view, doc.timeline_duration_ms, doc.simulation.playing)?;

        let map = draw_map(&view, cols, rows);
        let side = side_panel(&view);
        for (y, row) in map.iter().enumerate() {
            let line: String = row.iter().collect();
            queue!(
                stdout,
                cursor::MoveTo(0, y as u16 + MAP_OFFSET),
                terminal::Clear(terminal::ClearType::CurrentLine),
                style::Print(line),
                style::Print("  "),
                style::Print(side.get(y).map(String::as_str).unwrap_or("")),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let keys = &self.config.key_bindings;
        let items = [
            format!("[{}] play/pause", keys.toggle_play),
            format!("[{}][{}] scrub", keys.scrub_back, keys.scrub_forward),
            format!("[{}][{}] start/end", keys.jump_start, keys.jump_end),
            format!("[{}] reset", keys.reset),
            format!("[{}][Esc] quit", keys.quit),
        ];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_menu_item(stdout, item)?;
        }
        Ok(())
    }
}

fn render_status(stdout: &mut io::Stdout, view: &FrameView<'_>, duration_ms: f64, playing: bool) -> Result<()> {
    let state = if playing { "playing" } else { "paused" };
    let status = format!(
        " {} / {}  {state}  {} AoE(s) visible",
        format_ms(view.time_ms),
        format_ms(duration_ms),
        view.aoes.len(),
    );

    let mut cs = style::ContentStyle::default();
    cs.attributes.set(style::Attribute::Dim);

    queue!(
        stdout,
        cursor::MoveTo(0, 1),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::PrintStyledContent(style::StyledContent::new(cs, status)),
    )?;
    Ok(())
}

pub fn format_ms(ms: f64) -> String {
    let total = ms.max(0.0) / 1000.0;
    let minutes = (total / 60.0).floor();
    format!("{:02}:{:06.3}", minutes as u64, total - minutes * 60.0)
}

// ---------------------------------------------------------------------------
// Map drawing
// ---------------------------------------------------------------------------

/// Half-width and half-height of the arena, centred on the origin.
fn half_extent(arena: &Arena) -> Vec2 {
    match arena {
        Arena::Circle { radius } => Vec2::new(*radius, *radius),
        Arena::Rect { width, height } => Vec2::new(width / 2.0, height / 2.0),
    }
}

fn to_cell(p: Vec2, extent: Vec2, cols: usize, rows: usize) -> Option<(usize, usize)> {
    let fx = (p.x + extent.x) / (2.0 * extent.x);
    let fy = (p.y + extent.y) / (2.0 * extent.y);
    if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
        return None;
    }
    let col = (fx * (cols - 1) as f64).round() as usize;
    let row = (fy * (rows - 1) as f64).round() as usize;
    Some((col, row))
}

fn glyph(kind: &EntityKind) -> char {
    match kind {
        EntityKind::Boss => 'B',
        EntityKind::Player => 'P',
        EntityKind::Item => 'I',
        EntityKind::Marker { label } => label.chars().next().unwrap_or('M'),
    }
}

/// Draw the arena outline, the centres of visible AoEs (`*`) and entities,
/// lower z-index first so that the front-most object keeps its cell.
pub fn draw_map(view: &FrameView<'_>, cols: usize, rows: usize) -> Vec<Vec<char>> {
    let cols = cols.max(2);
    let rows = rows.max(2);
    let mut grid = vec![vec![' '; cols]; rows];
    let extent = half_extent(view.arena);

    match view.arena {
        Arena::Circle { radius } => {
            for step in 0..360 {
                let angle = f64::from(step).to_radians();
                let p = Vec2::new(radius * angle.cos(), radius * angle.sin());
                if let Some((x, y)) = to_cell(p, extent, cols, rows) {
                    grid[y][x] = '.';
                }
            }
        }
        Arena::Rect { .. } => {
            for x in 0..cols {
                grid[0][x] = '.';
                grid[rows - 1][x] = '.';
            }
            for row in grid.iter_mut() {
                row[0] = '.';
                row[cols - 1] = '.';
            }
        }
    }

    let mut marks: Vec<(i64, Vec2, char)> = view
        .aoes
        .iter()
        .map(|aoe| (aoe.z_index, aoe.position, '*'))
        .chain(
            view.entities
                .iter()
                .map(|e| (e.entity.z_index, e.position, glyph(&e.entity.kind))),
        )
        .collect();
    marks.sort_by_key(|&(z, _, _)| z);
    for (_, position, ch) in marks {
        if let Some((x, y)) = to_cell(position, extent, cols, rows) {
            grid[y][x] = ch;
        }
    }
    grid
}

fn side_panel(view: &FrameView<'_>) -> Vec<String> {
    let mut lines = vec!["Entities".to_string()];
    for e in &view.entities {
        lines.push(format!(
            "  {:<10} {:<7} ({:>7.1}, {:>7.1})",
            e.entity.id,
            e.entity.kind.name(),
            e.position.x,
            e.position.y
        ));
    }
    lines.push(String::new());
    lines.push("AoEs".to_string());
    if view.aoes.is_empty() {
        lines.push("  none".to_string());
    }
    for aoe in &view.aoes {
        let source = aoe.source_action_id.as_deref().unwrap_or("authored");
        lines.push(format!(
            "  {:<10} {:<10} ({:>7.1}, {:>7.1}) until {}  [{source}]",
            aoe.id,
            aoe.shape.name(),
            aoe.position.x,
            aoe.position.y,
            format_ms(aoe.timing.visible_until()),
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EditSettings;

    #[test]
    fn default_scene_draws_boss_in_the_middle() {
        let store = DocumentStore::new(EditSettings::default());
        let view = FrameView::build(store.document(), None, 250.0);
        let map = draw_map(&view, 21, 11);
        assert_eq!(map[5][10], 'B');
        assert!(map.iter().flatten().filter(|&&c| c == 'P').count() == 2);
        assert!(map.iter().flatten().any(|&c| c == '.'));
    }

    #[test]
    fn time_formats_as_minutes_and_seconds() {
        assert_eq!(format_ms(0.0), "00:00.000");
        assert_eq!(format_ms(61_500.0), "01:01.500");
    }
}
