use std::io::Write;

use crossterm::{queue, style};

/// Split a menu item into `(is_key, text)` runs: `[...]` spans, brackets
/// included, are keys. An unclosed `[` makes the rest plain text.
pub fn menu_segments(item: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            segments.push((false, rest));
            break;
        };
        let Some(close) = rest[open..].find(']').map(|c| open + c) else {
            segments.push((false, rest));
            break;
        };
        if open > 0 {
            segments.push((false, &rest[..open]));
        }
        segments.push((true, &rest[open..=close]));
        rest = &rest[close + 1..];
    }
    segments
}

/// Print a menu item, keys bold and labels dim.
pub fn print_menu_item(out: &mut impl Write, item: &str) -> anyhow::Result<()> {
    for (is_key, text) in menu_segments(item) {
        let attribute = if is_key {
            style::Attribute::Bold
        } else {
            style::Attribute::Dim
        };
        queue!(
            out,
            style::SetAttribute(attribute),
            style::Print(text),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}
