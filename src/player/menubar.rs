use std::io::Write;

use crossterm::{queue, style};

/// Print a menu item, bolding the key hints inside `[...]` and dimming the
/// description around them.
pub fn print_menu_item<W: Write>(out: &mut W, item: &str) -> anyhow::Result<()> {
    for (text, is_key) in menu_segments(item) {
        let attr = if is_key {
            style::Attribute::Bold
        } else {
            style::Attribute::Dim
        };
        queue!(
            out,
            style::SetAttribute(attr),
            style::Print(text),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}

/// Split a menu item into runs, flagging the bracketed key hints. An
/// unclosed `[` runs to the end of the item as plain text.
fn menu_segments(item: &str) -> Vec<(&str, bool)> {
    let mut segments = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            segments.push((rest, false));
            break;
        };
        if open > 0 {
            segments.push((&rest[..open], false));
        }
        rest = &rest[open..];
        match rest.find(']') {
            Some(close) => {
                segments.push((&rest[..=close], true));
                rest = &rest[close + 1..];
            }
            None => {
                segments.push((rest, false));
                break;
            }
        }
    }
    segments
}
