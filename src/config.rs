use std::path::PathBuf;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::animator::TurnTiming;
use crate::engine::spread::BookGeometry;
use crate::renderer::CellMetrics;

/// Largest canvas, in cells per axis, a config may ask for.
const MAX_GRID: f64 = 1000.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be a sensible size, got {value}")]
    Invalid { field: &'static str, value: f64 },

    #[error("book needs a {cols:.0}x{rows:.0} cell grid")]
    GridTooLarge { cols: f64, rows: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub key_bindings: KeyBindings,
    pub geometry: BookGeometry,
    pub timing: TurnTiming,
    pub cell: CellMetrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub next: String,
    pub next_alt: String,
    pub prev: String,
    pub quit: String,
    pub fullscreen: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            next: "Right".into(),
            next_alt: "Space".into(),
            prev: "Left".into(),
            quit: "q".into(),
            fullscreen: "F11".into(),
        }
    }
}

impl ReaderConfig {
    /// Load the config file, falling back to defaults when it is missing or
    /// invalid.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                warn!(path = %config_path.display(), "invalid reader config ({e}), using defaults");
                Self::default()
            }),
            Err(_) => {
                debug!(path = %config_path.display(), "no reader config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ReaderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject sizes that would make the book or the cell grid degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        let c = &self.cell;
        let positive = [
            ("geometry.page_width", g.page_width),
            ("geometry.page_height", g.page_height),
            ("geometry.line_height", g.line_height),
            ("geometry.body_font", g.body_font),
            ("geometry.title_font", g.title_font),
            ("geometry.author_font", g.author_font),
        ];
        let non_negative = [
            ("geometry.book_x", g.book_x),
            ("geometry.book_y", g.book_y),
            ("geometry.margin", g.margin),
            ("geometry.cover_bleed", g.cover_bleed),
            ("geometry.text_inset", g.text_inset),
            ("geometry.baseline_offset", g.baseline_offset),
        ];
        let at_least_one = [("cell.width_px", c.width_px), ("cell.height_px", c.height_px)];

        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        for (field, value) in at_least_one {
            if !(value.is_finite() && value >= 1.0) {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        if g.page_width - 2.0 * g.text_inset <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "geometry.text_inset",
                value: g.text_inset,
            });
        }

        let (w, h) = g.canvas_size();
        let (cols, rows) = (w / c.width_px, h / c.height_px);
        if cols > MAX_GRID || rows > MAX_GRID {
            return Err(ConfigError::GridTooLarge { cols, rows });
        }
        Ok(())
    }

    fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os("FLIPBOOK_CONFIG") {
            return PathBuf::from(path);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("flipbook");
        path.push("config.json");
        path
    }
}

/// A parsed binding string such as `"Right"`, `"Ctrl-n"` or `"F11"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    code: KeyCode,
    modifiers: KeyModifiers,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised key binding {0:?}")]
pub struct BadBinding(pub String);

impl FromStr for KeyBinding {
    type Err = BadBinding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (modifiers, key) = if let Some(rest) = s.strip_prefix("Alt-") {
            (KeyModifiers::ALT, rest)
        } else if let Some(rest) = s.strip_prefix("Ctrl-") {
            (KeyModifiers::CONTROL, rest)
        } else {
            (KeyModifiers::NONE, s)
        };

        let code = match key {
            "Right" => KeyCode::Right,
            "Left" => KeyCode::Left,
            "Up" => KeyCode::Up,
            "Down" => KeyCode::Down,
            "PageUp" => KeyCode::PageUp,
            "PageDown" => KeyCode::PageDown,
            "Enter" => KeyCode::Enter,
            "Esc" => KeyCode::Esc,
            "Space" => KeyCode::Char(' '),
            "Tab" => KeyCode::Tab,
            "Backspace" => KeyCode::Backspace,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            other => {
                let fkey = other
                    .strip_prefix('F')
                    .and_then(|n| n.parse::<u8>().ok());
                let mut chars = other.chars();
                match (fkey, chars.next(), chars.next()) {
                    (Some(n), _, _) => KeyCode::F(n),
                    (None, Some(c), None) => KeyCode::Char(c),
                    _ => return Err(BadBinding(s.to_owned())),
                }
            }
        };
        Ok(KeyBinding { code, modifiers })
    }
}

impl KeyBinding {
    /// Plain bindings reject events with Ctrl or Alt held, so `"q"` never
    /// fires on Alt-q. Shift is ignored.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        let held = event.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
        held == self.modifiers && event.code == self.code
    }
}

/// Bindings resolved once at startup.
#[derive(Debug, Clone)]
pub struct Keymap {
    pub next: Vec<KeyBinding>,
    pub prev: Vec<KeyBinding>,
    pub quit: Vec<KeyBinding>,
    pub fullscreen: Vec<KeyBinding>,
}

impl Keymap {
    /// `Esc` always quits, on top of the configured key.
    pub fn from_bindings(b: &KeyBindings) -> Result<Self, BadBinding> {
        Ok(Keymap {
            next: vec![b.next.parse()?, b.next_alt.parse()?],
            prev: vec![b.prev.parse()?],
            quit: vec![b.quit.parse()?, "Esc".parse()?],
            fullscreen: vec![b.fullscreen.parse()?],
        })
    }
}

pub fn any_matches(bindings: &[KeyBinding], event: &KeyEvent) -> bool {
    bindings.iter().any(|b| b.matches(event))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ReaderConfig::from_json(
            r#"{"timing":{"frame_count":40},"key_bindings":{"next":"n"}}"#,
        )
        .unwrap();
        assert_eq!(config.timing.frame_count, 40);
        assert_eq!(config.timing.frame_interval_ms, 20);
        assert_eq!(config.key_bindings.next, "n");
        assert_eq!(config.key_bindings.prev, "Left");
        assert_eq!(config.geometry, BookGeometry::default());
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ReaderConfig::from_json("{}").unwrap(), ReaderConfig::default());
    }

    #[test]
    fn zero_cell_width_is_rejected() {
        let err = ReaderConfig::from_json(r#"{"cell":{"width_px":0}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "cell.width_px",
                ..
            }
        ));
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        for json in [
            r#"{"geometry":{"page_width":-350}}"#,
            r#"{"geometry":{"line_height":0}}"#,
            r#"{"geometry":{"margin":-1}}"#,
            r#"{"geometry":{"text_inset":200}}"#,
        ] {
            assert!(
                matches!(ReaderConfig::from_json(json), Err(ConfigError::Invalid { .. })),
                "{json} accepted"
            );
        }
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let err = ReaderConfig::from_json(r#"{"cell":{"width_px":1},"geometry":{"page_width":800}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::GridTooLarge { .. }));
        assert!(matches!(
            ReaderConfig::from_json("[1, 2]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn defaults_validate() {
        assert!(ReaderConfig::default().validate().is_ok());
    }

    #[test]
    fn parses_named_function_and_char_keys() {
        let right: KeyBinding = "Right".parse().unwrap();
        assert!(right.matches(&key(KeyCode::Right, KeyModifiers::NONE)));

        let f11: KeyBinding = "F11".parse().unwrap();
        assert!(f11.matches(&key(KeyCode::F(11), KeyModifiers::NONE)));

        let f: KeyBinding = "F".parse().unwrap();
        assert!(f.matches(&key(KeyCode::Char('F'), KeyModifiers::SHIFT)));

        let space: KeyBinding = "Space".parse().unwrap();
        assert!(space.matches(&key(KeyCode::Char(' '), KeyModifiers::NONE)));
    }

    #[test]
    fn modifiers_must_agree() {
        let q: KeyBinding = "q".parse().unwrap();
        assert!(q.matches(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!q.matches(&key(KeyCode::Char('q'), KeyModifiers::ALT)));

        let ctrl_n: KeyBinding = "Ctrl-n".parse().unwrap();
        assert!(ctrl_n.matches(&key(KeyCode::Char('n'), KeyModifiers::CONTROL)));
        assert!(!ctrl_n.matches(&key(KeyCode::Char('n'), KeyModifiers::NONE)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            "Hyper-x".parse::<KeyBinding>(),
            Err(BadBinding("Hyper-x".into()))
        );
        assert!("".parse::<KeyBinding>().is_err());
    }

    #[test]
    fn default_keymap_resolves() {
        let keymap = Keymap::from_bindings(&KeyBindings::default()).unwrap();
        let space = key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(any_matches(&keymap.next, &space));
        assert!(any_matches(&keymap.quit, &key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!any_matches(&keymap.prev, &space));
    }
}
