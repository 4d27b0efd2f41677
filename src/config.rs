//! User configuration: effect tuning, preview settings, keybindings, and
//! persistence.
//!
//! Stored as TOML at `$XDG_CONFIG_HOME/scrollfx/config.toml` (default
//! `~/.config/scrollfx/config.toml`) with `[effects]`, `[preview]` and
//! `[keys]` tables.  Unknown keys and unusable values are ignored one by one
//! and fall back to the defaults; a file that is not TOML at all gives the
//! defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

use crate::core::tuning::{OpacityPolicy, Tuning};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    JumpTop,
    JumpBottom,
    NextLink,
    PrevLink,
    Activate,
    ToggleTheme,
    Quit,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::JumpTop,
        Action::JumpBottom,
        Action::NextLink,
        Action::PrevLink,
        Action::Activate,
        Action::ToggleTheme,
        Action::Quit,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::JumpTop => "jump_top",
            Action::JumpBottom => "jump_bottom",
            Action::NextLink => "next_link",
            Action::PrevLink => "prev_link",
            Action::Activate => "activate",
            Action::ToggleTheme => "toggle_theme",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding (key code + modifier combination).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Short display string for the status bar (e.g. `"↓"`, `"PgDn"`, `"t"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            other => key_name(other),
        });
        s
    }

    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            other => key_name(other),
        });
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Alt+Up"`, `"j"`, `"PageDown"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = key_part.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::BackTab => "BackTab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: effect tuning plus preview settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub tuning: Tuning,
    /// Preview animation-frame interval.
    pub frame_interval_ms: u64,
    /// Page pixels scrolled per line step.
    pub scroll_step: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            tuning: Tuning::default(),
            frame_interval_ms: 33,
            scroll_step: 40.0,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(
            Action::PageDown,
            vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char(' '), n)],
        );
        m.insert(JumpTop, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(JumpBottom, vec![KeyBind::new(End, n), KeyBind::new(Char('G'), KeyModifiers::SHIFT)]);
        m.insert(NextLink, vec![KeyBind::new(Tab, n), KeyBind::new(Right, n)]);
        m.insert(PrevLink, vec![KeyBind::new(BackTab, KeyModifiers::SHIFT), KeyBind::new(Left, n)]);
        m.insert(Activate, vec![KeyBind::new(Enter, n)]);
        m.insert(ToggleTheme, vec![KeyBind::new(Char('t'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// Action bound to `event`; the binding with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: nav link | {}: go | {}: theme | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::NextLink),
            self.short_binding(Action::Activate),
            self.short_binding(Action::ToggleTheme),
            self.short_binding(Action::Quit),
        )
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`, falling back to defaults when missing.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "no config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise()?)?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();
        let file = match toml::from_str::<ConfigFile>(s) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(%err, "invalid config TOML, using defaults");
                return config;
            }
        };

        for (key, value) in file.effects.iter().chain(file.preview.iter()) {
            let Some(text) = setting_text(value) else {
                tracing::warn!(key = %key, "ignoring non-scalar config value");
                continue;
            };
            if !config.apply_setting(key, &text) {
                tracing::debug!(key = %key, "unknown config key");
            }
        }

        for (key, value) in &file.keys {
            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!(key = %key, "unknown key binding action");
                continue;
            };
            let specs: Vec<&str> = match value {
                Value::String(s) => s.split(',').collect(),
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            let parsed: Vec<KeyBind> = specs
                .into_iter()
                .filter_map(|spec| KeyBind::parse(spec.trim()))
                .collect();
            if parsed.is_empty() {
                tracing::warn!(key = %key, "no usable key in binding, keeping default");
            } else {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    /// Apply one tuning or preview setting.  Returns `false` if `key` is not
    /// a setting; a bad value for a known key keeps the default.
    fn apply_setting(&mut self, key: &str, value: &str) -> bool {
        let t = &mut self.tuning;
        let num = || value.parse::<f64>().ok().filter(|v| v.is_finite());
        let ms = || value.parse::<u64>().ok().map(Duration::from_millis);

        macro_rules! set {
            ($slot:expr, $parsed:expr) => {{
                if let Some(v) = $parsed {
                    $slot = v;
                } else {
                    tracing::warn!(key, value, "ignoring invalid config value");
                }
            }};
        }

        match key {
            "reveal_threshold" => set!(t.reveal_threshold, num()),
            "reveal_stagger_ms" => set!(t.reveal_stagger, ms()),
            "title_band_upper" => set!(t.title_band_upper, num()),
            "title_band_lower" => set!(t.title_band_lower, num()),
            "split_threshold" => set!(t.split_threshold, num()),
            "scale_min" => set!(t.scale_min, num()),
            "scale_max" => set!(t.scale_max, num()),
            "parallax_factor" => set!(t.parallax_factor, num()),
            "parallax_fade_distance" => {
                set!(t.parallax_fade_distance, num().filter(|v| *v > 0.0))
            }
            "opacity_policy" => set!(t.opacity_policy, OpacityPolicy::from_label(value)),
            "nav_offset" => set!(t.nav_offset, num()),
            "navbar_threshold" => set!(t.navbar_threshold, num()),
            "timeline_zone_start" => set!(t.timeline_zone_start, num()),
            "timeline_zone_end" => set!(t.timeline_zone_end, num()),
            "gradient_step" => set!(t.gradient_step, num()),
            "resize_debounce_ms" => set!(t.resize_debounce, ms()),
            "scrolling_quiet_ms" => set!(t.scrolling_quiet, ms()),
            "intersection_threshold" => set!(t.intersection_threshold, num()),
            "entrance_stagger_ms" => set!(t.entrance_stagger, ms()),
            "entrance_settle_ms" => set!(t.entrance_settle, ms()),
            "entrance_offset_px" => set!(t.entrance_offset_px, num()),
            // Keep the preview responsive.
            "frame_interval_ms" => set!(
                self.frame_interval_ms,
                value.parse::<u64>().ok().map(|v| v.clamp(8, 500))
            ),
            "scroll_step" => set!(self.scroll_step, num().filter(|v| *v > 0.0)),
            _ => return false,
        }

        if self.tuning.scale_min > self.tuning.scale_max {
            tracing::warn!("scale_min > scale_max, swapping");
            std::mem::swap(&mut self.tuning.scale_min, &mut self.tuning.scale_max);
        }
        true
    }

    fn serialise(&self) -> Result<String, toml::ser::Error> {
        let t = &self.tuning;
        let mut effects = Table::new();
        let mut put = |key: &str, value: Value| {
            effects.insert(key.to_string(), value);
        };
        put("reveal_threshold", Value::Float(t.reveal_threshold));
        put("reveal_stagger_ms", millis(t.reveal_stagger));
        put("title_band_upper", Value::Float(t.title_band_upper));
        put("title_band_lower", Value::Float(t.title_band_lower));
        put("split_threshold", Value::Float(t.split_threshold));
        put("scale_min", Value::Float(t.scale_min));
        put("scale_max", Value::Float(t.scale_max));
        put("parallax_factor", Value::Float(t.parallax_factor));
        put("parallax_fade_distance", Value::Float(t.parallax_fade_distance));
        put("opacity_policy", Value::String(t.opacity_policy.label().into()));
        put("nav_offset", Value::Float(t.nav_offset));
        put("navbar_threshold", Value::Float(t.navbar_threshold));
        put("timeline_zone_start", Value::Float(t.timeline_zone_start));
        put("timeline_zone_end", Value::Float(t.timeline_zone_end));
        put("gradient_step", Value::Float(t.gradient_step));
        put("resize_debounce_ms", millis(t.resize_debounce));
        put("scrolling_quiet_ms", millis(t.scrolling_quiet));
        put("intersection_threshold", Value::Float(t.intersection_threshold));
        put("entrance_stagger_ms", millis(t.entrance_stagger));
        put("entrance_settle_ms", millis(t.entrance_settle));
        put("entrance_offset_px", Value::Float(t.entrance_offset_px));

        let mut preview = Table::new();
        preview.insert(
            "frame_interval_ms".into(),
            Value::Integer(i64::try_from(self.frame_interval_ms).unwrap_or(i64::MAX)),
        );
        preview.insert("scroll_step".into(), Value::Float(self.scroll_step));

        let mut keys = Table::new();
        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let specs = binds
                    .iter()
                    .map(|b| Value::String(b.to_config_string()))
                    .collect();
                keys.insert(action.config_key().into(), Value::Array(specs));
            }
        }

        let body = toml::to_string_pretty(&ConfigFile {
            effects,
            preview,
            keys,
        })?;
        Ok(format!(
            "# scrollfx configuration\n# opacity_policy: clamp | raw\n# keys: Ctrl+, Alt+, Shift+ prefixes\n\n{body}"
        ))
    }
}

/// On-disk shape of the config file.  Values stay loosely typed so one bad
/// entry only costs that entry.
#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(default)]
    effects: Table,
    #[serde(default)]
    preview: Table,
    #[serde(default)]
    keys: Table,
}

/// Scalar config values as the text `apply_setting` parses.
fn setting_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn millis(d: Duration) -> Value {
    Value::Integer(i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

/// `$XDG_CONFIG_HOME/scrollfx`, or `~/.config/scrollfx`.
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    base.join("scrollfx")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_and_bad_values() {
        let cfg = AppConfig::parse_config(
            r#"
# comment
[effects]
reveal_threshold = 0.6
reveal_stagger_ms = 50
opacity_policy = "raw"
parallax_fade_distance = -3

[preview]
scroll_step = "nope"
frame_interval_ms = 1

[keys]
toggle_theme = ["Ctrl+t"]
"#,
        );
        assert_eq!(cfg.tuning.reveal_threshold, 0.6);
        assert_eq!(cfg.tuning.reveal_stagger, Duration::from_millis(50));
        assert_eq!(cfg.tuning.opacity_policy, OpacityPolicy::Raw);
        assert_eq!(cfg.tuning.parallax_fade_distance, 700.0);
        assert_eq!(cfg.scroll_step, 40.0);
        assert_eq!(cfg.frame_interval_ms, 8);

        let ctrl_t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(cfg.match_key(ctrl_t), Some(Action::ToggleTheme));
        let plain_t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(cfg.match_key(plain_t), None);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.tuning.nav_offset = 120.0;
        cfg.tuning.opacity_policy = OpacityPolicy::Raw;
        cfg.scroll_step = 25.0;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.tuning, cfg.tuning);
        assert_eq!(loaded.scroll_step, 25.0);
        assert_eq!(loaded.bindings, cfg.bindings);
    }

    #[test]
    fn page_keys_map_to_page_actions() {
        let cfg = AppConfig::default();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(cfg.match_key(key(KeyCode::PageUp)), Some(Action::PageUp));
        assert_eq!(cfg.match_key(key(KeyCode::PageDown)), Some(Action::PageDown));
        assert_eq!(cfg.match_key(key(KeyCode::Char(' '))), Some(Action::PageDown));
    }

    #[test]
    fn bindings_accept_a_comma_list_and_skip_bad_keys() {
        let cfg = AppConfig::parse_config(
            r#"
[keys]
quit = "Ctrl+q, x"
next_link = ["NoSuchKey"]
bogus_action = ["z"]
"#,
        );
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(cfg.match_key(ctrl_q), Some(Action::Quit));
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(cfg.match_key(x), Some(Action::Quit));
        assert_eq!(
            cfg.bindings.get(&Action::NextLink),
            AppConfig::default_bindings().get(&Action::NextLink)
        );
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let cfg = AppConfig::parse_config("reveal_threshold = = 0.6\n");
        assert_eq!(cfg.tuning, Tuning::default());
        // Flat keys outside the tables are ignored.
        let flat = AppConfig::parse_config("reveal_threshold = 0.6\n");
        assert_eq!(flat.tuning, Tuning::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml"));
        assert_eq!(cfg.tuning, Tuning::default());
    }
}
