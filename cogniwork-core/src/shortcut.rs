//! 键盘快捷键
//!
//! 快捷键与按键事件的匹配规则：按键名不区分大小写，
//! Ctrl 与 Meta（Cmd）等价，Shift / Alt 必须完全一致。

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// 快捷键触发的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    OpenSearch,
    FocusSearch,
    NewItem,
    GoToDashboard,
    Custom(String),
}

/// 一次按键事件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// 按键组合，例如 "ctrl+shift+k"、"/"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Chord {
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.key.to_lowercase() == press.key.to_lowercase()
            && self.ctrl == (press.ctrl || press.meta)
            && self.shift == press.shift
            && self.alt == press.alt
    }

    /// 把组合键转换成等价的按键事件
    pub fn to_key_press(&self) -> KeyPress {
        KeyPress {
            key: self.key.clone(),
            ctrl: self.ctrl,
            meta: false,
            shift: self.shift,
            alt: self.alt,
        }
    }
}

impl FromStr for Chord {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        // "+" 本身也可以是按键，例如 "ctrl++"
        let (modifiers, key) = if trimmed == "+" {
            ("", "+")
        } else if let Some(rest) = trimmed.strip_suffix("++") {
            (rest, "+")
        } else {
            match trimmed.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", trimmed),
            }
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(CoreError::InvalidChord(s.to_string()));
        }

        let mut chord = Chord {
            key: key.to_lowercase(),
            ctrl: false,
            shift: false,
            alt: false,
        };

        for modifier in modifiers.split('+').map(str::trim).filter(|m| !m.is_empty()) {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "meta" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                _ => return Err(CoreError::InvalidChord(s.to_string())),
            }
        }

        Ok(chord)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        f.write_str(&self.key.to_uppercase())
    }
}

/// 快捷键定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub chord: Chord,
    pub description: String,
    pub action: ShortcutAction,
}

impl Shortcut {
    pub fn new(chord: Chord, description: impl Into<String>, action: ShortcutAction) -> Self {
        Self {
            chord,
            description: description.into(),
            action,
        }
    }
}

/// 快捷键注册表
#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仪表盘默认快捷键
    pub fn defaults() -> Self {
        let chord = |key: &str, ctrl: bool| Chord {
            key: key.to_string(),
            ctrl,
            shift: false,
            alt: false,
        };

        let mut registry = Self::new();
        registry.register(Shortcut::new(chord("k", true), "Open search", ShortcutAction::OpenSearch));
        registry.register(Shortcut::new(chord("/", false), "Focus search", ShortcutAction::FocusSearch));
        registry.register(Shortcut::new(chord("n", true), "New item", ShortcutAction::NewItem));
        registry.register(Shortcut::new(chord("h", true), "Go to dashboard", ShortcutAction::GoToDashboard));
        registry
    }

    pub fn register(&mut self, shortcut: Shortcut) {
        tracing::debug!(chord = %shortcut.chord, "Registering shortcut");
        self.shortcuts.push(shortcut);
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// 返回所有匹配的快捷键（按注册顺序），同一组合键注册多次时全部触发
    pub fn dispatch(&self, press: &KeyPress) -> Vec<&Shortcut> {
        let matched: Vec<&Shortcut> = self
            .shortcuts
            .iter()
            .filter(|shortcut| shortcut.chord.matches(press))
            .collect();
        tracing::trace!(key = %press.key, matched = matched.len(), "Dispatched key press");
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chords() {
        let chord: Chord = "Ctrl+Shift+K".parse().unwrap();
        assert_eq!(chord.key, "k");
        assert!(chord.ctrl && chord.shift && !chord.alt);

        let slash: Chord = "/".parse().unwrap();
        assert_eq!(slash.key, "/");
        assert!(!slash.ctrl);

        let plus: Chord = "ctrl++".parse().unwrap();
        assert_eq!(plus.key, "+");
        assert!(plus.ctrl);

        assert!("ctrl+".parse::<Chord>().is_err());
        assert!("hyper+k".parse::<Chord>().is_err());
    }

    #[test]
    fn test_chord_display() {
        let chord: Chord = "alt+ctrl+h".parse().unwrap();
        assert_eq!(chord.to_string(), "Ctrl+Alt+H");
    }

    #[test]
    fn test_meta_counts_as_ctrl() {
        let registry = ShortcutRegistry::defaults();
        let matched = registry.dispatch(&KeyPress::new("K").meta());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].action, ShortcutAction::OpenSearch);
    }

    #[test]
    fn test_modifiers_must_match_exactly() {
        let registry = ShortcutRegistry::defaults();
        assert!(registry.dispatch(&KeyPress::new("k")).is_empty());
        assert!(registry.dispatch(&KeyPress::new("k").ctrl().shift()).is_empty());
        assert!(registry.dispatch(&KeyPress::new("/").ctrl()).is_empty());
        assert_eq!(registry.dispatch(&KeyPress::new("/")).len(), 1);
    }

    #[test]
    fn test_all_matching_shortcuts_fire() {
        let mut registry = ShortcutRegistry::defaults();
        registry.register(Shortcut::new(
            "ctrl+k".parse().unwrap(),
            "Command palette",
            ShortcutAction::Custom("palette".into()),
        ));

        let actions: Vec<_> = registry
            .dispatch(&KeyPress::new("k").ctrl())
            .into_iter()
            .map(|s| s.action.clone())
            .collect();
        assert_eq!(
            actions,
            vec![ShortcutAction::OpenSearch, ShortcutAction::Custom("palette".into())]
        );
    }

    #[test]
    fn test_chord_to_key_press_round_trip() {
        let chord: Chord = "ctrl+n".parse().unwrap();
        assert!(chord.matches(&chord.to_key_press()));
    }

    #[test]
    fn test_non_ascii_keys_match_case_insensitively() {
        let chord: Chord = "alt+É".parse().unwrap();
        assert!(chord.matches(&KeyPress::new("é").alt()));
        assert!(chord.matches(&KeyPress::new("É").alt()));
        assert!(!chord.matches(&KeyPress::new("e").alt()));
    }
}
