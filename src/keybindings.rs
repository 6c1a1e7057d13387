//! Keybinding registry: maps keys to actions per context, with config overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Open,
    ToggleLike,
    ContextMenu,
    Back,
    CycleViewMode,
    SwitchTab,
    Refresh,
    MarkAllSeen,
    ShowHelp,
}

impl Action {
    const ALL: [Action; 14] = [
        Action::Quit,
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Open,
        Action::ToggleLike,
        Action::ContextMenu,
        Action::Back,
        Action::CycleViewMode,
        Action::SwitchTab,
        Action::Refresh,
        Action::MarkAllSeen,
        Action::ShowHelp,
    ];

    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::MoveUp => "Move focus up",
            Self::MoveDown => "Move focus down",
            Self::MoveLeft => "Move focus to the previous column",
            Self::MoveRight => "Move focus to the next column",
            Self::Open => "Open focused item",
            Self::ToggleLike => "Like / unlike focused post",
            Self::ContextMenu => "Item context menu",
            Self::Back => "Go back / dismiss",
            Self::CycleViewMode => "Cycle column count",
            Self::SwitchTab => "Switch between feed and notifications",
            Self::Refresh => "Reload the current list",
            Self::MarkAllSeen => "Mark all notifications seen",
            Self::ShowHelp => "Show help",
        }
    }

    /// Config name, as used in the `[keybindings]` table.
    pub fn config_name(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::Open => "open",
            Self::ToggleLike => "toggle_like",
            Self::ContextMenu => "context_menu",
            Self::Back => "back",
            Self::CycleViewMode => "cycle_view_mode",
            Self::SwitchTab => "switch_tab",
            Self::Refresh => "refresh",
            Self::MarkAllSeen => "mark_all_seen",
            Self::ShowHelp => "show_help",
        }
    }
}

/// Parse an action name from config. Accepts the config name and a few aliases.
fn parse_action_name(name: &str) -> Option<Action> {
    let name = name.trim().to_lowercase();
    if let Some(action) = Action::ALL.into_iter().find(|a| a.config_name() == name) {
        return Some(action);
    }
    match name.as_str() {
        "up" => Some(Action::MoveUp),
        "down" => Some(Action::MoveDown),
        "left" => Some(Action::MoveLeft),
        "right" => Some(Action::MoveRight),
        "like" => Some(Action::ToggleLike),
        "menu" => Some(Action::ContextMenu),
        "view_mode" | "columns" => Some(Action::CycleViewMode),
        "tab" => Some(Action::SwitchTab),
        "mark_all_read" => Some(Action::MarkAllSeen),
        "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    /// The masonry feed tab.
    Grid,
    Notifications,
    /// Full-item overlay.
    Detail,
    /// Context menu popup.
    Menu,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Grid => "Feed",
            Self::Notifications => "Notifications",
            Self::Detail => "Detail",
            Self::Menu => "Menu",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Drop SHIFT from character keys: the case of the char already carries it.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers - KeyModifiers::SHIFT),
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "L", "?"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right", "Space"
/// - Ctrl combos: "Ctrl+r"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" => Some(KeyCode::BackTab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    };

    format!("{modifier}{key_name}")
}

// ============================================================================
// Keybinding Registry
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::char('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::MoveUp),
    (Context::Global, KeySpec::char('k'), Action::MoveUp),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::MoveDown),
    (Context::Global, KeySpec::char('j'), Action::MoveDown),
    (Context::Global, KeySpec::plain(KeyCode::Left), Action::MoveLeft),
    (Context::Global, KeySpec::char('h'), Action::MoveLeft),
    (Context::Global, KeySpec::plain(KeyCode::Right), Action::MoveRight),
    (Context::Global, KeySpec::char('l'), Action::MoveRight),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Open),
    (Context::Global, KeySpec::char('L'), Action::ToggleLike),
    (Context::Global, KeySpec::char('m'), Action::ContextMenu),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::SwitchTab),
    (Context::Global, KeySpec::char('r'), Action::Refresh),
    (Context::Global, KeySpec::char('?'), Action::ShowHelp),
    (Context::Grid, KeySpec::char('v'), Action::CycleViewMode),
    (Context::Notifications, KeySpec::char('A'), Action::MarkAllSeen),
    (Context::Detail, KeySpec::char('b'), Action::Back),
    (Context::Detail, KeySpec::char('L'), Action::ToggleLike),
    (Context::Menu, KeySpec::char(' '), Action::Open),
];

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to `Global` when the specific context has no binding.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the `[keybindings]` config table.
    ///
    /// Keys in the map are action names (e.g., "quit", "move_down").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every existing key for that action, in the same contexts.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{action_name}', ignoring"));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{key_str}' for action '{action_name}', ignoring"
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for context in contexts {
                self.bind(context, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key, trying `context` first and then `Global`.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();
        self.lookup
            .get(&(context, key))
            .or_else(|| self.lookup.get(&(Context::Global, key)))
            .copied()
    }

    /// All bindings for the help screen: (context, key, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
