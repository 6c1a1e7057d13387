//! Input handling for the TUI.
//!
//! Routes keys to the help overlay, the context menu, or the active view,
//! in that order. Each layer captures every key while it is visible.

use crate::app::{App, AppEvent, ContextMenuState, Tab, View, CONTEXT_MENU_ITEMS};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::layout::Direction;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::helpers::{maybe_load_more, spawn_like, spawn_mark_all, spawn_reload, toggle_like};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Handle help overlay input first (captures all keys when visible)
    if app.show_help {
        return handle_help_input(app, code);
    }

    if app.context_menu.is_some() {
        return handle_context_menu_input(app, code, modifiers, event_tx);
    }

    match app.view {
        View::Browse => handle_browse_input(app, code, modifiers, event_tx),
        View::Detail { .. } => handle_detail_input(app, code, modifiers, event_tx),
    }
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    app.needs_redraw = true;
    Action::Continue
}

/// Handle input in the grid or notifications list.
fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let context = app.context();
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::MoveUp => move_focus(app, Direction::Up, event_tx),
        KbAction::MoveDown => move_focus(app, Direction::Down, event_tx),
        KbAction::MoveLeft => move_focus(app, Direction::Left, event_tx),
        KbAction::MoveRight => move_focus(app, Direction::Right, event_tx),
        KbAction::Open => {
            app.open_focused();
        }
        KbAction::ToggleLike => toggle_like(app, event_tx),
        KbAction::ContextMenu => {
            if !app.open_context_menu() {
                app.set_status("Nothing selected");
            }
        }
        KbAction::Back => {}
        KbAction::CycleViewMode => {
            if app.tab == Tab::Feed {
                app.cycle_view_mode();
            }
        }
        KbAction::SwitchTab => app.switch_tab(),
        KbAction::Refresh => {
            let tab = app.tab;
            spawn_reload(app, tab, event_tx);
            app.set_status(match tab {
                Tab::Feed => "Reloading feed...",
                Tab::Notifications => "Reloading notifications...",
            });
        }
        KbAction::MarkAllSeen => spawn_mark_all(app, event_tx),
        KbAction::ShowHelp => open_help(app),
    }
    Action::Continue
}

/// Handle input in the detail overlay.
fn handle_detail_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Detail) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::Back) => app.close_detail(),
        Some(KbAction::ToggleLike) => toggle_like(app, event_tx),
        Some(KbAction::ShowHelp) => open_help(app),
        _ => {}
    }
    Action::Continue
}

/// Handle input while the context menu is visible.
fn handle_context_menu_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Take ownership; the menu is put back unless the key closes it
    let Some(mut menu) = app.context_menu.take() else {
        return Action::Continue;
    };
    app.needs_redraw = true;

    match app.keybindings.action_for_key(code, modifiers, KbContext::Menu) {
        Some(KbAction::MoveUp) => {
            menu.selected_item = menu.selected_item.saturating_sub(1);
            app.context_menu = Some(menu);
        }
        Some(KbAction::MoveDown) => {
            menu.selected_item = (menu.selected_item + 1).min(CONTEXT_MENU_ITEMS.len() - 1);
            app.context_menu = Some(menu);
        }
        Some(KbAction::Open) => run_menu_item(app, menu, event_tx),
        Some(KbAction::Back) => {}
        Some(KbAction::Quit) => return Action::Quit,
        _ => app.context_menu = Some(menu),
    }
    Action::Continue
}

fn run_menu_item(app: &mut App, menu: ContextMenuState, event_tx: &mpsc::Sender<AppEvent>) {
    match (menu.selected_item, menu.tab) {
        (0, tab) => {
            app.open(tab, menu.index);
        }
        (1, Tab::Feed) => {
            let Some(uri) = app.posts.items().get(menu.index).map(|p| p.uri.clone()) else {
                return;
            };
            let (uri, liked) = app.toggle_like_uri(uri);
            spawn_like(app, uri, liked, event_tx);
        }
        (1, Tab::Notifications) => app.set_status("Only posts can be liked"),
        (2, Tab::Notifications) => {
            app.mark_seen(menu.index, Instant::now());
        }
        (2, Tab::Feed) => app.set_status("Only notifications can be marked seen"),
        _ => {}
    }
}

fn move_focus(app: &mut App, direction: Direction, event_tx: &mpsc::Sender<AppEvent>) {
    if app.move_focus(direction) {
        maybe_load_more(app, event_tx);
    }
}

fn open_help(app: &mut App) {
    app.show_help = true;
    app.help_scroll_offset = 0;
    app.needs_redraw = true;
}
