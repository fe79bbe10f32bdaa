// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, or into local ViewState mutations (selection movement,
// grabbing a search result, opening the picker). Pure function so the
// keybinding logic is unit-testable without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::UserCommand;
use crate::squad::roster::SQUAD_SIZE;
use crate::squad::state::Formation;

use super::{Focus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the app orchestrator, `None` when it was handled locally.
pub fn handle_key(key: KeyEvent, view: &mut ViewState) -> Option<UserCommand> {
    // On Windows, crossterm emits both Press and Release events; ignoring
    // non-Press events prevents double-processing.
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Any keypress dismisses a lingering notice.
    view.notice = None;

    // Ctrl+C always quits immediately regardless of mode (escape hatch).
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view.show_picker {
        return handle_picker(key, view);
    }
    if view.name_edit {
        return handle_name_edit(key, view);
    }
    match view.focus {
        Focus::Search => handle_search_keys(key, view),
        Focus::Pitch => handle_pitch_keys(key, view),
    }
}

// ---------------------------------------------------------------------------
// Mode handlers
// ---------------------------------------------------------------------------

fn handle_picker(key: KeyEvent, view: &mut ViewState) -> Option<UserCommand> {
    match key.code {
        KeyCode::Up => {
            view.picker_index = view.picker_index.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            if view.picker_index + 1 < view.squads.len() {
                view.picker_index += 1;
            }
            None
        }
        KeyCode::Enter => {
            let id = view.squads.get(view.picker_index).map(|s| s.id.clone())?;
            view.show_picker = false;
            Some(UserCommand::LoadSquad(id))
        }
        KeyCode::Esc => {
            view.show_picker = false;
            None
        }
        _ => None,
    }
}

fn handle_name_edit(key: KeyEvent, view: &mut ViewState) -> Option<UserCommand> {
    match key.code {
        KeyCode::Char(c) => {
            view.name_buffer.push(c);
            None
        }
        KeyCode::Backspace => {
            view.name_buffer.pop();
            None
        }
        KeyCode::Enter => {
            view.name_edit = false;
            Some(UserCommand::SetSquadName(view.name_buffer.clone()))
        }
        KeyCode::Esc => {
            view.name_edit = false;
            None
        }
        _ => None,
    }
}

fn handle_search_keys(key: KeyEvent, view: &mut ViewState) -> Option<UserCommand> {
    // Ctrl+G grabs the selected result for a targeted drop on the pitch.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('g') {
        if let Some(player) = view.search_results.get(view.selected_result) {
            view.grabbed = Some(player.clone());
            view.focus = Focus::Pitch;
        }
        return None;
    }

    match key.code {
        KeyCode::Char(c) => {
            view.search_text.push(c);
            view.selected_result = 0;
            Some(UserCommand::SearchInput(view.search_text.clone()))
        }
        KeyCode::Backspace => {
            view.search_text.pop();
            view.selected_result = 0;
            Some(UserCommand::SearchInput(view.search_text.clone()))
        }
        KeyCode::Up => {
            view.selected_result = view.selected_result.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            if view.selected_result + 1 < view.search_results.len() {
                view.selected_result += 1;
            }
            None
        }
        // Quick add: first empty slot wins.
        KeyCode::Enter => view
            .search_results
            .get(view.selected_result)
            .cloned()
            .map(UserCommand::AddToFirstEmpty),
        KeyCode::Tab => {
            view.focus = Focus::Pitch;
            None
        }
        KeyCode::Esc => {
            if view.search_text.is_empty() {
                view.focus = Focus::Pitch;
                None
            } else {
                view.search_text.clear();
                view.selected_result = 0;
                Some(UserCommand::SearchInput(String::new()))
            }
        }
        _ => None,
    }
}

fn handle_pitch_keys(key: KeyEvent, view: &mut ViewState) -> Option<UserCommand> {
    match key.code {
        KeyCode::Tab | KeyCode::Char('/') => {
            view.focus = Focus::Search;
            None
        }
        KeyCode::Left => {
            view.selected_slot = view.selected_slot.saturating_sub(1);
            None
        }
        KeyCode::Right => {
            if view.selected_slot + 1 < SQUAD_SIZE {
                view.selected_slot += 1;
            }
            None
        }
        KeyCode::Up => {
            view.selected_slot = move_vertical(view.formation, view.selected_slot, 1);
            None
        }
        KeyCode::Down => {
            view.selected_slot = move_vertical(view.formation, view.selected_slot, -1);
            None
        }
        KeyCode::Enter => {
            let player = view.grabbed.take()?;
            Some(UserCommand::PlaceAt {
                slot: view.selected_slot,
                player,
            })
        }
        KeyCode::Char('x') | KeyCode::Delete => Some(UserCommand::ClearSlot(view.selected_slot)),
        KeyCode::Char('n') => Some(UserCommand::NewSquad),
        KeyCode::Char('s') => Some(UserCommand::SaveSquad),
        KeyCode::Char('l') => {
            view.show_picker = true;
            view.picker_index = 0;
            Some(UserCommand::RefreshSquadList)
        }
        KeyCode::Char('r') => {
            view.name_edit = true;
            view.name_buffer = view.squad_name.clone();
            None
        }
        KeyCode::Char('f') => {
            // Optimistic local update; the snapshot echoes it back.
            view.formation = view.formation.next();
            Some(UserCommand::SetFormation(view.formation))
        }
        KeyCode::Char('d') => Some(UserCommand::SeedSamplePlayers),
        KeyCode::Char('q') => Some(UserCommand::Quit),
        KeyCode::Esc => {
            view.grabbed = None;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Pitch navigation
// ---------------------------------------------------------------------------

/// Move the slot selection one formation row up (`+1`, towards the attack)
/// or down (`-1`, towards the goalkeeper), keeping the column proportion.
///
/// Slot indices run goalkeeper-first through `Formation::rows`.
fn move_vertical(formation: Formation, index: usize, direction: i32) -> usize {
    let rows = formation.rows();

    // Locate the row containing `index` and its offset within it.
    let mut start = 0;
    let mut row = 0;
    for (r, &len) in rows.iter().enumerate() {
        if index < start + len {
            row = r;
            break;
        }
        start += len;
    }
    let col = index - start;

    let target_row = if direction > 0 {
        if row + 1 >= rows.len() {
            return index;
        }
        row + 1
    } else {
        if row == 0 {
            return index;
        }
        row - 1
    };

    let target_start: usize = rows[..target_row].iter().sum();
    let target_len = rows[target_row];
    // Scale the column into the target row's width.
    let target_col = (col * target_len) / rows[row].max(1);
    target_start + target_col.min(target_len - 1)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::squad::roster::Player;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_string(),
            club: String::new(),
            nation: String::new(),
            position: "ST".to_string(),
            rating: 80,
            img: None,
        }
    }

    fn search_view() -> ViewState {
        let mut view = ViewState::default();
        view.focus = Focus::Search;
        view.search_results = vec![player("a"), player("b")];
        view
    }

    #[test]
    fn typing_accumulates_search_text() {
        let mut view = search_view();
        assert_eq!(
            handle_key(press(KeyCode::Char('m')), &mut view),
            Some(UserCommand::SearchInput("m".to_string()))
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('e')), &mut view),
            Some(UserCommand::SearchInput("me".to_string()))
        );
        assert_eq!(
            handle_key(press(KeyCode::Backspace), &mut view),
            Some(UserCommand::SearchInput("m".to_string()))
        );
    }

    #[test]
    fn enter_in_search_adds_selected_to_first_empty() {
        let mut view = search_view();
        handle_key(press(KeyCode::Down), &mut view);
        let cmd = handle_key(press(KeyCode::Enter), &mut view);
        assert_eq!(cmd, Some(UserCommand::AddToFirstEmpty(player("b"))));
    }

    #[test]
    fn ctrl_g_grabs_and_enter_drops_on_selected_slot() {
        let mut view = search_view();
        assert_eq!(handle_key(ctrl('g'), &mut view), None);
        assert_eq!(view.focus, Focus::Pitch);
        assert!(view.grabbed.is_some());

        handle_key(press(KeyCode::Right), &mut view);
        let cmd = handle_key(press(KeyCode::Enter), &mut view);
        assert_eq!(
            cmd,
            Some(UserCommand::PlaceAt {
                slot: 1,
                player: player("a")
            })
        );
        assert!(view.grabbed.is_none());
    }

    #[test]
    fn escape_cancels_a_grab() {
        let mut view = search_view();
        handle_key(ctrl('g'), &mut view);
        handle_key(press(KeyCode::Esc), &mut view);
        assert!(view.grabbed.is_none());
        assert_eq!(handle_key(press(KeyCode::Enter), &mut view), None);
    }

    #[test]
    fn x_clears_the_selected_slot() {
        let mut view = ViewState::default();
        view.selected_slot = 4;
        assert_eq!(
            handle_key(press(KeyCode::Char('x')), &mut view),
            Some(UserCommand::ClearSlot(4))
        );
    }

    #[test]
    fn picker_enter_loads_the_selected_squad() {
        let mut view = ViewState::default();
        view.show_picker = true;
        view.squads = vec![
            crate::protocol::SquadSummary {
                id: "s1".to_string(),
                name: "One".to_string(),
                formation: "4-3-3".to_string(),
            },
            crate::protocol::SquadSummary {
                id: "s2".to_string(),
                name: "Two".to_string(),
                formation: "4-4-2".to_string(),
            },
        ];
        handle_key(press(KeyCode::Down), &mut view);
        let cmd = handle_key(press(KeyCode::Enter), &mut view);
        assert_eq!(cmd, Some(UserCommand::LoadSquad("s2".to_string())));
        assert!(!view.show_picker);
    }

    #[test]
    fn rename_commits_on_enter() {
        let mut view = ViewState::default();
        view.squad_name = "Old".to_string();
        handle_key(press(KeyCode::Char('r')), &mut view);
        assert!(view.name_edit);
        handle_key(press(KeyCode::Char('!')), &mut view);
        let cmd = handle_key(press(KeyCode::Enter), &mut view);
        assert_eq!(cmd, Some(UserCommand::SetSquadName("Old!".to_string())));
        assert!(!view.name_edit);
    }

    #[test]
    fn quit_only_from_pitch_mode() {
        let mut view = ViewState::default();
        assert_eq!(
            handle_key(press(KeyCode::Char('q')), &mut view),
            Some(UserCommand::Quit)
        );

        let mut view = search_view();
        // In search mode 'q' is just a character.
        assert_eq!(
            handle_key(press(KeyCode::Char('q')), &mut view),
            Some(UserCommand::SearchInput("q".to_string()))
        );
        // Ctrl+C quits from anywhere.
        assert_eq!(handle_key(ctrl('c'), &mut view), Some(UserCommand::Quit));
    }

    #[test]
    fn vertical_movement_respects_formation_rows() {
        // 4-3-3: GK = 0, defence = 1..=4, midfield = 5..=7, attack = 8..=10.
        let f = Formation::F433;
        assert_eq!(move_vertical(f, 0, 1), 1); // GK up into the defence
        assert_eq!(move_vertical(f, 4, 1), 7); // last defender -> last mid
        assert_eq!(move_vertical(f, 5, -1), 1); // first mid -> first defender
        assert_eq!(move_vertical(f, 9, 1), 9); // attack row: can't go higher
        assert_eq!(move_vertical(f, 0, -1), 0); // GK: can't go lower
    }
}
