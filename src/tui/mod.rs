// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the parts of the application
// state it renders. The app orchestrator pushes `UiUpdate` messages over an
// mpsc channel; the TUI applies them to `ViewState` and re-renders at
// ~30 fps. No squad logic lives here — every action becomes a UserCommand.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{SquadSummary, SyncStatus, UiUpdate, UserCommand};
use crate::squad::roster::{Player, Slot, SQUAD_SIZE};
use crate::squad::state::{Formation, SquadStats};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Which panel has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pitch,
    Search,
}

/// TUI-local state that mirrors the application state for rendering,
/// updated incrementally via `UiUpdate` messages from the orchestrator.
pub struct ViewState {
    pub slots: Vec<Slot>,
    pub stats: SquadStats,
    pub squad_name: String,
    pub formation: Formation,
    pub persisted_id: Option<String>,
    pub sync_status: SyncStatus,
    pub search_text: String,
    pub search_results: Vec<Player>,
    pub search_loading: bool,
    pub squads: Vec<SquadSummary>,
    /// Transient user-visible message (save outcome, etc.).
    pub notice: Option<String>,

    pub focus: Focus,
    pub selected_slot: usize,
    pub selected_result: usize,
    /// A search result picked up for a targeted drop.
    pub grabbed: Option<Player>,
    pub name_edit: bool,
    pub name_buffer: String,
    pub show_picker: bool,
    pub picker_index: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            slots: vec![Slot::Empty; SQUAD_SIZE],
            stats: SquadStats::default(),
            squad_name: String::new(),
            formation: Formation::default(),
            persisted_id: None,
            sync_status: SyncStatus::default(),
            search_text: String::new(),
            search_results: Vec::new(),
            search_loading: false,
            squads: Vec::new(),
            notice: None,
            focus: Focus::Pitch,
            selected_slot: 0,
            selected_result: 0,
            grabbed: None,
            name_edit: false,
            name_buffer: String::new(),
            show_picker: false,
            picker_index: 0,
        }
    }
}

/// Apply an update from the orchestrator to the view state.
pub fn apply_ui_update(view: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            view.slots = snapshot.slots;
            view.stats = snapshot.stats;
            view.squad_name = snapshot.squad_name;
            view.formation = snapshot.formation;
            view.persisted_id = snapshot.persisted_id;
            view.sync_status = snapshot.sync_status;
            view.search_results = snapshot.search_results;
            view.search_loading = snapshot.search_loading;
            view.squads = snapshot.squads;

            // Keep selections in range after the lists changed.
            if view.selected_result >= view.search_results.len() {
                view.selected_result = view.search_results.len().saturating_sub(1);
            }
            if view.picker_index >= view.squads.len() {
                view.picker_index = view.squads.len().saturating_sub(1);
            }
        }
        UiUpdate::Notice(text) => {
            view.notice = Some(text);
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook that restores the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal even if rendering panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(update) => apply_ui_update(&mut view, update),
                    None => break, // orchestrator is gone
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        if let Some(cmd) = input::handle_key(key, &mut view) {
                            let quitting = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quitting {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse/resize events: the next render tick picks up
                        // the new size.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, view: &ViewState) {
    let area = frame.area();
    let zones = build_layout(area);

    widgets::status_bar::render(frame, zones.status_bar, view);
    widgets::squad_grid::render(frame, zones.pitch, view);
    widgets::search_panel::render(frame, zones.search, view);
    render_help_bar(frame, zones.help_bar, view);

    if view.show_picker {
        widgets::squad_picker::render(frame, area, view);
    }
}

const HELP_TEXT: &str = " Tab search · arrows move · ^G grab · Enter add/drop · x clear · \
f formation · n new · s save · l load · r rename · d seed · q quit";

fn render_help_bar(frame: &mut Frame, area: ratatui::layout::Rect, view: &ViewState) {
    let line = match (&view.notice, view.name_edit) {
        (_, true) => Line::styled(
            format!(" Name: {}▌  (Enter confirm, Esc cancel)", view.name_buffer),
            Style::default().fg(Color::White).bg(Color::Blue),
        ),
        (Some(notice), _) => Line::styled(
            format!(" {notice}"),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
        (None, _) => Line::styled(HELP_TEXT, Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(line), area);
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
