// Pitch widget: the 11 slots laid out in formation-shaped rows.
//
// Slot indices run goalkeeper-first through Formation::rows; rows are
// rendered attack-first so the pitch reads top-down like a lineup graphic.
// Stub slots (loaded but not yet enriched) render as dim loading cards,
// not as empty slots.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::squad::roster::Slot;
use crate::tui::{Focus, ViewState};

/// Render the pitch into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut title = format!(" Pitch — {} ", state.formation);
    if let Some(grabbed) = &state.grabbed {
        title = format!(" Pitch — {} · dropping {} ", state.formation, grabbed.name);
    }

    let border_style = if state.focus == Focus::Pitch && !state.show_picker {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = state.formation.rows();
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows.len() as u32); rows.len()])
        .split(inner);

    // First slot index of each formation row.
    let mut starts = Vec::with_capacity(rows.len());
    let mut acc = 0;
    for &len in rows {
        starts.push(acc);
        acc += len;
    }

    // Attack row first on screen, goalkeeper last.
    for (display_idx, row) in (0..rows.len()).rev().enumerate() {
        let row_len = rows[row];
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, row_len as u32); row_len])
            .split(row_areas[display_idx]);

        for col in 0..row_len {
            let index = starts[row] + col;
            render_slot(frame, cells[col], index, &state.slots[index], state);
        }
    }
}

fn render_slot(frame: &mut Frame, area: Rect, index: usize, slot: &Slot, state: &ViewState) {
    let selected = state.focus == Focus::Pitch && state.selected_slot == index;

    let border_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines: Vec<Line> = match slot {
        Slot::Filled(player) => vec![
            Line::styled(
                format!("{} {}", player.rating, player.position),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Line::styled(player.name.clone(), Style::default().fg(Color::White)),
            Line::styled(player.club.clone(), Style::default().fg(Color::Gray)),
        ],
        Slot::Stub { id } => vec![
            Line::styled("loading…", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
            Line::styled(format!("#{id}"), Style::default().fg(Color::DarkGray)),
        ],
        Slot::Empty => {
            let hint = if selected && state.grabbed.is_some() {
                "drop here"
            } else {
                "empty"
            };
            vec![Line::styled(hint, Style::default().fg(Color::DarkGray))]
        }
    };

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
    frame.render_widget(card, area);
}
