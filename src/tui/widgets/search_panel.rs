// Search panel widget: query input line and result list.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::tui::{Focus, ViewState};

/// Render the search panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let focused = state.focus == Focus::Search && !state.show_picker && !state.name_edit;
    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Search players ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    // Query line with a cursor marker when focused.
    let cursor = if focused { "▌" } else { "" };
    let query = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}{cursor}", state.search_text),
            Style::default().fg(Color::White),
        ),
    ]));
    frame.render_widget(query, sections[0]);

    let list_area = sections[1];
    if state.search_loading {
        let loading = Paragraph::new("Loading…").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, list_area);
        return;
    }
    if state.search_results.is_empty() {
        let empty = Paragraph::new("No players found.").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    // Keep the selected row visible.
    let visible = (list_area.height as usize).max(1);
    let offset = state.selected_result.saturating_sub(visible.saturating_sub(1));

    let items: Vec<ListItem> = state
        .search_results
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, player)| {
            let style = if i == state.selected_result {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::styled(
                format!(
                    "{:>2} {:<3} {} — {} • {}",
                    player.rating, player.position, player.name, player.club, player.nation
                ),
                style,
            ))
        })
        .collect();

    frame.render_widget(List::new(items), list_area);
}
