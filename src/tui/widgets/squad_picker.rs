// Squad picker modal: list of saved squads for loading.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::tui::layout::centered_rect;
use crate::tui::ViewState;

/// Render the picker as a centered modal over the whole frame area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let modal = centered_rect(area, 50, 60);
    frame.render_widget(Clear, modal);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Load squad ")
        .title_bottom(" Enter load · Esc close ");
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    if state.squads.is_empty() {
        let empty =
            Paragraph::new("No saved squads.").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let items: Vec<ListItem> = state
        .squads
        .iter()
        .enumerate()
        .map(|(i, squad)| {
            let style = if i == state.picker_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::styled(
                format!("{} ({})", squad.name, squad.formation),
                style,
            ))
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}
