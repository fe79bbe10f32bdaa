// Status bar widget: squad name, formation, stats, sync indicator.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::SyncStatus;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [name][unsaved marker] | formation | players/OVR/chem | sync dot
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    // An asterisk marks a squad that has never been saved.
    let marker = if state.persisted_id.is_none() { "*" } else { "" };
    spans.push(Span::styled(
        format!(" {}{marker}", state.squad_name),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        state.formation.to_string(),
        Style::default().fg(Color::Cyan),
    ));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.push(Span::styled(
        format!(
            "Players {}/11  OVR {:.0}  Chem {}/33",
            state.stats.players, state.stats.avg_rating, state.stats.chemistry
        ),
        Style::default().fg(Color::White),
    ));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    let (label, color) = sync_indicator(state.sync_status);
    spans.push(Span::styled(label, Style::default().fg(color)));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Label and color for the sync state.
pub fn sync_indicator(status: SyncStatus) -> (&'static str, Color) {
    match status {
        SyncStatus::Idle => ("● synced", Color::Green),
        SyncStatus::Pending => ("⟳ syncing", Color::Yellow),
    }
}
