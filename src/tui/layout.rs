// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                               |
// +--------------------------------+-----------------+
// | Pitch (62%)                    | Search (38%)    |
// |                                |                 |
// +--------------------------------+-----------------+
// | Help / Notice Bar (1 row)                        |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: squad name, formation, stats, sync indicator.
    pub status_bar: Rect,
    /// Left side: the 11-slot pitch grid.
    pub pitch: Rect,
    /// Right side: search input and result list.
    pub search: Rect,
    /// Bottom row: keyboard hints or the current notice.
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // middle section (pitch + search)
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let middle = vertical[1];
    let help_bar = vertical[2];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(middle);

    AppLayout {
        status_bar,
        pitch: horizontal[0],
        search: horizontal[1],
        help_bar,
    }
}

/// A rectangle centered in `area` covering the given percentages, for the
/// squad picker modal.
pub fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_zones_fill_the_area() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = build_layout(area);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(
            layout.status_bar.height + layout.pitch.height + layout.help_bar.height,
            area.height
        );
        assert_eq!(layout.pitch.width + layout.search.width, area.width);
    }

    #[test]
    fn centered_rect_is_inside_the_area() {
        let area = Rect::new(0, 0, 100, 30);
        let modal = centered_rect(area, 50, 60);
        assert!(modal.x >= area.x && modal.right() <= area.right());
        assert!(modal.y >= area.y && modal.bottom() <= area.bottom());
    }
}
