// TUI widget modules for each panel.

pub mod search_panel;
pub mod squad_grid;
pub mod squad_picker;
pub mod status_bar;
