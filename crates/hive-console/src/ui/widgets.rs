use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

pub(crate) fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

pub(crate) fn text_panel<'a>(title: &'a str, body: &'a str, focused: bool) -> Paragraph<'a> {
    Paragraph::new(body).block(panel_block(title, focused))
}

pub(crate) fn list_panel<'a>(title: &'a str, lines: &'a [String], empty: &'a str) -> List<'a> {
    let items: Vec<ListItem> = if lines.is_empty() {
        vec![ListItem::new(empty)]
    } else {
        lines.iter().map(|line| ListItem::new(line.as_str())).collect()
    };
    List::new(items).block(panel_block(title, false))
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
