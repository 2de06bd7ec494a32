use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::Line,
    widgets::{Clear, Paragraph},
};

use super::app::{App, InputField};
use super::view_model::UiView;
use super::widgets::{centered_rect, list_panel, panel_block, text_panel};

pub(crate) fn draw(f: &mut ratatui::Frame, app: &App) {
    let view = UiView::from_app(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    f.render_widget(
        Paragraph::new(Line::from(view.header.as_str())).block(panel_block("Target", false)),
        chunks[0],
    );

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    f.render_widget(text_panel(&view.status_title, &view.status_body, false), top[0]);
    f.render_widget(text_panel("Session", &view.session_body, false), top[1]);

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(chunks[2]);
    f.render_widget(
        text_panel(
            &view.file_title,
            &view.file_line,
            app.editing == Some(InputField::File),
        ),
        inputs[0],
    );
    f.render_widget(
        text_panel(
            &view.delay_title,
            &view.delay_line,
            app.editing == Some(InputField::Delay),
        ),
        inputs[1],
    );

    f.render_widget(list_panel(&view.log_title, &view.log_lines, "<no log entries>"), chunks[3]);
    f.render_widget(Paragraph::new(Line::from(view.keys_line.as_str())), chunks[4]);

    if let Some(lines) = view.diagnostics.as_ref() {
        let area = centered_rect(80, 70, f.area());
        f.render_widget(Clear, area);
        f.render_widget(
            list_panel("Diagnostics (Esc to close)", lines, "<no diagnostics>"),
            area,
        );
    }
}
