//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Phase};

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    match app.phase {
        Phase::Loading => render_loading(frame, app),
        Phase::Ready => render_playground(frame, app),
    }

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Status line and progress gauge shown while the runtime boots
fn render_loading(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 40, frame.area());
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Status
            Constraint::Length(3), // Gauge
            Constraint::Length(1), // Hint
        ])
        .split(area);

    let failed = app.boot_failed();
    let status_style = if failed {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    };
    let status = Paragraph::new(app.progress.status.as_str())
        .style(status_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Python in the Terminal")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, layout[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(if failed { Color::Red } else { Color::Cyan }))
        .percent(u16::from(app.progress.percent.min(100)));
    frame.render_widget(gauge, layout[1]);

    let hint = if failed { "Press q to quit" } else { "Esc to quit" };
    frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        layout[2],
    );
}

fn render_playground(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),         // Editor
            Constraint::Percentage(40), // Result
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_editor(frame, app, main_layout[0]);
    render_result(frame, app, main_layout[1]);
    render_status_bar(frame, app, main_layout[2]);
}

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let (row, _) = app.editor.cursor();
    let top = row.saturating_sub(inner_height.saturating_sub(1));
    let gutter = app.editor.lines().len().to_string().len();

    let lines: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .enumerate()
        .skip(top)
        .take(inner_height.max(1))
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>gutter$} ", i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(text.clone()),
            ])
        })
        .collect();

    let editor = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Python Code (F5 / Ctrl+R to run)"),
    );
    frame.render_widget(editor, area);

    if !app.show_help {
        let x = area.x + 1 + (gutter + 1 + app.editor.cursor_display_col()) as u16;
        let y = area.y + 1 + (row - top) as u16;
        frame.set_cursor_position(Position::new(
            x.min(area.right().saturating_sub(2)),
            y.min(area.bottom().saturating_sub(2)),
        ));
    }
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.result.starts_with("Error: ") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let title = if app.running { "Result (running...)" } else { "Result" };

    let result = Paragraph::new(app.result.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));
    frame.render_widget(result, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_paragraph = Paragraph::new(app.status_message.as_str())
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Playground Help"),
        Line::from(""),
        Line::from("Running:"),
        Line::from("  F5 / Ctrl+R  - Run the buffer"),
        Line::from("  Ctrl+L       - Clear the result"),
        Line::from("  PgUp/PgDn    - Scroll the result"),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Enter        - New line"),
        Line::from("  Tab          - Indent (4 spaces)"),
        Line::from("  Arrows, Home, End, Backspace, Delete"),
        Line::from(""),
        Line::from("  F1           - Toggle this help"),
        Line::from("  Esc / Ctrl+C - Quit"),
        Line::from(""),
        Line::from("The last expression of the buffer is shown as the return value."),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
