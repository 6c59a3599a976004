use pseudodojo_core::{Layout as PageLayout, MetricKey};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::widgets::periodic::{hex_color, PeriodicTable, GRID_HEIGHT, GRID_WIDTH};
use crate::ui::widgets::popup::centered_rect;

const KEY_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

pub fn render_browser(app: &App, f: &mut Frame<'_>) {
    let area = f.area();
    let block = Block::default()
        .title("PseudoDojo")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let banner_height = if app.banner.is_some() { 3 } else { 0 };
    let keys_height = if app.layout == PageLayout::Light { 0 } else { 1 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Length(GRID_HEIGHT + 1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(keys_height),
        ])
        .split(inner);

    render_selection_bar(app, f, rows[0]);
    if let Some(banner) = &app.banner {
        render_banner(banner, f, rows[1]);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(GRID_WIDTH + 1), Constraint::Min(24)])
        .split(rows[2]);
    let grid_area = Rect {
        y: body[0].y + 1,
        height: body[0].height.saturating_sub(1),
        ..body[0]
    };
    f.render_widget(PeriodicTable::new(app), grid_area);
    render_detail(app, f, body[1]);

    let status = Paragraph::new(TextLine::from(Span::styled(
        app.status_message.as_str(),
        Style::default().fg(Color::White),
    )));
    f.render_widget(status, rows[4]);

    if keys_height > 0 {
        render_key_hints(f, rows[5]);
    }
}

fn render_selection_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let choice = &app.choice;

    let paint = app.archive.paint();
    let mut archive_style = Style::default()
        .bg(hex_color(paint.background))
        .fg(hex_color(paint.foreground));
    if app.focus == Some(Focus::Archive) {
        archive_style = archive_style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }

    let line = TextLine::from(vec![
        Span::styled("Type ", label),
        Span::styled(app.options.typ.label(), value),
        Span::styled("  XC ", label),
        Span::styled(choice.functional.as_str(), value),
        Span::styled("  Accuracy ", label),
        Span::styled(choice.accuracy.as_str(), value),
        Span::styled("  Format ", label),
        Span::styled(choice.format.as_str(), value),
        Span::raw("   "),
        Span::styled(" targz ", archive_style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_banner(banner: &str, f: &mut Frame<'_>, area: Rect) {
    let text = TextLine::from(vec![
        Span::styled(
            "Warning! ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(banner),
    ]);
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(paragraph, area);
}

fn render_detail(app: &App, f: &mut Frame<'_>, area: Rect) {
    let detail = &app.detail;
    let title_style = detail.color.map_or_else(
        || Style::default().fg(Color::Cyan),
        |color| Style::default().fg(Color::Black).bg(hex_color(color)),
    );
    let title = match detail.number {
        Some(number) => format!(" {number} {} ", detail.title),
        None => format!(" {} ", detail.title),
    };

    let mut lines = Vec::with_capacity(detail.values.len());
    for (key, value) in &detail.values {
        let style = if MetricKey::DISPLAYED.contains(key) {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(TextLine::from(vec![
            Span::styled(format!("{:<18}", key.label()), Style::default().fg(Color::Gray)),
            Span::styled(value.as_str(), style),
        ]));
    }

    let block = Block::default()
        .title(Span::styled(title, title_style.add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_key_hints(f: &mut Frame<'_>, area: Rect) {
    let hints = [
        ("←↑↓→", "move"),
        ("Enter", "download"),
        ("Tab", "archive"),
        ("t/x/a/f", "type/xc/accuracy/format"),
        ("Esc", "leave"),
        ("?", "help"),
        ("q", "quit"),
    ];
    let spans: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, KEY_STYLE),
                Span::raw(format!(": {action}   ")),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(TextLine::from(spans)).alignment(Alignment::Center),
        area,
    );
}

pub fn render_help(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let rows = [
        ("←↑↓→ / hjkl", "Move over the table"),
        ("Enter", "Download the file, or print the link for html"),
        ("Tab", "Switch between the table and the targz archive"),
        ("t / T", "Next / previous table type"),
        ("x / X", "Cycle the XC functional"),
        ("a / A", "Cycle the accuracy"),
        ("f / F", "Cycle the format"),
        ("b", "Dismiss the warning"),
        ("Esc", "Leave the cell and show table means"),
        ("q", "Quit"),
    ];
    let lines: Vec<TextLine<'_>> = rows
        .iter()
        .map(|(key, action)| {
            TextLine::from(vec![
                Span::styled(format!("{key:<14}"), KEY_STYLE),
                Span::raw(*action),
            ])
        })
        .collect();

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        popup_area,
    );
}
