use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};

use super::{centers, splash, styles};

pub fn render(frame: &mut Frame, app: &App) {
    if matches!(app.state, AppState::Splash) {
        splash::render(frame, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    centers::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ShowingDebug => render_debug_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Vaxmap";
    let help_hint = "[?] Help";

    let mut spans = vec![Span::styled(title, styles::title_style())];
    let mut used = title.len();

    if app.is_refreshing() {
        let refreshing = format!("  refreshing {:.0}%", app.splash_progress * 100.0);
        used += refreshing.len();
        spans.push(Span::styled(refreshing, styles::highlight_style()));
    }

    spans.push(Span::raw(" ".repeat(
        (area.width as usize).saturating_sub(used + help_hint.len() + 4),
    )));
    spans.push(Span::styled(help_hint, styles::muted_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]efresh | [/]search | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" {} centers | Updated {} ", app.store_count(), app.cache_age())
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            format!("  Vaxmap version {}", version),
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("↑/↓ j/k", "Navigate centers"),
        help_line("PgUp/PgDn", "Scroll a page"),
        help_line("Enter", "Show center details"),
        help_line("Esc", "Go back / clear search"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("/", "Search by name or address"),
        help_line("r", "Refresh centers from the API"),
        help_line("d", "Debug panel"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Markers", styles::highlight_style())),
        marker_line(vaxmap_core::MarkerColor::Transparent, "Central / regional center"),
        marker_line(vaxmap_core::MarkerColor::Blue, "Local center"),
        marker_line(vaxmap_core::MarkerColor::Magenta, "Other"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn marker_line(color: vaxmap_core::MarkerColor, desc: &str) -> Line<'static> {
    let (glyph, style) = styles::marker(color);
    Line::from(vec![
        Span::raw("  "),
        Span::styled(glyph, style),
        Span::raw("         "),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_debug_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 15, frame.area());
    frame.render_widget(Clear, area);

    let on_off = |flag: bool| if flag { "on" } else { "off" };
    let value = |text: String, ok: bool| {
        Span::styled(
            text,
            if ok { styles::success_style() } else { styles::error_style() },
        )
    };

    let lines = vec![
        Line::from(Span::styled(" Center store", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  Stored     ", styles::muted_style()),
            value(app.store_count().to_string(), !app.config.needs_refresh(app.store_count())),
        ]),
        Line::from(vec![
            Span::styled("  Displayed  ", styles::muted_style()),
            Span::raw(app.displayed.len().to_string()),
        ]),
        Line::from(vec![
            Span::styled("  Updated    ", styles::muted_style()),
            Span::raw(app.cache_age()),
        ]),
        Line::from(vec![
            Span::styled("  Busy       ", styles::muted_style()),
            value(on_off(app.is_store_busy()).to_string(), !app.is_store_busy()),
        ]),
        Line::from(vec![
            Span::styled("  Slow mode  ", styles::muted_style()),
            Span::raw(on_off(app.config.slow_mode)),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("c", "Clear center cache"),
        help_line("r", "Recache from the API"),
        help_line("n", "Log store count"),
        help_line("s", "Toggle slow network"),
        Line::from(""),
        Line::from(Span::styled("  [Esc] close", styles::muted_style())),
    ];

    let block = Block::default()
        .title(" Debug ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered_rect_fixed(40, 10, outer);
        assert_eq!(r, Rect::new(30, 15, 40, 10));

        // Clamped to a small terminal
        let small = Rect::new(0, 0, 20, 5);
        let r = centered_rect_fixed(40, 10, small);
        assert_eq!(r.width, 20);
        assert_eq!(r.height, 5);
    }
}
