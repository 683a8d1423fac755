use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

const SPLASH_WIDTH: u16 = 50;
const SPLASH_HEIGHT: u16 = 11;

/// Render the startup screen: logo plus the synthetic progress gauge
pub fn render(frame: &mut Frame, app: &App) {
    let area = super::render::centered_rect_fixed(SPLASH_WIDTH, SPLASH_HEIGHT, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Logo
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Caption
        ])
        .split(inner);

    let logo = vec![
        Line::from(Span::styled("╦  ╦╔═╗═╗ ╦╔╦╗╔═╗╔═╗", styles::title_style())),
        Line::from(Span::styled("╚╗╔╝╠═╣╔╩╦╝║║║╠═╣╠═╝", styles::title_style())),
        Line::from(Span::styled(" ╚╝ ╩ ╩╩ ╚═╩ ╩╩ ╩╩  ", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "COVID-19 vaccination centers",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(logo).alignment(Alignment::Center), chunks[0]);

    let progress = app.splash_progress.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(styles::gauge_style())
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0));
    frame.render_widget(gauge, padded(chunks[2], 2));

    let caption = if app.is_store_busy() {
        "Loading centers..."
    } else {
        "Preparing map..."
    };
    frame.render_widget(
        Paragraph::new(Span::styled(caption, styles::muted_style())).alignment(Alignment::Center),
        chunks[4],
    );
}

fn padded(area: Rect, horizontal: u16) -> Rect {
    Rect::new(
        area.x + horizontal,
        area.y,
        area.width.saturating_sub(horizontal * 2),
        area.height,
    )
}
