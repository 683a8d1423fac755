use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use vaxmap_core::utils::{format_coordinates, format_phone, format_updated_at, truncate_string};
use vaxmap_core::VaccinationCenter;

use crate::app::{App, AppState, Focus};
use crate::ui::styles;

/// Max characters of the address shown in the list column
const ADDRESS_COLUMN_LEN: usize = 40;

/// Render the center list with the detail panel on the right
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let centers = app.visible_centers();
    render_center_table(frame, app, &centers, chunks[0]);
    render_center_detail(frame, app, &centers, chunks[1]);
}

fn render_center_table(frame: &mut Frame, app: &App, centers: &[VaccinationCenter], area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new(vec![
        Cell::from(" "),
        Cell::from("Center"),
        Cell::from("Address"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = centers
        .iter()
        .enumerate()
        .map(|(i, center)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let (glyph, glyph_style) = styles::marker(center.marker_color());

            Row::new(vec![
                Cell::from(Span::styled(glyph, glyph_style)),
                Cell::from(center.center_name.clone()),
                Cell::from(truncate_string(&center.address, ADDRESS_COLUMN_LEN)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Percentage(45),
        Constraint::Fill(1),
    ];

    let title = if matches!(app.state, AppState::Searching) {
        Line::from(vec![
            Span::styled(" Search: ", styles::search_style()),
            Span::styled(format!("{}▌ ", app.search_query), styles::search_style()),
        ])
    } else if !app.search_query.is_empty() {
        Line::from(Span::styled(
            format!(" Centers ({}) matching \"{}\" ", centers.len(), app.search_query),
            styles::search_style(),
        ))
    } else {
        Line::from(format!(" Centers ({}) ", centers.len()))
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if centers.is_empty() {
        let message = if app.displayed.is_empty() {
            "  No centers cached. Press [r] to refresh."
        } else {
            "  No centers match the search."
        };
        let paragraph = Paragraph::new(Span::styled(message, styles::muted_style())).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let table = Table::new(rows, widths).header(header).block(block);
    let mut state = TableState::default();
    state.select(Some(app.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_center_detail(frame: &mut Frame, app: &App, centers: &[VaccinationCenter], area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    // The selected center wins; otherwise preview the highlighted row
    let center = app
        .displayed
        .selected()
        .or_else(|| centers.get(app.selection).cloned());

    let Some(center) = center else {
        let paragraph = Paragraph::new(Span::styled("  Nothing selected", styles::muted_style()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let (glyph, glyph_style) = styles::marker(center.marker_color());
    let label = |text: &str| Span::styled(format!("{:<10}", text), styles::muted_style());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", glyph), glyph_style),
            Span::styled(center.center_name.clone(), styles::title_style()),
        ]),
        Line::from(Span::styled(
            format!("  {}", center.category.label()),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![label("Facility"), Span::raw(center.facility_name.clone())]),
        Line::from(vec![label("Address"), Span::raw(center.address.clone())]),
        Line::from(vec![label("Phone"), Span::raw(format_phone(&center.phone_number))]),
        Line::from(vec![
            label("Updated"),
            Span::raw(format_updated_at(&center.updated_at)),
        ]),
        Line::from(vec![
            label("Location"),
            Span::raw(format_coordinates(&center.position)),
        ]),
    ];

    if focused {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  [Esc] back to list",
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
