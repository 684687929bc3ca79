use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::models::{ScreenOutcome, ScreenReport, Window};

use super::app::{FocusPanel, ScreenerApp};
use super::components::{checkbox_label, format_price, radio_label, styled_percentage_change};

/// Draw the whole dashboard
pub fn draw<P>(f: &mut Frame, app: &ScreenerApp<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(26), // Filter sidebar
            Constraint::Min(0),     // Results
        ])
        .split(chunks[1]);

    draw_filters(f, body[0], app);
    draw_results(f, body[1], app);

    draw_status_bar(f, chunks[2]);
}

fn draw_header<P>(f: &mut Frame, area: Rect, app: &ScreenerApp<P>) {
    let text = match &app.report {
        Some(report) => format!(
            "📈 Global Momentum Screener — showing data from {} to {}",
            report.start_date, report.end_date
        ),
        None => "📈 Global Momentum Screener".to_string(),
    };

    let header = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(header, area);
}

fn draw_filters<P>(f: &mut Frame, area: Rect, app: &ScreenerApp<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.regions.len() as u16 + 2),
            Constraint::Length(app.sectors.len() as u16 + 2),
            Constraint::Length(Window::ALL.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

    let region_labels: Vec<String> = app
        .regions
        .iter()
        .map(|(region, selected)| checkbox_label(*selected, region.as_str()))
        .collect();
    draw_selectable_list(
        f,
        chunks[0],
        "Regions",
        &region_labels,
        cursor_for(app, FocusPanel::Regions),
    );

    let sector_labels: Vec<String> = app
        .sectors
        .iter()
        .map(|(sector, selected)| checkbox_label(*selected, sector))
        .collect();
    draw_selectable_list(
        f,
        chunks[1],
        "Sectors",
        &sector_labels,
        cursor_for(app, FocusPanel::Sectors),
    );

    let window_labels: Vec<String> = Window::ALL
        .iter()
        .map(|window| radio_label(*window == app.window, window.label()))
        .collect();
    draw_selectable_list(
        f,
        chunks[2],
        "Timeframe",
        &window_labels,
        cursor_for(app, FocusPanel::Window),
    );
}

fn cursor_for<P>(app: &ScreenerApp<P>, panel: FocusPanel) -> Option<usize> {
    if app.focus == panel {
        Some(app.cursor)
    } else {
        None
    }
}

fn draw_selectable_list(
    f: &mut Frame,
    area: Rect,
    title: &str,
    labels: &[String],
    cursor: Option<usize>,
) {
    let items: Vec<ListItem> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let style = if cursor == Some(index) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(label.clone()).style(style)
        })
        .collect();

    let border_style = if cursor.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(list, area);
}

fn draw_results<P>(f: &mut Frame, area: Rect, app: &ScreenerApp<P>) {
    let report = match &app.report {
        Some(report) => report,
        None => {
            let placeholder = Paragraph::new("Press R to run the screen")
                .block(Block::default().borders(Borders::ALL).title("Results"))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(placeholder, area);
            return;
        }
    };

    match report.outcome() {
        ScreenOutcome::NoCriteriaMatched => {
            let message = Paragraph::new("No data available for the selected criteria.")
                .block(Block::default().borders(Borders::ALL).title("Results"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(message, area);
        }
        ScreenOutcome::NoUsableData => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(0),
                ])
                .split(area);

            let message = Paragraph::new("No valid data available after filtering.")
                .block(Block::default().borders(Borders::ALL).title("Results"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(message, chunks[0]);
            draw_failures(f, chunks[1], report, true);
        }
        ScreenOutcome::Ranked => {
            let failures_height = if report.failures.is_empty() {
                0
            } else if app.show_failures {
                report.failures.len() as u16 + 2
            } else {
                3
            };

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(5),
                    Constraint::Length(3),
                    Constraint::Length(failures_height),
                ])
                .split(area);

            draw_table(f, chunks[0], report);
            draw_summary(f, chunks[1], report);
            if !report.failures.is_empty() {
                draw_failures(f, chunks[2], report, app.show_failures);
            }
        }
    }
}

fn draw_table(f: &mut Frame, area: Rect, report: &ScreenReport) {
    let header = Row::new(vec![
        Cell::from("Ticker"),
        Cell::from("Name"),
        Cell::from("Region"),
        Cell::from("Sector"),
        Cell::from("Start"),
        Cell::from("End"),
        Cell::from(report.change_column_label()),
    ])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.symbol.clone()),
                Cell::from(row.name.clone()),
                Cell::from(row.region.to_string()),
                Cell::from(row.sector.clone()),
                Cell::from(format_price(row.start_price)),
                Cell::from(format_price(row.end_price)),
                Cell::from(styled_percentage_change(row.percent_change)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Min(10),
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(18),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title("Momentum Ranking"));
    f.render_widget(table, area);
}

fn draw_summary(f: &mut Frame, area: Rect, report: &ScreenReport) {
    let summary = match report.summary() {
        Some(summary) => summary,
        None => return,
    };

    let line = Line::from(vec![
        Span::raw("🏆 Top Performer: "),
        Span::styled(
            format!("{} ({})", summary.top.name, summary.top.symbol),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" with "),
        styled_percentage_change(summary.top.percent_change),
        Span::raw(format!(
            "  •  Avg {:+.2}%  •  {}/{} positive ({:.0}%)",
            summary.mean_change,
            summary.positive,
            report.rows.len(),
            summary.positive_share * 100.0
        )),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_failures(f: &mut Frame, area: Rect, report: &ScreenReport, expanded: bool) {
    if expanded {
        let items: Vec<ListItem> = report
            .failures
            .iter()
            .map(|failure| {
                ListItem::new(failure.to_string()).style(Style::default().fg(Color::Red))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title("⚠ Data Fetch Issues"),
        );
        f.render_widget(list, area);
    } else {
        let hint = Paragraph::new(format!(
            "{} data fetch issue(s) — press F to expand",
            report.failures.len()
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("⚠ Data Fetch Issues"),
        )
        .style(Style::default().fg(Color::Red));
        f.render_widget(hint, area);
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect) {
    let status_text = vec![Line::from(vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" switch panel • ", Style::default().fg(Color::Gray)),
        Span::styled("↑↓", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" move • ", Style::default().fg(Color::Gray)),
        Span::styled("Space", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" toggle • ", Style::default().fg(Color::Gray)),
        Span::styled("R", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::styled(" run • ", Style::default().fg(Color::Gray)),
        Span::styled("F", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::styled(" issues • ", Style::default().fg(Color::Gray)),
        Span::styled("Q", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::styled(" quit", Style::default().fg(Color::Gray)),
    ])];

    let paragraph = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
