use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Points};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Tabs};
use ratatui::Frame;
use voicedrone_core::{MarkerColor, MarkerShape, SurfaceSize};

use crate::app::{App, Tab};

/// Nominal pixel size of one terminal cell.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

struct Areas {
    tabs: Rect,
    feedback: Rect,
    main: Rect,
    input: Rect,
}

fn areas(area: Rect) -> Areas {
    let [tabs, feedback, main, input] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(3),
    ])
    .areas(area);
    Areas {
        tabs,
        feedback,
        main,
        input,
    }
}

/// Pixel size of the marker surface when the terminal is `area`.
pub fn surface_size(area: Rect) -> SurfaceSize {
    let main = areas(area).main;
    SurfaceSize {
        width: (main.width.saturating_sub(2).max(1)) as f64 * CELL_WIDTH_PX,
        height: (main.height.saturating_sub(2).max(1)) as f64 * CELL_HEIGHT_PX,
    }
}

pub fn marker_color(color: MarkerColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

pub fn draw(frame: &mut Frame, app: &App) {
    let areas = areas(frame.area());

    draw_tabs(frame, app, areas.tabs);
    draw_feedback(frame, app, areas.feedback);
    match app.tab {
        Tab::Surface => draw_surface(frame, app, areas.main),
        Tab::Logs => draw_logs(frame, app, areas.main),
    }
    draw_input(frame, app, areas.input);
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let selected = match app.tab {
        Tab::Surface => 0,
        Tab::Logs => 1,
    };
    let tabs = Tabs::new(vec!["Surface", "Logs"])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("voicedrone (Tab=switch, Esc=quit)"),
        )
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn draw_feedback(frame: &mut Frame, app: &App, area: Rect) {
    let confidence = app
        .feedback
        .confidence
        .map(|c| format!("{c}"))
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled("Heard: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.feedback.text.as_str()),
        Span::raw("   "),
        Span::styled("Confidence: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(confidence),
    ]);
    let para = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(para, area);
}

fn draw_surface(frame: &mut Frame, app: &App, area: Rect) {
    let width = app.surface.width;
    let height = app.surface.height;
    // Screen y grows downwards, canvas y upwards.
    let flip = |y: f64| height - y;
    let hand = [(app.hand.x, flip(app.hand.y))];

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Surface {}x{} ({} markers)", width, height, app.markers.len())),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(move |ctx| {
            for marker in &app.markers {
                let MarkerShape::Ellipse { width: w, height: h } = marker.shape;
                ctx.draw(&Circle {
                    x: marker.position.x + w / 2.0,
                    y: flip(marker.position.y + h / 2.0),
                    radius: w.min(h) / 2.0,
                    color: marker_color(marker.color),
                });
            }
            ctx.draw(&Points {
                coords: &hand,
                color: Color::White,
            });
        });
    frame.render_widget(canvas, area);
}

fn draw_logs(frame: &mut Frame, app: &App, area: Rect) {
    let logs = match app.logs.lock() {
        Ok(logs) => logs,
        Err(poisoned) => poisoned.into_inner(),
    };
    let total = logs.len();

    let visible_height = area.height.saturating_sub(2) as usize;
    let scroll = app.log_scroll.min(total.saturating_sub(visible_height));
    let end = total.saturating_sub(scroll);
    let start = end.saturating_sub(visible_height);

    let items: Vec<ListItem> = logs
        .iter()
        .skip(start)
        .take(end - start)
        .map(|s| ListItem::new(s.as_str()))
        .collect();

    let title = if app.log_auto_scroll {
        "Logs (auto-scroll)"
    } else {
        "Logs (Up/Down=scroll, End=bottom)"
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let para = Paragraph::new(format!("> {}", app.input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Say (Enter=send)"),
    );
    frame.render_widget(para, area);
}
