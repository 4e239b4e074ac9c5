//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │  gatewatch   KVD21   gateway:http://192.168.12.1   ok    │
//! ├──────────────────┬──────────────────┬────────────────────┤
//! │  4G LTE   B2     │  5G NR    n71    │  Cell site         │
//! │  ▮▮▮▯▯           │  ▮▮▮▮▯           │  T-Mobile USA      │
//! │  RSRP -95  best  │  RSRP -80  best  │  eNB 48225  cell 1 │
//! ├──────────────────┴──────────────────┴────────────────────┤
//! │  SNR trend: 4G ─ 5G ─                                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  g: chart   p: pause   +/-: speed   s: snapshot   q: quit│
//! └──────────────────────────────────────────────────────────┘

use super::app::{App, ChartMode, Snapshot};
use crate::commands::bar_glyphs;
use gatewatch_core::{Metric, Radio, format_uptime};
use ratatui::{prelude::*, widgets::*};

pub fn draw(f: &mut Frame, app: &App) {
    let snap = app.snapshot();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(8), // cards
            Constraint::Min(8),    // chart
            Constraint::Length(1), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app, &snap);
    draw_cards(f, rows[1], &snap);
    draw_chart(f, rows[2], app.chart_mode(), &snap);
    draw_status(f, rows[3], &snap);
    draw_keys(f, rows[4]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let status = &snap.view.status;
    let health = status.health();
    let health_style = match health {
        "ok" => Style::default().fg(Color::Green).bold(),
        "degraded" => Style::default().fg(Color::Red).bold(),
        _ => Style::default().fg(Color::DarkGray),
    };
    let spin = if snap.polling { " ⟳" } else { "" };
    let paused = if app.is_paused() { "  PAUSED" } else { "" };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" 📶 gatewatch ", Style::default().bold().fg(Color::Cyan)),
            Span::styled(app.model(), Style::default().bold().fg(Color::Yellow)),
            Span::styled(
                format!("  {}  ", app.source_name()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(health, health_style),
            Span::styled(
                format!(
                    "  #{}  every {}ms{spin}{paused} ",
                    status.ticks,
                    app.refresh_rate().as_millis()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_cards(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    draw_radio_card(f, cols[0], Radio::Lte, snap);
    draw_radio_card(f, cols[1], Radio::Nr, snap);
    draw_cell_panel(f, cols[2], snap);
}

/// Traffic-light color for a metric value.
fn quality_color(metric: Metric, value: f64) -> Color {
    let (good, fair) = match metric {
        Metric::Rsrp => (-90.0, -105.0),
        Metric::Snr => (13.0, 0.0),
        Metric::Rsrq => (-10.0, -15.0),
    };
    if value >= good {
        Color::Green
    } else if value >= fair {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn draw_radio_card(f: &mut Frame, area: Rect, radio: Radio, snap: &Snapshot) {
    let latest = snap.view.latest();
    let band = latest.and_then(|s| s.band(radio)).unwrap_or("-");
    let bars = latest.and_then(|s| s.bars(radio));

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{band:<6}"), Style::default().bold()),
        Span::styled(bar_glyphs(bars), Style::default().fg(Color::Cyan)),
        Span::styled(
            bars.map_or(String::new(), |b| format!(" {b}")),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    for metric in [Metric::Rsrp, Metric::Snr, Metric::Rsrq] {
        let current = latest.and_then(|s| s.metric(radio, metric));
        let (text, style) = match current {
            Some(v) => (
                format!("{v:>7} {:<3}", metric.unit()),
                Style::default().fg(quality_color(metric, v)),
            ),
            None => (format!("{:>7} {:<3}", "-", ""), Style::default().fg(Color::DarkGray)),
        };
        let best = snap.view.best.get(radio, metric);
        lines.push(Line::from(vec![
            Span::styled(format!("{:<5}", metric.label()), Style::default().bold()),
            Span::styled(text, style),
            Span::styled(format!("  best {best}"), Style::default().fg(Color::DarkGray)),
        ]));
    }

    let cell_id = match radio {
        Radio::Lte => latest.and_then(|s| s.lte.cell_id),
        Radio::Nr => latest.and_then(|s| s.nr.cell_id),
    };
    if let Some(cid) = cell_id {
        lines.push(Line::from(Span::styled(
            format!("cell {cid}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", radio.label()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_cell_panel(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    match &snap.cell_site {
        Some(site) => {
            lines.push(Line::from(Span::styled(
                site.operator_name(),
                Style::default().bold().fg(Color::Cyan),
            )));
            lines.push(Line::from(format!(
                "PLMN {}",
                site.plmn().unwrap_or_else(|| "-".into())
            )));
            lines.push(Line::from(format!(
                "eNB {}  cell {}",
                site.enb_id.map_or("-".into(), |v| v.to_string()),
                site.cell_id.map_or("-".into(), |v| v.to_string()),
            )));
        }
        None => lines.push(Line::from(Span::styled("cell site: login required", dim))),
    }

    if let Some(c) = &snap.clients {
        lines.push(Line::from(format!(
            "clients {}  (2.4G {} / 5G {} / eth {})",
            c.total(),
            c.wifi_2_4ghz,
            c.wifi_5ghz,
            c.ethernet
        )));
    }

    if let Some(info) = &snap.device {
        let headline = info.device.headline();
        if !headline.is_empty() {
            lines.push(Line::from(Span::styled(headline, dim)));
        }
        if let Some(up) = info.uptime_secs {
            lines.push(Line::from(Span::styled(format!("up {}", format_uptime(up.trunc())), dim)));
        }
    }

    let block = Block::default().borders(Borders::ALL).title(" Cell site ");
    let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    f.render_widget(p, area);
}

fn draw_chart(f: &mut Frame, area: Rect, mode: ChartMode, snap: &Snapshot) {
    let metric = mode.metric();
    let history = &snap.view.history;

    if history.is_empty() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} trend ", mode.label()));
        let p = Paragraph::new("Waiting for the first sample...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let lte = history.series(Radio::Lte, metric);
    let nr = history.series(Radio::Nr, metric);
    let x_max = (history.len().saturating_sub(1) as f64).max(1.0);

    let best_lte = snap.view.best.get(Radio::Lte, metric);
    let best_nr = snap.view.best.get(Radio::Nr, metric);
    let worst_lte = snap.view.worst.get(Radio::Lte, metric);
    let worst_nr = snap.view.worst.get(Radio::Nr, metric);
    let best_lte_line = [(0.0, best_lte), (x_max, best_lte)];
    let best_nr_line = [(0.0, best_nr), (x_max, best_nr)];
    let worst_lte_line = [(0.0, worst_lte), (x_max, worst_lte)];
    let worst_nr_line = [(0.0, worst_nr), (x_max, worst_nr)];

    let values = lte.iter().chain(nr.iter()).map(|&(_, v)| v);
    let min_val = values.clone().fold(f64::MAX, f64::min);
    let max_val = values.fold(f64::MIN, f64::max);
    let (y_min, y_max) = mode.y_bounds(min_val, max_val);

    let datasets = vec![
        Dataset::default()
            .name("4G")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&lte),
        Dataset::default()
            .name("5G")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&nr),
        Dataset::default()
            .name(format!("4G best {best_lte}"))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&best_lte_line),
        Dataset::default()
            .name(format!("5G best {best_nr}"))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Gray))
            .data(&best_nr_line),
        Dataset::default()
            .name(format!("4G worst {worst_lte}"))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray).dim())
            .data(&worst_lte_line),
        Dataset::default()
            .name(format!("5G worst {worst_nr}"))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Gray).dim())
            .data(&worst_nr_line),
    ];

    let first = history.oldest().map_or("", |s| s.time_label.as_str());
    let last = history.latest().map_or("", |s| s.time_label.as_str());

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} ({})  {} ",
            mode.label(),
            mode.y_label(),
            mode.summary()
        )))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![Line::from(first), Line::from(last)]),
        )
        .y_axis(Axis::default().bounds([y_min, y_max]).labels(vec![
            Line::from(format!("{y_min}")),
            Line::from(format!("{y_max}")),
        ]));

    f.render_widget(chart, area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let (text, style) = if let Some(err) = &snap.export_error {
        (format!(" export failed: {err}"), Style::default().fg(Color::Red))
    } else if let Some(err) = &snap.view.status.last_error {
        (format!(" last poll failed: {err}"), Style::default().fg(Color::Red))
    } else if let Some(path) = &snap.last_export {
        (format!(" saved {}", path.display()), Style::default().fg(Color::Green))
    } else {
        (
            format!(
                " {} samples  {} ok  {} failed",
                snap.view.history.len(),
                snap.view.status.successes,
                snap.view.status.failures
            ),
            Style::default().fg(Color::DarkGray),
        )
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(" g: chart   p: pause   +/-: speed   s: snapshot   q: quit")
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}
