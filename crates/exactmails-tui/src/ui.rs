// UI rendering logic
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use exactmails_core::{models::status_label, EmailStatus, SearchOutcome, SearchRecord};

use crate::sparkline::trend_sparkline;
use crate::{App, InputMode, Tab};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.tab {
        Tab::Dashboard => render_dashboard(frame, app, chunks[1]),
        Tab::History => render_history(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = match app.tab {
        Tab::Dashboard => "[Dashboard]  History ",
        Tab::History => " Dashboard  [History]",
    };

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Exact Mails",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::raw(tabs),
        Span::raw("  "),
        Span::styled(app.account_line.clone(), Style::default().fg(Color::Gray)),
    ])])
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(8), Constraint::Min(4)])
        .split(area);

    let metrics = &app.metrics;
    let growth_style = |value: f64| {
        if value >= 0.0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        }
    };

    let trend_line = if app.trend.points.is_empty() {
        Line::from("No searches yet")
    } else {
        let labels: Vec<String> = app.trend.points.iter().map(|p| p.label.clone()).collect();
        Line::from(vec![
            Span::styled(trend_sparkline(&app.trend), Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled(labels.join(" | "), Style::default().fg(Color::Gray)),
        ])
    };

    let summary = Paragraph::new(vec![
        Line::from(format!("Total Searches   {}", metrics.total_searches)),
        Line::from(format!("Verified Emails  {}", metrics.verified_emails)),
        Line::from(format!("Success Rate     {:.1}%", metrics.success_rate)),
        Line::from(vec![
            Span::raw("Monthly Growth   "),
            Span::styled(
                format!("{:+.1}%", metrics.monthly_growth),
                growth_style(metrics.monthly_growth),
            ),
            Span::raw("   Weekly Growth "),
            Span::styled(
                format!("{:+.1}%", metrics.weekly_growth),
                growth_style(metrics.weekly_growth),
            ),
        ]),
        Line::from(""),
        trend_line,
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.trend.weekly {
                " Overview (this month, by week) "
            } else {
                " Overview (last 6 months) "
            }),
    );
    frame.render_widget(summary, halves[0]);

    let items: Vec<ListItem> = if app.activity.is_empty() {
        vec![ListItem::new("Start searching to see your results here")]
    } else {
        app.activity
            .iter()
            .map(|entry| {
                let status_style = match entry.status.as_str() {
                    "Verified" => Style::default().fg(Color::Green),
                    "Partial" => Style::default().fg(Color::Yellow),
                    _ => Style::default().fg(Color::Red),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<9}", entry.status), status_style),
                    Span::raw(format!("{:<36}", entry.email)),
                    Span::raw(format!("{:>4.0}%  ", entry.confidence)),
                    Span::styled(entry.time.clone(), Style::default().fg(Color::Gray)),
                ]))
            })
            .collect()
    };

    let activity =
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Recent Activity "));
    frame.render_widget(activity, halves[1]);
}

fn status_style(status: EmailStatus) -> Style {
    match status {
        EmailStatus::Safe => Style::default().fg(Color::Green),
        EmailStatus::Partial => Style::default().fg(Color::Yellow),
        EmailStatus::NotFound => Style::default().fg(Color::Red),
    }
}

fn record_line(record: &SearchRecord) -> Line<'static> {
    let subject = record.subject().unwrap_or("Unknown").to_string();
    let (status_span, email_span) = match record.first_finding() {
        Some(finding) => (
            Span::styled(
                format!("{:<10}", status_label(finding.status)),
                status_style(finding.status),
            ),
            Span::raw(format!("{} ({:.0}%)", finding.email, finding.success_rate)),
        ),
        None => (
            Span::styled("Not Found ".to_string(), Style::default().fg(Color::Red)),
            Span::raw("No results".to_string()),
        ),
    };

    Line::from(vec![
        Span::styled(
            format!("{:<22}", record.kind().to_string()),
            Style::default().fg(Color::Blue),
        ),
        Span::raw(format!("{:<24}", subject)),
        status_span,
        email_span,
    ])
}

fn expanded_lines(record: &SearchRecord) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for finding in record.email_findings() {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(
                format!("{:<10}", status_label(finding.status)),
                status_style(finding.status),
            ),
            Span::raw(format!("{} ({:.0}%)", finding.email, finding.success_rate)),
        ]));
    }
    if let SearchOutcome::DecisionMaker(lookups) = &record.outcome {
        if let Some(position) = lookups.first().map(|l| l.position.as_str()) {
            lines.push(Line::from(format!("    Position: {}", position)));
        }
    }
    if let Some(url) = record.linkedin_url() {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(url.to_string(), Style::default().fg(Color::Blue)),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from("    No results"));
    }
    lines
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.history.is_empty() {
        let empty = Paragraph::new("No search history yet\nStart searching to see your results here")
            .block(Block::default().borders(Borders::ALL).title(" Search History "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .records()
        .iter()
        .map(|record| {
            let mut lines = vec![record_line(record)];
            if app.history.is_expanded(record.id) {
                lines.extend(expanded_lines(record));
            }
            ListItem::new(lines)
        })
        .collect();

    let title = format!(" Search History ({}) ", app.history.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.input_mode == InputMode::ConfirmingDelete {
        (
            "Delete this record? This cannot be undone. (y/n)".to_string(),
            Style::default().fg(Color::Red),
        )
    } else if let Some(ref error) = app.error_message {
        (error.clone(), Style::default().fg(Color::Red))
    } else if let Some(ref status) = app.status_message {
        (status.clone(), Style::default().fg(Color::Green))
    } else if app.loading {
        ("Loading...".to_string(), Style::default().fg(Color::Yellow))
    } else {
        (
            "q quit | Tab switch | j/k move | Enter expand | d delete | c copy | C copy verified | o open | r refresh"
                .to_string(),
            Style::default().fg(Color::Gray),
        )
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}
