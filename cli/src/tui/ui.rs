use kpss_core::{format_minutes, DayTotal, KeyValueStore, TimeRange};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::history::{truncate, EMPTY_STATE};
use crate::tui::app::{App, InputMode, View};

struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    questions: Color,
    done: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    questions: Color::Blue,
    done: Color::Green,
};

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer / input
        ])
        .split(f.area());

    draw_header(f, app, main_chunks[0]);

    match app.view {
        View::Dashboard => draw_dashboard(f, app, main_chunks[1]),
        View::History => draw_history(f, app, main_chunks[1]),
    }

    draw_footer(f, app, main_chunks[2]);
}

fn draw_header<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let mut spans = vec![Span::styled(
        "KPSS  ",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    )];
    for range in TimeRange::ALL {
        let style = if range == app.range {
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(THEME.muted)
        };
        spans.push(Span::styled(format!(" {} ", range), style));
    }
    let view = match app.view {
        View::Dashboard => "  [Dashboard]",
        View::History => "  [History]",
    };
    spans.push(Span::styled(view, Style::default().fg(THEME.primary)));

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, area);
}

fn draw_dashboard<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70), // Chart
            Constraint::Percentage(30), // Summary + goal
        ])
        .split(area);

    draw_chart(f, app.range, &app.series(), chunks[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(9), Constraint::Length(3)])
        .split(chunks[1]);

    let stats = app.dashboard();
    let most_studied = stats
        .most_studied_lesson
        .as_deref()
        .map(|id| app.lesson_name(id))
        .unwrap_or_else(|| "-".to_string());

    let label = |text: &'static str| Span::styled(text, Style::default().fg(THEME.muted));
    let value = |text: String| Span::styled(text, Style::default().fg(THEME.text).add_modifier(Modifier::BOLD));
    let summary = vec![
        Line::from(vec![label("Today:     "), value(format!("{} q", stats.today.questions))]),
        Line::from(vec![label("           "), value(format_minutes(stats.today.minutes))]),
        Line::from(""),
        Line::from(vec![label("Questions: "), value(stats.total_questions.to_string())]),
        Line::from(vec![label("Time:      "), value(format_minutes(stats.total_study_time))]),
        Line::from(vec![label("Days:      "), value(stats.studied_days_count.to_string())]),
        Line::from(vec![label("Top:       "), value(most_studied)]),
    ];
    let summary = Paragraph::new(summary).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(THEME.muted))
            .title(format!(" {} ", stats.range)),
    );
    f.render_widget(summary, side[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Goal ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted)),
        )
        .gauge_style(Style::default().fg(if stats.goal.percent >= 100 { THEME.done } else { THEME.questions }))
        .ratio(f64::from(stats.goal.percent) / 100.0)
        .label(format!("{}/{} ({}%)", stats.goal.achieved, stats.goal.target, stats.goal.percent));
    f.render_widget(gauge, side[1]);
}

fn draw_chart(f: &mut Frame, range: TimeRange, series: &[DayTotal], area: Rect) {
    let bars: Vec<Bar> = series
        .iter()
        .map(|day| {
            let label = match range {
                TimeRange::Monthly => day.date.format("%d").to_string(),
                _ => day.date.format("%a").to_string(),
            };
            Bar::default()
                .label(label)
                .value(day.totals.questions)
                .style(Style::default().fg(THEME.questions))
                .text_value(if day.totals.questions > 0 { day.totals.questions.to_string() } else { String::new() })
        })
        .collect();

    // Fit every day of the range into the chart
    let inner_width = area.width.saturating_sub(2);
    let count = series.len().max(1) as u16;
    let bar_width = (inner_width / count).saturating_sub(1).clamp(1, 7);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(THEME.muted))
                .title(" Questions per day "),
        )
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn draw_history<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    if app.logs().is_empty() {
        let empty = Paragraph::new(format!("{} Press 'a' to add one.", EMPTY_STATE))
            .alignment(Alignment::Center)
            .block(Block::default().title(" Sessions ").borders(Borders::ALL).border_type(BorderType::Rounded));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .logs()
        .iter()
        .map(|log| {
            Row::new(vec![
                Span::raw(log.date.format("%m-%d").to_string()),
                Span::styled(app.lesson_name(&log.lesson_id), Style::default().fg(THEME.primary)),
                Span::raw(truncate(&log.topic, 30)),
                Span::raw(log.questions_solved.to_string()),
                Span::raw(format_minutes(log.duration as u64)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),  // Date
            Constraint::Length(12), // Lesson
            Constraint::Min(10),    // Topic
            Constraint::Length(5),  // Questions
            Constraint::Length(8),  // Time
        ],
    )
    .header(Row::new(vec!["Date", "Lesson", "Topic", "Q", "Time"]).style(Style::default().fg(Color::Yellow)))
    .block(Block::default().title(" Sessions ").borders(Borders::ALL).border_type(BorderType::Rounded))
    .row_highlight_style(Style::default().bg(THEME.muted).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[0], &mut app.state);

    let detail_block = Block::default().title(" Detail ").borders(Borders::ALL).border_type(BorderType::Rounded);
    let Some(log) = app.selected_log() else {
        f.render_widget(detail_block, chunks[1]);
        return;
    };

    let field = |name: &'static str, text: String| {
        Line::from(vec![Span::styled(name, Style::default().fg(Color::Blue)), Span::raw(text)])
    };
    let mut detail = vec![
        Line::from(Span::styled(log.topic.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        field("Lesson: ", app.lesson_name(&log.lesson_id)),
        field("Date: ", log.date.format("%Y-%m-%d (%a)").to_string()),
        field("Questions: ", log.questions_solved.to_string()),
        field("Duration: ", format_minutes(log.duration as u64)),
        Line::from(vec![
            Span::styled("ID: ", Style::default().fg(THEME.muted)),
            Span::styled(log.id.clone(), Style::default().fg(THEME.muted)),
        ]),
    ];
    if let Some(notes) = &log.notes {
        detail.push(Line::from(""));
        detail.push(Line::from(Span::styled("Notes:", Style::default().fg(Color::Blue))));
        detail.push(Line::from(notes.clone()));
    }

    f.render_widget(Paragraph::new(detail).block(detail_block).wrap(Wrap { trim: true }), chunks[1]);
}

fn draw_footer<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let footer = match &app.input_mode {
        InputMode::Adding => {
            let mut spans = vec![
                Span::styled("add> ", Style::default().fg(THEME.primary)),
                Span::styled(app.input.as_str(), Style::default().fg(THEME.text)),
            ];
            if let Some(message) = &app.message {
                spans.push(Span::styled(format!("   {}", message), Style::default().fg(Color::Red)));
            }
            f.render_widget(Paragraph::new(Line::from(spans)), area);

            let cursor_x = area.x + 5 + app.cursor_position as u16;
            f.set_cursor_position((cursor_x.min(area.right().saturating_sub(1)), area.y));
            return;
        }
        InputMode::ConfirmDelete(id) => Paragraph::new(format!(
            "Delete session {}? (y/n)",
            crate::commands::short_id(id)
        ))
        .style(Style::default().fg(Color::Yellow)),
        InputMode::Normal => match &app.message {
            Some(message) => Paragraph::new(message.as_str()).style(Style::default().fg(THEME.done)),
            None => Paragraph::new("Tab: view | d/w/m/r: range | j/k: select | a: add | x: delete | q: quit")
                .style(Style::default().fg(THEME.muted)),
        },
    };
    f.render_widget(footer.alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpss_core::{today, KpssConfig, MemoryStore, NewStudyLog, StudyTracker};
    use ratatui::{backend::TestBackend, Terminal};

    fn sample_app() -> App<MemoryStore> {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        tracker
            .add_log(NewStudyLog {
                date: today(),
                lesson_id: "matematik".to_string(),
                topic: "Olasılık".to_string(),
                duration: 45,
                questions_solved: 30,
                notes: Some("deneme".to_string()),
            })
            .unwrap();
        App::new(tracker, &KpssConfig::default())
    }

    fn rendered(app: &mut App<MemoryStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_dashboard_renders_goal() {
        let mut app = sample_app();
        let screen = rendered(&mut app);
        assert!(screen.contains("Questions per day"));
        assert!(screen.contains("30/700"));
    }

    #[test]
    fn test_history_renders_selected_detail() {
        let mut app = sample_app();
        app.toggle_view();
        let screen = rendered(&mut app);
        assert!(screen.contains("Sessions"));
        assert!(screen.contains("deneme"));
    }

    #[test]
    fn test_history_view_shows_empty_state() {
        let tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let mut app = App::new(tracker, &KpssConfig::default());
        app.toggle_view();
        let screen = rendered(&mut app);
        assert!(screen.contains("No study logs yet"));
        assert!(!screen.contains("Detail"));
    }

    #[test]
    fn test_monthly_range_renders_every_day() {
        let mut app = sample_app();
        app.range = TimeRange::Monthly;
        let screen = rendered(&mut app);
        assert!(screen.contains("Questions per day"));
    }
}
