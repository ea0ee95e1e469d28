use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use kpss_core::{format_minutes, today, KeyValueStore, StudyLog, StudyTracker, TimeRange};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use unicode_width::UnicodeWidthStr;

use crate::commands::{resolve_lesson, short_id};

const TOPIC_WIDTH: usize = 34;

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Lesson")]
    lesson: String,
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Questions")]
    questions: u32,
    #[tabled(rename = "Time")]
    time: String,
}

#[derive(Tabled)]
struct TopicRow {
    #[tabled(rename = "Topic")]
    topic: String,
    #[tabled(rename = "Sessions")]
    sessions: usize,
    #[tabled(rename = "Questions")]
    questions: u64,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Goal")]
    goal: String,
}

pub const EMPTY_STATE: &str = "No study logs yet.";

pub fn show_dashboard<S: KeyValueStore>(tracker: &StudyTracker<S>, range: TimeRange) {
    print!("{}", render_dashboard(tracker, range, today()));
}

pub fn show_history<S: KeyValueStore>(tracker: &StudyTracker<S>) {
    println!("{}", render_history(tracker));
}

pub fn show_days<S: KeyValueStore>(tracker: &StudyTracker<S>, range: Option<TimeRange>) {
    println!("{}", render_days(tracker, range, today()));
}

pub fn show_lessons<S: KeyValueStore>(tracker: &StudyTracker<S>, lesson: Option<&str>) -> Result<()> {
    println!("{}", render_lessons(tracker, lesson)?);
    Ok(())
}

pub fn render_dashboard<S: KeyValueStore>(tracker: &StudyTracker<S>, range: TimeRange, today: NaiveDate) -> String {
    let stats = tracker.dashboard(range, today);
    let most_studied = stats
        .most_studied_lesson
        .as_deref()
        .map(|id| lesson_name(tracker, id))
        .unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "\x1b[1;36mToday\x1b[0m");
    let _ = writeln!(
        out,
        "  {} questions, {} in {} session(s)",
        stats.today.questions,
        format_minutes(stats.today.minutes),
        stats.today.sessions
    );
    let _ = writeln!(
        out,
        "\n\x1b[1;36m{} ({} .. {})\x1b[0m",
        range,
        stats.from.format("%Y-%m-%d"),
        stats.to.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "  Study time:     {}", format_minutes(stats.total_study_time));
    let _ = writeln!(out, "  Questions:      {}", stats.total_questions);
    let _ = writeln!(out, "  Studied days:   {}", stats.studied_days_count);
    let _ = writeln!(out, "  Most studied:   {}", most_studied);
    let _ = writeln!(
        out,
        "  Goal:           {}/{} {} {}%",
        stats.goal.achieved,
        stats.goal.target,
        progress_bar(stats.goal.percent, 20),
        stats.goal.percent
    );
    out
}

pub fn render_history<S: KeyValueStore>(tracker: &StudyTracker<S>) -> String {
    if tracker.logs().is_empty() {
        return EMPTY_STATE.to_string();
    }

    let rows: Vec<SessionRow> = tracker.logs().iter().map(|log| session_row(tracker, log, true)).collect();
    styled_table(Table::new(rows))
}

pub fn render_days<S: KeyValueStore>(tracker: &StudyTracker<S>, range: Option<TimeRange>, today: NaiveDate) -> String {
    let days = match range {
        Some(range) => tracker.daily_summaries_in(range, today),
        None => tracker.daily_summaries(),
    };

    if days.is_empty() {
        return EMPTY_STATE.to_string();
    }

    let mut out = String::new();
    for day in days {
        let _ = writeln!(
            out,
            "\n\x1b[1;36m{} ({})\x1b[0m {} questions, {}",
            day.date.format("%Y-%m-%d"),
            day.day_of_week,
            day.totals.questions,
            format_minutes(day.totals.minutes)
        );

        let rows: Vec<SessionRow> = day.logs.iter().map(|log| session_row(tracker, log, false)).collect();
        let _ = writeln!(out, "{}", styled_table(Table::new(rows)));
    }
    out
}

pub fn render_lessons<S: KeyValueStore>(tracker: &StudyTracker<S>, lesson: Option<&str>) -> Result<String> {
    let filter = lesson.map(|l| resolve_lesson(tracker, l)).transpose()?;
    let histories: Vec<_> = tracker
        .lesson_histories()
        .into_iter()
        .filter(|h| filter.as_ref().map_or(true, |f| *f == h.lesson_id))
        .collect();

    if histories.is_empty() {
        return Ok(EMPTY_STATE.to_string());
    }

    let mut out = String::new();
    for history in histories {
        let suffix = if history.known { "" } else { " (removed lesson)" };
        let _ = writeln!(
            out,
            "\n\x1b[1;36m{}{}\x1b[0m {} questions, {}, {} session(s)",
            history.lesson_name,
            suffix,
            history.totals.questions,
            format_minutes(history.totals.minutes),
            history.totals.sessions
        );

        let rows: Vec<TopicRow> = history
            .topics
            .iter()
            .map(|t| TopicRow {
                topic: truncate(&t.topic, TOPIC_WIDTH),
                sessions: t.totals.sessions,
                questions: t.totals.questions,
                time: format_minutes(t.totals.minutes),
                goal: match t.goal {
                    Some(goal) => format!("{}/{} ({}%)", goal.achieved, goal.target, goal.percent),
                    None => "-".to_string(),
                },
            })
            .collect();
        let _ = writeln!(out, "{}", styled_table(Table::new(rows)));
    }
    Ok(out)
}

fn session_row<S: KeyValueStore>(tracker: &StudyTracker<S>, log: &StudyLog, with_date: bool) -> SessionRow {
    SessionRow {
        date: if with_date { log.date.format("%Y-%m-%d").to_string() } else { String::new() },
        id: short_id(&log.id).to_string(),
        lesson: lesson_name(tracker, &log.lesson_id),
        topic: truncate(&log.topic, TOPIC_WIDTH),
        questions: log.questions_solved,
        time: format_minutes(log.duration as u64),
    }
}

fn styled_table(mut table: Table) -> String {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

/// Display name of a lesson, falling back to the raw id for removed lessons.
pub fn lesson_name<S: KeyValueStore>(tracker: &StudyTracker<S>, lesson_id: &str) -> String {
    tracker
        .lesson(lesson_id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| lesson_id.to_string())
}

pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (percent.min(100) as usize * width) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Cuts `text` to at most `max` display columns, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }

    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}
