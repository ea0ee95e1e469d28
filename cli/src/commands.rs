use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use kpss_core::{
    expand_key, format_minutes, parse_args, parse_day, parse_minutes, today, KeyValueStore,
    KpssConfig, NewStudyLog, StudyTracker, TimeRange,
};

const ADD_KEYS: [&str; 4] = ["questions", "minutes", "date", "note"];

#[derive(clap::Subcommand)]
pub enum TopicAction {
    /// List the topics of a lesson (or all lessons)
    List { lesson: Option<String> },
    /// Add one or more topics, separated by commas
    Add {
        lesson: String,
        #[arg(required = true, num_args = 1..)]
        topics: Vec<String>,
    },
    /// Rename a topic; its goal and past sessions follow the new name
    Rename { lesson: String, old: String, new: String },
    /// Remove a topic (past sessions keep their topic text)
    Delete {
        lesson: String,
        topic: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
pub enum GoalAction {
    /// Show every goal
    Show,
    /// Set the question goal of a time range
    Set { range: TimeRange, questions: u32 },
    /// Set the question goal of one topic
    Topic { lesson: String, topic: String, questions: u32 },
    /// Remove the goal of one topic
    Clear { lesson: String, topic: String },
}

/// Resolves a lesson id or unique prefix against the known lessons.
pub fn resolve_lesson<S: KeyValueStore>(tracker: &StudyTracker<S>, input: &str) -> Result<String> {
    let ids: Vec<&str> = tracker.lessons().iter().map(|l| l.id.as_str()).collect();
    expand_key(input, &ids).with_context(|| format!("no lesson matches '{}'", input))
}

/// Builds a session from `add` arguments: the lesson id or prefix, then topic
/// words and `key:value` metadata. An empty topic falls back to the lesson's
/// first topic.
pub fn build_log<S: KeyValueStore>(
    tracker: &StudyTracker<S>,
    config: &KpssConfig,
    lesson: &str,
    args: &[String],
) -> Result<NewStudyLog> {
    let lesson_id = resolve_lesson(tracker, lesson)?;
    let parsed = parse_args(args);

    // Normalize metadata keys
    let mut metadata = HashMap::new();
    for (key, value) in &parsed.metadata {
        match expand_key(&key, &ADD_KEYS) {
            Ok(full_key) => {
                metadata.insert(full_key, value.clone());
            }
            Err(e) => bail!("{}", e),
        }
    }

    let topic = match parsed.text() {
        t if t.trim().is_empty() => tracker
            .lesson(&lesson_id)
            .and_then(|l| l.first_topic())
            .map(str::to_string)
            .with_context(|| format!("lesson '{}' has no topics; pass one explicitly", lesson_id))?,
        t => t.trim().to_string(),
    };

    let duration = match metadata.get("minutes") {
        Some(m) => parse_minutes(m).with_context(|| format!("invalid duration '{}'", m))?,
        None => config.default_duration,
    };
    let questions_solved = match metadata.get("questions") {
        Some(q) => q.trim().parse::<u32>().with_context(|| format!("invalid question count '{}'", q))?,
        None => 0,
    };
    let date = match metadata.get("date") {
        Some(d) => parse_day(d, today())?,
        None => today(),
    };
    let notes = metadata.remove("note").filter(|n| !n.trim().is_empty());

    Ok(NewStudyLog {
        date,
        lesson_id,
        topic,
        duration,
        questions_solved,
        notes,
    })
}

pub fn add<S: KeyValueStore>(
    tracker: &mut StudyTracker<S>,
    config: &KpssConfig,
    lesson: &str,
    args: &[String],
) -> Result<()> {
    let new_log = build_log(tracker, config, lesson, args)?;
    let known_topic = tracker
        .lesson(&new_log.lesson_id)
        .is_some_and(|l| l.has_topic(&new_log.topic));
    if !known_topic {
        tracing::warn!(lesson = %new_log.lesson_id, topic = %new_log.topic, "topic is not in the lesson's topic list");
    }

    let log = tracker.add_log(new_log)?;

    let lesson_name = tracker.lesson(&log.lesson_id).map(|l| l.name.clone()).unwrap_or_default();
    println!("Session added: {} / {} (ID: {})", lesson_name, log.topic, short_id(&log.id));
    println!("  Date: {}", log.date.format("%Y-%m-%d"));
    println!("  Questions: {}", log.questions_solved);
    println!("  Duration: {}", format_minutes(log.duration as u64));
    if !known_topic {
        println!("  Note: '{}' is not one of the lesson's topics", log.topic);
    }
    Ok(())
}

pub fn delete<S: KeyValueStore>(tracker: &mut StudyTracker<S>, id: &str, yes: bool) -> Result<()> {
    let log = tracker.find_log_by_prefix(id)?.clone();
    let lesson_name = tracker
        .lesson(&log.lesson_id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| log.lesson_id.clone());

    let prompt = format!(
        "Delete {} / {} on {} ({} questions, {})?",
        lesson_name,
        log.topic,
        log.date.format("%Y-%m-%d"),
        log.questions_solved,
        format_minutes(log.duration as u64)
    );
    if !yes && !confirm(&prompt)? {
        println!("Cancelled.");
        return Ok(());
    }

    tracker.delete_log(&log.id)?;
    println!("Session {} deleted.", short_id(&log.id));
    Ok(())
}

pub fn topic<S: KeyValueStore>(tracker: &mut StudyTracker<S>, action: TopicAction) -> Result<()> {
    match action {
        TopicAction::List { lesson } => {
            let filter = lesson.map(|l| resolve_lesson(tracker, &l)).transpose()?;
            for lesson in tracker.lessons() {
                if filter.as_deref().is_some_and(|f| f != lesson.id) {
                    continue;
                }
                println!("\n\x1b[1;36m{}\x1b[0m ({}, {} topics)", lesson.name, lesson.id, lesson.topics.len());
                for topic in &lesson.topics {
                    match tracker.goals().topic_goal(&lesson.id, topic) {
                        Some(goal) => println!("  - {} (goal: {})", topic, goal),
                        None => println!("  - {}", topic),
                    }
                }
            }
        }
        TopicAction::Add { lesson, topics } => {
            let lesson_id = resolve_lesson(tracker, &lesson)?;
            let split: Vec<String> = topics
                .iter()
                .flat_map(|t| t.split(','))
                .map(|t| t.trim().to_string())
                .collect();
            let added = tracker.add_topics(&lesson_id, &split)?;
            println!("{} topic(s) added to {}.", added, lesson_id);
        }
        TopicAction::Rename { lesson, old, new } => {
            let lesson_id = resolve_lesson(tracker, &lesson)?;
            let rewritten = tracker.rename_topic(&lesson_id, &old, &new)?;
            println!("Renamed '{}' to '{}' ({} past session(s) updated).", old, new.trim(), rewritten);
        }
        TopicAction::Delete { lesson, topic, yes } => {
            let lesson_id = resolve_lesson(tracker, &lesson)?;
            if !yes && !confirm(&format!("Delete topic \"{}\" from {}?", topic, lesson_id))? {
                println!("Cancelled.");
                return Ok(());
            }
            tracker.delete_topic(&lesson_id, &topic)?;
            println!("Topic '{}' deleted.", topic);
        }
    }
    Ok(())
}

pub fn goal<S: KeyValueStore>(tracker: &mut StudyTracker<S>, action: Option<GoalAction>) -> Result<()> {
    match action.unwrap_or(GoalAction::Show) {
        GoalAction::Show => {
            let goals = tracker.goals();
            for range in TimeRange::ALL {
                println!("{:<8} {} questions", range.as_str(), goals.target_for(range).questions);
            }
            if goals.topic_goals.is_empty() {
                println!("No topic goals set.");
            } else {
                println!("\nTopic goals:");
                for (key, target) in &goals.topic_goals {
                    println!("  {:<50} {}", key, target);
                }
            }
        }
        GoalAction::Set { range, questions } => {
            tracker.set_goal(range, questions)?;
            println!("{} goal set to {} questions.", range, questions);
        }
        GoalAction::Topic { lesson, topic, questions } => {
            let lesson_id = resolve_lesson(tracker, &lesson)?;
            tracker.set_topic_goal(&lesson_id, &topic, questions)?;
            println!("Goal for {} / {} set to {} questions.", lesson_id, topic, questions);
        }
        GoalAction::Clear { lesson, topic } => {
            let lesson_id = resolve_lesson(tracker, &lesson)?;
            if tracker.clear_topic_goal(&lesson_id, &topic)? {
                println!("Goal for {} / {} removed.", lesson_id, topic);
            } else {
                println!("No goal was set for {} / {}.", lesson_id, topic);
            }
        }
    }
    Ok(())
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "e" | "evet"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpss_core::MemoryStore;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_resolve_lesson_prefix() {
        let tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        assert_eq!(resolve_lesson(&tracker, "geo").unwrap(), "geometri");
        assert_eq!(resolve_lesson(&tracker, "VAT").unwrap(), "vatandaslik");
        assert!(resolve_lesson(&tracker, "t").is_err());
    }

    #[test]
    fn test_add_defaults_to_first_topic() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let config = KpssConfig::default();
        add(&mut tracker, &config, "mat", &["q:25".to_string()]).unwrap();

        let log = &tracker.logs()[0];
        assert_eq!(log.lesson_id, "matematik");
        assert_eq!(log.topic, "Temel Kavramlar");
        assert_eq!(log.questions_solved, 25);
        assert_eq!(log.duration, 60);
        assert_eq!(log.date, today());
    }

    #[test]
    fn test_add_parses_metadata() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let config = KpssConfig::default();
        let args: Vec<String> = ["Oran-Orantı", "min:1h15m", "date:2026-10-01", "note:tekrar"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        add(&mut tracker, &config, "matematik", &args).unwrap();

        let log = &tracker.logs()[0];
        assert_eq!(log.topic, "Oran-Orantı");
        assert_eq!(log.duration, 75);
        assert_eq!(log.questions_solved, 0);
        assert_eq!(log.date.to_string(), "2026-10-01");
        assert_eq!(log.notes.as_deref(), Some("tekrar"));
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let config = KpssConfig::default();
        assert!(add(&mut tracker, &config, "mat", &["q:many".to_string()]).is_err());
        assert!(add(&mut tracker, &config, "mat", &["zz:1".to_string()]).is_err());
        assert!(add(&mut tracker, &config, "felsefe", &[]).is_err());
        assert!(tracker.logs().is_empty());
    }

    #[test]
    fn test_delete_with_yes_flag() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let config = KpssConfig::default();
        add(&mut tracker, &config, "tarih", &[]).unwrap();
        let id = tracker.logs()[0].id.clone();

        delete(&mut tracker, short_id(&id), true).unwrap();
        assert!(tracker.logs().is_empty());
    }
}
