use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{TrackerError, TrackerResult};
use crate::model::goals::{topic_goal_key, Goals};
use crate::model::lesson::Lesson;
use crate::model::range::TimeRange;
use crate::model::study_log::{NewStudyLog, StudyLog};
use crate::repository::persistence::{self, unique_id};
use crate::repository::KeyValueStore;
use crate::service::dto::{DailySummary, DashboardStats, DayTotal, LessonHistory};
use crate::usecase::history::HistoryUseCase;
use crate::usecase::stats::StatsUseCase;

/// Owns the three collections (logs, lessons, goals) and writes the affected
/// one back to the store after every change.
pub struct StudyTracker<S: KeyValueStore> {
    store: S,
    logs: Vec<StudyLog>,
    lessons: Vec<Lesson>,
    goals: Goals,
}

impl<S: KeyValueStore> StudyTracker<S> {
    /// Loads all collections, falling back to defaults for anything missing
    /// or malformed. Repaired ids and dropped entries are written back straight away.
    pub fn load(store: S) -> TrackerResult<Self> {
        let loaded = persistence::load_logs(&store)?;
        let lessons = persistence::load_lessons(&store)?;
        let goals = persistence::load_goals(&store)?;

        if loaded.needs_rewrite() {
            persistence::save_logs(&store, &loaded.logs)?;
        }
        debug!(logs = loaded.logs.len(), lessons = lessons.len(), "loaded tracker state");

        Ok(Self {
            store,
            logs: loaded.logs,
            lessons,
            goals,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Newest first.
    pub fn logs(&self) -> &[StudyLog] {
        &self.logs
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    fn lesson_index(&self, lesson_id: &str) -> TrackerResult<usize> {
        self.lessons
            .iter()
            .position(|l| l.id == lesson_id)
            .ok_or_else(|| TrackerError::UnknownLesson(lesson_id.to_string()))
    }

    // --- logs ---

    pub fn add_log(&mut self, new_log: NewStudyLog) -> TrackerResult<StudyLog> {
        self.lesson_index(&new_log.lesson_id)?;
        if new_log.topic.trim().is_empty() {
            return Err(TrackerError::EmptyTopic);
        }

        let taken: HashSet<String> = self.logs.iter().map(|l| l.id.clone()).collect();
        let log = StudyLog::from_new(new_log, unique_id(&taken));

        self.logs.insert(0, log.clone());
        persistence::save_logs(&self.store, &self.logs)?;
        info!(id = %log.id, lesson = %log.lesson_id, "added study log");
        Ok(log)
    }

    pub fn delete_log(&mut self, id: &str) -> TrackerResult<StudyLog> {
        let pos = self
            .logs
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| TrackerError::LogNotFound(id.to_string()))?;

        let removed = self.logs.remove(pos);
        persistence::save_logs(&self.store, &self.logs)?;
        info!(id = %removed.id, "deleted study log");
        Ok(removed)
    }

    /// Resolves a unique id prefix to a log, as typed on the command line.
    pub fn find_log_by_prefix(&self, prefix: &str) -> TrackerResult<&StudyLog> {
        if let Some(exact) = self.logs.iter().find(|l| l.id == prefix) {
            return Ok(exact);
        }
        let matches: Vec<&StudyLog> = self.logs.iter().filter(|l| l.id.starts_with(prefix)).collect();
        match matches.as_slice() {
            [single] => Ok(*single),
            [] => Err(TrackerError::LogNotFound(prefix.to_string())),
            many => Err(TrackerError::AmbiguousLogId {
                prefix: prefix.to_string(),
                matches: many.len(),
            }),
        }
    }

    // --- topics ---

    /// Appends the trimmed, non-empty topics not already in the lesson.
    /// Returns how many were added.
    pub fn add_topics(&mut self, lesson_id: &str, topics: &[String]) -> TrackerResult<usize> {
        let idx = self.lesson_index(lesson_id)?;
        let lesson = &mut self.lessons[idx];

        let mut added = 0;
        for topic in topics.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if !lesson.has_topic(topic) {
                lesson.topics.push(topic.to_string());
                added += 1;
            }
        }

        if added > 0 {
            persistence::save_lessons(&self.store, &self.lessons)?;
            info!(lesson = lesson_id, added, "added topics");
        }
        Ok(added)
    }

    /// Renames a topic in place, moves its topic goal to the new key and
    /// rewrites the topic of this lesson's historical logs. Returns the
    /// number of logs rewritten.
    pub fn rename_topic(&mut self, lesson_id: &str, old: &str, new: &str) -> TrackerResult<usize> {
        let idx = self.lesson_index(lesson_id)?;
        let (old, new) = (old.trim(), new.trim());

        let lesson = &mut self.lessons[idx];
        let pos = lesson
            .topics
            .iter()
            .position(|t| t == old)
            .ok_or_else(|| TrackerError::TopicNotFound {
                lesson: lesson_id.to_string(),
                topic: old.to_string(),
            })?;
        if new.is_empty() {
            return Err(TrackerError::EmptyTopic);
        }
        if old == new {
            return Ok(0);
        }
        if lesson.has_topic(new) {
            return Err(TrackerError::DuplicateTopic {
                lesson: lesson_id.to_string(),
                topic: new.to_string(),
            });
        }

        // All three collections change in memory before anything is written
        lesson.topics[pos] = new.to_string();
        let goal_moved = self.goals.migrate_topic_goal(lesson_id, old, new);
        let mut rewritten = 0;
        for log in self.logs.iter_mut().filter(|l| l.lesson_id == lesson_id && l.topic == old) {
            log.topic = new.to_string();
            rewritten += 1;
        }

        persistence::save_lessons(&self.store, &self.lessons)?;
        if goal_moved {
            persistence::save_goals(&self.store, &self.goals)?;
        }
        if rewritten > 0 {
            persistence::save_logs(&self.store, &self.logs)?;
        }

        info!(lesson = lesson_id, old, new, rewritten, "renamed topic");
        Ok(rewritten)
    }

    /// Removes a topic and its topic goal. Logs keep their topic text.
    pub fn delete_topic(&mut self, lesson_id: &str, topic: &str) -> TrackerResult<()> {
        let idx = self.lesson_index(lesson_id)?;
        let lesson = &mut self.lessons[idx];
        let before = lesson.topics.len();
        lesson.topics.retain(|t| t != topic);
        if lesson.topics.len() == before {
            return Err(TrackerError::TopicNotFound {
                lesson: lesson_id.to_string(),
                topic: topic.to_string(),
            });
        }
        persistence::save_lessons(&self.store, &self.lessons)?;

        if self.goals.topic_goals.remove(&topic_goal_key(lesson_id, topic)).is_some() {
            persistence::save_goals(&self.store, &self.goals)?;
        }
        info!(lesson = lesson_id, topic, "deleted topic");
        Ok(())
    }

    // --- goals ---

    pub fn set_goal(&mut self, range: TimeRange, questions: u32) -> TrackerResult<()> {
        self.goals.set_target(range, questions);
        persistence::save_goals(&self.store, &self.goals)?;
        info!(%range, questions, "updated goal");
        Ok(())
    }

    pub fn set_topic_goal(&mut self, lesson_id: &str, topic: &str, questions: u32) -> TrackerResult<()> {
        let lesson = &self.lessons[self.lesson_index(lesson_id)?];
        if !lesson.has_topic(topic) {
            return Err(TrackerError::TopicNotFound {
                lesson: lesson_id.to_string(),
                topic: topic.to_string(),
            });
        }
        self.goals.topic_goals.insert(topic_goal_key(lesson_id, topic), questions);
        persistence::save_goals(&self.store, &self.goals)?;
        info!(lesson = lesson_id, topic, questions, "updated topic goal");
        Ok(())
    }

    /// Returns whether a goal was set.
    pub fn clear_topic_goal(&mut self, lesson_id: &str, topic: &str) -> TrackerResult<bool> {
        let removed = self.goals.topic_goals.remove(&topic_goal_key(lesson_id, topic)).is_some();
        if removed {
            persistence::save_goals(&self.store, &self.goals)?;
        }
        Ok(removed)
    }

    // --- derived views ---

    pub fn dashboard(&self, range: TimeRange, today: NaiveDate) -> DashboardStats {
        StatsUseCase::new(&self.logs, &self.goals).dashboard(range, today)
    }

    pub fn daily_summaries(&self) -> Vec<DailySummary> {
        self.history().daily_summaries()
    }

    pub fn daily_summaries_in(&self, range: TimeRange, today: NaiveDate) -> Vec<DailySummary> {
        self.history().daily_summaries_in(range, today)
    }

    pub fn daily_series(&self, range: TimeRange, today: NaiveDate) -> Vec<DayTotal> {
        self.history().daily_series(range, today)
    }

    pub fn lesson_histories(&self) -> Vec<LessonHistory> {
        self.history().lesson_histories()
    }

    fn history(&self) -> HistoryUseCase<'_> {
        HistoryUseCase::new(&self.logs, &self.lessons, &self.goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::default_lessons;
    use crate::repository::persistence::{GOALS_KEY, LESSONS_KEY, LOGS_KEY};
    use crate::repository::MemoryStore;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_log(lesson: &str, topic: &str, questions: u32) -> NewStudyLog {
        NewStudyLog {
            date: day(2026, 10, 15),
            lesson_id: lesson.to_string(),
            topic: topic.to_string(),
            duration: 30,
            questions_solved: questions,
            notes: None,
        }
    }

    #[test]
    fn test_fresh_store_uses_defaults() {
        let tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        assert!(tracker.logs().is_empty());
        assert_eq!(tracker.lessons(), default_lessons().as_slice());
        assert_eq!(tracker.goals(), &Goals::default());
    }

    #[test]
    fn test_add_log_prepends_and_persists() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let first = tracker.add_log(new_log("tarih", "Yargı", 10)).unwrap();
        let second = tracker.add_log(new_log("matematik", "Olasılık", 20)).unwrap();

        assert_ne!(first.id, second.id);
        let ids: Vec<_> = tracker.logs().iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        let reloaded = StudyTracker::load(tracker.store()).unwrap();
        assert_eq!(reloaded.logs(), tracker.logs());
    }

    #[test]
    fn test_add_log_validates_lesson_and_topic() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        assert!(matches!(
            tracker.add_log(new_log("felsefe", "Mantık", 1)),
            Err(TrackerError::UnknownLesson(_))
        ));
        assert!(matches!(
            tracker.add_log(new_log("tarih", "  ", 1)),
            Err(TrackerError::EmptyTopic)
        ));
        assert!(tracker.logs().is_empty());
        assert_eq!(tracker.store().raw(LOGS_KEY), None);
    }

    #[test]
    fn test_delete_log_removes_exactly_one() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        for q in 0..4 {
            tracker.add_log(new_log("tarih", "Yargı", q)).unwrap();
        }
        let before: Vec<StudyLog> = tracker.logs().to_vec();
        let target = before[2].id.clone();

        let removed = tracker.delete_log(&target).unwrap();
        assert_eq!(removed, before[2]);

        let mut expected = before.clone();
        expected.remove(2);
        assert_eq!(tracker.logs(), expected.as_slice());

        assert!(matches!(tracker.delete_log(&target), Err(TrackerError::LogNotFound(_))));
        assert_eq!(tracker.logs().len(), 3);
    }

    #[test]
    fn test_find_log_by_prefix() {
        let raw = r#"[
            {"id":"abc1","date":"2026-10-01","lessonId":"tarih","topic":"Yargı","duration":1,"questionsSolved":1},
            {"id":"abc2","date":"2026-10-01","lessonId":"tarih","topic":"Yargı","duration":1,"questionsSolved":1},
            {"id":"xyz","date":"2026-10-01","lessonId":"tarih","topic":"Yargı","duration":1,"questionsSolved":1}
        ]"#;
        let tracker = StudyTracker::load(MemoryStore::with_entry(LOGS_KEY, raw)).unwrap();

        assert_eq!(tracker.find_log_by_prefix("x").unwrap().id, "xyz");
        assert_eq!(tracker.find_log_by_prefix("abc2").unwrap().id, "abc2");
        assert!(matches!(
            tracker.find_log_by_prefix("abc"),
            Err(TrackerError::AmbiguousLogId { matches: 2, .. })
        ));
        assert!(matches!(tracker.find_log_by_prefix("q"), Err(TrackerError::LogNotFound(_))));
    }

    #[test]
    fn test_load_repairs_and_writes_back_ids() {
        let raw = r#"[
            {"id":"same","date":"2026-10-01","lessonId":"tarih","topic":"Yargı","duration":1,"questionsSolved":1},
            {"id":"same","date":"2026-10-02","lessonId":"tarih","topic":"Yargı","duration":1,"questionsSolved":1}
        ]"#;
        let tracker = StudyTracker::load(MemoryStore::with_entry(LOGS_KEY, raw)).unwrap();
        assert_ne!(tracker.logs()[0].id, tracker.logs()[1].id);

        let stored = tracker.store().raw(LOGS_KEY).unwrap();
        let again = StudyTracker::load(MemoryStore::with_entry(LOGS_KEY, &stored)).unwrap();
        assert_eq!(again.logs(), tracker.logs());
    }

    #[test]
    fn test_corrupted_store_loads_defaults() {
        let store = MemoryStore::new();
        store.set(LOGS_KEY, "{{{{").unwrap();
        store.set(LESSONS_KEY, "{\"not\":\"a list\"}").unwrap();
        store.set(GOALS_KEY, "[1,2,3]").unwrap();

        let tracker = StudyTracker::load(store).unwrap();
        assert!(tracker.logs().is_empty());
        assert_eq!(tracker.lessons(), default_lessons().as_slice());
        assert_eq!(tracker.goals(), &Goals::default());
    }

    #[test]
    fn test_add_topics_skips_blank_and_existing() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        let before = tracker.lesson("tarih").unwrap().topics.len();

        let added = tracker
            .add_topics(
                "tarih",
                &["  Yakın Tarih ".to_string(), "".to_string(), "Anayasa Tarihi".to_string()],
            )
            .unwrap();
        assert_eq!(added, 1);

        let lesson = tracker.lesson("tarih").unwrap();
        assert_eq!(lesson.topics.len(), before + 1);
        assert_eq!(lesson.topics.last().map(String::as_str), Some("Yakın Tarih"));
    }

    #[test]
    fn test_rename_topic_migrates_goal_and_logs() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        tracker.set_topic_goal("vatandaslik", "Yasama", 200).unwrap();
        tracker.set_topic_goal("vatandaslik", "Yargı", 150).unwrap();
        tracker.set_topic_goal("matematik", "Olasılık", 90).unwrap();
        tracker.add_log(new_log("vatandaslik", "Yasama", 10)).unwrap();
        tracker.add_log(new_log("vatandaslik", "Yargı", 10)).unwrap();

        let rewritten = tracker.rename_topic("vatandaslik", "Yasama", "Yasama (TBMM)").unwrap();
        assert_eq!(rewritten, 1);

        let goals = tracker.goals();
        assert_eq!(goals.topic_goal("vatandaslik", "Yasama (TBMM)"), Some(200));
        assert_eq!(goals.topic_goal("vatandaslik", "Yasama"), None);
        assert_eq!(goals.topic_goal("vatandaslik", "Yargı"), Some(150));
        assert_eq!(goals.topic_goal("matematik", "Olasılık"), Some(90));
        assert_eq!(goals.topic_goals.len(), 3);

        let lesson = tracker.lesson("vatandaslik").unwrap();
        assert_eq!(lesson.topics[5], "Yasama (TBMM)");
        assert!(!lesson.has_topic("Yasama"));

        let topics: Vec<_> = tracker.logs().iter().map(|l| l.topic.as_str()).collect();
        assert_eq!(topics, vec!["Yargı", "Yasama (TBMM)"]);

        let reloaded = StudyTracker::load(tracker.store()).unwrap();
        assert_eq!(reloaded.goals(), tracker.goals());
        assert_eq!(reloaded.lessons(), tracker.lessons());
    }

    #[test]
    fn test_rename_topic_errors() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        assert!(matches!(
            tracker.rename_topic("tarih", "Yok Böyle Konu", "Yeni"),
            Err(TrackerError::TopicNotFound { .. })
        ));
        assert!(matches!(
            tracker.rename_topic("vatandaslik", "Yasama", "Yargı"),
            Err(TrackerError::DuplicateTopic { .. })
        ));
        assert!(matches!(
            tracker.rename_topic("vatandaslik", "Yasama", " "),
            Err(TrackerError::EmptyTopic)
        ));
    }

    #[test]
    fn test_rename_topic_to_itself_still_checks_topic() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        assert!(matches!(
            tracker.rename_topic("tarih", "Yok Böyle Konu", "Yok Böyle Konu"),
            Err(TrackerError::TopicNotFound { .. })
        ));
        assert_eq!(tracker.rename_topic("vatandaslik", " Yasama ", "Yasama").unwrap(), 0);
        assert!(tracker.lesson("vatandaslik").unwrap().has_topic("Yasama"));
        assert_eq!(tracker.store().raw(LESSONS_KEY), None);
    }

    #[test]
    fn test_rename_topic_trims_old_name() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        tracker.add_log(new_log("vatandaslik", "Yasama", 5)).unwrap();

        let rewritten = tracker.rename_topic("vatandaslik", "  Yasama ", "Meclis").unwrap();
        assert_eq!(rewritten, 1);
        assert_eq!(tracker.logs()[0].topic, "Meclis");

        let reloaded = StudyTracker::load(tracker.store()).unwrap();
        assert_eq!(reloaded.logs(), tracker.logs());
        assert!(reloaded.lesson("vatandaslik").unwrap().has_topic("Meclis"));
    }

    #[test]
    fn test_load_drops_malformed_entries_and_keeps_the_rest() {
        let raw = r#"[
            {"id":"a","date":"2026-10-01","lessonId":"tarih","topic":"Yargı","duration":30,"questionsSolved":10},
            {"id":"b","date":"2026-10-02","lessonId":"tarih","topic":"Yargı","duration":20,"questionsSolved":5},
            {"id":"c","date":"2026-10-03","topic":"Yargı","duration":20,"questionsSolved":5}
        ]"#;
        let mut tracker = StudyTracker::load(MemoryStore::with_entry(LOGS_KEY, raw)).unwrap();
        let ids: Vec<_> = tracker.logs().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // The cleaned collection is already on disk
        let stored = tracker.store().raw(LOGS_KEY).unwrap();
        assert!(!stored.contains("\"c\""));

        tracker.add_log(new_log("matematik", "Olasılık", 7)).unwrap();
        let reloaded = StudyTracker::load(tracker.store()).unwrap();
        assert_eq!(reloaded.logs().len(), 3);
        assert_eq!(reloaded.logs()[1].id, "a");
        assert_eq!(reloaded.logs()[2].id, "b");
    }

    #[test]
    fn test_delete_topic_drops_goal_keeps_logs() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        tracker.set_topic_goal("geometri", "Katı Cisimler", 40).unwrap();
        tracker.add_log(new_log("geometri", "Katı Cisimler", 12)).unwrap();

        tracker.delete_topic("geometri", "Katı Cisimler").unwrap();

        assert!(!tracker.lesson("geometri").unwrap().has_topic("Katı Cisimler"));
        assert_eq!(tracker.goals().topic_goal("geometri", "Katı Cisimler"), None);
        assert_eq!(tracker.logs()[0].topic, "Katı Cisimler");

        assert!(matches!(
            tracker.delete_topic("geometri", "Katı Cisimler"),
            Err(TrackerError::TopicNotFound { .. })
        ));
    }

    #[test]
    fn test_goal_updates_persist() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        tracker.set_goal(TimeRange::Daily, 150).unwrap();
        tracker.set_topic_goal("turkce", "Ses Bilgisi", 60).unwrap();
        assert!(tracker.clear_topic_goal("turkce", "Ses Bilgisi").unwrap());
        assert!(!tracker.clear_topic_goal("turkce", "Ses Bilgisi").unwrap());

        let reloaded = StudyTracker::load(tracker.store()).unwrap();
        assert_eq!(reloaded.goals().daily.questions, 150);
        assert!(reloaded.goals().topic_goals.is_empty());

        assert!(matches!(
            tracker.set_topic_goal("turkce", "Bilinmeyen", 5),
            Err(TrackerError::TopicNotFound { .. })
        ));
    }

    #[test]
    fn test_dashboard_through_tracker() {
        let mut tracker = StudyTracker::load(MemoryStore::new()).unwrap();
        tracker.add_log(new_log("tarih", "Yargı", 70)).unwrap();
        tracker.add_log(new_log("tarih", "Yargı", 50)).unwrap();

        let stats = tracker.dashboard(TimeRange::Daily, day(2026, 10, 15));
        assert_eq!(stats.total_questions, 120);
        assert_eq!(stats.goal.percent, 100);
        assert_eq!(stats.most_studied_lesson.as_deref(), Some("tarih"));
        assert_eq!(tracker.daily_summaries().len(), 1);
        assert_eq!(tracker.lesson_histories()[0].topics[0].totals.sessions, 2);
    }
}
