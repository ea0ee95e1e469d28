use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::model::goals::{goal_percentage, Goals};
use crate::model::range::TimeRange;
use crate::model::study_log::StudyLog;
use crate::service::dto::{DashboardStats, GoalProgress, Totals};

/// Range filtering and dashboard numbers over a log collection.
pub struct StatsUseCase<'a> {
    logs: &'a [StudyLog],
    goals: &'a Goals,
}

impl<'a> StatsUseCase<'a> {
    pub fn new(logs: &'a [StudyLog], goals: &'a Goals) -> Self {
        Self { logs, goals }
    }

    pub fn logs_in_range(&self, range: TimeRange, today: NaiveDate) -> impl Iterator<Item = &'a StudyLog> {
        let logs = self.logs;
        logs.iter().filter(move |l| range.contains(l.date, today))
    }

    pub fn today_totals(&self, today: NaiveDate) -> Totals {
        Totals::of(self.logs.iter().filter(|l| l.date == today))
    }

    pub fn range_totals(&self, range: TimeRange, today: NaiveDate) -> Totals {
        Totals::of(self.logs_in_range(range, today))
    }

    pub fn studied_days(&self, range: TimeRange, today: NaiveDate) -> usize {
        self.logs_in_range(range, today)
            .map(|l| l.date)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Lesson with the most minutes in the range. Ties go to the lesson that
    /// appears first in collection order (newest first).
    pub fn most_studied_lesson(&self, range: TimeRange, today: NaiveDate) -> Option<String> {
        let mut order: Vec<&str> = Vec::new();
        let mut minutes: HashMap<&str, u64> = HashMap::new();

        for log in self.logs_in_range(range, today) {
            let entry = minutes.entry(log.lesson_id.as_str()).or_insert_with(|| {
                order.push(log.lesson_id.as_str());
                0
            });
            *entry += log.duration as u64;
        }

        let mut best: Option<(&str, u64)> = None;
        for id in order {
            let total = minutes[id];
            if best.map_or(true, |(_, b)| total > b) {
                best = Some((id, total));
            }
        }
        best.map(|(id, _)| id.to_string())
    }

    pub fn goal_progress(&self, range: TimeRange, today: NaiveDate) -> GoalProgress {
        let target = self.goals.target_for(range).questions;
        let achieved = self.range_totals(range, today).questions;
        GoalProgress {
            target,
            achieved,
            percent: goal_percentage(achieved, target),
        }
    }

    /// All-time progress of one topic against its topic goal, if one is set.
    pub fn topic_goal_progress(&self, lesson_id: &str, topic: &str) -> Option<GoalProgress> {
        let target = self.goals.topic_goal(lesson_id, topic)?;
        let achieved = Totals::of(
            self.logs
                .iter()
                .filter(|l| l.lesson_id == lesson_id && l.topic == topic),
        )
        .questions;
        Some(GoalProgress {
            target,
            achieved,
            percent: goal_percentage(achieved, target),
        })
    }

    pub fn dashboard(&self, range: TimeRange, today: NaiveDate) -> DashboardStats {
        let totals = self.range_totals(range, today);
        DashboardStats {
            range,
            from: range.start(today),
            to: today,
            total_study_time: totals.minutes,
            total_questions: totals.questions,
            studied_days_count: self.studied_days(range, today),
            most_studied_lesson: self.most_studied_lesson(range, today),
            goal: self.goal_progress(range, today),
            today: self.today_totals(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::goals::topic_goal_key;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log(id: &str, date: NaiveDate, lesson: &str, topic: &str, duration: u32, questions: u32) -> StudyLog {
        StudyLog {
            id: id.to_string(),
            date,
            lesson_id: lesson.to_string(),
            topic: topic.to_string(),
            duration,
            questions_solved: questions,
            notes: None,
        }
    }

    fn sample() -> Vec<StudyLog> {
        let today = day(2026, 10, 15);
        vec![
            log("1", today, "matematik", "Olasılık", 60, 40),
            log("2", today, "tarih", "Yargı", 30, 20),
            log("3", day(2026, 10, 12), "tarih", "Yargı", 90, 50),
            log("4", day(2026, 10, 9), "matematik", "EBOB-EKOK", 20, 10),
            log("5", day(2026, 10, 1), "geometri", "Üçgende Alan", 45, 30),
            log("6", day(2026, 8, 1), "geometri", "Üçgende Alan", 500, 300),
            // future-dated entries are outside every range
            log("7", day(2026, 10, 20), "matematik", "Olasılık", 10, 10),
        ]
    }

    #[test]
    fn test_zero_logs_give_zero_aggregates() {
        let goals = Goals::default();
        let stats = StatsUseCase::new(&[], &goals);
        let today = day(2026, 10, 15);

        for range in TimeRange::ALL {
            let dashboard = stats.dashboard(range, today);
            assert_eq!(dashboard.total_study_time, 0);
            assert_eq!(dashboard.total_questions, 0);
            assert_eq!(dashboard.studied_days_count, 0);
            assert_eq!(dashboard.most_studied_lesson, None);
            assert_eq!(dashboard.goal.percent, 0);
            assert_eq!(dashboard.today, Totals::default());
        }
    }

    #[test]
    fn test_range_totals() {
        let logs = sample();
        let goals = Goals::default();
        let stats = StatsUseCase::new(&logs, &goals);
        let today = day(2026, 10, 15);

        let daily = stats.dashboard(TimeRange::Daily, today);
        assert_eq!(daily.total_study_time, 90);
        assert_eq!(daily.total_questions, 60);
        assert_eq!(daily.studied_days_count, 1);

        let weekly = stats.dashboard(TimeRange::Weekly, today);
        assert_eq!(weekly.total_study_time, 200);
        assert_eq!(weekly.total_questions, 120);
        assert_eq!(weekly.studied_days_count, 3);
        assert_eq!(weekly.from, day(2026, 10, 9));

        let monthly = stats.dashboard(TimeRange::Monthly, today);
        assert_eq!(monthly.total_study_time, 245);
        assert_eq!(monthly.total_questions, 150);
        assert_eq!(monthly.studied_days_count, 4);
    }

    #[test]
    fn test_today_totals_ignore_selected_range() {
        let logs = sample();
        let goals = Goals::default();
        let stats = StatsUseCase::new(&logs, &goals);
        let today = day(2026, 10, 15);

        let monthly = stats.dashboard(TimeRange::Monthly, today);
        assert_eq!(monthly.today, Totals { minutes: 90, questions: 60, sessions: 2 });
    }

    #[test]
    fn test_most_studied_lesson() {
        let logs = sample();
        let goals = Goals::default();
        let stats = StatsUseCase::new(&logs, &goals);
        let today = day(2026, 10, 15);

        assert_eq!(stats.most_studied_lesson(TimeRange::Weekly, today).as_deref(), Some("tarih"));
        assert_eq!(stats.most_studied_lesson(TimeRange::Daily, today).as_deref(), Some("matematik"));
    }

    #[test]
    fn test_most_studied_lesson_tie_goes_to_newest() {
        let today = day(2026, 10, 15);
        let logs = vec![
            log("1", today, "tarih", "Yargı", 30, 0),
            log("2", today, "matematik", "Olasılık", 30, 0),
        ];
        let goals = Goals::default();
        let stats = StatsUseCase::new(&logs, &goals);
        assert_eq!(stats.most_studied_lesson(TimeRange::Daily, today).as_deref(), Some("tarih"));
    }

    #[test]
    fn test_goal_progress_is_clamped() {
        let logs = sample();
        let mut goals = Goals::default();
        goals.daily.questions = 30;
        goals.weekly.questions = 0;
        goals.monthly.questions = 600;
        let stats = StatsUseCase::new(&logs, &goals);
        let today = day(2026, 10, 15);

        let daily = stats.goal_progress(TimeRange::Daily, today);
        assert_eq!(daily.achieved, 60);
        assert_eq!(daily.percent, 100);

        assert_eq!(stats.goal_progress(TimeRange::Weekly, today).percent, 100);
        assert_eq!(stats.goal_progress(TimeRange::Monthly, today).percent, 25);
    }

    #[test]
    fn test_topic_goal_progress_is_all_time() {
        let logs = sample();
        let mut goals = Goals::default();
        goals.topic_goals.insert(topic_goal_key("geometri", "Üçgende Alan"), 1000);
        let stats = StatsUseCase::new(&logs, &goals);

        let progress = stats.topic_goal_progress("geometri", "Üçgende Alan").unwrap();
        assert_eq!(progress.achieved, 330);
        assert_eq!(progress.percent, 33);
        assert!(stats.topic_goal_progress("tarih", "Yargı").is_none());
    }
}
