use serde::{Serialize, Deserialize};
use chrono::NaiveDate;

use crate::model::range::TimeRange;
use crate::model::study_log::StudyLog;

/// Running minutes/questions totals shared by every summary below.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub minutes: u64,
    pub questions: u64,
    pub sessions: usize,
}

impl Totals {
    pub fn add(&mut self, log: &StudyLog) {
        self.minutes += log.duration as u64;
        self.questions += log.questions_solved as u64;
        self.sessions += 1;
    }

    pub fn of<'a>(logs: impl IntoIterator<Item = &'a StudyLog>) -> Self {
        let mut totals = Totals::default();
        for log in logs {
            totals.add(log);
        }
        totals
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub target: u32,
    pub achieved: u64,
    pub percent: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub range: TimeRange,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_study_time: u64, // minutes
    pub total_questions: u64,
    pub studied_days_count: usize,
    pub most_studied_lesson: Option<String>, // lesson id
    pub goal: GoalProgress,
    pub today: Totals,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub day_of_week: String, // Mon, Tue...
    pub totals: Totals,
    pub logs: Vec<StudyLog>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TopicHistory {
    pub topic: String,
    pub totals: Totals,
    pub goal: Option<GoalProgress>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LessonHistory {
    pub lesson_id: String,
    pub lesson_name: String,
    // false when logs reference a lesson that no longer exists
    pub known: bool,
    pub totals: Totals,
    pub topics: Vec<TopicHistory>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub totals: Totals,
}
