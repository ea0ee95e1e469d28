use crate::model::goals::Goals;
use crate::model::lesson::Lesson;
use crate::model::range::TimeRange;
use crate::model::study_log::StudyLog;
use crate::service::dto::{DailySummary, DayTotal, LessonHistory, TopicHistory, Totals};
use crate::usecase::stats::StatsUseCase;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub struct HistoryUseCase<'a> {
    logs: &'a [StudyLog],
    lessons: &'a [Lesson],
    goals: &'a Goals,
}

impl<'a> HistoryUseCase<'a> {
    pub fn new(logs: &'a [StudyLog], lessons: &'a [Lesson], goals: &'a Goals) -> Self {
        Self {
            logs,
            lessons,
            goals,
        }
    }

    /// One entry per studied date, newest date first. Logs inside a day keep
    /// collection order.
    pub fn daily_summaries(&self) -> Vec<DailySummary> {
        self.summaries_for(self.logs.iter())
    }

    /// Same as `daily_summaries`, restricted to a time range.
    pub fn daily_summaries_in(&self, range: TimeRange, today: NaiveDate) -> Vec<DailySummary> {
        self.summaries_for(self.logs.iter().filter(|l| range.contains(l.date, today)))
    }

    fn summaries_for<'b>(&self, logs: impl Iterator<Item = &'b StudyLog>) -> Vec<DailySummary> {
        let mut by_day: BTreeMap<NaiveDate, Vec<StudyLog>> = BTreeMap::new();
        for log in logs {
            by_day.entry(log.date).or_default().push(log.clone());
        }

        by_day
            .into_iter()
            .rev()
            .map(|(date, logs)| DailySummary {
                date,
                day_of_week: date.format("%a").to_string(),
                totals: Totals::of(&logs),
                logs,
            })
            .collect()
    }

    /// Per-day totals for every date of the range, oldest first, with zero
    /// entries for days without logs.
    pub fn daily_series(&self, range: TimeRange, today: NaiveDate) -> Vec<DayTotal> {
        let mut by_day: HashMap<NaiveDate, Totals> = HashMap::new();
        for log in self.logs.iter().filter(|l| range.contains(l.date, today)) {
            by_day.entry(log.date).or_default().add(log);
        }

        range
            .days(today)
            .map(|date| DayTotal {
                date,
                totals: by_day.get(&date).copied().unwrap_or_default(),
            })
            .collect()
    }

    /// Lesson → topic drill-down. Lessons follow their definition order;
    /// logs whose lesson is gone are grouped afterwards under the raw id.
    /// Topics follow the lesson's topic list, then any topic only seen in
    /// logs in first-seen order. Defined lessons and topics without logs are
    /// left out.
    pub fn lesson_histories(&self) -> Vec<LessonHistory> {
        let stats = StatsUseCase::new(self.logs, self.goals);

        // lesson id -> (topic -> totals, topic first-seen order)
        let mut grouped: HashMap<&str, (HashMap<&str, Totals>, Vec<&str>)> = HashMap::new();
        let mut unknown_order: Vec<&str> = Vec::new();

        for log in self.logs {
            let lesson_id = log.lesson_id.as_str();
            let (topics, seen) = grouped.entry(lesson_id).or_insert_with(|| {
                if !self.lessons.iter().any(|l| l.id == lesson_id) {
                    unknown_order.push(lesson_id);
                }
                (HashMap::new(), Vec::new())
            });
            let totals = topics.entry(log.topic.as_str()).or_insert_with(|| {
                seen.push(log.topic.as_str());
                Totals::default()
            });
            totals.add(log);
        }

        let mut histories = Vec::new();

        for lesson in self.lessons {
            let Some((topics, seen)) = grouped.get(lesson.id.as_str()) else {
                continue;
            };
            let mut ordered: Vec<&str> = lesson
                .topics
                .iter()
                .map(String::as_str)
                .filter(|t| topics.contains_key(t))
                .collect();
            ordered.extend(seen.iter().filter(|t| !lesson.has_topic(t)));

            histories.push(build_history(&stats, &lesson.id, &lesson.name, true, topics, &ordered));
        }

        for lesson_id in unknown_order {
            let (topics, seen) = &grouped[lesson_id];
            histories.push(build_history(&stats, lesson_id, lesson_id, false, topics, seen));
        }

        histories
    }
}

fn build_history(
    stats: &StatsUseCase<'_>,
    lesson_id: &str,
    lesson_name: &str,
    known: bool,
    topics: &HashMap<&str, Totals>,
    ordered: &[&str],
) -> LessonHistory {
    let mut lesson_totals = Totals::default();
    let topic_histories = ordered
        .iter()
        .map(|topic| {
            let totals = topics[topic];
            lesson_totals.minutes += totals.minutes;
            lesson_totals.questions += totals.questions;
            lesson_totals.sessions += totals.sessions;
            TopicHistory {
                topic: topic.to_string(),
                totals,
                goal: stats.topic_goal_progress(lesson_id, topic),
            }
        })
        .collect();

    LessonHistory {
        lesson_id: lesson_id.to_string(),
        lesson_name: lesson_name.to_string(),
        known,
        totals: lesson_totals,
        topics: topic_histories,
    }
}
