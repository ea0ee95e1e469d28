use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::range::TimeRange;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalTarget {
    pub questions: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Goals {
    pub daily: GoalTarget,
    pub weekly: GoalTarget,
    pub monthly: GoalTarget,
    pub topic_goals: BTreeMap<String, u32>, // Key: "lessonId:topicName"
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily: GoalTarget { questions: 100 },
            weekly: GoalTarget { questions: 700 },
            monthly: GoalTarget { questions: 3000 },
            topic_goals: BTreeMap::new(),
        }
    }
}

impl Goals {
    pub fn target_for(&self, range: TimeRange) -> GoalTarget {
        match range {
            TimeRange::Daily => self.daily,
            TimeRange::Weekly => self.weekly,
            TimeRange::Monthly => self.monthly,
        }
    }

    pub fn set_target(&mut self, range: TimeRange, questions: u32) {
        let target = match range {
            TimeRange::Daily => &mut self.daily,
            TimeRange::Weekly => &mut self.weekly,
            TimeRange::Monthly => &mut self.monthly,
        };
        target.questions = questions;
    }

    pub fn topic_goal(&self, lesson_id: &str, topic: &str) -> Option<u32> {
        self.topic_goals.get(&topic_goal_key(lesson_id, topic)).copied()
    }

    /// Moves the goal stored under `lesson:old` to `lesson:new`.
    /// Returns whether an entry was moved.
    pub fn migrate_topic_goal(&mut self, lesson_id: &str, old: &str, new: &str) -> bool {
        match self.topic_goals.remove(&topic_goal_key(lesson_id, old)) {
            Some(target) => {
                self.topic_goals.insert(topic_goal_key(lesson_id, new), target);
                true
            }
            None => false,
        }
    }
}

pub fn topic_goal_key(lesson_id: &str, topic: &str) -> String {
    format!("{}:{}", lesson_id, topic)
}

/// Capped completion ratio in whole percent. A zero target counts as 1.
pub fn goal_percentage(total: u64, target: u32) -> u8 {
    let target = target.max(1) as f64;
    let pct = (100.0 * total as f64 / target).round();
    pct.clamp(0.0, 100.0) as u8
}
