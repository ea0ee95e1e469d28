pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod input;
pub mod time;
pub mod service;
pub mod usecase;

pub use config::{ConfigError, KpssConfig};
pub use error::{TrackerError, TrackerResult};
pub use model::goals::{goal_percentage, topic_goal_key, GoalTarget, Goals};
pub use model::lesson::{default_lessons, Lesson};
pub use model::range::TimeRange;
pub use model::study_log::{NewStudyLog, StudyLog};
pub use repository::{FileStore, KeyValueStore, MemoryStore};
pub use input::{parse_args, expand_key, ParsedInput};
pub use time::{format_minutes, parse_day, parse_minutes, today};
pub use service::tracker::StudyTracker;
pub use service::dto::{DailySummary, DashboardStats, DayTotal, GoalProgress, LessonHistory, TopicHistory, Totals};
