pub mod goals;
pub mod lesson;
pub mod range;
pub mod study_log;
