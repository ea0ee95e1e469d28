use chrono::NaiveDate;
use crossterm::event::KeyCode;
use kpss_core::{today, DashboardStats, DayTotal, KeyValueStore, KpssConfig, StudyLog, StudyTracker, TimeRange};
use ratatui::widgets::TableState;

use crate::commands::{build_log, short_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    ConfirmDelete(String),
}

pub struct App<S: KeyValueStore> {
    pub tracker: StudyTracker<S>,
    pub config: KpssConfig,
    pub range: TimeRange,
    pub view: View,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub message: Option<String>,
    pub today: NaiveDate,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(tracker: StudyTracker<S>, config: &KpssConfig) -> Self {
        let mut state = TableState::default();
        if !tracker.logs().is_empty() {
            state.select(Some(0));
        }
        App {
            tracker,
            config: config.clone(),
            range: config.default_range,
            view: View::Dashboard,
            state,
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            message: None,
            today: today(),
        }
    }

    pub fn logs(&self) -> &[StudyLog] {
        self.tracker.logs()
    }

    pub fn selected_log(&self) -> Option<&StudyLog> {
        self.state.selected().and_then(|i| self.tracker.logs().get(i))
    }

    pub fn dashboard(&self) -> DashboardStats {
        self.tracker.dashboard(self.range, self.today)
    }

    pub fn series(&self) -> Vec<DayTotal> {
        self.tracker.daily_series(self.range, self.today)
    }

    pub fn lesson_name(&self, lesson_id: &str) -> String {
        self.tracker
            .lesson(lesson_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| lesson_id.to_string())
    }

    /// Applies one key press. Returns `true` when the app should quit.
    pub fn on_key(&mut self, code: KeyCode) -> bool {
        match self.input_mode.clone() {
            InputMode::Normal => {
                self.message = None;
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => return true,
                    KeyCode::Tab => self.toggle_view(),
                    KeyCode::Char('r') => self.range = self.range.next(),
                    KeyCode::Char('d') => self.range = TimeRange::Daily,
                    KeyCode::Char('w') => self.range = TimeRange::Weekly,
                    KeyCode::Char('m') => self.range = TimeRange::Monthly,
                    KeyCode::Down | KeyCode::Char('j') => self.next(),
                    KeyCode::Up | KeyCode::Char('k') => self.previous(),
                    KeyCode::Char('x') | KeyCode::Delete => self.ask_delete(),
                    KeyCode::Char('a') => self.enter_add_mode(),
                    _ => {}
                }
            }
            InputMode::Adding => match code {
                KeyCode::Enter => self.submit_add(),
                KeyCode::Esc => self.exit_input_mode(),
                KeyCode::Char(c) => self.input_char(c),
                KeyCode::Backspace => self.delete_char(),
                KeyCode::Left => self.move_cursor_left(),
                KeyCode::Right => self.move_cursor_right(),
                _ => {}
            },
            InputMode::ConfirmDelete(id) => {
                if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.delete_log(&id);
                } else {
                    self.message = Some("Delete cancelled".to_string());
                }
                self.input_mode = InputMode::Normal;
            }
        }
        false
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Dashboard => View::History,
            View::History => View::Dashboard,
        };
    }

    pub fn next(&mut self) {
        let len = self.tracker.logs().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.tracker.logs().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn ask_delete(&mut self) {
        if self.view != View::History {
            return;
        }
        if let Some(log) = self.selected_log() {
            self.input_mode = InputMode::ConfirmDelete(log.id.clone());
        }
    }

    fn delete_log(&mut self, id: &str) {
        match self.tracker.delete_log(id) {
            Ok(log) => {
                self.message = Some(format!("Deleted session {}", short_id(&log.id)));
                self.clamp_selection();
            }
            Err(e) => self.message = Some(format!("Error: {}", e)),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.tracker.logs().len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            Some(_) => {}
        }
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(char::len_utf8).sum()
    }

    /// Input format: `<lesson> [topic words] [q:N] [min:D] [date:D] [note:T]`.
    fn submit_add(&mut self) {
        let mut words = self.input.split_whitespace().map(str::to_string);
        let Some(lesson) = words.next() else {
            self.exit_input_mode();
            return;
        };
        let args: Vec<String> = words.collect();

        let result = build_log(&self.tracker, &self.config, &lesson, &args)
            .and_then(|new_log| self.tracker.add_log(new_log).map_err(anyhow::Error::from));
        match result {
            Ok(log) => {
                self.message = Some(format!(
                    "Added {} / {} ({} questions)",
                    self.lesson_name(&log.lesson_id),
                    log.topic,
                    log.questions_solved
                ));
                self.state.select(Some(0));
                self.exit_input_mode();
            }
            // Keep the input so it can be corrected
            Err(e) => self.message = Some(format!("Error: {:#}", e)),
        }
    }
}
