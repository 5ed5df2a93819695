use std::future::Future;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use anyhow::Result;
use ratatui::style::{Color, Style};
use ratatui::widgets::TableState;
use tokio::runtime::Handle;
use tracing::debug;

use super::buffer::TextBuffer;
use super::constants::*;
use crate::commands::EMPTY_TITLE;
use crate::config::AppConfig;
use crate::controller::{ActionError, TodoController, ViewState};
use crate::model::{DeleteResult, FilterMode, Todo, TodoRow};
use crate::remote::TodoStore;

mod input;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Add,
    Help,
}

/// Completion of a spawned controller call, delivered back to the UI thread.
#[derive(Debug)]
pub(crate) enum Notice {
    Loaded(Result<usize, ActionError>),
    Created(Result<Todo, ActionError>),
    Deleted(u64, Result<(), ActionError>),
    Cleared(Vec<DeleteResult>),
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

pub(crate) struct App<S: TodoStore> {
    config: AppConfig,
    controller: TodoController<S>,
    runtime: Handle,
    notices: Receiver<Notice>,
    notice_tx: Sender<Notice>,
    view: ViewState,
    selected: usize,
    table_state: TableState,
    input_mode: InputMode,
    input: TextBuffer,
    submitting: bool,
    status: Option<StatusMessage>,
    spinner_tick: usize,
    should_quit: bool,
}

impl<S: TodoStore> App<S> {
    pub(crate) fn new(config: AppConfig, controller: TodoController<S>, runtime: Handle) -> Self {
        let (notice_tx, notices) = mpsc::channel();
        let view = controller.snapshot();
        let app = Self {
            config,
            controller,
            runtime,
            notices,
            notice_tx,
            view,
            selected: 0,
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            input: TextBuffer::new(),
            submitting: false,
            status: None,
            spinner_tick: 0,
            should_quit: false,
        };
        app.spawn_load();
        app
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn on_tick(&mut self) {
        self.spinner_tick = self.spinner_tick.wrapping_add(1);
        self.drain_notices();
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    /// Pull the latest controller state into the frame-local snapshot.
    fn sync_view(&mut self) {
        self.view = self.controller.snapshot();
        let len = self.view.visible_rows().len();
        if len == 0 {
            self.selected = 0;
            self.table_state.select(None);
        } else {
            if self.selected >= len {
                self.selected = len - 1;
            }
            self.table_state.select(Some(self.selected));
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Notice> + Send + 'static,
    {
        let tx = self.notice_tx.clone();
        self.runtime.spawn(async move {
            // The receiver only disappears when the app is shutting down.
            let _ = tx.send(task.await);
        });
    }

    fn spawn_load(&self) {
        let controller = self.controller.clone();
        self.spawn(async move { Notice::Loaded(controller.load().await) });
    }

    pub(crate) fn drain_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            self.apply_notice(notice);
        }
        self.sync_view();
    }

    fn apply_notice(&mut self, notice: Notice) {
        match notice {
            Notice::Loaded(Ok(count)) => debug!(count, "view loaded"),
            Notice::Loaded(Err(_)) => {}
            Notice::Created(Ok(todo)) => {
                self.submitting = false;
                self.input.clear();
                self.set_status_info(format!("Added “{}”", todo.title));
            }
            Notice::Created(Err(_)) => {
                // Keep the typed title so the user can retry.
                self.submitting = false;
            }
            Notice::Deleted(id, Ok(())) => debug!(todo_id = id, "delete settled"),
            Notice::Deleted(_, Err(_)) => {}
            Notice::Cleared(results) => {
                let deleted = results.iter().filter(|r| r.deleted).count();
                if deleted > 0 {
                    self.set_status_info(format!(
                        "Cleared {} completed todo{}",
                        deleted,
                        if deleted == 1 { "" } else { "s" }
                    ));
                }
            }
        }
    }

    fn rows(&self) -> Vec<TodoRow<'_>> {
        self.view.visible_rows()
    }

    fn select_next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
        self.table_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        if self.rows().is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        }
        self.table_state.select(Some(self.selected));
    }

    fn select_first(&mut self) {
        if !self.rows().is_empty() {
            self.selected = 0;
            self.table_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        let len = self.rows().len();
        if len > 0 {
            self.selected = len - 1;
            self.table_state.select(Some(self.selected));
        }
    }

    fn set_filter(&mut self, mode: FilterMode) {
        self.controller.set_filter(mode);
        self.selected = 0;
        self.sync_view();
    }

    fn begin_add(&mut self) {
        self.input_mode = InputMode::Add;
        self.set_status_info(STATUS_ENTER_ADD);
    }

    fn submit_new_todo(&mut self) {
        if self.submitting {
            self.set_status_info(STATUS_SAVING);
            return;
        }
        if self.input.is_blank() {
            self.set_status_error(EMPTY_TITLE);
            return;
        }
        let title = self.input.as_str().trim().to_string();

        self.submitting = true;
        self.status = None;
        let controller = self.controller.clone();
        self.spawn(async move { Notice::Created(controller.create(title).await) });
    }

    fn delete_selected(&mut self) {
        let target = self.rows().get(self.selected).and_then(|row| row.id());
        let Some(id) = target else {
            self.set_status_info(STATUS_NOTHING_SELECTED);
            return;
        };
        if self.view.is_deleting(id) {
            self.set_status_info(STATUS_ALREADY_DELETING);
            return;
        }

        let controller = self.controller.clone();
        self.spawn(async move {
            let result = controller.delete(id).await;
            Notice::Deleted(id, result)
        });
    }

    fn clear_completed(&mut self) {
        if !self.view.has_completed() {
            self.set_status_info(STATUS_NO_COMPLETED);
            return;
        }
        let controller = self.controller.clone();
        self.spawn(async move { Notice::Cleared(controller.clear_completed().await) });
    }

    fn refresh(&mut self) {
        self.controller.dismiss_error();
        self.set_status_info(STATUS_REFRESHING);
        self.spawn_load();
    }

    fn dismiss_error(&mut self) -> bool {
        if self.view.error().is_some() {
            self.controller.dismiss_error();
            self.sync_view();
            true
        } else {
            false
        }
    }

    fn show_help_overlay(&mut self) {
        self.input_mode = InputMode::Help;
        self.set_status_info(STATUS_HELP);
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("ℹ️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("⚠️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}
