use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::FilterMode;
use crate::remote::TodoStore;
use crate::tui::filters::mode_for_digit;

use super::{App, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NormalAction {
    Quit,
    EnterAdd,
    ShowHelp,
    Refresh,
    Delete,
    ClearCompleted,
    DismissError,
    SetFilter(FilterMode),
    NextFilter,
    PrevFilter,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
}

impl NormalAction {
    pub(crate) fn from_event(key: &KeyEvent) -> Option<Self> {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Char('a') | KeyCode::Char('n') => Some(Self::EnterAdd),
            KeyCode::Char('h') | KeyCode::Char('?') => Some(Self::ShowHelp),
            KeyCode::Char('r') => Some(Self::Refresh),
            KeyCode::Char('x') | KeyCode::Delete => Some(Self::Delete),
            KeyCode::Char('c') => Some(Self::ClearCompleted),
            KeyCode::Esc => Some(Self::DismissError),
            KeyCode::Char(ch) if mode_for_digit(ch).is_some() => {
                mode_for_digit(ch).map(Self::SetFilter)
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => Some(Self::NextFilter),
            KeyCode::Left | KeyCode::BackTab => Some(Self::PrevFilter),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Home | KeyCode::Char('g') => Some(Self::SelectFirst),
            KeyCode::End | KeyCode::Char('G') => Some(Self::SelectLast),
            _ => None,
        }
    }
}

impl<S: TodoStore> App<S> {
    pub(crate) fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Add => self.handle_add_mode(key),
            InputMode::Help => self.handle_help_mode(key),
        }
        Ok(())
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if let Some(action) = NormalAction::from_event(&key) {
            self.execute_normal_action(action);
        }
    }

    fn execute_normal_action(&mut self, action: NormalAction) {
        match action {
            NormalAction::Quit => self.should_quit = true,
            NormalAction::EnterAdd => self.begin_add(),
            NormalAction::ShowHelp => self.show_help_overlay(),
            NormalAction::Refresh => self.refresh(),
            NormalAction::Delete => self.delete_selected(),
            NormalAction::ClearCompleted => self.clear_completed(),
            NormalAction::DismissError => {
                if !self.dismiss_error() {
                    self.status = None;
                }
            }
            NormalAction::SetFilter(mode) => self.set_filter(mode),
            NormalAction::NextFilter => {
                let next = self.view.filter().next();
                self.set_filter(next);
            }
            NormalAction::PrevFilter => {
                let prev = self.view.filter().prev();
                self.set_filter(prev);
            }
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::SelectFirst => self.select_first(),
            NormalAction::SelectLast => self.select_last(),
        }
    }

    fn handle_add_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_new_todo(),
            KeyCode::Esc => {
                if self.dismiss_error() {
                    return;
                }
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            // The field is locked while a create is in flight.
            _ if self.submitting => {}
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete_char(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.insert_char(c)
            }
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => {}
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('h') | KeyCode::Char('?')
        ) {
            self.input_mode = InputMode::Normal;
            self.status = None;
        }
    }
}
