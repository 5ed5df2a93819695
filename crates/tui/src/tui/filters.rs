use crate::model::{filter_todos, FilterMode, Todo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FilterTab {
    pub(crate) mode: FilterMode,
    pub(crate) count: usize,
}

impl FilterTab {
    pub(crate) fn title(&self) -> String {
        format!("{} {} ({})", Self::icon(self.mode), self.mode.label(), self.count)
    }

    fn icon(mode: FilterMode) -> &'static str {
        match mode {
            FilterMode::All => "📋",
            FilterMode::Active => "⚡",
            FilterMode::Completed => "✅",
        }
    }
}

pub(crate) fn filter_tabs(todos: &[Todo]) -> Vec<FilterTab> {
    FilterMode::ALL
        .into_iter()
        .map(|mode| FilterTab {
            mode,
            count: filter_todos(todos, mode).len(),
        })
        .collect()
}

/// Digit shortcuts select a filter directly.
pub(crate) fn mode_for_digit(ch: char) -> Option<FilterMode> {
    match ch {
        '1' => Some(FilterMode::All),
        '2' => Some(FilterMode::Active),
        '3' => Some(FilterMode::Completed),
        _ => None,
    }
}

pub(crate) fn empty_heading(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "Nothing to do yet ✨",
        FilterMode::Active => "All caught up ⚡",
        FilterMode::Completed => "Nothing completed yet ✅",
    }
}
