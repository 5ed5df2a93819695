use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A todo item as stored by the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    pub user_id: u64,
}

/// Body of a create request. The server assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub completed: bool,
    pub user_id: u64,
}

impl NewTodo {
    pub fn new<T: Into<String>>(title: T, user_id: u64) -> Self {
        Self {
            title: title.into(),
            completed: false,
            user_id,
        }
    }
}

/// Locally rendered stand-in for a todo whose create call has not settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub completed: bool,
}

impl From<&NewTodo> for Draft {
    fn from(todo: &NewTodo) -> Self {
        Self {
            title: todo.title.clone(),
            completed: todo.completed,
        }
    }
}

/// One rendered row: either confirmed by the store or still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoRow<'a> {
    Committed(&'a Todo),
    Pending(&'a Draft),
}

impl<'a> TodoRow<'a> {
    pub fn title(&self) -> &'a str {
        match self {
            TodoRow::Committed(todo) => todo.title.as_str(),
            TodoRow::Pending(draft) => draft.title.as_str(),
        }
    }

    pub fn completed(&self) -> bool {
        match self {
            TodoRow::Committed(todo) => todo.completed,
            TodoRow::Pending(draft) => draft.completed,
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            TodoRow::Committed(todo) => Some(todo.id),
            TodoRow::Pending(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !todo.completed,
            FilterMode::Completed => todo.completed,
        }
    }

    pub fn index(self) -> usize {
        match self {
            FilterMode::All => 0,
            FilterMode::Active => 1,
            FilterMode::Completed => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = self.index();
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ValueEnum for FilterMode {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [FilterMode; 3] =
            [FilterMode::All, FilterMode::Active, FilterMode::Completed];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Project `items` through `mode`, preserving input order.
pub fn filter_todos(items: &[Todo], mode: FilterMode) -> Vec<&Todo> {
    items.iter().filter(|todo| mode.matches(todo)).collect()
}

pub fn active_count(items: &[Todo]) -> usize {
    items.iter().filter(|todo| !todo.completed).count()
}

pub fn has_completed(items: &[Todo]) -> bool {
    items.iter().any(|todo| todo.completed)
}

/// Footer counter text, e.g. "1 item left" or "3 items left".
pub fn items_left(count: usize) -> String {
    format!("{} item{} left", count, if count == 1 { "" } else { "s" })
}

/// Per-id outcome of a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub id: u64,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn todo(id: u64, completed: bool) -> Todo {
        Todo {
            id,
            title: format!("todo {id}"),
            completed,
            user_id: 7,
        }
    }

    fn sample() -> Vec<Todo> {
        vec![
            todo(1, false),
            todo(2, true),
            todo(3, false),
            todo(4, true),
        ]
    }

    fn ids(items: &[&Todo]) -> Vec<u64> {
        items.iter().map(|todo| todo.id).collect()
    }

    #[rstest]
    #[case(FilterMode::All, vec![1, 2, 3, 4])]
    #[case(FilterMode::Active, vec![1, 3])]
    #[case(FilterMode::Completed, vec![2, 4])]
    fn filter_keeps_matching_items_in_order(#[case] mode: FilterMode, #[case] expected: Vec<u64>) {
        let items = sample();
        assert_eq!(ids(&filter_todos(&items, mode)), expected);
    }

    #[test]
    fn filter_of_empty_list_is_empty() {
        for mode in FilterMode::ALL {
            assert!(filter_todos(&[], mode).is_empty());
        }
    }

    #[test]
    fn active_and_completed_partition_the_input() {
        let items = sample();
        let active = filter_todos(&items, FilterMode::Active);
        let completed = filter_todos(&items, FilterMode::Completed);

        assert_eq!(active.len() + completed.len(), items.len());
        assert!(active.iter().all(|a| !completed.iter().any(|c| c.id == a.id)));
    }

    #[test]
    fn counters_reflect_completion() {
        let items = sample();
        assert_eq!(active_count(&items), 2);
        assert!(has_completed(&items));
        assert!(!has_completed(&[todo(9, false)]));
    }

    #[test]
    fn todo_uses_camel_case_wire_names() {
        let parsed: Todo =
            serde_json::from_str(r#"{"id":5,"title":"buy milk","completed":false,"userId":2125}"#)
                .expect("parse todo");
        assert_eq!(parsed.user_id, 2125);

        let body = serde_json::to_value(NewTodo::new("buy milk", 2125)).expect("encode");
        assert_eq!(
            body,
            serde_json::json!({"title": "buy milk", "completed": false, "userId": 2125})
        );
    }

    #[test]
    fn filter_mode_cycles() {
        assert_eq!(FilterMode::All.next(), FilterMode::Active);
        assert_eq!(FilterMode::Completed.next(), FilterMode::All);
        assert_eq!(FilterMode::All.prev(), FilterMode::Completed);
    }

    #[test]
    fn filter_mode_cli_values_match_wire_names() {
        for mode in FilterMode::ALL {
            let parsed = FilterMode::from_str(mode.as_str(), false).expect("known value");
            assert_eq!(parsed, mode);
        }
        assert!(FilterMode::from_str("someday", false).is_err());
    }

    #[rstest]
    #[case(0, "0 items left")]
    #[case(1, "1 item left")]
    #[case(3, "3 items left")]
    fn items_left_pluralizes(#[case] count: usize, #[case] expected: &str) {
        assert_eq!(items_left(count), expected);
    }
}
