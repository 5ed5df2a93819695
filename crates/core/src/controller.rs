//! Authoritative in-memory todo state and the operations that keep it in sync with the store.
//!
//! State lives behind a mutex that is never held across an `.await`, so concurrent operations
//! only interleave at network boundaries. Every operation settles its own bookkeeping before
//! returning, whether the store call succeeded or not.

use std::collections::BTreeSet;
use std::sync::Arc;

use clap::ValueEnum;
use futures::future::join_all;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::model::{
    active_count, filter_todos, has_completed, DeleteResult, Draft, FilterMode, NewTodo, Todo,
    TodoRow,
};
use crate::remote::{StoreError, TodoStore};

/// How concurrent operations settle the shared loading and deleting bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SettlementPolicy {
    /// A single loading flag cleared by whichever operation settles first, and the whole
    /// deleting set reset when any delete fails.
    Compatible,
    /// Loading counts in-flight operations and a failed delete only releases its own id.
    #[default]
    Scoped,
}

/// Failure surfaced to the user. The message is fixed per operation.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unable to load todos")]
    Load(#[source] StoreError),
    #[error("Unable to add a todo")]
    Add(#[source] StoreError),
    #[error("Unable to delete a todo")]
    Delete(#[source] StoreError),
}

impl ActionError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            ActionError::Load(err) | ActionError::Add(err) | ActionError::Delete(err) => err,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadingTracker {
    Flag(bool),
    Counter(usize),
}

impl LoadingTracker {
    fn for_policy(policy: SettlementPolicy) -> Self {
        match policy {
            SettlementPolicy::Compatible => LoadingTracker::Flag(false),
            SettlementPolicy::Scoped => LoadingTracker::Counter(0),
        }
    }

    fn begin(&mut self) {
        match self {
            LoadingTracker::Flag(active) => *active = true,
            LoadingTracker::Counter(count) => *count += 1,
        }
    }

    fn settle(&mut self) {
        match self {
            LoadingTracker::Flag(active) => *active = false,
            LoadingTracker::Counter(count) => *count = count.saturating_sub(1),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            LoadingTracker::Flag(active) => *active,
            LoadingTracker::Counter(count) => *count > 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewState {
    todos: Vec<Todo>,
    filter: FilterMode,
    pending: Option<Draft>,
    deleting: BTreeSet<u64>,
    loading: LoadingTracker,
    error: Option<String>,
    policy: SettlementPolicy,
    loaded: bool,
}

impl ViewState {
    pub fn new(policy: SettlementPolicy) -> Self {
        Self {
            todos: Vec::new(),
            filter: FilterMode::All,
            pending: None,
            deleting: BTreeSet::new(),
            loading: LoadingTracker::for_policy(policy),
            error: None,
            policy,
            loaded: false,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn pending(&self) -> Option<&Draft> {
        self.pending.as_ref()
    }

    pub fn deleting(&self) -> &BTreeSet<u64> {
        &self.deleting
    }

    pub fn is_deleting(&self, id: u64) -> bool {
        self.deleting.contains(&id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_active()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the first list request has settled.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn active_count(&self) -> usize {
        active_count(&self.todos)
    }

    pub fn has_completed(&self) -> bool {
        has_completed(&self.todos)
    }

    /// Committed items passing the current filter, followed by the pending placeholder.
    pub fn visible_rows(&self) -> Vec<TodoRow<'_>> {
        let mut rows: Vec<TodoRow<'_>> = filter_todos(&self.todos, self.filter)
            .into_iter()
            .map(TodoRow::Committed)
            .collect();
        if let Some(draft) = &self.pending {
            rows.push(TodoRow::Pending(draft));
        }
        rows
    }

    fn begin_create(&mut self, draft: Draft) {
        self.error = None;
        self.pending = Some(draft);
        self.loading.begin();
    }

    fn settle_create(&mut self, result: &Result<Todo, ActionError>) {
        match result {
            Ok(todo) => self.todos.push(todo.clone()),
            Err(err) => self.error = Some(err.to_string()),
        }
        self.pending = None;
        self.loading.settle();
    }

    fn begin_delete(&mut self, id: u64) {
        self.error = None;
        self.loading.begin();
        self.deleting.insert(id);
    }

    fn settle_delete(&mut self, id: u64, result: &Result<(), ActionError>) {
        match result {
            Ok(()) => {
                self.todos.retain(|todo| todo.id != id);
                self.deleting.remove(&id);
            }
            Err(err) => {
                self.error = Some(err.to_string());
                match self.policy {
                    SettlementPolicy::Compatible => self.deleting.clear(),
                    SettlementPolicy::Scoped => {
                        self.deleting.remove(&id);
                    }
                }
            }
        }
        self.loading.settle();
    }

    fn settle_load(&mut self, result: &Result<Vec<Todo>, ActionError>) {
        match result {
            Ok(todos) => self.todos = todos.clone(),
            Err(err) => self.error = Some(err.to_string()),
        }
        self.loaded = true;
    }
}

pub struct TodoController<S: TodoStore> {
    store: Arc<S>,
    state: Arc<Mutex<ViewState>>,
    user_id: u64,
}

impl<S: TodoStore> Clone for TodoController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            user_id: self.user_id,
        }
    }
}

impl<S: TodoStore> TodoController<S> {
    pub fn new(store: S, user_id: u64, policy: SettlementPolicy) -> Self {
        Self {
            store: Arc::new(store),
            state: Arc::new(Mutex::new(ViewState::new(policy))),
            user_id,
        }
    }

    pub fn from_config(store: S, config: &AppConfig) -> Self {
        Self::new(store, config.user_id(), config.policy())
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn set_filter(&self, mode: FilterMode) {
        self.state.lock().filter = mode;
    }

    pub fn dismiss_error(&self) {
        self.state.lock().error = None;
    }

    /// Replace the committed list with the owner's todos.
    pub async fn load(&self) -> Result<usize, ActionError> {
        let result = self
            .store
            .list(self.user_id)
            .await
            .map_err(ActionError::Load);
        self.state.lock().settle_load(&result);
        match result {
            Ok(todos) => {
                info!(user_id = self.user_id, count = todos.len(), "loaded todos");
                Ok(todos.len())
            }
            Err(err) => {
                warn!(error = %err.store_error(), "{}", err);
                Err(err)
            }
        }
    }

    /// Create a todo, showing `title` as a placeholder until the store answers.
    pub async fn create<T: Into<String>>(&self, title: T) -> Result<Todo, ActionError> {
        let new_todo = NewTodo::new(title, self.user_id);
        self.state.lock().begin_create(Draft::from(&new_todo));

        let result = self
            .store
            .create(&new_todo)
            .await
            .map_err(ActionError::Add);
        self.state.lock().settle_create(&result);
        match &result {
            Ok(todo) => debug!(todo_id = todo.id, "todo committed"),
            Err(err) => warn!(error = %err.store_error(), "{}", err),
        }
        result
    }

    pub async fn delete(&self, id: u64) -> Result<(), ActionError> {
        self.state.lock().begin_delete(id);

        let result = self.store.delete(id).await.map_err(ActionError::Delete);
        self.state.lock().settle_delete(id, &result);
        match &result {
            Ok(()) => debug!(todo_id = id, "todo removed"),
            Err(err) => warn!(todo_id = id, error = %err.store_error(), "{}", err),
        }
        result
    }

    /// Delete every completed todo, with all requests in flight at once.
    pub async fn clear_completed(&self) -> Vec<DeleteResult> {
        let ids: Vec<u64> = self.with_state(|state| {
            state
                .todos()
                .iter()
                .filter(|todo| todo.completed)
                .map(|todo| todo.id)
                .collect()
        });
        debug!(count = ids.len(), "clearing completed todos");

        let outcomes = join_all(ids.iter().map(|id| self.delete(*id))).await;
        ids.into_iter()
            .zip(outcomes)
            .map(|(id, outcome)| DeleteResult {
                id,
                deleted: outcome.is_ok(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use futures::poll;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use super::*;

    type Reply<T> = oneshot::Receiver<Result<T, StoreError>>;

    #[derive(Default)]
    struct ScriptedStore {
        listed: Mutex<Option<Result<Vec<Todo>, StoreError>>>,
        creates: Mutex<VecDeque<Reply<Todo>>>,
        deletes: Mutex<HashMap<u64, Reply<()>>>,
        delete_calls: Mutex<Vec<u64>>,
    }

    impl ScriptedStore {
        fn listing(todos: Vec<Todo>) -> Self {
            let store = Self::default();
            *store.listed.lock() = Some(Ok(todos));
            store
        }

        fn gate_create(&self) -> oneshot::Sender<Result<Todo, StoreError>> {
            let (tx, rx) = oneshot::channel();
            self.creates.lock().push_back(rx);
            tx
        }

        fn gate_delete(&self, id: u64) -> oneshot::Sender<Result<(), StoreError>> {
            let (tx, rx) = oneshot::channel();
            self.deletes.lock().insert(id, rx);
            tx
        }
    }

    #[async_trait::async_trait]
    impl TodoStore for ScriptedStore {
        async fn list(&self, _user_id: u64) -> Result<Vec<Todo>, StoreError> {
            self.listed
                .lock()
                .take()
                .unwrap_or(Err(StoreError::Server { status: 500 }))
        }

        async fn create(&self, _todo: &NewTodo) -> Result<Todo, StoreError> {
            let reply = self.creates.lock().pop_front();
            match reply {
                Some(rx) => rx.await.unwrap_or(Err(StoreError::Server { status: 503 })),
                None => Err(StoreError::Server { status: 500 }),
            }
        }

        async fn delete(&self, id: u64) -> Result<(), StoreError> {
            self.delete_calls.lock().push(id);
            let reply = self.deletes.lock().remove(&id);
            match reply {
                Some(rx) => rx.await.unwrap_or(Err(StoreError::Server { status: 503 })),
                None => Ok(()),
            }
        }
    }

    fn todo(id: u64, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            completed,
            user_id: 2125,
        }
    }

    fn ids(state: &ViewState) -> Vec<u64> {
        state.todos().iter().map(|todo| todo.id).collect()
    }

    fn deleting(state: &ViewState) -> Vec<u64> {
        state.deleting().iter().copied().collect()
    }

    async fn loaded(
        todos: Vec<Todo>,
        policy: SettlementPolicy,
    ) -> TodoController<ScriptedStore> {
        let controller = TodoController::new(ScriptedStore::listing(todos), 2125, policy);
        controller.load().await.expect("initial load");
        controller
    }

    #[tokio::test]
    async fn initial_load_replaces_committed_list() {
        let listed = vec![todo(1, "a", false)];
        let controller = loaded(listed.clone(), SettlementPolicy::Scoped).await;

        let state = controller.snapshot();
        assert_eq!(state.todos(), listed.as_slice());
        assert!(state.is_loaded());
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn empty_listing_is_not_a_failure() {
        let controller = loaded(Vec::new(), SettlementPolicy::Scoped).await;
        let state = controller.snapshot();
        assert!(state.todos().is_empty());
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn failed_load_keeps_list_and_reports() {
        let controller =
            TodoController::new(ScriptedStore::default(), 2125, SettlementPolicy::Scoped);

        let err = controller.load().await.expect_err("load should fail");
        assert_eq!(err.to_string(), "Unable to load todos");

        let state = controller.snapshot();
        assert!(state.todos().is_empty());
        assert_eq!(state.error(), Some("Unable to load todos"));
    }

    #[tokio::test]
    async fn create_shows_placeholder_until_store_confirms() {
        let controller = loaded(vec![todo(1, "a", false)], SettlementPolicy::Scoped).await;
        let reply = controller.store.gate_create();

        let create = controller.create("buy milk");
        tokio::pin!(create);
        assert!(poll!(&mut create).is_pending());

        let state = controller.snapshot();
        assert!(state.is_loading());
        assert_eq!(
            state.pending(),
            Some(&Draft {
                title: "buy milk".into(),
                completed: false
            })
        );
        assert_eq!(ids(&state), vec![1]);
        assert!(matches!(
            state.visible_rows().last(),
            Some(TodoRow::Pending(_))
        ));

        reply
            .send(Ok(todo(5, "buy milk", false)))
            .expect("send reply");
        let created = create.await.expect("create succeeds");
        assert_eq!(created.id, 5);

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![1, 5]);
        assert_eq!(state.pending(), None);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn failed_create_keeps_list_and_reports() {
        let controller = loaded(vec![todo(1, "a", false)], SettlementPolicy::Scoped).await;
        let reply = controller.store.gate_create();
        reply
            .send(Err(StoreError::Validation {
                status: 422,
                message: "bad".into(),
            }))
            .expect("send reply");

        let err = controller
            .create("buy milk")
            .await
            .expect_err("create fails");
        assert_eq!(err.to_string(), "Unable to add a todo");

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![1]);
        assert_eq!(state.error(), Some("Unable to add a todo"));
        assert_eq!(state.pending(), None);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn new_attempt_clears_previous_error() {
        let controller = loaded(vec![todo(3, "c", false)], SettlementPolicy::Scoped).await;
        controller.create("doomed").await.expect_err("no reply scripted");
        assert!(controller.snapshot().error().is_some());

        let reply = controller.store.gate_delete(3);
        let delete = controller.delete(3);
        tokio::pin!(delete);
        assert!(poll!(&mut delete).is_pending());
        assert_eq!(controller.snapshot().error(), None);

        reply.send(Ok(())).expect("send reply");
        delete.await.expect("delete succeeds");
    }

    #[tokio::test]
    async fn delete_removes_item_and_releases_id() {
        let controller = loaded(
            vec![todo(2, "b", false), todo(3, "c", false)],
            SettlementPolicy::Scoped,
        )
        .await;
        let reply = controller.store.gate_delete(3);

        let delete = controller.delete(3);
        tokio::pin!(delete);
        assert!(poll!(&mut delete).is_pending());
        assert!(controller.snapshot().is_deleting(3));

        reply.send(Ok(())).expect("send reply");
        delete.await.expect("delete succeeds");

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![2]);
        assert!(!state.is_deleting(3));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn failed_delete_reports_and_keeps_item() {
        let controller = loaded(vec![todo(3, "c", false)], SettlementPolicy::Scoped).await;
        let reply = controller.store.gate_delete(3);
        reply
            .send(Err(StoreError::NotFound { id: 3 }))
            .expect("send reply");

        let err = controller.delete(3).await.expect_err("delete fails");
        assert_eq!(err.to_string(), "Unable to delete a todo");

        let state = controller.snapshot();
        assert_eq!(ids(&state), vec![3]);
        assert_eq!(state.error(), Some("Unable to delete a todo"));
        assert!(state.deleting().is_empty());
    }

    #[tokio::test]
    async fn compatible_policy_resets_every_pending_delete_on_one_failure() {
        let controller = loaded(
            vec![todo(1, "a", true), todo(2, "b", true), todo(3, "c", false)],
            SettlementPolicy::Compatible,
        )
        .await;
        let first = controller.store.gate_delete(1);
        let second = controller.store.gate_delete(2);

        let clear = controller.clear_completed();
        tokio::pin!(clear);
        assert!(poll!(&mut clear).is_pending());
        assert_eq!(deleting(&controller.snapshot()), vec![1, 2]);

        first
            .send(Err(StoreError::Server { status: 500 }))
            .expect("send reply");
        assert!(poll!(&mut clear).is_pending());

        // 2 is still in flight, yet the whole set and the flag were reset.
        let state = controller.snapshot();
        assert!(state.deleting().is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("Unable to delete a todo"));

        second.send(Ok(())).expect("send reply");
        let results = clear.await;
        assert_eq!(
            results,
            vec![
                DeleteResult {
                    id: 1,
                    deleted: false
                },
                DeleteResult {
                    id: 2,
                    deleted: true
                },
            ]
        );
        assert_eq!(ids(&controller.snapshot()), vec![1, 3]);
    }

    #[tokio::test]
    async fn scoped_policy_only_releases_the_failed_delete() {
        let controller = loaded(
            vec![todo(1, "a", true), todo(2, "b", true), todo(3, "c", false)],
            SettlementPolicy::Scoped,
        )
        .await;
        let first = controller.store.gate_delete(1);
        let second = controller.store.gate_delete(2);

        let clear = controller.clear_completed();
        tokio::pin!(clear);
        assert!(poll!(&mut clear).is_pending());

        first
            .send(Err(StoreError::Server { status: 500 }))
            .expect("send reply");
        assert!(poll!(&mut clear).is_pending());

        let state = controller.snapshot();
        assert_eq!(deleting(&state), vec![2]);
        assert!(state.is_loading());

        second.send(Ok(())).expect("send reply");
        clear.await;

        let state = controller.snapshot();
        assert!(state.deleting().is_empty());
        assert!(!state.is_loading());
        assert_eq!(ids(&state), vec![1, 3]);
    }

    #[tokio::test]
    async fn clear_completed_removes_every_completed_item() {
        let controller = loaded(
            vec![todo(1, "a", true), todo(2, "b", true), todo(3, "c", false)],
            SettlementPolicy::Scoped,
        )
        .await;

        let results = controller.clear_completed().await;

        assert!(results.iter().all(|result| result.deleted));
        assert_eq!(controller.snapshot().todos(), &[todo(3, "c", false)]);
        assert_eq!(*controller.store.delete_calls.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn filter_changes_projection_not_list() {
        let controller = loaded(
            vec![todo(1, "a", true), todo(2, "b", false)],
            SettlementPolicy::Scoped,
        )
        .await;
        controller.set_filter(FilterMode::Active);

        let state = controller.snapshot();
        let visible: Vec<Option<u64>> = state.visible_rows().iter().map(|row| row.id()).collect();
        assert_eq!(visible, vec![Some(2)]);
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn dismiss_error_clears_message() {
        let controller =
            TodoController::new(ScriptedStore::default(), 2125, SettlementPolicy::Scoped);
        controller.state.lock().error = Some("Unable to load todos".into());
        controller.dismiss_error();
        assert_eq!(controller.snapshot().error(), None);
    }
}
