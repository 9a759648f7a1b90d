// src/tree/node.rs

//! The task node: identity, tree links, mutable fields, construction and
//! composition (`add`).

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tracing::debug;

use crate::engine::EngineContext;
use crate::errors::{Result, TaskError};
use crate::events::ObserverRegistry;
use crate::exec::{Action, Payload};
use crate::tree::ids::TaskId;
use crate::tree::state::TaskState;

/// Name given to nodes built without an explicit or action-provided name.
pub const ANONYMOUS: &str = "anonymous";

/// Bounds every data type carried by a task tree must satisfy.
pub trait TaskData: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> TaskData for T {}

/// What a node is built from.
#[derive(Debug, Clone)]
pub enum TaskSpec<D> {
    /// Pure grouping node named `"anonymous"`.
    Anonymous,
    /// Grouping node with an explicit name.
    Named(String),
    /// Node backed by an action; named after the action if it has a name.
    Action(Action<D>),
}

impl<D> From<()> for TaskSpec<D> {
    fn from(_: ()) -> Self {
        TaskSpec::Anonymous
    }
}

impl<D> From<&str> for TaskSpec<D> {
    fn from(name: &str) -> Self {
        TaskSpec::Named(name.to_string())
    }
}

impl<D> From<String> for TaskSpec<D> {
    fn from(name: String) -> Self {
        TaskSpec::Named(name)
    }
}

impl<D> From<Action<D>> for TaskSpec<D> {
    fn from(action: Action<D>) -> Self {
        TaskSpec::Action(action)
    }
}

impl<D> TaskSpec<D> {
    /// Resolve the node name and action, rejecting empty names.
    fn resolve(self) -> Result<(String, Option<Action<D>>)>
    where
        D: TaskData,
    {
        match self {
            TaskSpec::Anonymous => Ok((ANONYMOUS.to_string(), None)),
            TaskSpec::Named(name) => {
                ensure_name(&name)?;
                Ok((name, None))
            }
            TaskSpec::Action(action) => {
                let name = match action.name() {
                    Some(name) => {
                        ensure_name(name)?;
                        name.to_string()
                    }
                    None => ANONYMOUS.to_string(),
                };
                Ok((name, Some(action)))
            }
        }
    }
}

fn ensure_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TaskError::InvalidArgument(
            "task name must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

/// Argument accepted by [`Task::add`]: either something to wrap in a fresh
/// child, or an existing (sub)tree.
#[derive(Debug, Clone)]
pub enum Child<D> {
    Spec(TaskSpec<D>),
    Task(Task<D>),
}

impl<D> From<TaskSpec<D>> for Child<D> {
    fn from(spec: TaskSpec<D>) -> Self {
        Child::Spec(spec)
    }
}

impl<D> From<Action<D>> for Child<D> {
    fn from(action: Action<D>) -> Self {
        Child::Spec(TaskSpec::Action(action))
    }
}

impl<D> From<&str> for Child<D> {
    fn from(name: &str) -> Self {
        Child::Spec(name.into())
    }
}

impl<D> From<String> for Child<D> {
    fn from(name: String) -> Self {
        Child::Spec(name.into())
    }
}

impl<D> From<()> for Child<D> {
    fn from(_: ()) -> Self {
        Child::Spec(TaskSpec::Anonymous)
    }
}

impl<D> From<Task<D>> for Child<D> {
    fn from(task: Task<D>) -> Self {
        Child::Task(task)
    }
}

impl<D> From<&Task<D>> for Child<D> {
    fn from(task: &Task<D>) -> Self {
        Child::Task(task.clone())
    }
}

/// Mutable per-node fields, guarded by one lock.
pub(crate) struct NodeFields<D> {
    pub(crate) state: TaskState,
    pub(crate) status: String,
    pub(crate) progress: f64,
    pub(crate) bound: Option<Payload<D>>,
    pub(crate) error: Option<Arc<anyhow::Error>>,
    pub(crate) children: Vec<Task<D>>,
    pub(crate) parallel: Option<Vec<Task<D>>>,
}

impl<D> NodeFields<D> {
    fn new(bound: Option<Payload<D>>) -> Self {
        Self {
            state: TaskState::Declared,
            status: String::new(),
            progress: 0.0,
            bound,
            error: None,
            children: Vec::new(),
            parallel: None,
        }
    }
}

pub(crate) struct TaskInner<D> {
    pub(crate) id: TaskId,
    pub(crate) name: String,
    pub(crate) action: Option<Action<D>>,
    pub(crate) context: EngineContext,
    /// Set at most once; never traversed for ownership.
    pub(crate) parent: OnceLock<Weak<TaskInner<D>>>,
    pub(crate) fields: Mutex<NodeFields<D>>,
    pub(crate) observers: Mutex<ObserverRegistry<D>>,
}

/// A node in the task tree.
///
/// `Task` is a cheap, clonable handle; clones refer to the same node.
/// A node owns its `children` and parallel branches; its link to the parent
/// is weak, so dropping a tree (or a subtree's owner) drops the nodes below.
pub struct Task<D> {
    pub(crate) inner: Arc<TaskInner<D>>,
}

impl<D> Clone for Task<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> fmt::Debug for Task<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self
            .inner
            .fields
            .lock()
            .map(|g| g.state)
            .unwrap_or_else(|p| p.into_inner().state);
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

/// Handles compare by node identity.
impl<D> PartialEq for Task<D> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<D> Eq for Task<D> {}

/// Builder for nodes that need bound data, a parent link, or a non-default
/// [`EngineContext`].
#[derive(Debug)]
pub struct TaskBuilder<D> {
    spec: TaskSpec<D>,
    data: Option<Payload<D>>,
    parent: Option<Task<D>>,
    context: Option<EngineContext>,
}

impl<D: TaskData> TaskBuilder<D> {
    /// Default data for `run()` when called without an argument.
    pub fn data(mut self, data: Payload<D>) -> Self {
        self.data = Some(data);
        self
    }

    /// Pre-set the parent link. The node still has to be attached with
    /// `parent.add(node)`, which accepts it because the link matches.
    pub fn parent(mut self, parent: &Task<D>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Engine settings for this node. Defaults to the parent's context, or
    /// [`EngineContext::default`] for a root.
    pub fn context(mut self, context: EngineContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> Result<Task<D>> {
        let (name, action) = self.spec.resolve()?;
        let context = match (self.context, &self.parent) {
            (Some(ctx), _) => ctx,
            (None, Some(parent)) => parent.inner.context.clone(),
            (None, None) => EngineContext::default(),
        };
        let task = Task::from_parts(name, action, self.data, context);
        if let Some(parent) = self.parent {
            task.link_parent(&parent);
        }
        Ok(task)
    }
}

impl<D: TaskData> Task<D> {
    /// Build a root node from a name, an action, or `()`.
    pub fn new(spec: impl Into<TaskSpec<D>>) -> Result<Self> {
        Self::builder(spec).build()
    }

    pub fn builder(spec: impl Into<TaskSpec<D>>) -> TaskBuilder<D> {
        TaskBuilder {
            spec: spec.into(),
            data: None,
            parent: None,
            context: None,
        }
    }

    pub(crate) fn from_parts(
        name: String,
        action: Option<Action<D>>,
        bound: Option<Payload<D>>,
        context: EngineContext,
    ) -> Self {
        let id = context.next_id();
        debug!(task = %name, id = %id, has_action = action.is_some(), "task declared");
        Self {
            inner: Arc::new(TaskInner {
                id,
                name,
                action,
                context,
                parent: OnceLock::new(),
                fields: Mutex::new(NodeFields::new(bound)),
                observers: Mutex::new(ObserverRegistry::default()),
            }),
        }
    }

    /// Child built from a spec, sharing this node's context and parented here.
    fn make_child(&self, spec: TaskSpec<D>, data: Option<Payload<D>>) -> Result<Task<D>> {
        let (name, action) = spec.resolve()?;
        let child = Task::from_parts(name, action, data, self.inner.context.clone());
        child.link_parent(self);
        Ok(child)
    }

    /// Parallel branch: same name and action as this node, one data item.
    pub(crate) fn make_branch(&self, item: D) -> Task<D> {
        let branch = Task::from_parts(
            self.inner.name.clone(),
            self.inner.action.clone(),
            Some(Payload::Scalar(item)),
            self.inner.context.clone(),
        );
        branch.link_parent(self);
        branch
    }

    /// Only called on freshly built nodes, whose link is still unset.
    fn link_parent(&self, parent: &Task<D>) {
        let _ = self.inner.parent.set(Arc::downgrade(&parent.inner));
    }

    pub(crate) fn fields(&self) -> MutexGuard<'_, NodeFields<D>> {
        self.inner
            .fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a child and return `self` for chaining.
    ///
    /// - An action, a name, or `()` is wrapped in a new child node.
    /// - An existing node is attached as-is. It must be parentless or already
    ///   parented to this node; anything else is `InvalidParent`, as is an
    ///   attempt to attach a node to itself or to one of its descendants.
    pub fn add(&self, child: impl Into<Child<D>>) -> Result<&Self> {
        match child.into() {
            Child::Spec(spec) => {
                let child = self.make_child(spec, None)?;
                self.push_child(child);
            }
            Child::Task(task) => self.attach(task)?,
        }
        Ok(self)
    }

    /// Like [`add`](Self::add) for a spec, with data bound to the new child.
    pub fn add_with(&self, spec: impl Into<TaskSpec<D>>, data: Payload<D>) -> Result<&Self> {
        let child = self.make_child(spec.into(), Some(data))?;
        self.push_child(child);
        Ok(self)
    }

    /// Attach a pre-built node or subtree.
    pub fn add_task(&self, task: &Task<D>) -> Result<&Self> {
        self.attach(task.clone())?;
        Ok(self)
    }

    fn attach(&self, task: Task<D>) -> Result<()> {
        if self.is_self_or_ancestor(&task) {
            return Err(TaskError::InvalidParent(format!(
                "cannot attach task '{}' ({}) beneath itself",
                task.name(),
                task.id()
            )));
        }

        let own = Arc::downgrade(&self.inner);
        match task.inner.parent.get() {
            Some(existing) if Weak::ptr_eq(existing, &own) => {
                if self.fields().children.contains(&task) {
                    debug!(task = %task.name(), parent = %self.name(), "task already attached; ignoring");
                    return Ok(());
                }
            }
            Some(_) => {
                return Err(TaskError::InvalidParent(format!(
                    "task '{}' ({}) already has a different parent",
                    task.name(),
                    task.id()
                )));
            }
            None => {
                if task.inner.parent.set(own).is_err() {
                    return Err(TaskError::InvalidParent(format!(
                        "task '{}' ({}) was attached elsewhere concurrently",
                        task.name(),
                        task.id()
                    )));
                }
            }
        }

        self.push_child(task);
        Ok(())
    }

    fn push_child(&self, child: Task<D>) {
        debug!(task = %child.name(), id = %child.id(), parent = %self.name(), "child added");
        self.fields().children.push(child);
    }

    fn is_self_or_ancestor(&self, candidate: &Task<D>) -> bool {
        let mut cursor = Some(self.clone());
        while let Some(node) = cursor {
            if node == *candidate {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    pub fn id(&self) -> &TaskId {
        &self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn has_action(&self) -> bool {
        self.inner.action.is_some()
    }

    pub fn context(&self) -> &EngineContext {
        &self.inner.context
    }

    pub fn state(&self) -> TaskState {
        self.fields().state
    }

    pub fn status(&self) -> String {
        self.fields().status.clone()
    }

    pub fn progress(&self) -> f64 {
        self.fields().progress
    }

    /// The last action failure recorded on this node, verbatim.
    pub fn error(&self) -> Option<Arc<anyhow::Error>> {
        self.fields().error.clone()
    }

    /// Data the node runs with when `run()` gets no argument.
    pub fn bound_data(&self) -> Option<Payload<D>> {
        self.fields().bound.clone()
    }

    /// `None` for a root, or when the parent has already been dropped.
    pub fn parent(&self) -> Option<Task<D>> {
        self.inner
            .parent
            .get()
            .and_then(Weak::upgrade)
            .map(|inner| Task { inner })
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.get().is_none()
    }

    /// Topmost reachable ancestor (or `self`).
    pub fn root(&self) -> Task<D> {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Number of reachable ancestors.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            depth += 1;
            cursor = node.parent();
        }
        depth
    }

    pub fn children(&self) -> Vec<Task<D>> {
        self.fields().children.clone()
    }

    /// Branches created by the last batch run, if any.
    pub fn parallel_branches(&self) -> Option<Vec<Task<D>>> {
        self.fields().parallel.clone()
    }

    pub(crate) fn child_at(&self, index: usize) -> Option<Task<D>> {
        self.fields().children.get(index).cloned()
    }

    pub fn ptr_eq(&self, other: &Task<D>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
