// src/engine/events.rs

//! Workflow lifecycle events and a synchronous, typed emitter.
//!
//! Every event is a variant of [`WorkflowEvent`] carrying its own payload
//! struct. Listeners either subscribe to one payload type via
//! [`EventEmitter::on`] or to everything via [`EventEmitter::on_any`].
//! Listeners run synchronously inside [`EventEmitter::emit`], in the order
//! they were registered. A panicking listener is logged and skipped; it
//! never reaches the code that emitted the event.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::error;

use crate::engine::tracker::WorkflowSummary;
use crate::errors::panic_message;
use crate::types::TaskId;

/// Discriminant of a [`WorkflowEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    WorkflowStart,
    TaskStart,
    TaskFinish,
    TaskThrow,
    TaskSkip,
    WorkflowFinish,
}

/// Emitted once at the beginning of a run.
#[derive(Debug, Clone)]
pub struct WorkflowStart<C> {
    pub context: Arc<C>,
    pub task_order: Arc<[TaskId]>,
}

/// Emitted when a task body begins executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStart {
    pub id: TaskId,
}

/// Emitted when a task body returns successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFinish<R> {
    pub id: TaskId,
    pub result: R,
}

/// Emitted when a task body fails or panics.
#[derive(Debug, Clone)]
pub struct TaskThrow {
    pub id: TaskId,
    pub error: Arc<anyhow::Error>,
}

/// Emitted when a task is not run because a dependency errored or was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSkip {
    pub id: TaskId,
    pub errored_dependencies: Vec<TaskId>,
    pub skipped_dependencies: Vec<TaskId>,
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent<C, R> {
    WorkflowStart(WorkflowStart<C>),
    TaskStart(TaskStart),
    TaskFinish(TaskFinish<R>),
    TaskThrow(TaskThrow),
    TaskSkip(TaskSkip),
    WorkflowFinish(WorkflowSummary),
}

impl<C, R> WorkflowEvent<C, R> {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkflowEvent::WorkflowStart(_) => EventKind::WorkflowStart,
            WorkflowEvent::TaskStart(_) => EventKind::TaskStart,
            WorkflowEvent::TaskFinish(_) => EventKind::TaskFinish,
            WorkflowEvent::TaskThrow(_) => EventKind::TaskThrow,
            WorkflowEvent::TaskSkip(_) => EventKind::TaskSkip,
            WorkflowEvent::WorkflowFinish(_) => EventKind::WorkflowFinish,
        }
    }

    /// Id of the task this event is about, if it is a task event.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            WorkflowEvent::TaskStart(e) => Some(&e.id),
            WorkflowEvent::TaskFinish(e) => Some(&e.id),
            WorkflowEvent::TaskThrow(e) => Some(&e.id),
            WorkflowEvent::TaskSkip(e) => Some(&e.id),
            WorkflowEvent::WorkflowStart(_) | WorkflowEvent::WorkflowFinish(_) => None,
        }
    }
}

/// Payload types that can be subscribed to individually.
pub trait EventPayload<C, R>: Sized + 'static {
    const KIND: EventKind;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self>;
}

impl<C: 'static, R> EventPayload<C, R> for WorkflowStart<C> {
    const KIND: EventKind = EventKind::WorkflowStart;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self> {
        match event {
            WorkflowEvent::WorkflowStart(e) => Some(e),
            _ => None,
        }
    }
}

impl<C, R> EventPayload<C, R> for TaskStart {
    const KIND: EventKind = EventKind::TaskStart;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self> {
        match event {
            WorkflowEvent::TaskStart(e) => Some(e),
            _ => None,
        }
    }
}

impl<C, R: 'static> EventPayload<C, R> for TaskFinish<R> {
    const KIND: EventKind = EventKind::TaskFinish;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self> {
        match event {
            WorkflowEvent::TaskFinish(e) => Some(e),
            _ => None,
        }
    }
}

impl<C, R> EventPayload<C, R> for TaskThrow {
    const KIND: EventKind = EventKind::TaskThrow;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self> {
        match event {
            WorkflowEvent::TaskThrow(e) => Some(e),
            _ => None,
        }
    }
}

impl<C, R> EventPayload<C, R> for TaskSkip {
    const KIND: EventKind = EventKind::TaskSkip;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self> {
        match event {
            WorkflowEvent::TaskSkip(e) => Some(e),
            _ => None,
        }
    }
}

impl<C, R> EventPayload<C, R> for WorkflowSummary {
    const KIND: EventKind = EventKind::WorkflowFinish;

    fn extract(event: &WorkflowEvent<C, R>) -> Option<&Self> {
        match event {
            WorkflowEvent::WorkflowFinish(e) => Some(e),
            _ => None,
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<C, R> = Arc<dyn Fn(&WorkflowEvent<C, R>) + Send + Sync>;

struct Registration<C, R> {
    id: ListenerId,
    /// `None` means "every event".
    kind: Option<EventKind>,
    listener: Listener<C, R>,
}

/// Synchronous publish/subscribe hub for [`WorkflowEvent`]s.
pub struct EventEmitter<C, R> {
    listeners: RwLock<Vec<Registration<C, R>>>,
    next_id: AtomicU64,
}

impl<C: 'static, R: 'static> EventEmitter<C, R> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Subscribe to a single event type.
    ///
    /// ```ignore
    /// emitter.on(|skip: &TaskSkip| println!("{} skipped", skip.id));
    /// ```
    pub fn on<E, F>(&self, listener: F) -> ListenerId
    where
        E: EventPayload<C, R>,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let erased: Listener<C, R> = Arc::new(move |event: &WorkflowEvent<C, R>| {
            if let Some(payload) = E::extract(event) {
                listener(payload);
            }
        });
        self.register(Some(E::KIND), erased)
    }

    /// Subscribe to every event, in emission order.
    pub fn on_any<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&WorkflowEvent<C, R>) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every matching listener before returning.
    pub fn emit(&self, event: &WorkflowEvent<C, R>) {
        let kind = event.kind();

        // Snapshot so listeners may subscribe/unsubscribe without deadlocking.
        let matching: Vec<Listener<C, R>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.kind.is_none_or(|k| k == kind))
            .map(|r| Arc::clone(&r.listener))
            .collect();

        // The tracker emits while holding its lock, so a panic must not
        // unwind out of here.
        for listener in matching {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                error!(
                    event = ?kind,
                    task = event.task_id().unwrap_or("-"),
                    panic = %panic_message(payload.as_ref()),
                    "event listener panicked"
                );
            }
        }
    }

    fn register(&self, kind: Option<EventKind>, listener: Listener<C, R>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration { id, kind, listener });
        id
    }
}

impl<C: 'static, R: 'static> Default for EventEmitter<C, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, R> std::fmt::Debug for EventEmitter<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .listeners
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("EventEmitter")
            .field("listeners", &count)
            .finish()
    }
}
