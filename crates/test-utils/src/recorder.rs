use std::sync::{Arc, Mutex};

use taskdag::{EventEmitter, EventKind, TaskFinish, TaskSkip, TaskThrow, WorkflowEvent};

/// Subscribes to every event of an emitter and keeps them in emission order.
pub struct EventRecorder<C, R> {
    events: Arc<Mutex<Vec<WorkflowEvent<C, R>>>>,
}

impl<C, R> EventRecorder<C, R>
where
    C: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    WorkflowEvent<C, R>: Clone,
{
    pub fn attach(emitter: &EventEmitter<C, R>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        emitter.on_any(move |event| sink.lock().unwrap().push(event.clone()));
        Self { events }
    }

    pub fn events(&self) -> Vec<WorkflowEvent<C, R>> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind()).collect()
    }

    /// Ids of task events of the given kind, in emission order.
    pub fn ids(&self, kind: EventKind) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind)
            .filter_map(|e| e.task_id().map(str::to_string))
            .collect()
    }

    /// Index in the event stream of the `kind` event for task `id`.
    pub fn position(&self, kind: EventKind, id: &str) -> Option<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .position(|e| e.kind() == kind && e.task_id() == Some(id))
    }

    /// Index of the event that moved `id` into a terminal state.
    pub fn terminal_position(&self, id: &str) -> Option<usize> {
        [EventKind::TaskFinish, EventKind::TaskThrow, EventKind::TaskSkip]
            .into_iter()
            .find_map(|kind| self.position(kind, id))
    }

    pub fn finishes(&self) -> Vec<TaskFinish<R>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::TaskFinish(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn throws(&self) -> Vec<TaskThrow> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::TaskThrow(t) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn skips(&self) -> Vec<TaskSkip> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::TaskSkip(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}
