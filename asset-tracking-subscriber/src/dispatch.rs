//! Delivery of completions and delegate notifications
//!
//! Nothing computed by the worker reaches application code directly. Results
//! and notifications are wrapped in jobs and handed to a [`CallbackExecutor`],
//! which runs them on the application's callback context. The default
//! executor is a [`CallbackQueue`]: a dedicated thread running jobs in FIFO
//! order.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Weak};
use std::thread;

use crate::delegate::{DelegateEvent, SubscriberDelegate};
use crate::error::{Result, TrackingError};

/// A unit of work for the callback context
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs callback jobs in submission order on the application's chosen context
///
/// Implemented for closures taking a [`Job`], so an application can forward
/// jobs into its own event loop.
pub trait CallbackExecutor: Send + Sync {
    fn execute(&self, job: Job);
}

impl<F> CallbackExecutor for F
where
    F: Fn(Job) + Send + Sync,
{
    fn execute(&self, job: Job) {
        self(job)
    }
}

/// Dedicated callback thread
///
/// The thread exits once the queue is dropped and the remaining jobs have run.
/// A panicking job is logged and does not stop later jobs.
pub struct CallbackQueue {
    tx: mpsc::Sender<Job>,
}

impl CallbackQueue {
    /// Spawns the callback thread with the given name
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        thread::Builder::new().name(name.into()).spawn(move || {
            for job in rx {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::error!("Subscriber callback panicked");
                }
            }
            tracing::trace!("Callback queue drained");
        })?;
        Ok(Self { tx })
    }
}

impl CallbackExecutor for CallbackQueue {
    fn execute(&self, job: Job) {
        if self.tx.send(job).is_err() {
            tracing::warn!("Callback thread has exited, dropping callback");
        }
    }
}

impl fmt::Debug for CallbackQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackQueue").finish_non_exhaustive()
    }
}

type Handler<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// One-shot continuation of a subscriber request
///
/// Resolving consumes the completion, so it can only run once. A completion
/// dropped without being resolved reports
/// [`TrackingError::SubscriberTerminated`] instead of going silent.
pub(crate) struct Completion<T: Send + 'static = ()> {
    handler: Option<Handler<T>>,
    executor: Arc<dyn CallbackExecutor>,
}

impl<T: Send + 'static> Completion<T> {
    pub(crate) fn resolve(mut self, result: Result<T>) {
        if let Some(handler) = self.handler.take() {
            self.executor.execute(Box::new(move || handler(result)));
        }
    }
}

impl<T: Send + 'static> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            tracing::debug!("Request dropped before completing");
            self.executor
                .execute(Box::new(move || handler(Err(TrackingError::SubscriberTerminated))));
        }
    }
}

/// Routes worker output to the callback executor and the delegate
#[derive(Clone)]
pub(crate) struct CallbackDispatcher {
    executor: Arc<dyn CallbackExecutor>,
    delegate: Option<Weak<dyn SubscriberDelegate>>,
}

impl CallbackDispatcher {
    pub(crate) fn new(
        executor: Arc<dyn CallbackExecutor>,
        delegate: Option<Weak<dyn SubscriberDelegate>>,
    ) -> Self {
        Self { executor, delegate }
    }

    pub(crate) fn completion<T, F>(&self, handler: F) -> Completion<T>
    where
        T: Send + 'static,
        F: FnOnce(Result<T>) + Send + 'static,
    {
        Completion {
            handler: Some(Box::new(handler)),
            executor: Arc::clone(&self.executor),
        }
    }

    /// Schedules a delegate notification
    ///
    /// The delegate is upgraded when the job runs; if it is gone by then the
    /// notification is skipped.
    pub(crate) fn notify(&self, event: DelegateEvent) {
        let Some(delegate) = self.delegate.clone() else {
            return;
        };

        self.executor.execute(Box::new(move || match delegate.upgrade() {
            Some(delegate) => event.deliver(delegate.as_ref()),
            None => tracing::trace!("Delegate dropped, skipping {:?}", event),
        }));
    }
}
