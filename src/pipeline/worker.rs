//! Background classification worker.
//!
//! A model invocation blocks for its full duration, so interactive callers
//! hand captures to a dedicated worker thread and await the result on a
//! per-request channel instead of blocking their own loop. The worker owns the
//! classifier outright and processes jobs strictly in submission order, which
//! also serializes all access to the underlying model handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use super::LeafClassifier;
use crate::core::errors::ClassifyError;
use crate::core::traits::InferenceEngine;
use crate::domain::{ClassificationResult, RawImage};

struct Job {
    image: RawImage,
    canceled: Arc<AtomicBool>,
    reply: Sender<Result<ClassificationResult, ClassifyError>>,
}

/// Owns a [`LeafClassifier`] on a dedicated thread and feeds it jobs in FIFO
/// order.
///
/// Dropping the worker closes the queue, lets the thread drain, and joins it.
#[derive(Debug)]
pub struct ClassifierWorker {
    jobs: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl ClassifierWorker {
    /// Moves the classifier onto a new worker thread.
    pub fn spawn<E>(classifier: LeafClassifier<E>) -> Self
    where
        E: InferenceEngine + 'static,
    {
        let (jobs, queue) = mpsc::channel::<Job>();
        let thread = std::thread::spawn(move || {
            for job in queue {
                if job.canceled.load(Ordering::Acquire) {
                    tracing::debug!("dropping canceled classification job");
                    continue;
                }
                let outcome = classifier.classify(&job.image);
                // The submitter may have dropped its handle already.
                let _ = job.reply.send(outcome);
            }
            tracing::debug!("classification worker drained, exiting");
        });
        Self {
            jobs: Some(jobs),
            thread: Some(thread),
        }
    }

    /// Enqueues a capture and returns a handle to the eventual result.
    ///
    /// Never blocks on inference; the submitting thread only pays for a
    /// channel send.
    pub fn submit(&self, image: RawImage) -> PendingClassification {
        let (reply, result) = mpsc::channel();
        let canceled = Arc::new(AtomicBool::new(false));
        let job = Job {
            image,
            canceled: Arc::clone(&canceled),
            reply,
        };
        let delivered = match &self.jobs {
            Some(jobs) => jobs.send(job).is_ok(),
            None => false,
        };
        PendingClassification {
            result,
            canceled,
            delivered,
        }
    }
}

impl Drop for ClassifierWorker {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Handle to a classification submitted to a [`ClassifierWorker`].
#[derive(Debug)]
pub struct PendingClassification {
    result: Receiver<Result<ClassificationResult, ClassifyError>>,
    canceled: Arc<AtomicBool>,
    delivered: bool,
}

impl PendingClassification {
    /// Requests cancellation.
    ///
    /// Effective only while the job is still queued; once the worker has
    /// dispatched it to the model, the invocation runs to completion and its
    /// result is discarded.
    pub fn cancel(self) {
        self.canceled.store(true, Ordering::Release);
    }

    /// Blocks until the worker delivers the result.
    pub fn wait(self) -> Result<ClassificationResult, ClassifyError> {
        if !self.delivered {
            return Err(ClassifyError::worker_terminated());
        }
        match self.result.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(ClassifyError::worker_terminated()),
        }
    }

    /// Returns the result if the worker has already delivered it.
    pub fn try_wait(&self) -> Option<Result<ClassificationResult, ClassifyError>> {
        self.result.try_recv().ok()
    }
}
