//! Dedicated move worker: one background thread per game
//!
//! Level 4 - Utilities and configuration

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

type Job = Box<dyn FnOnce() + Send>;

/// Result of a job; `Err` carries the panic payload
pub type JobResult<T> = thread::Result<T>;

/// Runs submitted jobs one at a time on its own thread
pub struct MoveWorker {
    jobs: Option<Sender<Job>>,
    /// Disconnects when the worker thread exits
    exited: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl MoveWorker {
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (jobs, queue) = unbounded::<Job>();
        let (exit_signal, exited) = bounded::<()>(0);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let _exit_signal = exit_signal;
            while let Ok(job) = queue.recv() {
                job();
            }
        })?;
        Ok(Self { jobs: Some(jobs), exited, handle: Some(handle) })
    }

    /// Queue `job`; its result arrives on the returned channel
    pub fn submit<T, F>(&self, job: F) -> Receiver<JobResult<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (reply, result) = bounded(1);
        let wrapped: Job = Box::new(move || {
            let _ = reply.send(panic::catch_unwind(AssertUnwindSafe(job)));
        });
        if let Some(jobs) = &self.jobs {
            // A dead worker drops the reply sender, which the caller sees as disconnection
            let _ = jobs.send(wrapped);
        }
        result
    }

    /// Stop accepting jobs and wait up to `grace` for the thread to finish.
    ///
    /// Returns false if the thread is still running, e.g. stuck in a job.
    pub fn shutdown(mut self, grace: Duration) -> bool {
        self.jobs = None;
        match self.exited.recv_timeout(grace) {
            Err(RecvTimeoutError::Disconnected) | Ok(()) => {
                if let Some(handle) = self.handle.take() {
                    let _ = handle.join();
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    "move worker did not terminate within {} ms, is there an infinite loop in an agent?",
                    grace.as_millis()
                );
                false
            }
        }
    }

    /// Stop accepting jobs; a job already running is left to finish
    pub fn retire(&mut self) {
        self.jobs = None;
    }
}
