//! Bounded worker pool for summarization calls.
//!
//! Model inference is the slow path of every request, so it runs on a fixed set
//! of workers draining a bounded queue. Submission awaits queue capacity, which
//! gives the server backpressure instead of an unbounded backlog. Jobs run to
//! completion once dequeued; there is no mid-flight cancellation.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::model::{ModelClientError, SummarizationModel, SummaryParams};

const QUEUE_CAPACITY: usize = 64;

/// Errors surfaced when submitting work to the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Pool has shut down, or a worker dropped the reply channel.
    #[error("Inference pool is no longer accepting work")]
    Closed,
    /// Model client failure forwarded from the worker.
    #[error(transparent)]
    Model(#[from] ModelClientError),
}

struct SummarizeJob {
    texts: Vec<String>,
    params: SummaryParams,
    reply: oneshot::Sender<Result<Vec<String>, ModelClientError>>,
}

/// Fixed-size pool of workers sharing one bounded job queue.
pub struct InferencePool {
    sender: Mutex<Option<mpsc::Sender<SummarizeJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl InferencePool {
    /// Spawn `worker_count` workers draining a shared queue into `model`.
    pub fn spawn(model: Arc<dyn SummarizationModel>, worker_count: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<SummarizeJob>(QUEUE_CAPACITY);
        let receiver = Arc::new(Mutex::new(receiver));

        let count = worker_count.max(1);
        let mut workers = Vec::with_capacity(count);
        for worker_id in 0..count {
            let receiver = Arc::clone(&receiver);
            let model = Arc::clone(&model);
            workers.push(tokio::spawn(async move {
                loop {
                    let job = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    let Some(job) = job else { break };

                    tracing::debug!(worker_id, batch = job.texts.len(), "Running summarization job");
                    let result = model.summarize_batch(&job.texts, &job.params).await;
                    if job.reply.send(result).is_err() {
                        tracing::debug!(worker_id, "Requester stopped waiting for summarization result");
                    }
                }
                tracing::debug!(worker_id, "Inference worker stopped");
            }));
        }

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        }
    }

    /// Queue a batch and wait for its fragments.
    ///
    /// Awaits queue capacity when all slots are taken. Returns [`PoolError::Closed`]
    /// once [`InferencePool::shutdown`] has run.
    pub async fn submit_and_wait(
        &self,
        texts: Vec<String>,
        params: SummaryParams,
    ) -> Result<Vec<String>, PoolError> {
        let sender = {
            let guard = self.sender.lock().await;
            guard.clone()
        };
        let Some(sender) = sender else {
            return Err(PoolError::Closed);
        };

        let (reply, receive) = oneshot::channel();
        let job = SummarizeJob {
            texts,
            params,
            reply,
        };
        sender.send(job).await.map_err(|_| PoolError::Closed)?;

        match receive.await {
            Ok(result) => result.map_err(PoolError::from),
            Err(_) => Err(PoolError::Closed),
        }
    }

    /// Close the queue and wait for every worker to finish its outstanding jobs.
    pub async fn shutdown(&self) {
        let sender = self.sender.lock().await.take();
        drop(sender);

        let mut workers = self.workers.lock().await;
        for worker in workers.drain(..) {
            if let Err(error) = worker.await {
                tracing::warn!(error = %error, "Inference worker ended abnormally");
            }
        }
    }
}
