use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use super::{get_connection, DbPool};
use crate::errors::StorageError;

// A job runs against the writer's connection. Its return value is boxed as
// `Any` so jobs of different types share one channel.
type Job = Box<dyn FnOnce(&mut SqliteConnection) -> JobResult + Send + 'static>;
type JobResult = Result<Box<dyn Any + Send + 'static>, StorageError>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job, oneshot::Sender<JobResult>)>,
}

impl WriteHandle {
    /// Runs `job` inside an immediate transaction on the writer's dedicated
    /// connection, after every job queued before it.
    pub async fn exec<F, T>(&self, job: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job: Job = Box::new(move |conn: &mut SqliteConnection| {
            job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)
        });
        self.tx
            .send((job, reply_tx))
            .await
            .map_err(|_| StorageError::WriterUnavailable("writer has stopped".to_string()))?;

        let boxed = reply_rx.await.map_err(|_| {
            StorageError::WriterUnavailable("writer dropped the reply".to_string())
        })??;

        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            StorageError::WriterUnavailable("writer returned an unexpected type".to_string())
        })
    }
}

/// Spawns a background task that is the only writer to the database.
///
/// The writer owns one pooled connection for its lifetime and runs jobs
/// serially. Must be called from within a Tokio runtime.
pub fn spawn_writer(pool: &DbPool) -> Result<WriteHandle, StorageError> {
    let mut conn = get_connection(pool)?;
    let (tx, mut rx) = mpsc::channel::<(Job, oneshot::Sender<JobResult>)>(1024);

    tokio::spawn(async move {
        while let Some((job, reply_tx)) = rx.recv().await {
            let result = conn.immediate_transaction::<_, StorageError, _>(|c| job(c));
            // The caller may have gone away (request cancelled); nothing to do then.
            let _ = reply_tx.send(result);
        }
    });

    Ok(WriteHandle { tx })
}
