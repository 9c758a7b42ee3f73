use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Drain `items` with exactly `threads` concurrent workers.
///
/// The queue is the single synchronized hand-off point: the first available
/// worker takes the head, so admission is FIFO with no reordering and at
/// most `threads` items are in flight at any instant. The pool does not
/// fail fast; it returns only once every item reached a worker or the
/// cancel flag stopped admission. In-flight items always run to completion.
pub(crate) async fn run_pool<T, F, Fut>(
    threads: usize,
    items: Vec<T>,
    cancel: Arc<AtomicBool>,
    worker: F,
) where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let queue = Arc::new(Mutex::new(VecDeque::from(items)));
    let mut workers = JoinSet::new();

    for _ in 0..threads {
        let queue = Arc::clone(&queue);
        let cancel = Arc::clone(&cancel);
        let worker = worker.clone();
        workers.spawn(async move {
            loop {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                let item = queue.lock().await.pop_front();
                match item {
                    Some(item) => worker(item).await,
                    None => break,
                }
            }
        });
    }

    while workers.join_next().await.is_some() {}
}
