use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

struct Slot {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Observable state driven by at most one background task.
///
/// Starting a task aborts the previous one, which drops its future (and any
/// HTTP request inside it). The generation check in [`LatestCell::settle`]
/// covers a task that already finished its work but had not yet published
/// when it was superseded.
pub(crate) struct LatestCell<S> {
    name: &'static str,
    tx: watch::Sender<S>,
    slot: Mutex<Slot>,
}

impl<S> LatestCell<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(name: &'static str, initial: S) -> Arc<Self> {
        let (tx, _rx) = watch::channel(initial);
        Arc::new(Self {
            name,
            tx,
            slot: Mutex::new(Slot {
                generation: 0,
                task: None,
            }),
        })
    }

    pub(crate) fn current(&self) -> S {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Cancels whatever is in flight and publishes `state` right away.
    pub(crate) fn replace(&self, state: S) -> u64 {
        let mut slot = self.slot.lock();
        let generation = Self::begin(self.name, &mut slot);
        self.tx.send_replace(state);
        generation
    }

    /// Cancels whatever is in flight, publishes `pending`, then runs `work`
    /// on the runtime and publishes its output unless superseded first.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn run<F>(self: &Arc<Self>, pending: S, work: F) -> u64
    where
        F: Future<Output = S> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        let generation = Self::begin(self.name, &mut slot);
        self.tx.send_replace(pending);

        let cell = Arc::clone(self);
        slot.task = Some(tokio::spawn(async move {
            let settled = work.await;
            cell.settle(generation, settled);
        }));
        generation
    }

    /// Publishes `state` only if `generation` is still the latest.
    pub(crate) fn settle(&self, generation: u64, state: S) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            debug!(cell = self.name, generation, latest = slot.generation, "Dropping superseded result");
            return false;
        }
        slot.task = None;
        self.tx.send_replace(state);
        true
    }

    /// Aborts the in-flight task, if any, leaving the published state alone.
    pub(crate) fn cancel(&self) {
        let mut slot = self.slot.lock();
        Self::begin(self.name, &mut slot);
    }

    fn begin(name: &'static str, slot: &mut Slot) -> u64 {
        slot.generation += 1;
        if let Some(task) = slot.task.take() {
            if !task.is_finished() {
                debug!(cell = name, superseded = slot.generation - 1, "Aborting in-flight request");
            }
            task.abort();
        }
        slot.generation
    }
}
