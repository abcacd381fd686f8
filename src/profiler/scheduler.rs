//! Periodic scheduling of the sampler and correlator passes.
//!
//! Each wrapper owns a timer thread that, once per interval, submits a
//! safepoint operation to the executor collaborator. The timer thread never
//! touches profiler state itself; the executor serializes the actual work
//! against every other pause-triggering activity.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
    time::Duration,
};

use parking_lot::{Condvar, Mutex};

use crate::{
    safepoint::{SafepointExecutor, VmOperation},
    traits::{HeapModel, ThreadSet},
};

use super::Profiler;

struct TaskShared {
    should_terminate: AtomicBool,
    lock: Mutex<()>,
    cond: Condvar,
}

/// A timer thread invoking a tick callback at a fixed interval until
/// disengaged. Disengage wakes the thread immediately instead of waiting out
/// the current interval.
pub struct PeriodicTask {
    shared: Arc<TaskShared>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub fn engage(
        name: &'static str,
        interval: Duration,
        mut tick: impl FnMut() + Send + 'static,
    ) -> Self {
        let shared = Arc::new(TaskShared {
            should_terminate: AtomicBool::new(false),
            lock: Mutex::new(()),
            cond: Condvar::new(),
        });

        log::debug!(target: "profiler", "engaging {} every {:?}", name, interval);

        let thread_shared = shared.clone();
        let handle = std::thread::spawn(move || loop {
            {
                let mut guard = thread_shared.lock.lock();
                if !thread_shared.should_terminate.load(Ordering::Acquire) {
                    thread_shared.cond.wait_for(&mut guard, interval);
                }
            }

            if thread_shared.should_terminate.load(Ordering::Acquire) {
                break;
            }

            tick();
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    pub fn disengage(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.shared.should_terminate.store(true, Ordering::Release);
        {
            let _guard = self.shared.lock.lock();
        }
        self.shared.cond.notify_all();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Safepoint operation: one stack-sampling pass over every live thread.
pub struct SampleThreadsOperation<T> {
    profiler: Arc<Profiler>,
    threads: Arc<T>,
}

impl<T: ThreadSet> VmOperation for SampleThreadsOperation<T> {
    fn name(&self) -> &'static str {
        "HotMethodSample"
    }

    fn doit(&mut self) {
        self.profiler.sample_threads(&*self.threads);
    }
}

/// Safepoint operation: one heap-correlation pass, flushing the tracker
/// afterwards to bound its growth between passes.
pub struct CorrelateHeapOperation<H> {
    profiler: Arc<Profiler>,
    heap: Arc<Mutex<H>>,
}

impl<H: HeapModel> VmOperation for CorrelateHeapOperation<H> {
    fn name(&self) -> &'static str {
        "HotTypeCorrelate"
    }

    fn doit(&mut self) {
        let mut heap = self.heap.lock();
        self.profiler.correlate_and_flush(&mut *heap);
    }
}

/// Engage/disengage handle for the periodic sampler.
#[derive(Default)]
pub struct SamplerTaskManager {
    task: Option<PeriodicTask>,
}

impl SamplerTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage<T>(
        &mut self,
        profiler: Arc<Profiler>,
        threads: Arc<T>,
        executor: Arc<dyn SafepointExecutor>,
    ) where
        T: ThreadSet + Send + Sync + 'static,
    {
        let interval = Duration::from_millis(profiler.arguments().sample_interval_ms as u64);

        self.task = Some(PeriodicTask::engage("hot-method-sampler", interval, move || {
            let mut op = SampleThreadsOperation {
                profiler: profiler.clone(),
                threads: threads.clone(),
            };
            executor.execute(&mut op);
        }));
    }

    pub fn disengage(&mut self) {
        if let Some(task) = self.task.take() {
            task.disengage();
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.task.is_some()
    }
}

/// Engage/disengage handle for the periodic correlator.
#[derive(Default)]
pub struct CorrelatorTaskManager {
    task: Option<PeriodicTask>,
}

impl CorrelatorTaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage<H>(
        &mut self,
        profiler: Arc<Profiler>,
        heap: Arc<Mutex<H>>,
        executor: Arc<dyn SafepointExecutor>,
    ) where
        H: HeapModel + Send + 'static,
    {
        let interval = Duration::from_millis(profiler.arguments().correlate_interval_ms as u64);
        let mut pass = 0usize;

        self.task = Some(PeriodicTask::engage(
            "hot-type-correlator",
            interval,
            move || {
                pass += 1;
                log::info!(target: "profiler", "Collection interval {}", pass);

                let mut op = CorrelateHeapOperation {
                    profiler: profiler.clone(),
                    heap: heap.clone(),
                };
                executor.execute(&mut op);
            },
        ));
    }

    pub fn disengage(&mut self) {
        if let Some(task) = self.task.take() {
            task.disengage();
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.task.is_some()
    }
}
