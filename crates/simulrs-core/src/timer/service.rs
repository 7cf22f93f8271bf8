// Simulrs Timer Service
// One-shot deferred press emission, one worker thread per source slot

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, error};
use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{ChordTimers, FaultHandler, TimerError};
use crate::chord::SlotIndex;
use crate::input::RawInputEvent;
use crate::output::EventSink;

#[derive(Debug, Default)]
struct SlotState {
    deadline: Option<Instant>,
    shutdown: bool,
}

#[derive(Debug, Default)]
struct SlotTimer {
    state: Mutex<SlotState>,
    wake: Condvar,
}

/// Real-time timers backed by worker threads.
///
/// A slot's deadline is cleared either by its worker when the threshold
/// elapses or by `disarm`, always under the slot lock, so each arming ends in
/// exactly one of "fired" or "cancelled". The worker writes the deferred press
/// while still holding that lock: a main-loop query racing a firing blocks
/// until the press is on the wire.
pub struct TimerService {
    slots: Vec<Arc<SlotTimer>>,
    workers: Vec<JoinHandle<()>>,
    threshold: Duration,
}

impl TimerService {
    /// Spawn one worker per template. `templates[i]` is what slot `i` emits
    /// when its threshold elapses.
    pub fn new(
        templates: Vec<RawInputEvent>,
        threshold: Duration,
        sink: Arc<dyn EventSink>,
        on_fault: FaultHandler,
    ) -> Result<Self, TimerError> {
        let mut service = Self {
            slots: Vec::with_capacity(templates.len()),
            workers: Vec::with_capacity(templates.len()),
            threshold,
        };

        for (index, template) in templates.into_iter().enumerate() {
            let slot = Arc::new(SlotTimer::default());
            let worker_slot = Arc::clone(&slot);
            let sink = Arc::clone(&sink);
            let on_fault = Arc::clone(&on_fault);

            // On failure `service` drops here and stops the workers already running.
            let handle = std::thread::Builder::new()
                .name(format!("simulrs-timer-{}", index))
                .spawn(move || run_worker(index, worker_slot, template, sink, on_fault))
                .map_err(TimerError::Spawn)?;

            service.slots.push(slot);
            service.workers.push(handle);
        }

        Ok(service)
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    fn slot(&self, slot: SlotIndex) -> &SlotTimer {
        &self.slots[slot.get()]
    }
}

fn run_worker(
    index: usize,
    slot: Arc<SlotTimer>,
    template: RawInputEvent,
    sink: Arc<dyn EventSink>,
    on_fault: FaultHandler,
) {
    let mut state = slot.state.lock();
    loop {
        if state.shutdown {
            return;
        }
        match state.deadline {
            None => slot.wake.wait(&mut state),
            Some(deadline) if Instant::now() >= deadline => {
                state.deadline = None;
                debug!("timer {} fired, emitting deferred press of code {}", index, template.code);
                if let Err(e) = sink.emit_key(template, true) {
                    error!("timer {} failed to emit deferred press: {}", index, e);
                    on_fault(e);
                }
            }
            Some(deadline) => {
                slot.wake.wait_until(&mut state, deadline);
            }
        }
    }
}

impl ChordTimers for TimerService {
    fn arm(&self, slot: SlotIndex) -> bool {
        let timer = self.slot(slot);
        let fresh = timer
            .state
            .lock()
            .deadline
            .replace(Instant::now() + self.threshold)
            .is_none();
        timer.wake.notify_one();
        fresh
    }

    fn disarm(&self, slot: SlotIndex) -> bool {
        let timer = self.slot(slot);
        let cancelled = timer.state.lock().deadline.take().is_some();
        if cancelled {
            timer.wake.notify_one();
        }
        cancelled
    }

    fn is_armed(&self, slot: SlotIndex) -> bool {
        self.slot(slot).state.lock().deadline.is_some()
    }

    fn disarm_if_all_armed(&self, slots: &[SlotIndex]) -> bool {
        // Lock in slot order; workers only ever take their own lock.
        let mut ordered = slots.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guards: Vec<MutexGuard<'_, SlotState>> =
            ordered.iter().map(|s| self.slot(*s).state.lock()).collect();
        if !guards.iter().all(|g| g.deadline.is_some()) {
            return false;
        }
        for guard in guards.iter_mut() {
            guard.deadline = None;
        }
        drop(guards);

        for s in &ordered {
            self.slot(*s).wake.notify_one();
        }
        true
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        for slot in &self.slots {
            slot.state.lock().shutdown = true;
            slot.wake.notify_one();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
