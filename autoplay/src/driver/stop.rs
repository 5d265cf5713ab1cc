use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

pub type StopCallback = Box<dyn FnOnce() + Send>;

/// Stop flag shared between the decision loop and whoever ends it.
///
/// Callbacks registered with [`StopState::register_on_stop`] run exactly once,
/// on the thread that calls [`StopState::stop`], or immediately if the state
/// is stopped already.
pub struct StopState {
    is_stopped: AtomicBool,
    on_stop: Mutex<Vec<StopCallback>>,
}

impl Default for StopState {
    fn default() -> Self {
        Self::new()
    }
}

impl StopState {
    pub fn new() -> Self {
        Self {
            is_stopped: AtomicBool::new(false),
            on_stop: Mutex::new(Vec::new()),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.is_stopped.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        if self.is_stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let callbacks = {
            let mut on_stop = self.on_stop.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *on_stop)
        };
        for cb in callbacks {
            cb();
        }
    }

    pub fn register_on_stop(&self, callback: StopCallback) {
        let mut on_stop = self.on_stop.lock().unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock: `stop` flips the flag before taking it.
        if self.is_stopped() {
            drop(on_stop);
            callback();
            return;
        }
        on_stop.push(callback);
    }
}
