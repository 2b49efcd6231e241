//! A value that observers can read and subscribe to.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A shared current value with change notification.
///
/// Callbacks registered with [`subscribe`](Observable::subscribe) run
/// synchronously inside every [`set`](Observable::set), in registration
/// order. Async observers can use [`watch`](Observable::watch) instead.
/// A callback must not set the same observable.
pub struct Observable<T> {
    value: watch::Sender<T>,
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        let (value, _) = watch::channel(value);
        Self {
            value,
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, next: T) {
        let callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        self.value.send_replace(next);
        let current = self.value.borrow();
        for callback in callbacks.iter() {
            callback(&current);
        }
    }

    /// Derive the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.value.borrow());
        self.set(next);
    }

    /// Call `callback` with the current value now and after every change.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        callback(&self.value.borrow());
        callbacks.push(Box::new(callback));
    }

    /// A receiver that wakes on every change.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
