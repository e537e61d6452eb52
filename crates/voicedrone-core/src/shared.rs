use std::sync::{Arc, Mutex};

/// A small `Copy` value shared between one writer and any number of readers.
///
/// The whole value is replaced under the lock, so a reader never observes a
/// mix of fields from two different writes.
#[derive(Debug, Default)]
pub struct SharedCell<T: Copy> {
    inner: Arc<Mutex<T>>,
}

impl<T: Copy> SharedCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    pub fn get(&self) -> T {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, value: T) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl<T: Copy> Clone for SharedCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
