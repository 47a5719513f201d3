//! Teardown handles for mounted views.

/// Collects the cleanup steps of one mount. Runs them on `dispose` or drop,
/// in reverse registration order.
#[derive(Default)]
pub struct Disposer {
    teardown: Vec<Box<dyn FnOnce()>>,
}

impl Disposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl FnOnce() + 'static) {
        self.teardown.push(Box::new(step));
    }

    /// Keep a value alive until disposal (event listener guards, timers).
    pub fn hold<T: 'static>(&mut self, value: T) {
        self.push(move || drop(value));
    }

    pub fn absorb(&mut self, mut other: Disposer) {
        self.teardown.append(&mut other.teardown);
    }

    pub fn len(&self) -> usize {
        self.teardown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teardown.is_empty()
    }

    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        while let Some(step) = self.teardown.pop() {
            step();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.run();
    }
}
