//! Cooperative cancellation.
//!
//! One shared boolean, written by the interactive side (Ctrl-C handler, stop
//! button) and polled by the worker at defined boundaries: the top of the
//! per-item batch loop and before each size-priority probe encode. Setting
//! the flag never pre-empts an in-flight encode.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory stop flag shared between the interactive context and the worker.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current run stop at its next checked boundary.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clear the flag. The driver calls this on entry to a run so a stop
    /// requested after one run cannot leak into the next.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        assert!(!CancelToken::new().is_requested());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let writer = token.clone();
        writer.request();
        assert!(token.is_requested());
    }

    #[test]
    fn reset_clears_a_request() {
        let token = CancelToken::new();
        token.request();
        token.reset();
        assert!(!token.is_requested());
    }

    #[test]
    fn visible_across_threads() {
        let token = CancelToken::new();
        let writer = token.clone();
        std::thread::spawn(move || writer.request()).join().unwrap();
        assert!(token.is_requested());
    }
}
