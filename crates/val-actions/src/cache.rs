//! Publish-once caching

use std::sync::OnceLock;

/// Return the value published in `cell`, computing it if there is none
///
/// The computation runs outside the cell, so concurrent first callers may
/// each compute. The first value stored wins and every caller returns it.
/// Callers must pass a computation that is idempotent.
pub(crate) fn publish_once<V>(cell: &OnceLock<V>, compute: impl FnOnce() -> V) -> &V {
    if let Some(value) = cell.get() {
        return value;
    }
    let value = compute();
    cell.get_or_init(|| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_cached_after_first_call() {
        let cell = OnceLock::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let value = publish_once(&cell, || calls.fetch_add(1, Ordering::SeqCst) + 10);
            assert_eq!(*value, 10);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_racing_callers_observe_one_value() {
        const THREADS: usize = 8;
        let cell = Arc::new(OnceLock::new());
        let barrier = Arc::new(Barrier::new(THREADS));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (cell, barrier, calls) = (cell.clone(), barrier.clone(), calls.clone());
                thread::spawn(move || {
                    barrier.wait();
                    *publish_once(&cell, || calls.fetch_add(1, Ordering::SeqCst))
                })
            })
            .collect();

        let observed: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let published = *cell.get().unwrap();
        assert!(observed.iter().all(|v| *v == published));
        let computed = calls.load(Ordering::SeqCst);
        assert!((1..=THREADS).contains(&computed));
    }
}
