use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// Shared read handle on a ticker's count. Stays readable after the ticker
/// stops, holding the final value.
#[derive(Debug, Clone, Default)]
pub struct ElapsedCounter(Arc<AtomicU64>);

impl ElapsedCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counts elapsed seconds on a background thread, calling back on each tick.
///
/// Dropping the ticker stops it.
pub struct ElapsedTicker {
    elapsed: ElapsedCounter,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ElapsedTicker {
    pub fn start<F>(on_tick: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        Self::with_interval(TICK, on_tick)
    }

    pub(crate) fn with_interval<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let elapsed = ElapsedCounter::default();
        let (stop, stopped) = mpsc::channel::<()>();
        let counter = Arc::clone(&elapsed.0);

        let handle = thread::spawn(move || loop {
            match stopped.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    let ticks = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    on_tick(ticks);
                }
                // Explicit stop or the sender was dropped.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        Self {
            elapsed,
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    /// Ticks counted so far.
    pub fn elapsed(&self) -> u64 {
        self.elapsed.get()
    }

    pub fn counter(&self) -> ElapsedCounter {
        self.elapsed.clone()
    }

    /// Stop ticking and return the final count.
    pub fn cancel(mut self) -> u64 {
        self.shutdown();
        self.elapsed()
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn ticks_until_cancelled() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ticker = ElapsedTicker::with_interval(Duration::from_millis(10), move |n| {
            sink.lock().unwrap().push(n);
        });

        thread::sleep(Duration::from_millis(100));
        let total = ticker.cancel();
        let seen = seen.lock().unwrap().clone();

        assert!(total >= 1);
        assert_eq!(seen.len() as u64, total);
        assert_eq!(seen, (1..=total).collect::<Vec<_>>());
    }

    #[test]
    fn no_ticks_after_drop() {
        let count = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&count);
        let ticker = ElapsedTicker::with_interval(Duration::from_millis(10), move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(50));
        drop(ticker);

        let after_drop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }

    #[test]
    fn counter_outlives_ticker() {
        let ticker = ElapsedTicker::with_interval(Duration::from_millis(10), |_| {});
        let counter = ticker.counter();
        thread::sleep(Duration::from_millis(60));
        let total = ticker.cancel();

        assert!(total >= 1);
        assert_eq!(counter.get(), total);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(counter.get(), total);
    }

    #[test]
    fn cancel_before_first_tick() {
        let ticker = ElapsedTicker::start(|_| {});
        assert_eq!(ticker.cancel(), 0);
    }
}
