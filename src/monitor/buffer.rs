//! Bounded circular-buffer monitor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::error::{MonitorError, MonitorResult};
use super::MonitorStats;

/// Default threshold after which a blocked waiter triggers a deadlock warning.
pub const DEFAULT_DEADLOCK_THRESHOLD: Duration = Duration::from_secs(5);

/// Bookkeeping for one blocked caller.
///
/// Entries exist only while the caller is actually blocked, so the map is
/// bounded by the number of blocked threads.
struct Waiter {
    since: Instant,
    thread: String,
    priority: u8,
    warned: bool,
}

/// The thread currently inside a monitor operation, tracked only for
/// priority-inheritance bookkeeping.
struct Owner {
    token: u64,
    thread: String,
    priority: u8,
    inherited: u8,
}

struct State<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
    closed: bool,
    waiters: HashMap<u64, Waiter>,
    owner: Option<Owner>,
    insertions: u64,
    removals: u64,
    timeouts: u64,
    priority_inheritances: u64,
    avg_wait_secs: f64,
}

impl<T> State<T> {
    fn claim_owner(&mut self, token: u64, priority: u8) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(Owner {
            token,
            thread: current_thread_name(),
            priority,
            inherited: priority,
        });
        true
    }

    fn register_waiter(&mut self, token: u64, priority: u8) {
        let mut inherited_by = None;
        if let Some(owner) = self.owner.as_mut() {
            if owner.token != token && priority > owner.inherited {
                owner.inherited = priority;
                inherited_by = Some((owner.thread.clone(), owner.priority));
            }
        }
        if let Some((holder, base)) = inherited_by {
            self.priority_inheritances += 1;
            tracing::debug!(
                holder = %holder,
                base_priority = base,
                inherited_priority = priority,
                "priority inheritance applied"
            );
        }
        self.waiters.insert(
            token,
            Waiter {
                since: Instant::now(),
                thread: current_thread_name(),
                priority,
                warned: false,
            },
        );
    }

    fn record_success(&mut self, waited: Duration) {
        let ops = self.insertions + self.removals;
        debug_assert!(ops > 0);
        self.avg_wait_secs =
            (self.avg_wait_secs * (ops - 1) as f64 + waited.as_secs_f64()) / ops as f64;
    }
}

fn current_thread_name() -> String {
    std::thread::current().name().unwrap_or("unnamed").to_string()
}

/// A fixed-capacity circular buffer guarded by one mutex and two condition
/// variables (not-full / not-empty).
///
/// Both `insert` and `remove` use predicate-guarded waits: the buffer
/// condition is re-checked after every wake, so spurious wakeups and
/// competing waiters are tolerated. Timeouts are monotonic deadlines computed
/// once per call; re-entering the wait loop only consumes the remaining
/// slice.
///
/// The monitor also keeps advisory diagnostics: waiters blocked past a
/// configurable threshold produce a warning log, and a waiter with a higher
/// priority than the thread currently inside the monitor raises that
/// holder's inherited priority. Neither affects wake order.
pub struct BoundedMonitor<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    deadlock_threshold: Duration,
    started: Instant,
    next_token: AtomicU64,
}

impl<T> BoundedMonitor<T> {
    /// Create a monitor with the default deadlock-warning threshold.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_DEADLOCK_THRESHOLD)
    }

    /// Create a monitor with a custom deadlock-warning threshold.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_threshold(capacity: usize, deadlock_threshold: Duration) -> Self {
        assert!(capacity > 0, "monitor capacity must be non-zero");
        let slots = (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
        Self {
            state: Mutex::new(State {
                slots,
                head: 0,
                tail: 0,
                count: 0,
                closed: false,
                waiters: HashMap::new(),
                owner: None,
                insertions: 0,
                removals: 0,
                timeouts: 0,
                priority_inheritances: 0,
                avg_wait_secs: 0.0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            deadlock_threshold,
            started: Instant::now(),
            next_token: AtomicU64::new(0),
        }
    }

    /// Insert an item, blocking while the buffer is full.
    ///
    /// `timeout` of `None` waits indefinitely. On timeout the buffer is left
    /// unchanged and the timeout counter is incremented.
    pub fn insert(&self, item: T, timeout: Option<Duration>) -> MonitorResult<()> {
        self.insert_with_priority(item, timeout, 0)
    }

    /// Insert with an explicit waiter priority.
    ///
    /// The priority is bookkeeping only: it feeds the priority-inheritance
    /// counters and logs but does not reorder the wait queue.
    pub fn insert_with_priority(
        &self,
        item: T,
        timeout: Option<Duration>,
        priority: u8,
    ) -> MonitorResult<()> {
        let begin = Instant::now();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(MonitorError::Closed);
        }
        let became_owner = state.claim_owner(token, priority);

        let outcome = self.block_while(state, &self.not_full, begin, timeout, token, priority, |s| {
            s.count == s.slots.len()
        });
        match outcome {
            Ok(mut state) => {
                let tail = state.tail;
                state.slots[tail] = Some(item);
                state.tail = (tail + 1) % self.capacity;
                state.count += 1;
                state.insertions += 1;
                state.record_success(begin.elapsed());
                if became_owner {
                    state.owner = None;
                }
                drop(state);
                self.not_empty.notify_one();
                Ok(())
            }
            Err((mut state, err)) => {
                if err.is_timeout() {
                    state.timeouts += 1;
                }
                if became_owner {
                    state.owner = None;
                }
                Err(err)
            }
        }
    }

    /// Remove the oldest item, blocking while the buffer is empty.
    pub fn remove(&self, timeout: Option<Duration>) -> MonitorResult<T> {
        self.remove_with_priority(timeout, 0)
    }

    /// Remove with an explicit waiter priority. See [`Self::insert_with_priority`].
    pub fn remove_with_priority(
        &self,
        timeout: Option<Duration>,
        priority: u8,
    ) -> MonitorResult<T> {
        let begin = Instant::now();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(MonitorError::Closed);
        }
        let became_owner = state.claim_owner(token, priority);

        let outcome = self.block_while(state, &self.not_empty, begin, timeout, token, priority, |s| {
            s.count == 0
        });
        match outcome {
            Ok(mut state) => {
                let head = state.head;
                let item = state.slots[head]
                    .take()
                    .expect("occupied slot accounted by count");
                state.head = (head + 1) % self.capacity;
                state.count -= 1;
                state.removals += 1;
                state.record_success(begin.elapsed());
                if became_owner {
                    state.owner = None;
                }
                drop(state);
                self.not_full.notify_one();
                Ok(item)
            }
            Err((mut state, err)) => {
                if err.is_timeout() {
                    state.timeouts += 1;
                }
                if became_owner {
                    state.owner = None;
                }
                Err(err)
            }
        }
    }

    /// Predicate-guarded wait shared by insert and remove.
    ///
    /// Registers the caller in the waiter map for the duration of the block
    /// and deregisters it on every exit path.
    #[allow(clippy::too_many_arguments)]
    fn block_while<'a>(
        &'a self,
        mut state: MutexGuard<'a, State<T>>,
        cv: &Condvar,
        begin: Instant,
        timeout: Option<Duration>,
        token: u64,
        priority: u8,
        blocked: impl Fn(&State<T>) -> bool,
    ) -> Result<MutexGuard<'a, State<T>>, (MutexGuard<'a, State<T>>, MonitorError)> {
        let deadline = timeout.map(|t| begin + t);
        let mut registered = false;
        loop {
            if state.closed {
                if registered {
                    state.waiters.remove(&token);
                }
                return Err((state, MonitorError::Closed));
            }
            if !blocked(&state) {
                if registered {
                    state.waiters.remove(&token);
                }
                return Ok(state);
            }
            if !registered {
                state.register_waiter(token, priority);
                registered = true;
            }
            self.warn_stalled_waiters(&mut state);

            state = match deadline {
                Some(deadline) => {
                    let remaining = match deadline.checked_duration_since(Instant::now()) {
                        Some(remaining) => remaining,
                        None => {
                            state.waiters.remove(&token);
                            let timeout = timeout.unwrap_or_default();
                            return Err((state, MonitorError::Timeout(timeout)));
                        }
                    };
                    let (guard, _) = cv.wait_timeout(state, remaining).unwrap();
                    guard
                }
                None => cv.wait(state).unwrap(),
            };
        }
    }

    /// Advisory deadlock heuristic: warn once per waiter blocked past the
    /// threshold. Never aborts a wait.
    fn warn_stalled_waiters(&self, state: &mut State<T>) {
        let threshold = self.deadlock_threshold;
        for (token, waiter) in state.waiters.iter_mut() {
            let waited = waiter.since.elapsed();
            if !waiter.warned && waited > threshold {
                waiter.warned = true;
                tracing::warn!(
                    waiter = *token,
                    thread = %waiter.thread,
                    priority = waiter.priority,
                    waited_ms = waited.as_millis() as u64,
                    "possible deadlock: waiter blocked past threshold"
                );
            }
        }
    }

    /// Close the monitor, waking every blocked caller with `Closed`.
    ///
    /// Idempotent; items still buffered are dropped with the monitor.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return;
        }
        state.closed = true;
        tracing::info!(
            len = state.count,
            waiters = state.waiters.len(),
            "monitor closed"
        );
        drop(state);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().count
    }

    /// True when no slots are occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer slot count, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Snapshot of counters and derived throughput, taken under the lock.
    pub fn stats(&self) -> MonitorStats {
        let state = self.state.lock().unwrap();
        let elapsed = self.started.elapsed().as_secs_f64();
        let ops = state.insertions + state.removals;
        MonitorStats {
            capacity: self.capacity,
            len: state.count,
            waiters: state.waiters.len(),
            insertions: state.insertions,
            removals: state.removals,
            timeouts: state.timeouts,
            priority_inheritances: state.priority_inheritances,
            avg_wait_secs: state.avg_wait_secs,
            elapsed_secs: elapsed,
            ops_per_sec: if elapsed > 0.0 { ops as f64 / elapsed } else { 0.0 },
        }
    }
}

impl<T> Drop for BoundedMonitor<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_then_remove() {
        let monitor = BoundedMonitor::new(4);
        monitor.insert(7, None).unwrap();
        assert_eq!(monitor.len(), 1);
        assert_eq!(monitor.remove(None).unwrap(), 7);
        assert!(monitor.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let monitor = BoundedMonitor::new(3);
        for i in 1..=3 {
            monitor.insert(i, None).unwrap();
        }
        assert_eq!(monitor.remove(None).unwrap(), 1);
        assert_eq!(monitor.remove(None).unwrap(), 2);
        assert_eq!(monitor.remove(None).unwrap(), 3);
    }

    #[test]
    fn test_wraparound() {
        let monitor = BoundedMonitor::new(2);
        monitor.insert(1, None).unwrap();
        monitor.insert(2, None).unwrap();
        assert_eq!(monitor.remove(None).unwrap(), 1);
        monitor.insert(3, None).unwrap();
        assert_eq!(monitor.remove(None).unwrap(), 2);
        assert_eq!(monitor.remove(None).unwrap(), 3);
    }

    #[test]
    fn test_remove_times_out_on_empty() {
        let monitor: BoundedMonitor<i32> = BoundedMonitor::new(2);
        let begin = Instant::now();
        let err = monitor.remove(Some(Duration::from_millis(50))).unwrap_err();
        assert!(err.is_timeout());
        assert!(begin.elapsed() >= Duration::from_millis(50));
        assert_eq!(monitor.stats().timeouts, 1);
    }

    #[test]
    fn test_insert_times_out_on_full() {
        let monitor = BoundedMonitor::new(1);
        monitor.insert(1, None).unwrap();
        let err = monitor
            .insert(2, Some(Duration::from_millis(50)))
            .unwrap_err();
        assert!(err.is_timeout());
        // The buffer is unchanged by the failed insert.
        assert_eq!(monitor.len(), 1);
        assert_eq!(monitor.remove(None).unwrap(), 1);
    }

    #[test]
    fn test_blocked_insert_wakes_on_remove() {
        let monitor = Arc::new(BoundedMonitor::new(1));
        monitor.insert(1, None).unwrap();

        let producer = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.insert(2, Some(Duration::from_secs(5))))
        };
        thread::sleep(Duration::from_millis(50));
        assert_eq!(monitor.remove(None).unwrap(), 1);
        producer.join().unwrap().unwrap();
        assert_eq!(monitor.remove(None).unwrap(), 2);
    }

    #[test]
    fn test_close_rejects_new_calls() {
        let monitor = BoundedMonitor::new(2);
        monitor.insert(1, None).unwrap();
        monitor.close();
        assert!(monitor.is_closed());
        assert!(monitor.insert(2, None).unwrap_err().is_closed());
        assert!(monitor.remove(None).unwrap_err().is_closed());
    }

    #[test]
    fn test_close_wakes_blocked_remover() {
        let monitor: Arc<BoundedMonitor<i32>> = Arc::new(BoundedMonitor::new(2));
        let consumer = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.remove(None))
        };
        thread::sleep(Duration::from_millis(50));
        monitor.close();
        let err = consumer.join().unwrap().unwrap_err();
        assert!(err.is_closed());
    }

    #[test]
    fn test_stats_counters() {
        let monitor = BoundedMonitor::new(4);
        monitor.insert(1, None).unwrap();
        monitor.insert(2, None).unwrap();
        monitor.remove(None).unwrap();
        monitor.remove(None).unwrap();
        let _ = monitor.remove(Some(Duration::from_millis(10)));
        let stats = monitor.stats();
        assert_eq!(stats.insertions, 2);
        assert_eq!(stats.removals, 2);
        assert_eq!(stats.timeouts, 1);
        assert_eq!(stats.len, 0);
        assert_eq!(stats.capacity, 4);
    }

    #[test]
    fn test_priority_inheritance_counted() {
        let monitor = Arc::new(BoundedMonitor::new(1));
        monitor.insert(0, None).unwrap();

        // First blocked inserter becomes the tracked holder.
        let low = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.insert_with_priority(1, None, 1))
        };
        thread::sleep(Duration::from_millis(50));

        // A higher-priority waiter arriving while the holder is active
        // raises the holder's inherited priority.
        let high = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || monitor.insert_with_priority(2, None, 9))
        };
        thread::sleep(Duration::from_millis(50));

        monitor.remove(None).unwrap();
        monitor.remove(None).unwrap();
        monitor.remove(None).unwrap();
        low.join().unwrap().unwrap();
        high.join().unwrap().unwrap();

        assert!(monitor.stats().priority_inheritances >= 1);
    }

    #[test]
    fn test_deadline_not_restarted_by_wakeups() {
        // Repeated signals that never satisfy the predicate must not extend
        // the overall deadline.
        let monitor: Arc<BoundedMonitor<i32>> = Arc::new(BoundedMonitor::new(2));
        let consumer = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                let begin = Instant::now();
                let err = monitor.remove(Some(Duration::from_millis(200))).unwrap_err();
                (err, begin.elapsed())
            })
        };
        // Poke the condvar a few times without making the buffer non-empty.
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(30));
            monitor.not_empty.notify_all();
        }
        let (err, elapsed) = consumer.join().unwrap();
        assert!(err.is_timeout());
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(600));
    }
}
