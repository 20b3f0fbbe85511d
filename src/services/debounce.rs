//! Trailing-edge debouncing for values and actions.
//!
//! Both primitives own at most one [`TimerHandle`]; replacing or dropping it
//! aborts the pending task, so nothing fires after its owner is gone.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

/// Exclusively owned handle to a scheduled timer task. Aborts the task on drop.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Runs `on_elapsed` once `delay` has passed, unless the handle is dropped first
    pub fn spawn<F>(delay: Duration, on_elapsed: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let deadline = tokio::time::Instant::now() + delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_elapsed.await;
        });
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Channels shared between a scheduler and its timer task
struct Shared<T> {
    value: watch::Sender<T>,
    pending: watch::Sender<bool>,
}

/// Debounces a changing value: only the latest input survives a quiet period.
///
/// `Idle -> Pending -> Settled`: [`schedule`](Self::schedule) restarts the
/// timer with the newest value; when it elapses the value is published to
/// subscribers and the scheduler stops being pending.
pub struct DebounceScheduler<T> {
    delay: Duration,
    latest: T,
    shared: Arc<Shared<T>>,
    timer: Option<TimerHandle>,
}

impl<T> DebounceScheduler<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (value, _) = watch::channel(initial.clone());
        let (pending, _) = watch::channel(false);

        Self {
            delay,
            latest: initial,
            shared: Arc::new(Shared { value, pending }),
            timer: None,
        }
    }

    /// Replaces any pending value with `value`, published after the default delay
    pub fn update(&mut self, value: T) {
        self.schedule(value, self.delay);
    }

    /// Replaces any pending value with `value`, published once `delay` passes without a newer call
    pub fn schedule(&mut self, value: T, delay: Duration) {
        // Dropping the old handle invalidates its timer before the new one starts
        self.timer.take();
        self.latest = value.clone();

        if *self.shared.value.borrow() != value {
            self.shared.pending.send_replace(true);
        }

        let shared = Arc::clone(&self.shared);
        self.timer = Some(TimerHandle::spawn(delay, async move {
            shared.value.send_replace(value);
            shared.pending.send_replace(false);
        }));
    }

    /// Publishes the latest input right away and clears the pending state
    pub fn cancel(&mut self) {
        self.timer.take();
        self.shared.value.send_replace(self.latest.clone());
        self.shared.pending.send_replace(false);
    }

    /// Same effect as [`cancel`](Self::cancel); reads better at call sites that want the value now
    pub fn flush(&mut self) {
        self.cancel();
    }

    /// Changes the delay used by [`update`](Self::update).
    ///
    /// A value still waiting out its quiet period is rescheduled with the new delay.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
        let waiting = self.timer.take().is_some_and(|timer| !timer.is_finished());
        if waiting {
            self.schedule(self.latest.clone(), delay);
        }
    }

    /// Current debounced value
    pub fn value(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Most recent input, settled or not
    pub fn latest(&self) -> &T {
        &self.latest
    }

    pub fn is_pending(&self) -> bool {
        *self.shared.pending.borrow()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Receiver that observes each published value
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.shared.value.subscribe()
    }

    /// Receiver that observes the pending flag
    pub fn pending(&self) -> watch::Receiver<bool> {
        self.shared.pending.subscribe()
    }
}

/// Debounces invocations of an action: only the last call in a quiet window runs.
pub struct DebouncedCallback<A> {
    delay: Duration,
    action: Arc<dyn Fn(A) + Send + Sync>,
    timer: Option<TimerHandle>,
}

impl<A> DebouncedCallback<A>
where
    A: Send + 'static,
{
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            delay,
            action: Arc::new(action),
            timer: None,
        }
    }

    /// Schedules the action with `args`, superseding any call still waiting
    pub fn call(&mut self, args: A) {
        self.timer.take();
        let action = Arc::clone(&self.action);
        self.timer = Some(TimerHandle::spawn(self.delay, async move {
            action(args);
        }));
    }

    /// Drops the waiting invocation, if any, without running it
    pub fn cancel(&mut self) {
        self.timer.take();
    }

    pub fn is_scheduled(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::{sleep, sleep_until, Instant};

    const DELAY: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_is_published() {
        let mut scheduler = DebounceScheduler::new(String::new(), DELAY);
        let mut rx = scheduler.subscribe();
        let start = Instant::now();

        scheduler.update("n".to_string());
        sleep(ms(50)).await;
        scheduler.update("na".to_string());
        sleep(ms(30)).await;
        scheduler.update("nar".to_string());
        assert!(scheduler.is_pending());

        // t0 + 579ms: the last timer is due at t0 + 580ms
        sleep_until(start + ms(579)).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(scheduler.value(), "");
        assert!(scheduler.is_pending());

        sleep_until(start + ms(600)).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "nar");
        assert_eq!(scheduler.value(), "nar");
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_flush_publish_immediately() {
        let mut scheduler = DebounceScheduler::new(0u32, DELAY);

        scheduler.update(1);
        scheduler.cancel();
        assert_eq!(scheduler.value(), 1);
        assert!(!scheduler.is_pending());

        scheduler.update(2);
        scheduler.flush();
        assert_eq!(scheduler.value(), 2);

        // The released timer must not republish anything later
        let rx = scheduler.subscribe();
        sleep(DELAY * 2).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(scheduler.value(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_value_is_not_pending() {
        let mut scheduler = DebounceScheduler::new("naruto".to_string(), DELAY);
        scheduler.update("naruto".to_string());
        assert!(!scheduler.is_pending());

        scheduler.schedule("bleach".to_string(), ms(10));
        assert!(scheduler.is_pending());
        sleep(ms(20)).await;
        assert_eq!(scheduler.value(), "bleach");

        // Returning to the published value leaves the flag raised until the timer fires
        scheduler.update("monster".to_string());
        scheduler.update("bleach".to_string());
        assert!(scheduler.is_pending());
        sleep(DELAY + ms(1)).await;
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.value(), "bleach");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_delay_reschedules_pending_value() {
        let mut scheduler = DebounceScheduler::new(0u32, DELAY);
        let start = Instant::now();

        scheduler.update(7);
        scheduler.set_delay(ms(100));
        assert_eq!(scheduler.delay(), ms(100));
        assert!(scheduler.is_pending());

        sleep_until(start + ms(99)).await;
        assert_eq!(scheduler.value(), 0);

        sleep_until(start + ms(101)).await;
        assert_eq!(scheduler.value(), 7);
        assert_eq!(*scheduler.latest(), 7);
        assert!(!scheduler.is_pending());

        // Nothing waiting: only the delay changes
        let rx = scheduler.subscribe();
        scheduler.set_delay(DELAY);
        sleep(DELAY * 2).await;
        assert!(!rx.has_changed().unwrap());
        assert!(!scheduler.is_pending());

        scheduler.update(8);
        sleep(DELAY + ms(1)).await;
        assert_eq!(scheduler.value(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_timer() {
        let scheduler = {
            let mut scheduler = DebounceScheduler::new(0u8, DELAY);
            scheduler.update(9);
            scheduler
        };
        let rx = scheduler.subscribe();
        drop(scheduler);

        sleep(DELAY * 2).await;
        assert_eq!(*rx.borrow(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_runs_once_with_last_args() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let mut callback = DebouncedCallback::new(DELAY, move |(query, top_n): (String, u32)| {
            sink.lock().unwrap().push((query, top_n));
        });

        callback.call(("one".to_string(), 5));
        sleep(ms(100)).await;
        callback.call(("one piece".to_string(), 10));
        assert!(callback.is_scheduled());

        sleep(DELAY + ms(1)).await;
        assert_eq!(*calls.lock().unwrap(), vec![("one piece".to_string(), 10)]);
        assert!(!callback.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_dropped_before_firing_never_runs() {
        let calls = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&calls);
        let mut callback = DebouncedCallback::new(DELAY, move |_: ()| {
            *sink.lock().unwrap() += 1;
        });

        callback.call(());
        drop(callback);
        sleep(DELAY * 2).await;
        assert_eq!(*calls.lock().unwrap(), 0);

        let sink = Arc::clone(&calls);
        let mut callback = DebouncedCallback::new(DELAY, move |_: ()| {
            *sink.lock().unwrap() += 1;
        });
        callback.call(());
        callback.cancel();
        sleep(DELAY * 2).await;
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
