// Countdown timer driven by the frame tick.
//
// Listeners are boxed closures owned by the timer; dropping or reconfiguring the timer with
// `clear_listeners` drops them. The world itself reacts to the returned `TimerStep` instead.

use std::fmt;

pub type TimerListener = Box<dyn FnMut(f32) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Outcome of a single running tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerStep {
    pub progress: f32,
    pub finished: bool,
}

#[derive(Default)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
    running: bool,
    finished: bool,
    next_listener: u64,
    update_listeners: Vec<(ListenerId, TimerListener)>,
    complete_listeners: Vec<(ListenerId, TimerListener)>,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        let mut timer = Self::default();
        timer.configure(duration, false);
        timer
    }

    /// Sets a new duration, resets elapsed time and leaves the timer stopped.
    pub fn configure(&mut self, duration: f32, clear_listeners: bool) {
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.running = false;
        self.finished = false;
        if clear_listeners {
            self.clear_listeners();
        }
    }

    /// Starts counting from zero, restarting if already running.
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.finished = false;
        self.running = true;
    }

    /// Halts without firing completion.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.finished || self.running { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Advances a running timer. Returns `None` while stopped.
    pub fn tick(&mut self, dt: f32) -> Option<TimerStep> {
        if !self.running {
            return None;
        }

        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let done = self.elapsed >= self.duration;
        let progress = if done { 1.0 } else { self.progress() };

        for (_, listener) in self.update_listeners.iter_mut() {
            listener(progress);
        }

        if done {
            self.running = false;
            self.finished = true;
            for (_, listener) in self.complete_listeners.iter_mut() {
                listener(1.0);
            }
        }

        Some(TimerStep {
            progress,
            finished: done,
        })
    }

    pub fn on_update(&mut self, listener: impl FnMut(f32) + Send + 'static) -> ListenerId {
        let id = self.next_id();
        self.update_listeners.push((id, Box::new(listener)));
        id
    }

    pub fn on_complete(&mut self, listener: impl FnMut(f32) + Send + 'static) -> ListenerId {
        let id = self.next_id();
        self.complete_listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.update_listeners.len() + self.complete_listeners.len();
        self.update_listeners.retain(|(listener, _)| *listener != id);
        self.complete_listeners.retain(|(listener, _)| *listener != id);
        before != self.update_listeners.len() + self.complete_listeners.len()
    }

    pub fn clear_listeners(&mut self) {
        self.update_listeners.clear();
        self.complete_listeners.clear();
    }

    fn next_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId(self.next_listener)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("running", &self.running)
            .field("finished", &self.finished)
            .field("update_listeners", &self.update_listeners.len())
            .field("complete_listeners", &self.complete_listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn run_to_completion(duration: f32, dt: f32) -> (Vec<f32>, Vec<f32>) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let completions = Arc::new(Mutex::new(Vec::new()));
        let mut timer = Timer::new(duration);
        {
            let updates = Arc::clone(&updates);
            timer.on_update(move |progress| updates.lock().expect("updates").push(progress));
        }
        {
            let completions = Arc::clone(&completions);
            timer.on_complete(move |progress| {
                completions.lock().expect("completions").push(progress)
            });
        }

        timer.start();
        for _ in 0..200 {
            timer.tick(dt);
        }

        let updates = updates.lock().expect("updates").clone();
        let completions = completions.lock().expect("completions").clone();
        (updates, completions)
    }

    #[test]
    fn when_ticked_at_sixty_hz_then_completes_exactly_once_at_full_progress() {
        let (updates, completions) = run_to_completion(0.4, 1.0 / 60.0);

        assert_eq!(completions, vec![1.0]);
        assert_eq!(updates.last().copied(), Some(1.0));
        assert!(updates.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn when_ticked_at_ten_hz_then_completes_exactly_once_at_full_progress() {
        let (updates, completions) = run_to_completion(0.3, 1.0 / 10.0);

        assert_eq!(completions, vec![1.0]);
        assert_eq!(updates.last().copied(), Some(1.0));
        assert!(updates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn when_stopped_early_then_completion_never_fires() {
        let mut timer = Timer::new(0.3);
        let fired = Arc::new(Mutex::new(0));
        {
            let fired = Arc::clone(&fired);
            timer.on_complete(move |_| *fired.lock().expect("fired") += 1);
        }

        timer.start();
        timer.tick(0.1);
        timer.stop();
        for _ in 0..10 {
            assert!(timer.tick(0.1).is_none());
        }

        assert_eq!(*fired.lock().expect("fired"), 0);
        assert!(!timer.is_finished());
    }

    #[test]
    fn when_duration_is_zero_then_first_tick_finishes() {
        let mut timer = Timer::new(0.0);
        timer.start();

        let step = timer.tick(1.0 / 60.0).expect("running timer should step");

        assert_eq!(step.progress, 1.0);
        assert!(step.finished);
        assert!(!timer.is_running());
    }

    #[test]
    fn when_listener_is_removed_then_it_is_not_called() {
        let mut timer = Timer::new(0.1);
        let calls = Arc::new(Mutex::new(0));
        let id = {
            let calls = Arc::clone(&calls);
            timer.on_update(move |_| *calls.lock().expect("calls") += 1)
        };

        assert!(timer.remove_listener(id));
        assert!(!timer.remove_listener(id));
        timer.start();
        timer.tick(0.05);

        assert_eq!(*calls.lock().expect("calls"), 0);
    }

    #[test]
    fn when_reconfigured_with_clear_then_listeners_are_dropped() {
        let mut timer = Timer::new(0.1);
        timer.on_update(|_| {});
        timer.on_complete(|_| {});

        timer.configure(0.5, true);

        assert_eq!(timer.duration(), 0.5);
        assert!(!timer.is_running());
        assert!(format!("{timer:?}").contains("update_listeners: 0"));
    }
}
