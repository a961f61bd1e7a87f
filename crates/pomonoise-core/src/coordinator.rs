//! Session coordinator.
//!
//! Routes user intents to the [`TimerEngine`] and keeps the noise bed in step
//! with it: noise loops only while the timer runs. When a session finishes it
//! rings the alarm, sends a notification and hands focus sessions to the work
//! log.
//!
//! Collaborator failures are logged and swallowed here; they never change
//! timer state or block the log write.

use std::time::Duration;

use chrono::Local;

use crate::audio::{Alarm, AudioOutput, PlaybackController, PlaybackState, SilentAlarm};
use crate::events::{Event, FinishEvent};
use crate::noise::NoiseColor;
use crate::notify::{finish_message, LogNotifier, Notifier, FINISHED_TITLE};
use crate::storage::{LogEntry, LogWriter};
use crate::timer::{ManualScheduler, SessionMode, TickHandle, TickScheduler, TimerEngine};

/// Spacing between ticks while running.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub struct SessionCoordinator<S: TickScheduler, O: AudioOutput> {
    engine: TimerEngine,
    playback: PlaybackController<O>,
    scheduler: S,
    alarm: Box<dyn Alarm>,
    notifier: Box<dyn Notifier>,
    log: Option<Box<dyn LogWriter>>,
    task_name: String,
}

impl<S: TickScheduler, O: AudioOutput> SessionCoordinator<S, O> {
    pub fn new(engine: TimerEngine, playback: PlaybackController<O>, scheduler: S) -> Self {
        Self {
            engine,
            playback,
            scheduler,
            alarm: Box::new(SilentAlarm),
            notifier: Box::new(LogNotifier),
            log: None,
            task_name: String::new(),
        }
    }

    pub fn with_alarm(mut self, alarm: impl Alarm + 'static) -> Self {
        self.alarm = Box::new(alarm);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_log_writer(mut self, log: impl LogWriter + 'static) -> Self {
        self.log = Some(Box::new(log));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn playback(&self) -> &PlaybackController<O> {
        &self.playback
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn set_task_name(&mut self, name: impl Into<String>) {
        self.task_name = name.into();
    }

    // ── Intents ──────────────────────────────────────────────────────

    /// Start/pause toggle. Noise follows the resulting state.
    pub fn on_start_requested(&mut self) -> Option<Event> {
        self.disarm_tick();
        let event = self.engine.start();
        if self.engine.is_running() {
            self.arm_tick();
            self.playback.play();
            tracing::info!(mode = %self.engine.mode(), remaining = %self.engine.display(), "session running");
        } else {
            self.playback.stop();
            tracing::info!(remaining = %self.engine.display(), "session paused");
        }
        event
    }

    pub fn on_pause(&mut self) -> Option<Event> {
        self.disarm_tick();
        let event = self.engine.pause();
        self.playback.stop();
        event
    }

    pub fn on_reset(&mut self) -> Option<Event> {
        self.disarm_tick();
        let event = self.engine.reset();
        self.playback.stop();
        tracing::info!(mode = %self.engine.mode(), "session reset");
        event
    }

    pub fn on_mode_changed(&mut self, mode: SessionMode) -> Option<Event> {
        self.disarm_tick();
        let event = self.engine.change_mode(mode);
        self.playback.stop();
        tracing::info!(%mode, "mode changed");
        event
    }

    /// Deliver a fired tick. Returns the finish event when this tick ended
    /// the session.
    pub fn on_tick_fired(&mut self, handle: TickHandle) -> Option<FinishEvent> {
        if self.engine.pending_tick() != Some(handle) {
            tracing::debug!(tick = handle.id(), "dropping stale tick");
            return None;
        }

        match self.engine.tick_from(handle) {
            Some(Event::SessionFinished(finish)) => {
                self.finish(&finish);
                Some(finish)
            }
            _ => {
                if self.engine.is_running() {
                    self.arm_tick();
                    // Covers a buffer that wasn't ready when the session started.
                    self.playback.play();
                }
                None
            }
        }
    }

    /// Select a noise color. Only a running session makes it audible.
    pub fn on_color_changed(&mut self, color: Option<NoiseColor>) {
        self.playback.set_color(color);
        if self.engine.is_running() {
            self.playback.play();
        }
    }

    pub fn on_volume_changed(&mut self, gain: f32) {
        self.playback.set_gain(gain);
    }

    /// Begin producing the selected color's buffer in the background.
    pub fn prepare(&mut self) {
        self.playback.prepare();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm_tick(&mut self) {
        self.disarm_tick();
        let handle = self.scheduler.schedule_tick(TICK_INTERVAL);
        if let Some(stale) = self.engine.arm(handle) {
            self.scheduler.cancel(stale);
        }
    }

    fn disarm_tick(&mut self) {
        if let Some(handle) = self.engine.cancel_pending() {
            self.scheduler.cancel(handle);
        }
    }

    fn finish(&mut self, finish: &FinishEvent) {
        self.playback.stop();
        tracing::info!(mode = %finish.mode, minutes = finish.elapsed_minutes, "session finished");

        self.alarm.ring();

        if let Err(e) = self
            .notifier
            .notify(FINISHED_TITLE, finish_message(finish.mode))
        {
            tracing::warn!(error = %e, "notification failed");
        }

        if !finish.mode.is_focus() {
            return;
        }
        if let Some(log) = self.log.as_mut() {
            let entry = LogEntry::from_finish(finish, &self.task_name, finish.at.with_timezone(&Local));
            if let Err(e) = log.write(&entry) {
                tracing::warn!(error = %e, "failed to write work log entry");
            }
        }
    }
}

impl<O: AudioOutput> SessionCoordinator<ManualScheduler, O> {
    /// Move the virtual clock forward, delivering every tick that comes due
    /// (including ticks armed along the way).
    pub fn advance(&mut self, by: Duration) -> Vec<FinishEvent> {
        let target = self.scheduler.now() + by;
        let mut finished = Vec::new();
        loop {
            let step = target.saturating_sub(self.scheduler.now()).min(TICK_INTERVAL);
            let fired = self.scheduler.advance(step);
            for handle in fired {
                finished.extend(self.on_tick_fired(handle));
            }
            if self.scheduler.now() >= target {
                break;
            }
        }
        finished
    }
}
