//! Focus session controller.
//!
//! Owns "which task is being timed right now and in what mode". All timing
//! arithmetic is delegated to [`TaskTimer`]; after each state-affecting
//! operation the affected tasks are handed to the [`TaskRepository`].
//!
//! The controller is a plain owned value: hosts construct it at startup and
//! pass it around (or wrap it in a [`super::FocusHandle`] when several threads
//! need it). Every operation takes the caller's `now`.
//!
//! ## Invariants
//!
//! - At most one task is focused.
//! - A task that loses focus through `switch_to` is stopped before the new
//!   one starts, so two tasks are never running because of a switch.
//! - Persistence failures are logged and kept for `take_persist_error`; the
//!   in-memory state is never rolled back.
//! - The pomodoro phase clock is frozen exactly while the focused task is
//!   paused. Completing or dismissing the task lets it run again.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::session::{FocusPhase, FocusSession, TimerMode};
use super::snapshot::{FocusSnapshot, PomodoroSnapshot};
use crate::error::{FocusError, RepositoryError, TimerError};
use crate::events::Event;
use crate::repository::TaskRepository;
use crate::task::{TaskRun, TaskSnapshot, TimingRecord};
use crate::timer::{PomodoroSettings, PomodoroState, TaskTimer};

pub struct FocusSessionController<R> {
    repo: R,
    settings: PomodoroSettings,
    session: FocusSession,
    focused: Option<TaskSnapshot>,
    dismissed: Option<TaskSnapshot>,
    last_persist_error: Option<RepositoryError>,
}

impl<R: TaskRepository> FocusSessionController<R> {
    /// Create an idle controller in stopwatch mode.
    pub fn new(repo: R, settings: PomodoroSettings) -> Self {
        Self::with_mode(repo, settings, TimerMode::Stopwatch)
    }

    /// Create an idle controller in the given mode.
    ///
    /// Starting directly in pomodoro mode leaves the cycle unstarted; the
    /// first operation that needs the phase clock starts it.
    pub fn with_mode(repo: R, settings: PomodoroSettings, mode: TimerMode) -> Self {
        Self {
            repo,
            settings,
            session: FocusSession::new(mode),
            focused: None,
            dismissed: None,
            last_persist_error: None,
        }
    }

    /// Rebuild a controller from a stored session.
    ///
    /// Focused and dismissed tasks are re-read from the repository. Tasks that
    /// no longer exist are dropped from the session.
    pub fn restore(
        repo: R,
        settings: PomodoroSettings,
        session: FocusSession,
    ) -> Result<Self, FocusError> {
        let mut controller = Self {
            repo,
            settings,
            session,
            focused: None,
            dismissed: None,
            last_persist_error: None,
        };

        if let Some(id) = controller.session.focused_task_id.clone() {
            match controller.repo.fetch(&id)? {
                Some(task) => {
                    if !controller.session.completing {
                        controller.session.is_paused = !task.is_in_progress();
                    }
                    controller.focused = Some(task);
                }
                None => {
                    warn!(task_id = %id, "focused task no longer exists, clearing focus");
                    controller.session.focused_task_id = None;
                    controller.session.completing = false;
                    controller.session.is_paused = false;
                }
            }
        }

        if let Some(id) = controller.session.dismissed_task_id.clone() {
            match controller.repo.fetch(&id)? {
                Some(task) => controller.dismissed = Some(task),
                None => {
                    warn!(task_id = %id, "dismissed task no longer exists");
                    controller.session.dismissed_task_id = None;
                }
            }
        }

        Ok(controller)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &FocusSession {
        &self.session
    }

    pub fn phase(&self) -> FocusPhase {
        self.session.phase()
    }

    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    pub fn focused_task(&self) -> Option<&TaskSnapshot> {
        self.focused.as_ref()
    }

    pub fn dismissed_task(&self) -> Option<&TaskSnapshot> {
        self.dismissed.as_ref()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Direct repository access for task CRUD. Timing fields of the focused
    /// or dismissed task must not be changed through it.
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    /// The most recent persistence failure, if any, clearing it.
    pub fn take_persist_error(&mut self) -> Option<RepositoryError> {
        self.last_persist_error.take()
    }

    /// Elapsed time of the focused task as of `now`.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.focused.as_ref().map(|t| TaskTimer::elapsed(t, now))
    }

    /// Remaining time of the current pomodoro phase. `None` outside pomodoro mode.
    pub fn pomodoro_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.session.timer_mode == TimerMode::Pomodoro)
            .then(|| self.session.pomodoro.remaining(&self.settings, now))
    }

    pub fn is_interval_complete(&self, now: DateTime<Utc>) -> bool {
        self.session.timer_mode == TimerMode::Pomodoro
            && self.session.pomodoro.is_interval_complete(&self.settings, now)
    }

    /// Copy of the session with derived values computed at `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> FocusSnapshot {
        let task = self.focused.clone();
        let elapsed_ms = task
            .as_ref()
            .map(|t| TaskTimer::elapsed(t, now).num_milliseconds())
            .unwrap_or(0);
        let progress_ratio = task
            .as_ref()
            .map(|t| TaskTimer::progress_ratio(t, now))
            .unwrap_or(0.0);
        let countdown_remaining_ms = match (self.session.timer_mode, task.as_ref()) {
            (TimerMode::Timer, Some(t)) => {
                TaskTimer::countdown_remaining(t, now).map(|d| d.num_milliseconds())
            }
            _ => None,
        };
        let pomodoro = (self.session.timer_mode == TimerMode::Pomodoro).then(|| {
            let p = &self.session.pomodoro;
            PomodoroSnapshot {
                phase: p.phase(),
                completed_intervals: p.completed_intervals(),
                interval_ms: p.interval(&self.settings).num_milliseconds(),
                remaining_ms: p.remaining(&self.settings, now).num_milliseconds(),
                interval_complete: p.is_interval_complete(&self.settings, now),
                paused: p.is_paused(),
            }
        });

        FocusSnapshot {
            phase: self.session.phase(),
            timer_mode: self.session.timer_mode,
            task,
            elapsed_ms,
            progress_ratio,
            countdown_remaining_ms,
            pomodoro,
            dismissed_task_id: self.session.dismissed_task_id.clone(),
            at: now,
        }
    }

    // ── Focus commands ───────────────────────────────────────────────

    /// Focus a task and make sure its timer runs.
    ///
    /// An already running task keeps its `started_at`. When another task is
    /// focused this is a [`switch_to`](Self::switch_to).
    pub fn enter_focus(&mut self, task_id: &str, now: DateTime<Utc>) -> Result<Event, FocusError> {
        self.ensure_not_completing()?;
        if let Some(current) = self.session.focused_task_id.as_deref() {
            if current != task_id {
                return self.switch_to(task_id, now);
            }
        }

        let task = self.load_task(task_id)?;
        if task.is_completed {
            return Err(FocusError::TaskAlreadyCompleted(task.id));
        }
        let (task, resumed) = start_if_stopped(&task, now)?;

        // A dismissed task that is still running must not keep running
        // behind a different focus.
        let released = match &self.dismissed {
            Some(d) if d.id != task_id && d.is_in_progress() => Some(stop_if_running(d, now)?),
            _ => None,
        };

        self.dismissed = None;
        self.session.dismissed_task_id = None;
        if let Some((stopped, run)) = released {
            debug!(task_id = %stopped.id, "stopping dismissed task before new focus");
            self.commit_stopped(&stopped, run);
        }

        self.session.focused_task_id = Some(task.id.clone());
        self.session.is_paused = false;
        self.session.pomodoro.resume(now);
        self.ensure_cycle_started(now);
        self.persist(&task);
        debug!(task_id = %task.id, resumed, "focus entered");
        self.focused = Some(task);

        Ok(Event::FocusEntered {
            task_id: task_id.to_string(),
            resumed,
            at: now,
        })
    }

    /// Pause a running focused task (banking its time) or resume a paused one.
    pub fn toggle_pause(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        let task = self.focused.clone().ok_or(FocusError::NoFocusedTask)?;
        self.ensure_not_completing()?;
        self.ensure_cycle_started(now);

        if task.is_in_progress() {
            let (paused, banked) = self.pause_focused(&task, now)?;
            Ok(Event::FocusPaused {
                task_id: paused.id.clone(),
                banked_ms: banked.num_milliseconds(),
                accumulated_ms: paused.accumulated().num_milliseconds(),
                at: now,
            })
        } else {
            let running = TaskTimer::resume(&task, now)?;
            self.session.is_paused = false;
            self.session.pomodoro.resume(now);
            self.persist(&running);
            debug!(task_id = %running.id, "focus resumed");
            self.focused = Some(running);
            Ok(Event::FocusResumed {
                task_id: task.id,
                at: now,
            })
        }
    }

    /// Step away: pause the timer without touching mode or pomodoro counters.
    pub fn take_break(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        let task = self.focused.clone().ok_or(FocusError::NoFocusedTask)?;
        self.ensure_not_completing()?;
        self.ensure_cycle_started(now);

        let banked = if task.is_in_progress() {
            self.pause_focused(&task, now)?.1
        } else {
            Duration::zero()
        };
        Ok(Event::BreakTaken {
            task_id: task.id,
            banked_ms: banked.num_milliseconds(),
            at: now,
        })
    }

    /// Hide the focus experience. The task's clock keeps its current state.
    pub fn dismiss_focus(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        if self.focused.is_none() {
            return Err(FocusError::NoFocusedTask);
        }
        self.ensure_not_completing()?;
        let task = self.focused.take().ok_or(FocusError::NoFocusedTask)?;

        self.session.focused_task_id = None;
        self.session.is_paused = false;
        self.session.dismissed_task_id = Some(task.id.clone());
        self.session.pomodoro.resume(now);
        let still_running = task.is_in_progress();
        debug!(task_id = %task.id, still_running, "focus dismissed");
        let task_id = task.id.clone();
        self.dismissed = Some(task);

        Ok(Event::FocusDismissed {
            task_id,
            still_running,
            at: now,
        })
    }

    /// Bring back the last dismissed task without touching its timer.
    pub fn reopen_focus(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        if let Some(task_id) = self.session.focused_task_id.clone() {
            return Err(FocusError::AlreadyFocused { task_id });
        }
        let task = self.dismissed.take().ok_or(FocusError::NothingToReopen)?;

        self.session.dismissed_task_id = None;
        self.session.focused_task_id = Some(task.id.clone());
        self.session.is_paused = !task.is_in_progress();
        if self.session.is_paused {
            self.session.pomodoro.pause(now);
        }
        let task_id = task.id.clone();
        self.focused = Some(task);

        Ok(Event::FocusReopened { task_id, at: now })
    }

    /// Move focus to another task, banking the current one first.
    ///
    /// The new task is fetched before anything changes, so a failed fetch
    /// leaves the current focus intact.
    pub fn switch_to(&mut self, task_id: &str, now: DateTime<Utc>) -> Result<Event, FocusError> {
        self.ensure_not_completing()?;
        let current = match self.focused.clone() {
            Some(current) if current.id != task_id => current,
            _ => return self.enter_focus(task_id, now),
        };

        let next = self.load_task(task_id)?;
        if next.is_completed {
            return Err(FocusError::TaskAlreadyCompleted(next.id));
        }
        let (old, run) = stop_if_running(&current, now)?;
        let (next, resumed) = start_if_stopped(&next, now)?;
        let banked_ms = run.as_ref().map(|r| r.duration.num_milliseconds()).unwrap_or(0);

        self.commit_stopped(&old, run);
        self.session.focused_task_id = Some(next.id.clone());
        self.session.is_paused = false;
        self.session.pomodoro.resume(now);
        self.ensure_cycle_started(now);
        self.persist(&next);
        debug!(from = %old.id, to = %next.id, banked_ms, "focus switched");
        self.focused = Some(next);

        Ok(Event::FocusSwitched {
            from_task: old.id,
            to_task: task_id.to_string(),
            banked_ms,
            resumed,
            at: now,
        })
    }

    /// Stop the focused task's clock, mark it completed, and wait for
    /// [`finish_completion`](Self::finish_completion).
    pub fn mark_complete(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        let task = self.focused.clone().ok_or(FocusError::NoFocusedTask)?;
        self.ensure_not_completing()?;

        let (mut done, run) = stop_if_running(&task, now)?;
        let banked_ms = run.as_ref().map(|r| r.duration.num_milliseconds()).unwrap_or(0);
        done.is_completed = true;

        self.session.completing = true;
        self.session.is_paused = false;
        self.session.pomodoro.resume(now);
        self.persist(&done);
        if let Some(run) = run {
            self.log_run(&run);
        }
        debug!(task_id = %done.id, banked_ms, "task completed");
        let accumulated_ms = done.accumulated().num_milliseconds();
        self.focused = Some(done);

        Ok(Event::TaskCompleted {
            task_id: task.id,
            banked_ms,
            accumulated_ms,
            at: now,
        })
    }

    /// Leave the completing state and return to idle.
    pub fn finish_completion(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        if !self.session.completing {
            return Err(FocusError::NotCompleting);
        }
        let task_id = self
            .session
            .focused_task_id
            .take()
            .ok_or(FocusError::NoFocusedTask)?;
        self.session.completing = false;
        self.session.is_paused = false;
        self.focused = None;

        Ok(Event::CompletionFinished { task_id, at: now })
    }

    // ── Timer mode & pomodoro ────────────────────────────────────────

    /// Change the timer mode. Entering pomodoro starts a fresh cycle; leaving
    /// it discards all pomodoro progress.
    pub fn set_timer_mode(&mut self, mode: TimerMode, now: DateTime<Utc>) -> Event {
        let from = self.session.timer_mode;
        if from != mode {
            self.session.pomodoro = if mode == TimerMode::Pomodoro {
                self.fresh_cycle(now)
            } else {
                PomodoroState::default()
            };
            self.session.timer_mode = mode;
            debug!(%from, to = %mode, "timer mode changed");
        } else {
            self.ensure_cycle_started(now);
        }
        Event::TimerModeChanged {
            from,
            to: mode,
            at: now,
        }
    }

    /// Replace the interval configuration. Takes effect on the next query.
    pub fn set_pomodoro_settings(&mut self, settings: PomodoroSettings) {
        self.settings = settings;
    }

    /// Leave the work phase for a break, counting one completed interval.
    ///
    /// Early breaks count as completed intervals too; with
    /// `allow_early_break` off they are refused instead.
    pub fn start_pomodoro_break(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        self.ensure_pomodoro()?;
        if self.session.pomodoro.is_on_break() {
            return Err(FocusError::AlreadyOnBreak);
        }
        let mut cycle = match self.session.pomodoro.phase_started_at() {
            Some(_) => self.session.pomodoro.clone(),
            None => self.fresh_cycle(now),
        };
        let remaining = cycle.remaining(&self.settings, now);
        let early = remaining > Duration::zero();
        if early && !self.settings.allow_early_break {
            return Err(FocusError::IntervalNotComplete {
                remaining_ms: remaining.num_milliseconds(),
            });
        }

        cycle.start_break(now);
        self.session.pomodoro = cycle;
        let completed_intervals = self.session.pomodoro.completed_intervals();
        debug!(completed_intervals, early, "pomodoro break started");
        Ok(Event::PomodoroBreakStarted {
            completed_intervals,
            break_ms: self
                .session
                .pomodoro
                .interval(&self.settings)
                .num_milliseconds(),
            early,
            at: now,
        })
    }

    /// End the break and start the next work interval.
    pub fn end_pomodoro_break(&mut self, now: DateTime<Utc>) -> Result<Event, FocusError> {
        self.ensure_pomodoro()?;
        if !self.session.pomodoro.is_on_break() {
            return Err(FocusError::NotOnBreak);
        }
        self.session.pomodoro.end_break(now);
        Ok(Event::PomodoroBreakEnded {
            completed_intervals: self.session.pomodoro.completed_intervals(),
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_not_completing(&self) -> Result<(), FocusError> {
        if self.session.completing {
            return Err(FocusError::CompletionPending {
                task_id: self.session.focused_task_id.clone().unwrap_or_default(),
            });
        }
        Ok(())
    }

    fn ensure_pomodoro(&self) -> Result<(), FocusError> {
        if self.session.timer_mode != TimerMode::Pomodoro {
            return Err(FocusError::NotInPomodoroMode);
        }
        Ok(())
    }

    /// A new cycle starting at `now`, frozen if the focused task is paused.
    fn fresh_cycle(&self, now: DateTime<Utc>) -> PomodoroState {
        let mut fresh = PomodoroState::started(now);
        if self.session.phase() == FocusPhase::Paused {
            fresh.pause(now);
        }
        fresh
    }

    /// Sessions created or restored in pomodoro mode have no phase yet.
    fn ensure_cycle_started(&mut self, now: DateTime<Utc>) {
        if self.session.timer_mode == TimerMode::Pomodoro
            && self.session.pomodoro.phase_started_at().is_none()
        {
            self.session.pomodoro = self.fresh_cycle(now);
        }
    }

    /// In-memory copy for the focused or dismissed task, otherwise a fetch.
    fn load_task(&self, task_id: &str) -> Result<TaskSnapshot, FocusError> {
        let cached = [self.focused.as_ref(), self.dismissed.as_ref()]
            .into_iter()
            .flatten()
            .find(|t| t.id == task_id);
        if let Some(task) = cached {
            return Ok(task.clone());
        }
        self.repo
            .fetch(task_id)?
            .ok_or_else(|| FocusError::TaskNotFound(task_id.to_string()))
    }

    fn pause_focused(
        &mut self,
        task: &TaskSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(TaskSnapshot, Duration), FocusError> {
        let outcome = TaskTimer::stop(task, now)?;
        self.session.is_paused = true;
        self.session.pomodoro.pause(now);
        self.commit_stopped(&outcome.task, Some(outcome.run));
        debug!(task_id = %outcome.task.id, banked_ms = outcome.ran_for.num_milliseconds(), "focus paused");
        self.focused = Some(outcome.task.clone());
        Ok((outcome.task, outcome.ran_for))
    }

    fn commit_stopped(&mut self, task: &TaskSnapshot, run: Option<TaskRun>) {
        self.persist(task);
        if let Some(run) = run {
            self.log_run(&run);
        }
    }

    fn persist(&mut self, task: &TaskSnapshot) {
        let record = TimingRecord::from(task);
        if let Err(e) = self.repo.persist(&record) {
            warn!(task_id = %record.task_id, error = %e, "failed to persist task timing");
            self.last_persist_error = Some(e);
        }
    }

    fn log_run(&mut self, run: &TaskRun) {
        if let Err(e) = self.repo.record_run(run) {
            warn!(task_id = %run.task_id, error = %e, "failed to record task run");
            self.last_persist_error = Some(e);
        }
    }
}

fn stop_if_running(
    task: &TaskSnapshot,
    now: DateTime<Utc>,
) -> Result<(TaskSnapshot, Option<TaskRun>), TimerError> {
    if task.is_in_progress() {
        let outcome = TaskTimer::stop(task, now)?;
        Ok((outcome.task, Some(outcome.run)))
    } else {
        Ok((task.clone(), None))
    }
}

fn start_if_stopped(
    task: &TaskSnapshot,
    now: DateTime<Utc>,
) -> Result<(TaskSnapshot, bool), TimerError> {
    if task.is_in_progress() {
        Ok((task.clone(), false))
    } else {
        Ok((TaskTimer::resume(task, now)?, true))
    }
}
