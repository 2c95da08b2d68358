//! Property tests for the timing arithmetic and the session state machine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use focusroom_core::{
    FocusSessionController, MemoryTaskRepository, PomodoroSettings, TaskSnapshot, TaskTimer,
    TimerMode,
};
use proptest::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Non-decreasing timestamps built from non-negative gaps.
fn timeline(gaps: &[i64]) -> Vec<i64> {
    gaps.iter()
        .scan(0i64, |t, gap| {
            *t += gap;
            Some(*t)
        })
        .collect()
}

proptest! {
    #[test]
    fn accumulated_equals_sum_of_runs(gaps in prop::collection::vec(0i64..10_000, 0..40)) {
        let times = timeline(&gaps);
        let mut task = TaskSnapshot::new("t", "");
        let mut expected = Duration::zero();

        for pair in times.chunks(2) {
            task = TaskTimer::start(&task, at(pair[0])).unwrap();
            if let Some(&stop) = pair.get(1) {
                let outcome = TaskTimer::stop(&task, at(stop)).unwrap();
                prop_assert!(outcome.ran_for >= Duration::zero());
                expected = expected + Duration::seconds(stop - pair[0]);
                task = outcome.task;
            }
        }
        if task.is_in_progress() {
            let last = *times.last().unwrap();
            task = TaskTimer::stop(&task, at(last)).unwrap().task;
        }

        prop_assert_eq!(task.accumulated(), expected);
        prop_assert!(!task.is_in_progress());
    }

    #[test]
    fn stopping_never_changes_elapsed_at_that_instant(
        banked in 0i64..100_000,
        start in 0i64..100_000,
        run in -500i64..100_000,
    ) {
        let task = TaskSnapshot::from_parts("t", "", None, Duration::seconds(banked), false, None);
        let running = TaskTimer::start(&task, at(start)).unwrap();
        let stop_at = at(start + run);
        let before = TaskTimer::elapsed(&running, stop_at);
        let stopped = TaskTimer::stop(&running, stop_at).unwrap().task;
        prop_assert_eq!(TaskTimer::elapsed(&stopped, stop_at), before);
        prop_assert!(stopped.accumulated() >= Duration::zero());
    }

    #[test]
    fn controller_toggles_conserve_time(gaps in prop::collection::vec(0i64..5_000, 1..30)) {
        let times = timeline(&gaps);
        let repo = MemoryTaskRepository::new().with_task(TaskSnapshot::new("t", ""));
        let mut focus = FocusSessionController::new(repo, PomodoroSettings::default());

        focus.enter_focus("t", at(0)).unwrap();
        let mut running_since = Some(0i64);
        let mut expected = 0i64;
        for &t in &times {
            focus.toggle_pause(at(t)).unwrap();
            running_since = match running_since {
                Some(s) => {
                    expected += t - s;
                    None
                }
                None => Some(t),
            };
        }

        let task = focus.repository().get("t").unwrap();
        prop_assert_eq!(task.accumulated(), Duration::seconds(expected));
        prop_assert_eq!(task.is_in_progress(), running_since.is_some());
    }

    #[test]
    fn completed_intervals_grow_by_one_per_break(early in prop::collection::vec(any::<bool>(), 1..20)) {
        let settings = PomodoroSettings::new(Duration::seconds(1500), Duration::seconds(300));
        let mut focus = FocusSessionController::new(MemoryTaskRepository::new(), settings);
        focus.set_timer_mode(TimerMode::Pomodoro, at(0));

        let mut now = 0i64;
        for (i, take_early) in early.iter().enumerate() {
            now += if *take_early { 60 } else { 1500 };
            let before = focus.session().pomodoro().completed_intervals();
            focus.start_pomodoro_break(at(now)).unwrap();
            prop_assert_eq!(focus.session().pomodoro().completed_intervals(), before + 1);
            prop_assert_eq!(before as usize, i);
            now += 300;
            focus.end_pomodoro_break(at(now)).unwrap();
            prop_assert_eq!(focus.session().pomodoro().completed_intervals(), before + 1);
        }
    }

    #[test]
    fn pomodoro_remaining_is_never_negative(offset in 0i64..1_000_000) {
        let settings = PomodoroSettings::new(Duration::seconds(1500), Duration::seconds(300));
        let mut focus = FocusSessionController::new(MemoryTaskRepository::new(), settings);
        focus.set_timer_mode(TimerMode::Pomodoro, at(0));
        let remaining = focus.pomodoro_remaining(at(offset)).unwrap();
        prop_assert!(remaining >= Duration::zero());
        prop_assert_eq!(focus.is_interval_complete(at(offset)), offset >= 1500);
    }

    #[test]
    fn dismiss_then_reopen_is_identity(pause_first in any::<bool>(), offset in 1i64..10_000) {
        let repo = MemoryTaskRepository::new().with_task(TaskSnapshot::new("t", ""));
        let mut focus = FocusSessionController::new(repo, PomodoroSettings::default());
        focus.enter_focus("t", at(0)).unwrap();
        if pause_first {
            focus.toggle_pause(at(offset)).unwrap();
        }
        let session = focus.session().clone();
        let task = focus.repository().get("t").unwrap().clone();

        focus.dismiss_focus(at(offset + 1)).unwrap();
        focus.reopen_focus(at(offset + 2)).unwrap();

        prop_assert_eq!(focus.session(), &session);
        prop_assert_eq!(focus.repository().get("t").unwrap(), &task);
        prop_assert_eq!(focus.focused_task().unwrap(), &task);
    }
}
