//! Centrifuge test sequencer on the extended engine.
//!
//! `Start` (guarded on a stopped rotor) runs the test: accelerate one step
//! per `Poll` up to [`TARGET_SPEED`], then decelerate one step per `Poll`
//! back to zero, complete, and return to idle. `Cancel` aborts any running
//! test through the failed state.

use crate::builder::BuildError;
use crate::core::{Directive, Event, State};
use crate::descriptor::{Descriptor, ExtendedEntry, Machine};
use crate::engine::{Ctx, DispatchError, StateMachine};
use tracing::info;

/// Speed at which acceleration stops.
pub const TARGET_SPEED: i32 = 5;

crate::state_enum! {
    pub enum CentrifugeState {
        Idle,
        Completed,
        Failed,
        StartTest,
        Acceleration,
        WaitForAcceleration,
        Deceleration,
        WaitForDeceleration,
    }
    error: [Failed]
}

/// Instance data for one centrifuge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Centrifuge {
    pub speed: i32,
    pub poll_active: bool,
}

/// Marker type for the centrifuge test machine. Its events carry no data.
pub struct CentrifugeTest;

impl Machine for CentrifugeTest {
    type State = CentrifugeState;
    type Data = ();
    type Context = Centrifuge;
}

type TestCtx<'a> = Ctx<'a, CentrifugeTest>;

fn st_idle(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "ST_Idle");
}

fn en_idle(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "EN_Idle");
    let centrifuge = ctx.context_mut();
    centrifuge.speed = 0;
    centrifuge.poll_active = false;
}

fn st_completed(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "ST_Completed");
    ctx.raise(CentrifugeState::Idle, None);
}

fn st_failed(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "ST_Failed");
    ctx.raise(CentrifugeState::Idle, None);
}

fn st_start_test(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "ST_StartTest");
    ctx.raise(CentrifugeState::Acceleration, None);
}

/// Only a stopped rotor may start a test.
fn gd_start_test(ctx: &mut TestCtx<'_>, _data: Option<&()>) -> bool {
    info!(machine = ctx.machine_name(), "GD_StartTest");
    ctx.context().speed == 0
}

fn st_acceleration(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "ST_Acceleration");
    ctx.context_mut().poll_active = true;
}

fn st_wait_for_acceleration(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    let speed = ctx.context().speed;
    info!(machine = ctx.machine_name(), speed, "ST_WaitForAcceleration");

    ctx.context_mut().speed = speed + 1;
    if speed + 1 >= TARGET_SPEED {
        ctx.raise(CentrifugeState::Deceleration, None);
    }
}

fn ex_wait_for_acceleration(ctx: &mut TestCtx<'_>) {
    info!(machine = ctx.machine_name(), "EX_WaitForAcceleration");
    ctx.context_mut().poll_active = false;
}

fn st_deceleration(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    info!(machine = ctx.machine_name(), "ST_Deceleration");
    ctx.context_mut().poll_active = true;
}

fn st_wait_for_deceleration(ctx: &mut TestCtx<'_>, _data: Option<&()>) {
    let speed = ctx.context().speed;
    info!(machine = ctx.machine_name(), speed, "ST_WaitForDeceleration");

    if speed == 0 {
        ctx.raise(CentrifugeState::Completed, None);
    } else {
        ctx.context_mut().speed = speed - 1;
    }
}

fn ex_wait_for_deceleration(ctx: &mut TestCtx<'_>) {
    info!(machine = ctx.machine_name(), "EX_WaitForDeceleration");
    ctx.context_mut().poll_active = false;
}

static STATES: [ExtendedEntry<CentrifugeTest>; <CentrifugeState as State>::COUNT] = [
    ExtendedEntry {
        name: "ST_Idle",
        behavior: st_idle,
        guard: None,
        entry: Some(en_idle),
        exit: None,
    },
    ExtendedEntry::new("ST_Completed", st_completed),
    ExtendedEntry::new("ST_Failed", st_failed),
    ExtendedEntry {
        name: "ST_StartTest",
        behavior: st_start_test,
        guard: Some(gd_start_test),
        entry: None,
        exit: None,
    },
    ExtendedEntry::new("ST_Acceleration", st_acceleration),
    ExtendedEntry {
        name: "ST_WaitForAcceleration",
        behavior: st_wait_for_acceleration,
        guard: None,
        entry: None,
        exit: Some(ex_wait_for_acceleration),
    },
    ExtendedEntry::new("ST_Deceleration", st_deceleration),
    ExtendedEntry {
        name: "ST_WaitForDeceleration",
        behavior: st_wait_for_deceleration,
        guard: None,
        entry: None,
        exit: Some(ex_wait_for_deceleration),
    },
];

const START_MAP: [Directive<CentrifugeState>; <CentrifugeState as State>::COUNT] = [
    Directive::Transition(CentrifugeState::StartTest), // Idle
    Directive::Impossible,                             // Completed
    Directive::Impossible,                             // Failed
    Directive::Ignored,                                // StartTest
    Directive::Ignored,                                // Acceleration
    Directive::Ignored,                                // WaitForAcceleration
    Directive::Ignored,                                // Deceleration
    Directive::Ignored,                                // WaitForDeceleration
];

const CANCEL_MAP: [Directive<CentrifugeState>; <CentrifugeState as State>::COUNT] = [
    Directive::Ignored,                             // Idle
    Directive::Impossible,                          // Completed
    Directive::Impossible,                          // Failed
    Directive::Transition(CentrifugeState::Failed), // StartTest
    Directive::Transition(CentrifugeState::Failed), // Acceleration
    Directive::Transition(CentrifugeState::Failed), // WaitForAcceleration
    Directive::Transition(CentrifugeState::Failed), // Deceleration
    Directive::Transition(CentrifugeState::Failed), // WaitForDeceleration
];

const POLL_MAP: [Directive<CentrifugeState>; <CentrifugeState as State>::COUNT] = [
    Directive::Ignored,                                          // Idle
    Directive::Ignored,                                          // Completed
    Directive::Ignored,                                          // Failed
    Directive::Ignored,                                          // StartTest
    Directive::Transition(CentrifugeState::WaitForAcceleration), // Acceleration
    Directive::Transition(CentrifugeState::WaitForAcceleration), // WaitForAcceleration
    Directive::Transition(CentrifugeState::WaitForDeceleration), // Deceleration
    Directive::Transition(CentrifugeState::WaitForDeceleration), // WaitForDeceleration
];

pub static START: Event<CentrifugeState> = Event::new("CFG_Start", &START_MAP);
pub static CANCEL: Event<CentrifugeState> = Event::new("CFG_Cancel", &CANCEL_MAP);
pub static POLL: Event<CentrifugeState> = Event::new("CFG_Poll", &POLL_MAP);

static EVENTS: [&Event<CentrifugeState>; 3] = [&START, &CANCEL, &POLL];

pub static CENTRIFUGE_TEST: Descriptor<CentrifugeTest> = Descriptor::extended(
    "CentrifugeTest",
    <CentrifugeState as State>::COUNT,
    &STATES,
    &EVENTS,
);

/// An idle centrifuge with a stopped rotor.
pub fn new_centrifuge() -> Result<StateMachine<CentrifugeTest>, BuildError> {
    StateMachine::new(&CENTRIFUGE_TEST, Centrifuge::default())
}

pub fn start(test: &mut StateMachine<CentrifugeTest>) -> Result<(), DispatchError> {
    test.dispatch(&START, None)
}

pub fn cancel(test: &mut StateMachine<CentrifugeTest>) -> Result<(), DispatchError> {
    test.dispatch(&CANCEL, None)
}

pub fn poll(test: &mut StateMachine<CentrifugeTest>) -> Result<(), DispatchError> {
    test.dispatch(&POLL, None)
}

pub fn is_poll_active(test: &StateMachine<CentrifugeTest>) -> bool {
    test.context().poll_active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_runs_into_acceleration() {
        let mut test = new_centrifuge().unwrap();

        start(&mut test).unwrap();

        assert_eq!(test.current_state(), CentrifugeState::Acceleration);
        assert!(is_poll_active(&test));
        let path: Vec<_> = test.history().get_path().into_iter().copied().collect();
        assert_eq!(
            path,
            vec![
                CentrifugeState::Idle,
                CentrifugeState::StartTest,
                CentrifugeState::Acceleration
            ]
        );
    }

    #[test]
    fn guard_vetoes_start_while_spinning() {
        let mut test = new_centrifuge().unwrap();
        test.context_mut().speed = 3;

        start(&mut test).unwrap();

        assert_eq!(test.current_state(), CentrifugeState::Idle);
        assert_eq!(test.context().speed, 3);
        assert!(test.history().is_empty());
    }

    #[test]
    fn cancel_while_idle_is_ignored() {
        let mut test = new_centrifuge().unwrap();
        cancel(&mut test).unwrap();
        assert_eq!(test.current_state(), CentrifugeState::Idle);
        assert!(test.history().is_empty());
    }
}
