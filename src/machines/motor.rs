//! Motor controller on the basic engine.
//!
//! `SetSpeed` starts an idle motor or changes a running motor's speed;
//! `Halt` stops it, and the stop state falls straight back to idle.

use crate::alloc::{Allocator, Payload};
use crate::builder::BuildError;
use crate::core::{Directive, Event, State};
use crate::descriptor::{BasicEntry, Descriptor, Machine};
use crate::engine::{Ctx, DispatchError, StateMachine};
use std::sync::Arc;
use tracing::info;

crate::state_enum! {
    pub enum MotorState {
        Idle,
        Stop,
        Start,
        ChangeSpeed,
    }
}

/// Instance data for one motor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotorStatus {
    pub current_speed: i32,
}

/// Payload for `SetSpeed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorData {
    pub speed: i32,
}

/// Marker type for the motor machine.
pub struct Motor;

impl Machine for Motor {
    type State = MotorState;
    type Data = MotorData;
    type Context = MotorStatus;
}

type MotorCtx<'a> = Ctx<'a, Motor>;

fn st_idle(ctx: &mut MotorCtx<'_>, _data: Option<&MotorData>) {
    info!(machine = ctx.machine_name(), "ST_Idle");
}

fn st_stop(ctx: &mut MotorCtx<'_>, _data: Option<&MotorData>) {
    ctx.context_mut().current_speed = 0;
    info!(machine = ctx.machine_name(), speed = 0, "ST_Stop");
    ctx.raise(MotorState::Idle, None);
}

fn st_start(ctx: &mut MotorCtx<'_>, data: Option<&MotorData>) {
    let Some(data) = data else {
        ctx.fault("Start requires MotorData");
        return;
    };
    ctx.context_mut().current_speed = data.speed;
    info!(machine = ctx.machine_name(), speed = data.speed, "ST_Start");
}

fn st_change_speed(ctx: &mut MotorCtx<'_>, data: Option<&MotorData>) {
    let Some(data) = data else {
        ctx.fault("ChangeSpeed requires MotorData");
        return;
    };
    ctx.context_mut().current_speed = data.speed;
    info!(machine = ctx.machine_name(), speed = data.speed, "ST_ChangeSpeed");
}

static STATES: [BasicEntry<Motor>; <MotorState as State>::COUNT] = [
    BasicEntry::new("ST_Idle", st_idle),
    BasicEntry::new("ST_Stop", st_stop),
    BasicEntry::new("ST_Start", st_start),
    BasicEntry::new("ST_ChangeSpeed", st_change_speed),
];

const SET_SPEED_MAP: [Directive<MotorState>; <MotorState as State>::COUNT] = [
    Directive::Transition(MotorState::Start),       // Idle
    Directive::Impossible,                          // Stop
    Directive::Transition(MotorState::ChangeSpeed), // Start
    Directive::Transition(MotorState::ChangeSpeed), // ChangeSpeed
];

const HALT_MAP: [Directive<MotorState>; <MotorState as State>::COUNT] = [
    Directive::Ignored,                      // Idle
    Directive::Impossible,                   // Stop
    Directive::Transition(MotorState::Stop), // Start
    Directive::Transition(MotorState::Stop), // ChangeSpeed
];

pub static SET_SPEED: Event<MotorState> = Event::new("MTR_SetSpeed", &SET_SPEED_MAP);
pub static HALT: Event<MotorState> = Event::new("MTR_Halt", &HALT_MAP);

static EVENTS: [&Event<MotorState>; 2] = [&SET_SPEED, &HALT];

pub static MOTOR: Descriptor<Motor> =
    Descriptor::basic("Motor", <MotorState as State>::COUNT, &STATES, &EVENTS);

/// A stopped motor in the idle state.
pub fn new_motor() -> Result<StateMachine<Motor>, BuildError> {
    StateMachine::new(&MOTOR, MotorStatus::default())
}

/// Set the motor speed, starting it if idle.
pub fn set_speed(
    motor: &mut StateMachine<Motor>,
    allocator: &Arc<dyn Allocator>,
    speed: i32,
) -> Result<(), DispatchError> {
    let payload = Payload::new(allocator, MotorData { speed })?;
    motor.dispatch(&SET_SPEED, Some(payload))
}

/// Stop the motor. Ignored when already idle.
pub fn halt(motor: &mut StateMachine<Motor>) -> Result<(), DispatchError> {
    motor.dispatch(&HALT, None)
}

pub fn get_speed(motor: &StateMachine<Motor>) -> i32 {
    motor.context().current_speed
}
