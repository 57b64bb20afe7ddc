//! Property-based tests for the engine and the bundled machines.
//!
//! These tests use proptest to drive machines with random event scripts and
//! check that the engine's invariants hold after every dispatch.

use fsm_kernel::alloc::{Allocator, BlockPool, Payload, PoolTier};
use fsm_kernel::core::State;
use fsm_kernel::engine::{EngineConfig, StateMachine};
use fsm_kernel::machines::centrifuge::{self, CentrifugeState, CENTRIFUGE_TEST, TARGET_SPEED};
use fsm_kernel::machines::motor::{self, MotorState, MotorStatus, MOTOR};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum MotorOp {
    SetSpeed(i32),
    Halt,
}

#[derive(Debug, Clone, Copy)]
enum CentrifugeOp {
    Start,
    Cancel,
    Poll,
}

prop_compose! {
    fn arbitrary_motor_op()(variant in 0..3u8, speed in -500..500i32) -> MotorOp {
        match variant {
            0 => MotorOp::Halt,
            _ => MotorOp::SetSpeed(speed),
        }
    }
}

prop_compose! {
    fn arbitrary_centrifuge_op()(variant in 0..6u8) -> CentrifugeOp {
        match variant {
            0 => CentrifugeOp::Start,
            1 => CentrifugeOp::Cancel,
            _ => CentrifugeOp::Poll,
        }
    }
}

fn polling_state(state: CentrifugeState) -> bool {
    matches!(
        state,
        CentrifugeState::Acceleration
            | CentrifugeState::WaitForAcceleration
            | CentrifugeState::Deceleration
            | CentrifugeState::WaitForDeceleration
    )
}

proptest! {
    #[test]
    fn motor_follows_its_transition_tables(
        ops in prop::collection::vec(arbitrary_motor_op(), 0..40)
    ) {
        let pool = Arc::new(BlockPool::standard());
        let allocator: Arc<dyn Allocator> = pool.clone();
        let mut mtr = motor::new_motor().unwrap();

        let mut expected_state = MotorState::Idle;
        let mut expected_speed = 0;

        for op in ops {
            match op {
                MotorOp::SetSpeed(speed) => {
                    motor::set_speed(&mut mtr, &allocator, speed).unwrap();
                    expected_state = match expected_state {
                        MotorState::Idle => MotorState::Start,
                        _ => MotorState::ChangeSpeed,
                    };
                    expected_speed = speed;
                }
                MotorOp::Halt => {
                    motor::halt(&mut mtr).unwrap();
                    expected_state = MotorState::Idle;
                    expected_speed = 0;
                }
            }

            prop_assert_eq!(mtr.current_state(), expected_state);
            prop_assert_eq!(motor::get_speed(&mtr), expected_speed);
            prop_assert!(!mtr.is_pending());
            prop_assert_eq!(pool.stats().in_use(), 0);
        }

        prop_assert_eq!(pool.free_blocks(), vec![10, 5]);
    }

    #[test]
    fn centrifuge_polls_only_while_spinning(
        ops in prop::collection::vec(arbitrary_centrifuge_op(), 0..80)
    ) {
        let mut test = centrifuge::new_centrifuge().unwrap();

        for op in ops {
            let result = match op {
                CentrifugeOp::Start => centrifuge::start(&mut test),
                CentrifugeOp::Cancel => centrifuge::cancel(&mut test),
                CentrifugeOp::Poll => centrifuge::poll(&mut test),
            };
            prop_assert!(result.is_ok(), "unexpected fault: {:?}", result);

            let state = test.current_state();
            prop_assert_eq!(centrifuge::is_poll_active(&test), polling_state(state));
            prop_assert!(!matches!(
                state,
                CentrifugeState::StartTest | CentrifugeState::Completed | CentrifugeState::Failed
            ));
            prop_assert!((0..=TARGET_SPEED).contains(&test.context().speed));
            prop_assert!(!test.is_pending());
        }
    }

    #[test]
    fn history_never_exceeds_limit(
        limit in 0..16usize,
        polls in 0..40usize
    ) {
        let mut test = StateMachine::builder()
            .descriptor(&CENTRIFUGE_TEST)
            .context(centrifuge::Centrifuge::default())
            .config(EngineConfig::default().history_limit(limit))
            .build()
            .unwrap();

        centrifuge::start(&mut test).unwrap();
        for _ in 0..polls {
            centrifuge::poll(&mut test).unwrap();
        }

        prop_assert!(test.history().len() <= limit);
        if limit > 0 {
            let last = test.history().transitions().last().map(|t| t.to);
            prop_assert_eq!(last, Some(test.current_state()));
        }
    }

    #[test]
    fn every_state_round_trips_through_its_index(variant in 0..8usize) {
        let state = CentrifugeState::from_index(variant).unwrap();
        prop_assert_eq!(state.index(), variant);
        prop_assert_eq!(CentrifugeState::ALL[variant], state);
        prop_assert_eq!(CentrifugeState::from_index(variant + 8), None);
    }

    #[test]
    fn pool_accounts_for_every_block(
        sizes in prop::collection::vec(1..160usize, 0..24),
        release_mask in prop::collection::vec(any::<bool>(), 24)
    ) {
        let pool = Arc::new(BlockPool::new(&[PoolTier::new(32, 4), PoolTier::new(128, 2)]));
        let allocator: Arc<dyn Allocator> = pool.clone();

        let mut live = Vec::new();
        for (index, size) in sizes.iter().enumerate() {
            if let Ok(block) = allocator.allocate(*size) {
                live.push(block);
            }
            if release_mask[index] {
                if let Some(block) = live.pop() {
                    allocator.release(block);
                }
            }

            let free: usize = pool.free_blocks().iter().sum();
            prop_assert_eq!(free + live.len(), 6);
            prop_assert_eq!(pool.stats().in_use(), live.len() as u64);
        }
    }

    #[test]
    fn motor_payloads_come_back_to_the_pool(speeds in prop::collection::vec(any::<i32>(), 1..30)) {
        let pool = Arc::new(BlockPool::new(&[PoolTier::new(8, 1)]));
        let allocator: Arc<dyn Allocator> = pool.clone();
        let mut mtr = StateMachine::new(&MOTOR, MotorStatus::default()).unwrap();

        // A single block suffices because each payload is released before
        // the dispatch returns.
        for speed in speeds {
            let payload = Payload::new(&allocator, motor::MotorData { speed }).unwrap();
            mtr.dispatch(&motor::SET_SPEED, Some(payload)).unwrap();
            prop_assert_eq!(motor::get_speed(&mtr), speed);
        }
        prop_assert_eq!(pool.free_blocks(), vec![1]);
    }
}
