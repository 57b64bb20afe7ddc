//! Motor Controller
//!
//! Drives the basic-table motor machine through a start, a speed change and
//! two halts, the second of which is ignored because the motor is idle.
//!
//! Key concepts:
//! - Event payloads drawn from a fixed-block pool
//! - Internal events (Stop falls straight back to Idle)
//! - Ignored events
//!
//! Run with: RUST_LOG=debug cargo run --example motor

use fsm_kernel::alloc::{Allocator, BlockPool};
use fsm_kernel::machines::motor::{self, get_speed};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Motor Controller Example ===\n");

    let pool = Arc::new(BlockPool::standard());
    let allocator: Arc<dyn Allocator> = pool.clone();
    let mut mtr = motor::new_motor()?;

    motor::set_speed(&mut mtr, &allocator, 100)?;
    println!("set speed 100 -> {:?}, speed {}", mtr.current_state(), get_speed(&mtr));

    motor::set_speed(&mut mtr, &allocator, 200)?;
    println!("set speed 200 -> {:?}, speed {}", mtr.current_state(), get_speed(&mtr));

    motor::halt(&mut mtr)?;
    println!("halt          -> {:?}, speed {}", mtr.current_state(), get_speed(&mtr));

    motor::halt(&mut mtr)?;
    println!("halt again    -> {:?} (ignored)", mtr.current_state());

    println!("\nPath:");
    for transition in mtr.history().transitions() {
        let origin = if transition.internal { "internal" } else { "external" };
        println!("  {:?} -> {:?} ({origin})", transition.from, transition.to);
    }

    let stats = pool.stats();
    println!(
        "\nPool: {} allocations, {} releases, {} in use",
        stats.allocations,
        stats.releases,
        stats.in_use()
    );

    Ok(())
}
