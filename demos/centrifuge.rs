//! Centrifuge Test
//!
//! Runs the extended-table centrifuge machine through a full test cycle by
//! polling until the sequencer stops asking for polls, then starts a second
//! test and cancels it halfway through acceleration.
//!
//! Key concepts:
//! - Guard conditions (a test only starts with the rotor stopped)
//! - Entry and exit actions
//! - Cancelling through an error state
//!
//! Run with: RUST_LOG=debug cargo run --example centrifuge

use fsm_kernel::core::State;
use fsm_kernel::machines::centrifuge::{self, is_poll_active};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Centrifuge Test Example ===\n");

    let mut test = centrifuge::new_centrifuge()?;

    println!("Full cycle:");
    centrifuge::start(&mut test)?;
    let mut polls = 0;
    while is_poll_active(&test) {
        centrifuge::poll(&mut test)?;
        polls += 1;
        println!(
            "  poll {polls:2}: {:<20} speed {}",
            test.current_state().name(),
            test.context().speed
        );
    }
    println!("Finished in {:?} after {polls} polls\n", test.current_state());

    println!("Cancelled run:");
    centrifuge::start(&mut test)?;
    for _ in 0..3 {
        centrifuge::poll(&mut test)?;
    }
    println!(
        "  before cancel: {} speed {}",
        test.current_state().name(),
        test.context().speed
    );
    centrifuge::cancel(&mut test)?;
    println!(
        "  after cancel:  {} speed {}",
        test.current_state().name(),
        test.context().speed
    );

    let failed = test
        .history()
        .transitions()
        .filter(|transition| transition.to.is_error())
        .count();
    println!("\nError-state visits: {failed}");

    Ok(())
}
