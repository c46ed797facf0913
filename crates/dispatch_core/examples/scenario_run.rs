//! Spawn a seeded fleet, replay one request per rider and print completed rides.
//!
//! Run with: cargo run -p dispatch_core --example scenario_run

use dispatch_core::config::DispatchConfig;
use dispatch_core::registry::UserRegistry;
use dispatch_core::scenario::{run_requests, spawn_fleet, FleetParams};
use dispatch_core::DispatchEngine;

fn main() -> dispatch_core::Result<()> {
    const NUM_RIDERS: usize = 500;
    const NUM_DRIVERS: usize = 100;
    const SEED: u64 = 123;

    let registry = UserRegistry::new();
    let config = DispatchConfig::default()
        .with_standard_observers(false)
        .with_surge(1.2);
    let engine = DispatchEngine::new(config)?;
    let params = FleetParams::default()
        .with_counts(NUM_DRIVERS, NUM_RIDERS)
        .with_seed(SEED);
    let fleet = spawn_fleet(&registry, &engine, &params)?;
    let telemetry = run_requests(&engine, &fleet, &params)?;
    let counts = &telemetry.counts;

    println!("--- Scenario run ({NUM_RIDERS} riders, {NUM_DRIVERS} drivers, seed {SEED}) ---");
    println!("Pricing: {}", engine.pricing_strategy().describe());
    println!(
        "Requested: {}  assigned: {}  unassigned: {}",
        counts.rides_requested, counts.rides_assigned, counts.rides_unassigned
    );
    println!(
        "Completed: {}  cancelled: {}",
        counts.rides_completed, counts.rides_cancelled
    );
    println!("Revenue: {:.2}", counts.revenue);
    if let Some(average) = telemetry.average_fare() {
        println!("Average fare: {average:.2}");
    }

    const SAMPLE: usize = 10;
    for (i, record) in telemetry.completed_rides.iter().take(SAMPLE).enumerate() {
        let driver = match record.driver_id {
            Some(id) => id.to_string(),
            None => String::from("-"),
        };
        println!(
            "  {}  ride={} driver={}  distance={:.2} km  fare={:.2}",
            i + 1,
            record.ride_id,
            driver,
            record.distance_km,
            record.fare,
        );
    }
    if telemetry.completed_rides.len() > SAMPLE {
        let rest = telemetry.completed_rides.len() - SAMPLE;
        println!("  ... and {rest} more");
    }
    Ok(())
}
