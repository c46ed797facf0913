use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dispatch_core::agents::{VehicleKind, VehicleSpec};
use dispatch_core::config::DispatchConfig;
use dispatch_core::ids::RideId;
use dispatch_core::matching::MatchingPolicy;
use dispatch_core::pricing::{build_pricing, estimate_fare, PricingModifier};
use dispatch_core::registry::UserRegistry;
use dispatch_core::scenario::{run_requests, spawn_fleet, FleetParams};
use dispatch_core::spatial::Coordinate;
use dispatch_core::telemetry::DispatchCounts;
use dispatch_core::DispatchEngine;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "dispatch",
    about = "Ride dispatch engine: demo walkthrough, fare quotes and fleet runs"
)]
struct Cli {
    /// Log filter (same syntax as RUST_LOG), e.g. `info` or `dispatch_core=debug`
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk three riders and four drivers through the ride lifecycle
    Demo,
    /// Quote a trip without requesting it
    Estimate {
        /// Pickup as `LAT,LNG`
        #[arg(long, value_parser = parse_coordinate)]
        pickup: Coordinate,
        /// Dropoff as `LAT,LNG`
        #[arg(long, value_parser = parse_coordinate)]
        dropoff: Coordinate,
        /// Vehicle kind; unknown names fall back to SEDAN
        #[arg(long, default_value = "SEDAN")]
        vehicle: String,
        /// Surge multiplier applied over the base fare
        #[arg(long)]
        surge: Option<f64>,
        /// Discount percentage applied last
        #[arg(long)]
        discount: Option<f64>,
    },
    /// Run a seeded random fleet and print telemetry
    Simulate {
        #[arg(long, default_value_t = 100)]
        drivers: usize,
        #[arg(long, default_value_t = 500)]
        riders: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// NEAREST or HIGHEST_RATED
        #[arg(long, default_value = "NEAREST")]
        matching: MatchingPolicy,
        #[arg(long)]
        surge: Option<f64>,
        #[arg(long)]
        discount: Option<f64>,
        /// Print the full telemetry (including per-ride records) as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_coordinate(raw: &str) -> std::result::Result<Coordinate, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got `{raw}`"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("bad latitude `{lat}`"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("bad longitude `{lng}`"))?;
    Coordinate::new(lat, lng).map_err(|err| err.to_string())
}

fn modifiers(surge: Option<f64>, discount: Option<f64>) -> Vec<PricingModifier> {
    let mut modifiers = Vec::new();
    if let Some(multiplier) = surge {
        modifiers.push(PricingModifier::Surge { multiplier });
    }
    if let Some(percentage) = discount {
        modifiers.push(PricingModifier::Discount { percentage });
    }
    modifiers
}

// ── demo ───────────────────────────────────────────────────────────

/// Offsets in degrees around central Berlin; 0.01° is roughly 1 km.
fn around_center(dlat: f64, dlng: f64) -> Result<Coordinate> {
    Ok(Coordinate::new(52.52 + dlat, 13.40 + dlng)?)
}

fn drive_to_completion(engine: &DispatchEngine, ride_id: RideId) -> Result<f64> {
    engine.start_ride(ride_id)?;
    engine.pickup_rider(ride_id)?;
    Ok(engine.complete_ride(ride_id)?.fare)
}

fn run_demo() -> Result<()> {
    println!("=== Ride dispatch demo ===\n");
    let registry = UserRegistry::new();
    let engine = DispatchEngine::new(DispatchConfig::default())?;

    let alice = registry.register_rider("Alice", "123-456-7890", around_center(0.0, 0.0)?)?;
    let bob = registry.register_rider("Bob", "234-567-8901", around_center(0.05, 0.05)?)?;
    let charlie = registry.register_rider("Charlie", "345-678-9012", around_center(0.1, 0.1)?)?;
    println!("Registered {} riders", registry.riders().len());

    let fleet = [
        (
            "Dave",
            "456-789-0123",
            VehicleSpec::new("CAR001", "Toyota Camry", VehicleKind::Sedan, 4),
            (0.01, 0.01),
        ),
        (
            "Eve",
            "567-890-1234",
            VehicleSpec::new("CAR002", "Honda Civic", VehicleKind::Sedan, 4),
            (0.06, 0.06),
        ),
        (
            "Frank",
            "678-901-2345",
            VehicleSpec::new("CAR003", "Ford Explorer", VehicleKind::Suv, 6),
            (0.04, 0.05),
        ),
        (
            "Grace",
            "789-012-3456",
            VehicleSpec::new("BIKE001", "Honda CBR", VehicleKind::Bike, 1),
            (0.09, 0.1),
        ),
    ];
    for (name, phone, vehicle, (dlat, dlng)) in fleet {
        let location = around_center(dlat, dlng)?;
        let driver = registry.register_driver(name, phone, vehicle, location)?;
        engine.register_driver(driver);
    }
    println!("Registered {} drivers", registry.drivers().len());
    println!("Available drivers: {}\n", engine.available_drivers().len());

    println!("--- 1: regular ride, nearest driver, base pricing ---");
    let ride = engine.request_ride(
        Arc::clone(&alice),
        alice.location(),
        around_center(0.05, 0.05)?,
        VehicleKind::Sedan,
    );
    println!("Ride {} assigned: {}", ride.ride_id(), ride.is_assigned());
    if ride.is_assigned() {
        let fare = drive_to_completion(&engine, ride.ride_id())?;
        println!("Fare: {fare:.2}\n");
    }

    println!("--- 2: carpool, highest rated driver, surge 1.5 ---");
    engine.set_matching_policy(MatchingPolicy::HighestRated);
    engine.set_pricing_modifiers(&[PricingModifier::Surge { multiplier: 1.5 }])?;
    let ride = engine.request_carpool(
        Arc::clone(&bob),
        bob.location(),
        around_center(0.1, 0.1)?,
        VehicleKind::Suv,
    );
    println!("Ride {} assigned: {}", ride.ride_id(), ride.is_assigned());
    if ride.is_assigned() {
        let fare = drive_to_completion(&engine, ride.ride_id())?;
        println!("Fare with surge: {fare:.2}\n");
    }

    println!("--- 3: regular ride, nearest driver, 15% discount ---");
    engine.set_matching_policy(MatchingPolicy::Nearest);
    engine.set_pricing_modifiers(&[PricingModifier::Discount { percentage: 15.0 }])?;
    let ride = engine.request_ride(
        Arc::clone(&charlie),
        charlie.location(),
        around_center(0.05, 0.05)?,
        VehicleKind::Bike,
    );
    println!("Ride {} assigned: {}", ride.ride_id(), ride.is_assigned());
    if ride.is_assigned() {
        let fare = drive_to_completion(&engine, ride.ride_id())?;
        println!("Fare with discount: {fare:.2}\n");
    }

    println!("--- 4: cancellation ---");
    let ride = engine.request_ride(
        Arc::clone(&alice),
        around_center(0.05, 0.05)?,
        around_center(0.0, 0.0)?,
        VehicleKind::Sedan,
    );
    if ride.is_assigned() {
        engine.start_ride(ride.ride_id())?;
    }
    let cancelled = engine.cancel_ride(ride.ride_id())?;
    println!("Ride {} is {}\n", cancelled.id, cancelled.status);

    println!("=== Summary ===");
    println!("Total rides: {}", engine.all_rides().len());
    println!("Active rides: {}", engine.active_rides().len());
    println!("Available drivers: {}", engine.available_drivers().len());
    for driver in engine.available_drivers() {
        let (name, rating) = (driver.name(), driver.rating());
        let kind = driver.vehicle().kind();
        println!("  {name} ({kind}, rating {rating:.1})");
    }
    Ok(())
}

// ── estimate / simulate ────────────────────────────────────────────

fn run_estimate(
    pickup: Coordinate,
    dropoff: Coordinate,
    vehicle: &str,
    surge: Option<f64>,
    discount: Option<f64>,
) -> Result<()> {
    let pricing = build_pricing(&modifiers(surge, discount)).context("invalid pricing options")?;
    let kind = VehicleKind::parse_or_sedan(vehicle);
    let estimate = estimate_fare(pricing.as_ref(), pickup, dropoff, kind);
    println!("{}", serde_json::to_string_pretty(&estimate)?);
    Ok(())
}

#[derive(Serialize)]
struct SimulationSummary<'a> {
    seed: u64,
    drivers: usize,
    riders: usize,
    matching: MatchingPolicy,
    pricing: String,
    counts: &'a DispatchCounts,
    average_fare: Option<f64>,
}

fn run_simulate(
    drivers: usize,
    riders: usize,
    seed: u64,
    matching: MatchingPolicy,
    surge: Option<f64>,
    discount: Option<f64>,
    json: bool,
) -> Result<()> {
    if drivers == 0 && riders == 0 {
        bail!("nothing to simulate: --drivers and --riders are both 0");
    }
    let config = DispatchConfig::default()
        .with_matching(matching)
        .with_pricing(modifiers(surge, discount))
        .with_standard_observers(false);
    let engine = DispatchEngine::new(config).context("invalid dispatch configuration")?;
    let registry = UserRegistry::new();
    let params = FleetParams::default()
        .with_counts(drivers, riders)
        .with_seed(seed);

    let fleet = spawn_fleet(&registry, &engine, &params)?;
    info!(drivers, riders, seed, "fleet ready");
    let telemetry = run_requests(&engine, &fleet, &params)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&telemetry)?);
        return Ok(());
    }
    let summary = SimulationSummary {
        seed,
        drivers,
        riders,
        matching,
        pricing: engine.pricing_strategy().describe(),
        counts: &telemetry.counts,
        average_fare: telemetry.average_fare(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

// ── main ───────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log).context("invalid --log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Demo => run_demo(),
        Commands::Estimate {
            pickup,
            dropoff,
            vehicle,
            surge,
            discount,
        } => run_estimate(pickup, dropoff, &vehicle, surge, discount),
        Commands::Simulate {
            drivers,
            riders,
            seed,
            matching,
            surge,
            discount,
            json,
        } => run_simulate(drivers, riders, seed, matching, surge, discount, json),
    }
}
