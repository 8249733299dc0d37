// ============================================================================
// Basic Usage Example
// ============================================================================

use order_batching::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() {
    #[cfg(feature = "logging")]
    order_batching::utils::init_logging(tracing::Level::INFO);

    println!("=== Order Batching Example ===\n");

    // Dark-store hub: 40 saved per rider not sent
    let pool = OrderPool::from_config(
        BatchingConfig::dark_store(Decimal::from(40)),
        Arc::new(LoggingEventHandler),
    )
    .expect("valid configuration");

    println!("Receiving orders...");
    for (id, x, y, budget) in [
        ("ORD-101", 2.0, 3.0, 15.0),
        ("ORD-102", 8.0, 8.0, 25.0),
        ("ORD-103", 3.0, 2.0, 12.0),
        ("ORD-104", 7.0, 9.0, 30.0),
    ] {
        pool.submit(Order::new(id, x, y, budget)).expect("unique id");
        println!("  {} at ({}, {}) with {} min left", id, x, y, budget);
    }

    // A late arrival near the hub
    pool.submit(Order::new("ORD-105", -5.0, 5.0, 20.0))
        .expect("unique id");

    println!("\nRunning batching cycle...");
    let plan = match pool.run_batching_cycle() {
        Ok(plan) => plan,
        Err(err) => {
            println!("No batching this cycle: {}", err);
            return;
        },
    };

    for batch in &plan.batches {
        let ids: Vec<String> = batch.members.iter().map(|id| id.to_string()).collect();
        match batch.kind {
            BatchKind::Paired => println!(
                "  BATCH  {:<20} saving {}",
                ids.join(" + "),
                batch.estimated_saving
            ),
            BatchKind::Single => println!("  SINGLE {:<20} -", ids.join("")),
        }
    }

    println!(
        "\nPaired: {}  Single: {}  Real-time savings: {}",
        plan.paired_count(),
        plan.single_count(),
        plan.total_saving()
    );

    println!("\nDispatching riders...");
    for batch in &plan.batches {
        match pool.dispatch(batch) {
            Ok(orders) => println!("  rider out with {} order(s)", orders.len()),
            Err(err) => println!("  dispatch failed: {}", err),
        }
    }

    println!("\nOrders left at hub: {}", pool.len());
    println!("\n=== Example Complete ===");
}
