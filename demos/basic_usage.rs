//! Basic usage example for deprecation-reporter.
//!
//! Demonstrates:
//! - Fetching the process-wide reporter with `Reporter::global()`
//! - Routing messages to `tracing` with `TracingSink`
//! - Reporting from a deprecated function via the live stack and via `deprecated!`
//! - Duplicate suppression
//!
//! Run with: `cargo run --example basic_usage`

use deprecation_reporter::{deprecated, Reporter, TracingSink};

#[inline(never)]
fn old_greeting(name: &str) -> String {
    let _ = Reporter::global().report(Some("use greeting()"));
    format!("Hello, {name}!")
}

#[track_caller]
fn old_farewell(name: &str) -> String {
    let _ = deprecated!(Reporter::global(), "use farewell()");
    format!("Bye, {name}!")
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== deprecation-reporter: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Configure the shared reporter
    // -------------------------------------------------------------------------
    println!("1. Configuring the global reporter...");

    Reporter::global().set_logger(TracingSink);

    println!("   Sink: TracingSink (target \"deprecation\")");

    // -------------------------------------------------------------------------
    // 2. Report through a stack walk
    // -------------------------------------------------------------------------
    println!("\n2. Calling a deprecated function three times from one place...");

    for name in ["Ada", "Grace", "Linus"] {
        old_greeting(name);
    }

    // -------------------------------------------------------------------------
    // 3. Report with an explicit call site
    // -------------------------------------------------------------------------
    println!("\n3. Calling a deprecated function from two places...");

    old_farewell("Ada");
    old_farewell("Grace");

    // -------------------------------------------------------------------------
    // 4. Summary
    // -------------------------------------------------------------------------
    println!(
        "\n4. Distinct messages logged: {}",
        Reporter::global().seen_count()
    );

    println!("\n=== Example completed successfully! ===");
}
