//! Derived stores feeding other derived stores

use tincan_derived::{derive, Store};

fn main() {
    println!("=== Chained Derived Stores ===\n");

    let celsius = [Store::new(18.0f64), Store::new(21.5), Store::new(19.0)];

    let average = derive(celsius.clone(), |deps: &[f64; 3], _, _| {
        deps.iter().sum::<f64>() / deps.len() as f64
    });

    // Track the running maximum using the previous derived value
    let warmest = derive((average.clone(),), |deps: &(f64,), _, prev: Option<&f64>| {
        prev.map_or(deps.0, |prev| f64::max(*prev, deps.0))
    });

    let report = derive(
        (average.clone(), warmest.clone()),
        |deps: &(f64, f64), _, _| format!("avg {:.1}°C, warmest avg {:.1}°C", deps.0, deps.1),
    );

    // Each reading changes both inputs of `report`, so it recomputes twice
    let _ = report.subscribe(|state, _| println!("   {}", state));

    println!("Initial: {}\n", report.get_state());
    println!("Readings come in:");
    celsius[0].set(24.0);
    celsius[2].set(12.5);
    celsius[1].set(16.0);

    println!("\nFinal: {}", report.get_state());
}
