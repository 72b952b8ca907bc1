//! Fiber Tensor Basics Example
//!
//! This example demonstrates:
//! - Building a coordinate tensor
//! - Planning mode orders
//! - Constructing a fiber tensor and walking its slices and fibers
//!
//! Run with: cargo run --example fiber_tensor_basics
//! Set `RUST_LOG=tenrso_fiber=debug` to see construction events.

use tenrso_fiber::{init_tracing, plan_mode_orders, CoordTensor, FiberTensor, TracingConfig};

fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::default())?;

    println!("=== TenRSo Fiber: Basics Example ===\n");

    // 1. A 4x50x6 tensor; slice 2 of mode 0 is left empty
    println!("1. Creating a 4x50x6 coordinate tensor...");
    let tt = CoordTensor::from_entries(
        vec![4, 50, 6],
        [
            ([0usize, 3, 1], 1.0),
            ([0, 17, 1], 2.0),
            ([0, 3, 4], 3.0),
            ([1, 40, 0], 4.0),
            ([3, 8, 5], 5.0),
            ([3, 9, 5], 6.0),
        ],
    )?;
    println!(
        "   {} non-zeros, density: {:.3}%\n",
        tt.nnz(),
        tt.density() * 100.0
    );

    // 2. Mode orders put the longest remaining mode innermost
    println!("2. Planned mode orders:");
    for (mode, order) in plan_mode_orders(tt.dims()).iter().enumerate() {
        println!("   mode {}: {:?}", mode, order.as_slice());
    }
    println!();

    // 3. Build every mode
    println!("3. Building the fiber tensor...");
    let ft = FiberTensor::from_coord(&tt)?;
    println!("   storage: {} bytes\n", ft.storage_bytes());

    // 4. Walk each mode
    for fibers in ft.modes() {
        println!(
            "4.{} Mode {} ({} fibers, {} empty slices)",
            fibers.mode(),
            fibers.mode(),
            fibers.nfibs(),
            fibers.empty_slices()
        );
        println!("   sptr = {:?}", fibers.sptr());
        println!("   fptr = {:?}", fibers.fptr());
        for fiber in fibers.fibers() {
            println!(
                "   slice {:>2}, mode-{} index {:>2}: inds {:?} vals {:?}",
                fiber.slice,
                fibers.fiber_id_mode(),
                fiber.id,
                fiber.inds,
                fiber.vals
            );
        }
        println!();
    }

    println!("=== Example Complete ===");
    Ok(())
}
