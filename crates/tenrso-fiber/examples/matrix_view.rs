//! Matrix View Example
//!
//! This example demonstrates:
//! - Viewing one mode of a fiber tensor as a CSR matrix
//! - Using the matrix independently of the tensor
//! - Building with caller-supplied mode orders
//!
//! Run with: cargo run --example matrix_view

use tenrso_fiber::{CoordTensor, FiberConfig, FiberTensor};

fn main() -> anyhow::Result<()> {
    println!("=== TenRSo Fiber: Matrix View Example ===\n");

    // 1. Build a small tensor with a pseudo-random fill
    println!("1. Creating a 10x30x8 tensor...");
    let mut tt = CoordTensor::zeros(vec![10, 30, 8])?;
    let mut seed = 42u64;
    for _ in 0..60 {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let i = (seed >> 8) as usize % 10;
        let j = (seed >> 16) as usize % 30;
        let k = (seed >> 24) as usize % 8;
        tt.push(&[i, j, k], ((seed >> 32) % 100) as f64 / 10.0)?;
    }
    println!("   {} non-zeros\n", tt.nnz());

    // 2. Default build, then view mode 0 as a matrix
    let ft = FiberTensor::from_coord(&tt)?;
    let csr = ft.to_csr(0)?;
    let m0 = ft.mode(0)?;
    println!("2. Mode 0 under order {:?}", m0.dim_perm());
    println!(
        "   CSR: {}x{} with {} non-zeros (density {:.1}%)",
        csr.nrows(),
        csr.ncols(),
        csr.nnz(),
        csr.density() * 100.0
    );

    // 3. The matrix owns its data
    drop(ft);
    let ones = vec![1.0; csr.ncols()];
    let fiber_sums = csr.spmv(&ones)?;
    let total: f64 = fiber_sums.iter().sum();
    println!(
        "   Sum over all fibers: {:.1} (tensor total {:.1})\n",
        total,
        tt.vals().iter().sum::<f64>()
    );

    // 4. Caller-supplied orders: keep mode 2 innermost everywhere it can be
    println!("3. Building with explicit orders...");
    let orders = [[0usize, 1, 2], [1, 0, 2], [2, 0, 1]];
    let config = FiberConfig::default().parallel(false);
    let ft = FiberTensor::with_mode_orders(&tt, &orders, &config)?;
    for fibers in ft.modes() {
        println!(
            "   mode {} order {:?}: {} fibers, average length {:.2}",
            fibers.mode(),
            fibers.dim_perm(),
            fibers.nfibs(),
            fibers.nnz() as f64 / fibers.nfibs().max(1) as f64
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
