//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `boardflow_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("boardflow_core ping={}", boardflow_core::ping());
    println!("boardflow_core version={}", boardflow_core::core_version());
}
