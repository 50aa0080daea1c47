//! Domain model for executive appointment governance.
//!
//! # Responsibility
//! - Define the canonical records moved through the appointment lifecycle.
//! - Keep pure status rules (`status`) separate from persistence.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Ledger, timeline and governance-log records are append-only; history is
//!   extended, never rewritten.

pub mod appointment;
pub mod document;
pub mod officer;
pub mod records;
pub mod resolution;
pub mod status;
pub mod timeline;
