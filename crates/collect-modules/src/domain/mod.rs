//! # Domain Layer (Inner Hexagon)
//!
//! Pure auction logic: records, price curves, fee splits and invariants.
//! NO I/O, NO async, NO locks.
//!
//! Dependencies point INWARD only (engines and adapters depend on this,
//! not vice versa).

pub mod entities;
pub mod fees;
pub mod invariants;
pub mod pricing;
pub mod value_objects;

pub use entities::*;
pub use fees::*;
pub use invariants::*;
pub use pricing::*;
pub use value_objects::*;
