//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the auction engines and the outside world.
//!
//! - **Driving Ports (Inbound)**: `CollectModule`, `DutchAuctionApi`,
//!   `EnglishAuctionApi`
//! - **Driven Ports (Outbound)**: `ModuleGlobals`, `HostGateway`,
//!   `CurrencyTransfer`, `TimeSource`
//! - No concrete implementations in this module besides the system clock

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
