//! Domain logic for the locker registration service.
//!
//! Everything here is transport-agnostic: persistence goes through the
//! [`store::Store`] contract and nothing depends on HTTP.

pub mod assignment;
pub mod board;
pub mod error;
pub mod form;
pub mod grid;
pub mod locker;
pub mod roster;
pub mod signature;
pub mod stats;
pub mod store;
pub mod student;
pub mod types;
