//! stocksim: historical stock replay and paper-trading simulator.
//!
//! Hexagonal architecture: domain logic and the pure reducers in [`domain`],
//! port traits in [`ports`], concrete implementations (CSV, INI, terminal,
//! tokio drivers) in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
