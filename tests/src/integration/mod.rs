//! Integration tests across the bus, store and coordinator crates.

pub mod fixtures;

#[cfg(test)]
mod file_store;
#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod scheduler;
