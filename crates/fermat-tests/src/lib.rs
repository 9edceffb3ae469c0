//! Integration tests across the Fermat node crates.
//!
//! The [`harness`] module builds regtest chains block by block through the
//! real connector, so every mined block passes contextual validation.

pub mod harness;

#[cfg(test)]
mod difficulty_tests;
#[cfg(test)]
mod property_tests;
