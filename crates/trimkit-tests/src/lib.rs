//! Integration test crate for Trimkit.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! They drive a `PlayerSession` against the tokio-backed `SimulatedPlayer`
//! and probed-style `MediaAsset`s from trimkit-media.

#[cfg(test)]
mod support;

#[cfg(test)]
mod seeking;

#[cfg(test)]
mod trimming;

#[cfg(test)]
mod controls;
