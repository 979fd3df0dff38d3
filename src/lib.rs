//! Fantasy-football lineup decisions from two data providers: identity
//! resolution across providers, signal fusion, matchup scoring, position
//! normalization and greedy lineup assignment.

pub mod config;
pub mod enrich;
pub mod identity;
pub mod lineup;
pub mod output;
pub mod provider;
pub mod scoring;
