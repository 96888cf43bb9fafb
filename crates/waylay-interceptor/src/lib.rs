//! Waylay: network request interception for driven browser sessions.
//!
//! Waylay sits between a driven browser and the network. For each
//! intercepted request it consults the mapping subsystem for an override
//! (replay the request elsewhere) and/or a mock response (fabricate the
//! answer), merges whatever is present with live upstream data, and hands
//! the browser a single decision: continue with substituted parameters,
//! fulfill with a response, or pass through untouched.
//!
//! The merge engine in [`merge`] is pure decision logic over injected
//! capabilities; browser plumbing and mapping configuration live outside
//! this crate behind the traits in [`intercept`] and [`mapping`].

pub mod config;
pub mod intercept;
pub mod mapping;
pub mod merge;
pub mod replay;
pub mod types;
