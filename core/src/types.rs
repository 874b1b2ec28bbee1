//! Shared primitive types used across the entire engine.

/// The canonical ad-account identifier. One attribution pass covers one account.
pub type AccountId = String;

/// Monetary amounts in the account's reporting currency.
/// The engine never converts currencies; it reports whatever unit the
/// snapshots were uploaded in.
pub type Money = f64;
