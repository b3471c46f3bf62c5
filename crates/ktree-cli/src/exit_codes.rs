//! Process exit codes (spec §6).

/// Success.
pub const SUCCESS: i32 = 0;

/// The root reference matched nothing.
pub const NOT_FOUND: i32 = 1;

/// The root reference matched more than one object.
pub const AMBIGUOUS: i32 = 2;

/// The cluster's discovery API could not be reached at all.
pub const DISCOVERY_UNAVAILABLE: i32 = 3;

/// The operation was canceled (Ctrl-C).
pub const CANCELED: i32 = 4;

/// Anything else: config errors, internal invariant violations, and so on.
/// Not part of spec.md's enumerated exit codes, reserved for everything the
/// distilled taxonomy doesn't name.
pub const INTERNAL: i32 = 5;
