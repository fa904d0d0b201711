// --- Structural faults
pub const CONSTRAINT_VIOLATION: &str = "CONSTRAINT_VIOLATION";

// --- Configuration
pub const INVALID_OPTION: &str = "INVALID_OPTION";
pub const UNKNOWN_REFERENCE: &str = "UNKNOWN_REFERENCE";
