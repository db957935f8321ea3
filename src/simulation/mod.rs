//! Simulated backend: delayed replies, page settling and OTP checks.

pub mod otp;
pub mod reply;
pub mod runtime;

/// Returns the simulation module name for smoke checks.
pub fn module_name() -> &'static str {
    "simulation"
}
