//! Fail-safe fallback package
//!
//! Pre-built guidance delivered when the upstream live session is
//! unavailable (connection refused, handshake failure, stream error).
//! The user must never be left without guidance during an emergency.

use std::sync::{Arc, OnceLock};

/// Version of the fallback payload. Bump when the wording changes.
pub const FALLBACK_VERSION: u32 = 1;

/// The fixed guidance steps, in delivery order.
pub const FALLBACK_INSTRUCTIONS: [&str; 8] = [
    "Stay calm. Take a slow, deep breath.",
    "Call emergency services right away if you have not already.",
    "If someone is hurt, do not move them unless they are in immediate danger.",
    "If there is bleeding, apply gentle pressure with a clean cloth.",
    "If someone is unconscious, check if they are breathing.",
    "If there is a fire, move away to a safe area immediately.",
    "Stay with the person and keep them warm and comfortable.",
    "Help is on the way. You are doing the right thing.",
];

/// Shown alongside the instructions so the user knows the AI is gone.
pub const FALLBACK_DISCLAIMER: &str = "The AI connection was lost. These are general safety guidelines. \
     Please call your local emergency number for professional help.";

/// The fixed guidance set delivered when the upstream cannot serve a session.
///
/// Read-only after process start; obtain the shared instance with
/// [`FallbackPackage::current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPackage {
    pub version: u32,
    pub instructions: Vec<String>,
    pub disclaimer: String,
}

static CURRENT: OnceLock<Arc<FallbackPackage>> = OnceLock::new();

impl FallbackPackage {
    /// The process-wide fallback package.
    pub fn current() -> Arc<FallbackPackage> {
        CURRENT
            .get_or_init(|| {
                Arc::new(FallbackPackage {
                    version: FALLBACK_VERSION,
                    instructions: FALLBACK_INSTRUCTIONS
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                    disclaimer: FALLBACK_DISCLAIMER.to_string(),
                })
            })
            .clone()
    }
}
