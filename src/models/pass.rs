//! Prepaid hour-bank passes

use serde::{Deserialize, Serialize};

/// External hour-bank entity. This core only reads `remaining_hours` to
/// gate submission; deduction happens server-side upon redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    pub pass_uid: String,
    pub remaining_hours: f64,
    pub total_hours: f64,
    pub owner_identity: String,
}

/// Response to a pass validation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassValidationResponse {
    pub valid: bool,
    pub pass: Option<Pass>,
    pub error: Option<String>,
}
