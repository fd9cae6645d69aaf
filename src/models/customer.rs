//! Customer directory records

use serde::{Deserialize, Serialize};

/// One entry of the vendor's customer directory, used for suggestion
/// inputs on the booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
}
