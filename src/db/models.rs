use serde::{Deserialize, Serialize};

/// One row of the profile listing, without its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub name: String,
    pub asset_name: String,
    pub currency: String,
    pub visible: bool,
    pub calculation_method: String,
    pub line_count: i64,
}
