//! Project record model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A project record. Ids are generated `prj_` prefixed ULIDs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
}
