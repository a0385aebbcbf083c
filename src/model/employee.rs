use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employees are created out of band; this service only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Ann",
        "department": "Eng"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ann")]
    pub name: String,

    #[schema(example = "Eng")]
    pub department: String,
}

impl Employee {
    pub fn new(id: u64, name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            department: department.into(),
        }
    }
}
