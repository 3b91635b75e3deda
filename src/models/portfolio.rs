use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A named grouping of trades (e.g., "Long-term", "IPO applications"),
// owned by exactly one user. Ids are client-generated so a portfolio can
// be created offline and referenced before its first sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Portfolio {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertPortfolio {
    pub id: Option<Uuid>,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePortfolio {
    pub name: String,
    pub color: Option<String>,
}

impl Portfolio {
    pub fn new(user_id: String, name: String, color: Option<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            color,
            created_at: now,
            updated_at: now,
        }
    }
}
