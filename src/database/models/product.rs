use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::node::NodeId;

pub type ProductId = i64;

/// A good produced or sold by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub model: String,
    pub release_date: NaiveDate,
    #[serde(rename = "owner")]
    pub owner_id: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub model: String,
    pub release_date: NaiveDate,
    pub owner_id: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub model: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub owner_id: Option<NodeId>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProductUpdate::default()
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(v) = &self.name {
            product.name = v.clone();
        }
        if let Some(v) = &self.model {
            product.model = v.clone();
        }
        if let Some(v) = self.release_date {
            product.release_date = v;
        }
        if let Some(v) = self.owner_id {
            product.owner_id = v;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub owner: Option<NodeId>,
}
