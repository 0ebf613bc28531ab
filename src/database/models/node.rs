use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type NodeId = i64;

/// One participant of the supply network. A node without a supplier is a
/// factory (level 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub building_number: String,
    #[serde(rename = "supplier")]
    pub supplier_id: Option<NodeId>,
    pub debt_to_supplier: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Validated insert for a node. `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub building_number: String,
    pub supplier_id: Option<NodeId>,
    pub debt_to_supplier: Decimal,
}

/// Validated change set for an existing node.
///
/// No `debt_to_supplier` here: the only writers of that
/// column are node creation and `SupplyRepository::clear_debt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
    /// `Some(None)` detaches the node from its supplier.
    pub supplier_id: Option<Option<NodeId>>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == NodeUpdate::default()
    }

    pub fn apply_to(&self, node: &mut Node) {
        if let Some(v) = &self.name {
            node.name = v.clone();
        }
        if let Some(v) = &self.email {
            node.email = v.clone();
        }
        if let Some(v) = &self.phone {
            node.phone = v.clone();
        }
        if let Some(v) = &self.country {
            node.country = v.clone();
        }
        if let Some(v) = &self.city {
            node.city = v.clone();
        }
        if let Some(v) = &self.street {
            node.street = v.clone();
        }
        if let Some(v) = &self.building_number {
            node.building_number = v.clone();
        }
        if let Some(v) = self.supplier_id {
            node.supplier_id = v;
        }
    }
}

/// The three columns that must be unique across all nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueNodeFields<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeFilter {
    pub country: Option<String>,
}

/// Node as returned by the API: the stored row plus its computed level.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: Node,
    pub level: u32,
}
