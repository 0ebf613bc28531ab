//! Audit trail for writes to the supply network.
//!
//! Events go to the `audit` tracing target. `main` routes that target to
//! `AUDIT_LOG_PATH` when it is set; otherwise they appear in the normal log.

use crate::database::models::{Node, NodeId, Product, ProductId};

pub const TARGET: &str = "audit";

#[derive(Debug, Clone, Copy)]
pub struct Audit {
    enabled: bool,
}

impl Audit {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn node_created(&self, actor: &str, node: &Node) {
        if self.enabled {
            tracing::info!(target: "audit", actor, node_id = node.id, name = %node.name, "node created");
        }
    }

    pub fn node_updated(&self, actor: &str, node: &Node) {
        if self.enabled {
            tracing::info!(target: "audit", actor, node_id = node.id, "node updated");
        }
    }

    pub fn node_deleted(&self, actor: &str, node_id: NodeId) {
        if self.enabled {
            tracing::info!(target: "audit", actor, node_id, "node deleted");
        }
    }

    /// Logged whatever the `enabled` flag says: a dropped write is a warning.
    pub fn protected_fields_dropped(&self, actor: &str, node_id: NodeId, fields: &[&str]) {
        tracing::warn!(
            target: "audit",
            actor,
            node_id,
            fields = ?fields,
            "protected fields dropped from node update"
        );
    }

    pub fn debt_cleared(&self, actor: &str, ids: &[NodeId], cleared: u64) {
        if self.enabled {
            tracing::info!(target: "audit", actor, ids = ?ids, cleared, "debt to supplier cleared");
        }
    }

    pub fn product_created(&self, actor: &str, product: &Product) {
        if self.enabled {
            tracing::info!(target: "audit", actor, product_id = product.id, owner = product.owner_id, "product created");
        }
    }

    pub fn product_updated(&self, actor: &str, product: &Product) {
        if self.enabled {
            tracing::info!(target: "audit", actor, product_id = product.id, "product updated");
        }
    }

    pub fn product_deleted(&self, actor: &str, product_id: ProductId) {
        if self.enabled {
            tracing::info!(target: "audit", actor, product_id, "product deleted");
        }
    }

    pub fn login(&self, email: &str, success: bool) {
        if !self.enabled {
            return;
        }
        if success {
            tracing::info!(target: "audit", email, "login succeeded");
        } else {
            tracing::warn!(target: "audit", email, "login failed");
        }
    }
}
