use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::database::models::{
    Node, NodeFilter, NodeId, NodeView, Product, ProductFilter, ProductId, UniqueNodeFields,
};
use crate::database::repository::{RepositoryError, SupplyRepository};
use crate::supply::hierarchy::{self, HierarchyError, SupplierLinks};
use crate::supply::validation::{self, FieldErrors};
use crate::supply::{guard, Audit, NodeChanges, NodeDraft, ProductChanges, ProductDraft, WriteMode};

#[derive(Debug, Error)]
pub enum SupplyError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("stored supplier hierarchy is inconsistent: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<FieldErrors> for SupplyError {
    fn from(errors: FieldErrors) -> Self {
        SupplyError::Validation(errors)
    }
}

/// Constraint failures that slipped past the pre-checks become the same
/// field errors the pre-checks would have produced.
impl From<RepositoryError> for SupplyError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation { field } => {
                SupplyError::Validation(FieldErrors::single(field, node_taken(field)))
            }
            RepositoryError::ForeignKeyViolation { field } => {
                SupplyError::Validation(FieldErrors::single(field, "Invalid pk - object does not exist."))
            }
            other => SupplyError::Repository(other),
        }
    }
}

const SELF_SUPPLIER: &str = "A node cannot be its own supplier.";

fn node_taken(field: &str) -> String {
    format!("node with this {field} already exists.")
}

fn hierarchy_message(err: &HierarchyError) -> String {
    match err {
        HierarchyError::SelfSupplier(_) => SELF_SUPPLIER.to_string(),
        HierarchyError::Cycle { .. } => {
            "This supplier is a client of the node, directly or indirectly.".to_string()
        }
        HierarchyError::DepthLimitExceeded { limit, .. } => {
            format!("Supplier chain would be longer than {limit} levels.")
        }
    }
}

/// One line of the hierarchy printout.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub level: u32,
    pub node: Node,
}

/// Node and product operations behind the HTTP handlers and the CLI.
#[derive(Clone)]
pub struct SupplyService {
    repo: Arc<dyn SupplyRepository>,
    max_depth: u32,
    audit: Audit,
}

impl SupplyService {
    pub fn new(repo: Arc<dyn SupplyRepository>, max_depth: u32, audit: Audit) -> Self {
        Self { repo, max_depth, audit }
    }

    // Nodes

    pub async fn list_nodes(&self, filter: &NodeFilter) -> Result<Vec<NodeView>, SupplyError> {
        let nodes = self.repo.list_nodes(filter).await?;
        let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
        let links = self.repo.supplier_links(&ids).await?;

        nodes.into_iter().map(|node| self.view(&links, node)).collect()
    }

    pub async fn get_node(&self, id: NodeId) -> Result<NodeView, SupplyError> {
        let node = self.find_node(id).await?;
        self.view_one(node).await
    }

    pub async fn create_node(&self, actor: &str, draft: NodeDraft) -> Result<NodeView, SupplyError> {
        let new = draft.validate()?;

        let mut errors = FieldErrors::new();
        self.check_unique(
            &mut errors,
            UniqueNodeFields {
                name: Some(&new.name),
                email: Some(&new.email),
                phone: Some(&new.phone),
            },
            None,
        )
        .await?;
        if let Some(supplier) = new.supplier_id {
            self.check_supplier(&mut errors, None, supplier).await?;
        }
        errors.finish(|| ())?;

        let node = self.repo.insert_node(new).await?;
        self.audit.node_created(actor, &node);
        self.view_one(node).await
    }

    /// Applies a PUT or PATCH body. `debt_to_supplier` is dropped and audited.
    pub async fn update_node(
        &self,
        actor: &str,
        id: NodeId,
        mut body: Value,
        mode: WriteMode,
    ) -> Result<NodeView, SupplyError> {
        self.find_node(id).await?;

        let dropped = guard::strip_protected(&mut body);
        if !dropped.is_empty() {
            self.audit.protected_fields_dropped(actor, id, &dropped);
        }

        let changes: NodeChanges = serde_json::from_value(body)
            .map_err(|e| FieldErrors::single("non_field_errors", e.to_string()))?;
        let update = changes.validate(mode)?;

        let mut errors = FieldErrors::new();
        self.check_unique(
            &mut errors,
            UniqueNodeFields {
                name: update.name.as_deref(),
                email: update.email.as_deref(),
                phone: update.phone.as_deref(),
            },
            Some(id),
        )
        .await?;
        if let Some(Some(supplier)) = update.supplier_id {
            self.check_supplier(&mut errors, Some(id), supplier).await?;
        }
        errors.finish(|| ())?;

        let node = self
            .repo
            .update_node(id, update)
            .await?
            .ok_or(SupplyError::NodeNotFound(id))?;
        self.audit.node_updated(actor, &node);
        self.view_one(node).await
    }

    /// Former clients become roots; owned products are removed.
    pub async fn delete_node(&self, actor: &str, id: NodeId) -> Result<(), SupplyError> {
        if !self.repo.delete_node(id).await? {
            return Err(SupplyError::NodeNotFound(id));
        }
        self.audit.node_deleted(actor, id);
        Ok(())
    }

    /// Sets `debt_to_supplier` to 0.00 on exactly the listed nodes.
    pub async fn clear_debt(&self, actor: &str, ids: &[NodeId]) -> Result<u64, SupplyError> {
        let unique: Vec<NodeId> = ids.iter().copied().collect::<HashSet<_>>().into_iter().collect();
        let cleared = self.repo.clear_debt(&unique).await?;
        self.audit.debt_cleared(actor, &unique, cleared);
        Ok(cleared)
    }

    /// Every node in depth-first order from the roots, siblings by name.
    pub async fn tree(&self) -> Result<Vec<TreeEntry>, SupplyError> {
        let nodes = self.repo.list_nodes(&NodeFilter::default()).await?;
        let mut entries = Vec::with_capacity(nodes.len());
        let mut visited = HashSet::new();

        let mut stack: Vec<(u32, &Node)> = nodes
            .iter()
            .filter(|n| n.supplier_id.is_none())
            .rev()
            .map(|n| (0, n))
            .collect();

        while let Some((level, node)) = stack.pop() {
            if !visited.insert(node.id) {
                continue;
            }
            entries.push(TreeEntry { level, node: node.clone() });
            if level >= self.max_depth {
                continue;
            }
            // nodes are name-ordered, so pushing in reverse pops them by name
            stack.extend(
                nodes
                    .iter()
                    .filter(|n| n.supplier_id == Some(node.id))
                    .rev()
                    .map(|n| (level + 1, n)),
            );
        }

        let unreachable = nodes.len() - entries.len();
        if unreachable > 0 {
            tracing::warn!("{} nodes are not reachable from any root", unreachable);
        }
        Ok(entries)
    }

    // Products

    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, SupplyError> {
        Ok(self.repo.list_products(filter).await?)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, SupplyError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or(SupplyError::ProductNotFound(id))
    }

    pub async fn create_product(&self, actor: &str, draft: ProductDraft) -> Result<Product, SupplyError> {
        let new = draft.validate()?;
        self.check_owner(new.owner_id).await?;

        let product = self.repo.insert_product(new).await?;
        self.audit.product_created(actor, &product);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        actor: &str,
        id: ProductId,
        changes: ProductChanges,
        mode: WriteMode,
    ) -> Result<Product, SupplyError> {
        self.get_product(id).await?;

        let update = changes.validate(mode)?;
        if let Some(owner) = update.owner_id {
            self.check_owner(owner).await?;
        }

        let product = self
            .repo
            .update_product(id, update)
            .await?
            .ok_or(SupplyError::ProductNotFound(id))?;
        self.audit.product_updated(actor, &product);
        Ok(product)
    }

    pub async fn delete_product(&self, actor: &str, id: ProductId) -> Result<(), SupplyError> {
        if !self.repo.delete_product(id).await? {
            return Err(SupplyError::ProductNotFound(id));
        }
        self.audit.product_deleted(actor, id);
        Ok(())
    }

    /// Products owned by `node_id`. The node must exist.
    pub async fn node_products(&self, node_id: NodeId) -> Result<Vec<Product>, SupplyError> {
        self.find_node(node_id).await?;
        let filter = ProductFilter { owner: Some(node_id) };
        Ok(self.repo.list_products(&filter).await?)
    }

    /// A missing node is reported before a missing or foreign product.
    pub async fn node_product(&self, node_id: NodeId, product_id: ProductId) -> Result<Product, SupplyError> {
        self.find_node(node_id).await?;
        match self.repo.get_product(product_id).await? {
            Some(product) if product.owner_id == node_id => Ok(product),
            _ => Err(SupplyError::ProductNotFound(product_id)),
        }
    }

    // Store

    pub async fn counts(&self) -> Result<(i64, i64), SupplyError> {
        Ok((self.repo.count_nodes().await?, self.repo.count_products().await?))
    }

    pub async fn health_check(&self) -> Result<(), SupplyError> {
        Ok(self.repo.health_check().await?)
    }

    // Helpers

    async fn find_node(&self, id: NodeId) -> Result<Node, SupplyError> {
        self.repo.get_node(id).await?.ok_or(SupplyError::NodeNotFound(id))
    }

    fn view(&self, links: &SupplierLinks, node: Node) -> Result<NodeView, SupplyError> {
        let level = hierarchy::depth(links, node.id, self.max_depth)?;
        Ok(NodeView { node, level })
    }

    async fn view_one(&self, node: Node) -> Result<NodeView, SupplyError> {
        let links = self.repo.supplier_links(&[node.id]).await?;
        self.view(&links, node)
    }

    async fn check_unique(
        &self,
        errors: &mut FieldErrors,
        fields: UniqueNodeFields<'_>,
        exclude: Option<NodeId>,
    ) -> Result<(), SupplyError> {
        for field in self.repo.find_unique_conflicts(fields, exclude).await? {
            errors.add(field, node_taken(field));
        }
        Ok(())
    }

    /// Supplier must exist, must not close a loop back to `node` and must
    /// leave room below it for the clients of `node`.
    ///
    /// Runs before the write and without a lock. Two concurrent re-parentings
    /// are last-write-wins and can still close a loop; reads then report it
    /// as `SupplyError::Hierarchy` instead of walking forever.
    async fn check_supplier(
        &self,
        errors: &mut FieldErrors,
        node: Option<NodeId>,
        supplier: NodeId,
    ) -> Result<(), SupplyError> {
        if node == Some(supplier) {
            errors.add("supplier", SELF_SUPPLIER);
            return Ok(());
        }

        let links = self.repo.supplier_links(&[supplier]).await?;
        if !links.contains(supplier) {
            errors.add("supplier", validation::missing_object(supplier));
            return Ok(());
        }
        let clients_height = match node {
            Some(id) => {
                let clients = self.repo.client_links(id).await?;
                match hierarchy::height(&clients, id, self.max_depth) {
                    Ok(height) => height,
                    Err(err) => {
                        errors.add("supplier", hierarchy_message(&err));
                        return Ok(());
                    }
                }
            }
            None => 0,
        };
        if let Err(err) = hierarchy::ensure_acyclic(&links, node, supplier, clients_height, self.max_depth) {
            errors.add("supplier", hierarchy_message(&err));
        }
        Ok(())
    }

    async fn check_owner(&self, owner: NodeId) -> Result<(), SupplyError> {
        if self.repo.get_node(owner).await?.is_none() {
            return Err(FieldErrors::single("owner", validation::missing_object(owner)).into());
        }
        Ok(())
    }
}
