use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::database::models::{
    NewNode, NewProduct, NewUser, Node, NodeFilter, NodeId, NodeUpdate, Product, ProductFilter,
    ProductId, ProductUpdate, UniqueNodeFields, User, UserId,
};
use crate::database::repository::{RepoResult, RepositoryError, SupplyRepository, UserRepository};
use crate::supply::hierarchy::{SupplierLinks, SupplierLookup};

/// Repository kept in process memory. Mirrors the Postgres schema: unique
/// node columns, `SET NULL` on supplier delete, `CASCADE` on owner delete and
/// two-digit debt precision.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    nodes: BTreeMap<NodeId, Node>,
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, User>,
    next_node_id: NodeId,
    next_product_id: ProductId,
    next_user_id: UserId,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn money(value: Decimal) -> Decimal {
    let mut value = value.round_dp(2);
    value.rescale(2);
    value
}

impl MemoryState {
    fn unique_conflicts(&self, fields: UniqueNodeFields<'_>, exclude: Option<NodeId>) -> Vec<&'static str> {
        let mut taken = Vec::new();
        for node in self.nodes.values().filter(|n| Some(n.id) != exclude) {
            if fields.name == Some(node.name.as_str()) && !taken.contains(&"name") {
                taken.push("name");
            }
            if fields.email == Some(node.email.as_str()) && !taken.contains(&"email") {
                taken.push("email");
            }
            if fields.phone == Some(node.phone.as_str()) && !taken.contains(&"phone") {
                taken.push("phone");
            }
        }
        taken
    }

    fn check_node_constraints(&self, node: &Node) -> RepoResult<()> {
        let fields = UniqueNodeFields {
            name: Some(&node.name),
            email: Some(&node.email),
            phone: Some(&node.phone),
        };
        if let Some(field) = self.unique_conflicts(fields, Some(node.id)).first().copied() {
            return Err(RepositoryError::UniqueViolation { field });
        }
        if let Some(supplier) = node.supplier_id {
            if !self.nodes.contains_key(&supplier) {
                return Err(RepositoryError::ForeignKeyViolation { field: "supplier" });
            }
        }
        Ok(())
    }

    fn check_owner(&self, owner: NodeId) -> RepoResult<()> {
        if self.nodes.contains_key(&owner) {
            Ok(())
        } else {
            Err(RepositoryError::ForeignKeyViolation { field: "owner" })
        }
    }
}

impl SupplierLookup for MemoryState {
    fn supplier_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.supplier_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupplyRepository for MemoryStore {
    async fn list_nodes(&self, filter: &NodeFilter) -> RepoResult<Vec<Node>> {
        let state = self.state.read().await;
        let mut nodes: Vec<Node> = state
            .nodes
            .values()
            .filter(|n| filter.country.as_ref().map_or(true, |c| &n.country == c))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(nodes)
    }

    async fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        Ok(self.state.read().await.nodes.get(&id).cloned())
    }

    async fn insert_node(&self, new: NewNode) -> RepoResult<Node> {
        let mut state = self.state.write().await;
        let mut node = Node {
            id: 0,
            name: new.name,
            email: new.email,
            phone: new.phone,
            country: new.country,
            city: new.city,
            street: new.street,
            building_number: new.building_number,
            supplier_id: new.supplier_id,
            debt_to_supplier: money(new.debt_to_supplier),
            created_at: Utc::now(),
        };
        state.check_node_constraints(&node)?;

        node.id = next_id(&mut state.next_node_id);
        state.nodes.insert(node.id, node.clone());
        Ok(node)
    }

    async fn update_node(&self, id: NodeId, update: NodeUpdate) -> RepoResult<Option<Node>> {
        let mut state = self.state.write().await;
        let Some(mut node) = state.nodes.get(&id).cloned() else {
            return Ok(None);
        };
        update.apply_to(&mut node);
        state.check_node_constraints(&node)?;

        state.nodes.insert(id, node.clone());
        Ok(Some(node))
    }

    async fn delete_node(&self, id: NodeId) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        if state.nodes.remove(&id).is_none() {
            return Ok(false);
        }
        for client in state.nodes.values_mut().filter(|n| n.supplier_id == Some(id)) {
            client.supplier_id = None;
        }
        state.products.retain(|_, p| p.owner_id != id);
        Ok(true)
    }

    async fn clear_debt(&self, ids: &[NodeId]) -> RepoResult<u64> {
        let mut state = self.state.write().await;
        let mut touched = 0;
        for node in state.nodes.values_mut().filter(|n| ids.contains(&n.id)) {
            node.debt_to_supplier = Decimal::new(0, 2);
            touched += 1;
        }
        Ok(touched)
    }

    async fn supplier_links(&self, ids: &[NodeId]) -> RepoResult<SupplierLinks> {
        let state = self.state.read().await;
        let mut links = SupplierLinks::new();
        let mut pending: Vec<NodeId> = ids.to_vec();
        while let Some(id) = pending.pop() {
            if links.contains(id) || !state.nodes.contains_key(&id) {
                continue;
            }
            let supplier = state.supplier_of(id);
            links.insert(id, supplier);
            pending.extend(supplier);
        }
        Ok(links)
    }

    async fn client_links(&self, id: NodeId) -> RepoResult<SupplierLinks> {
        let state = self.state.read().await;
        let mut links = SupplierLinks::new();
        let mut pending = vec![id];
        while let Some(supplier) = pending.pop() {
            for client in state.nodes.values().filter(|n| n.supplier_id == Some(supplier)) {
                if client.id == id || links.contains(client.id) {
                    continue;
                }
                links.insert(client.id, Some(supplier));
                pending.push(client.id);
            }
        }
        Ok(links)
    }

    async fn find_unique_conflicts(
        &self,
        fields: UniqueNodeFields<'_>,
        exclude: Option<NodeId>,
    ) -> RepoResult<Vec<&'static str>> {
        Ok(self.state.read().await.unique_conflicts(fields, exclude))
    }

    async fn count_nodes(&self) -> RepoResult<i64> {
        Ok(self.state.read().await.nodes.len() as i64)
    }

    async fn list_products(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| filter.owner.map_or(true, |o| p.owner_id == o))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn insert_product(&self, new: NewProduct) -> RepoResult<Product> {
        let mut state = self.state.write().await;
        state.check_owner(new.owner_id)?;

        let product = Product {
            id: next_id(&mut state.next_product_id),
            name: new.name,
            model: new.model,
            release_date: new.release_date,
            owner_id: new.owner_id,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> RepoResult<Option<Product>> {
        let mut state = self.state.write().await;
        let Some(mut product) = state.products.get(&id).cloned() else {
            return Ok(None);
        };
        update.apply_to(&mut product);
        state.check_owner(product.owner_id)?;

        state.products.insert(id, product.clone());
        Ok(Some(product))
    }

    async fn delete_product(&self, id: ProductId) -> RepoResult<bool> {
        Ok(self.state.write().await.products.remove(&id).is_some())
    }

    async fn count_products(&self) -> RepoResult<i64> {
        Ok(self.state.read().await.products.len() as i64)
    }

    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> RepoResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == new.email) {
            return Err(RepositoryError::UniqueViolation { field: "email" });
        }

        let user = User {
            id: next_id(&mut state.next_user_id),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            role: new.role,
            is_active: new.is_active,
            is_staff: new.is_staff,
            is_superuser: new.is_superuser,
            date_joined: Utc::now(),
            last_login: None,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn touch_last_login(&self, id: UserId) -> RepoResult<()> {
        if let Some(user) = self.state.write().await.users.get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn count_users(&self) -> RepoResult<i64> {
        Ok(self.state.read().await.users.len() as i64)
    }
}
