use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{
    NewNode, NewProduct, NewUser, Node, NodeFilter, NodeId, NodeUpdate, Product, ProductFilter,
    ProductId, ProductUpdate, UniqueNodeFields, User, UserId,
};
use crate::supply::hierarchy::SupplierLinks;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{field} is already taken")]
    UniqueViolation { field: &'static str },

    #[error("{field} refers to a row that does not exist")]
    ForeignKeyViolation { field: &'static str },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl RepositoryError {
    /// Classifies an sqlx error; constraint failures map onto the API field they guard.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        let (code, constraint) = match &err {
            sqlx::Error::Database(db) => (
                db.code().map(|c| c.into_owned()),
                db.constraint().map(str::to_owned),
            ),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                return RepositoryError::Unavailable(err.to_string());
            }
            _ => return RepositoryError::Database(err),
        };

        let field = constraint.as_deref().and_then(constraint_field);
        match (code.as_deref(), field) {
            (Some("23505"), Some(field)) => RepositoryError::UniqueViolation { field },
            (Some("23503"), Some(field)) => RepositoryError::ForeignKeyViolation { field },
            _ => RepositoryError::Database(err),
        }
    }
}

fn constraint_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        "nodes_name_key" => Some("name"),
        "nodes_email_key" => Some("email"),
        "nodes_phone_key" => Some("phone"),
        "nodes_supplier_id_fkey" => Some("supplier"),
        "products_owner_id_fkey" => Some("owner"),
        "users_email_key" => Some("email"),
        _ => None,
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Storage for nodes and products.
///
/// Each mutating method is a single statement in the Postgres store, so a
/// failed call leaves nothing behind.
#[async_trait]
pub trait SupplyRepository: Send + Sync {
    /// Nodes ordered by name, optionally restricted to an exact country.
    async fn list_nodes(&self, filter: &NodeFilter) -> RepoResult<Vec<Node>>;
    async fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>>;
    async fn insert_node(&self, node: NewNode) -> RepoResult<Node>;
    /// `None` when the node does not exist.
    async fn update_node(&self, id: NodeId, update: NodeUpdate) -> RepoResult<Option<Node>>;
    /// Clears the supplier of former clients and removes owned products.
    async fn delete_node(&self, id: NodeId) -> RepoResult<bool>;
    /// Sets the debt of every listed node to zero. Returns the rows touched.
    async fn clear_debt(&self, ids: &[NodeId]) -> RepoResult<u64>;
    /// Supplier links of `ids` and of every node above them.
    async fn supplier_links(&self, ids: &[NodeId]) -> RepoResult<SupplierLinks>;
    /// Supplier links of every node below `id`: its clients, their clients
    /// and so on. `id` itself is not included.
    async fn client_links(&self, id: NodeId) -> RepoResult<SupplierLinks>;
    /// Which of the given unique values already belong to another node.
    async fn find_unique_conflicts(
        &self,
        fields: UniqueNodeFields<'_>,
        exclude: Option<NodeId>,
    ) -> RepoResult<Vec<&'static str>>;
    async fn count_nodes(&self) -> RepoResult<i64>;

    async fn list_products(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    async fn insert_product(&self, product: NewProduct) -> RepoResult<Product>;
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> RepoResult<Option<Product>>;
    async fn delete_product(&self, id: ProductId) -> RepoResult<bool>;
    async fn count_products(&self) -> RepoResult<i64>;

    async fn health_check(&self) -> RepoResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> RepoResult<User>;
    async fn touch_last_login(&self, id: UserId) -> RepoResult<()>;
    async fn count_users(&self) -> RepoResult<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constraints_map_to_fields() {
        assert_eq!(constraint_field("nodes_phone_key"), Some("phone"));
        assert_eq!(constraint_field("products_owner_id_fkey"), Some("owner"));
        assert_eq!(constraint_field("nodes_supplier_id_fkey"), Some("supplier"));
        assert_eq!(constraint_field("something_else"), None);
    }

    #[test]
    fn non_database_errors_are_passed_through() {
        let err = RepositoryError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));

        let err = RepositoryError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }
}
