use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::models::{
    NewNode, NewProduct, NewUser, Node, NodeFilter, NodeId, NodeUpdate, Product, ProductFilter,
    ProductId, ProductUpdate, UniqueNodeFields, User, UserId,
};
use crate::database::repository::{RepoResult, RepositoryError, SupplyRepository, UserRepository};
use crate::supply::hierarchy::SupplierLinks;

const NODE_COLUMNS: &str = "id, name, email, phone, country, city, street, building_number, \
                            supplier_id, debt_to_supplier, created_at";
const PRODUCT_COLUMNS: &str = "id, name, model, release_date, owner_id";
const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, role, \
                            is_active, is_staff, is_superuser, date_joined, last_login";

/// Repository backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupplyRepository for PgStore {
    async fn list_nodes(&self, filter: &NodeFilter) -> RepoResult<Vec<Node>> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {NODE_COLUMNS} FROM nodes"));
        if let Some(country) = &filter.country {
            query.push(" WHERE country = ").push_bind(country);
        }
        query.push(" ORDER BY name, id");

        query
            .build_query_as::<Node>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        sqlx::query_as::<_, Node>(&format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn insert_node(&self, node: NewNode) -> RepoResult<Node> {
        sqlx::query_as::<_, Node>(&format!(
            "INSERT INTO nodes (name, email, phone, country, city, street, building_number, \
             supplier_id, debt_to_supplier) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {NODE_COLUMNS}"
        ))
        .bind(&node.name)
        .bind(&node.email)
        .bind(&node.phone)
        .bind(&node.country)
        .bind(&node.city)
        .bind(&node.street)
        .bind(&node.building_number)
        .bind(node.supplier_id)
        .bind(node.debt_to_supplier)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn update_node(&self, id: NodeId, update: NodeUpdate) -> RepoResult<Option<Node>> {
        if update.is_empty() {
            return self.get_node(id).await;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE nodes SET ");
        let mut set = query.separated(", ");
        let text_columns = [
            ("name", update.name),
            ("email", update.email),
            ("phone", update.phone),
            ("country", update.country),
            ("city", update.city),
            ("street", update.street),
            ("building_number", update.building_number),
        ];
        for (column, value) in text_columns {
            if let Some(value) = value {
                set.push(format!("{column} = ")).push_bind_unseparated(value);
            }
        }
        if let Some(supplier) = update.supplier_id {
            set.push("supplier_id = ").push_bind_unseparated(supplier);
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {NODE_COLUMNS}"));

        query
            .build_query_as::<Node>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn delete_node(&self, id: NodeId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_debt(&self, ids: &[NodeId]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("UPDATE nodes SET debt_to_supplier = 0.00 WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn supplier_links(&self, ids: &[NodeId]) -> RepoResult<SupplierLinks> {
        if ids.is_empty() {
            return Ok(SupplierLinks::new());
        }
        // UNION drops repeated rows, so a cyclic chain still terminates.
        let rows: Vec<(NodeId, Option<NodeId>)> = sqlx::query_as(
            "WITH RECURSIVE chain (id, supplier_id) AS ( \
                 SELECT id, supplier_id FROM nodes WHERE id = ANY($1) \
                 UNION \
                 SELECT n.id, n.supplier_id FROM nodes n JOIN chain c ON n.id = c.supplier_id \
             ) \
             SELECT id, supplier_id FROM chain",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(rows.into_iter().collect())
    }

    async fn client_links(&self, id: NodeId) -> RepoResult<SupplierLinks> {
        let rows: Vec<(NodeId, Option<NodeId>)> = sqlx::query_as(
            "WITH RECURSIVE below (id, supplier_id) AS ( \
                 SELECT id, supplier_id FROM nodes WHERE supplier_id = $1 \
                 UNION \
                 SELECT n.id, n.supplier_id FROM nodes n JOIN below b ON n.supplier_id = b.id \
             ) \
             SELECT id, supplier_id FROM below WHERE id <> $1",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(rows.into_iter().collect())
    }

    async fn find_unique_conflicts(
        &self,
        fields: UniqueNodeFields<'_>,
        exclude: Option<NodeId>,
    ) -> RepoResult<Vec<&'static str>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT name, email, phone FROM nodes \
             WHERE (name = $1 OR email = $2 OR phone = $3) \
               AND ($4::BIGINT IS NULL OR id <> $4)",
        )
        .bind(fields.name)
        .bind(fields.email)
        .bind(fields.phone)
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        let mut taken = Vec::new();
        for (name, email, phone) in &rows {
            if fields.name == Some(name.as_str()) && !taken.contains(&"name") {
                taken.push("name");
            }
            if fields.email == Some(email.as_str()) && !taken.contains(&"email") {
                taken.push("email");
            }
            if fields.phone == Some(phone.as_str()) && !taken.contains(&"phone") {
                taken.push("phone");
            }
        }
        Ok(taken)
    }

    async fn count_nodes(&self) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM nodes")
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn list_products(&self, filter: &ProductFilter) -> RepoResult<Vec<Product>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        if let Some(owner) = filter.owner {
            query.push(" WHERE owner_id = ").push_bind(owner);
        }
        query.push(" ORDER BY name, id");

        query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn insert_product(&self, product: NewProduct) -> RepoResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, model, release_date, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.model)
        .bind(product.release_date)
        .bind(product.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> RepoResult<Option<Product>> {
        if update.is_empty() {
            return self.get_product(id).await;
        }

        let mut query = QueryBuilder::<Postgres>::new("UPDATE products SET ");
        let mut set = query.separated(", ");
        if let Some(name) = update.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(model) = update.model {
            set.push("model = ").push_bind_unseparated(model);
        }
        if let Some(release_date) = update.release_date {
            set.push("release_date = ").push_bind_unseparated(release_date);
        }
        if let Some(owner) = update.owner_id {
            set.push("owner_id = ").push_bind_unseparated(owner);
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        query
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn delete_product(&self, id: ProductId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products(&self) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn health_check(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn insert_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, phone, role, \
             is_active, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn touch_last_login(&self, id: UserId) -> RepoResult<()> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        Ok(())
    }

    async fn count_users(&self) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}
