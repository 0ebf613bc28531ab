pub mod node_products;
pub mod nodes;
pub mod products;
