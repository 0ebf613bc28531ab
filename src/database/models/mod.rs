pub mod node;
pub mod product;
pub mod user;

pub use node::{NewNode, Node, NodeFilter, NodeId, NodeUpdate, NodeView, UniqueNodeFields};
pub use product::{NewProduct, Product, ProductFilter, ProductId, ProductUpdate};
pub use user::{NewUser, Role, User, UserId};
