pub mod category;
pub mod customer;
pub mod product;
pub mod supplier;
pub mod transaction;
pub mod user;
pub mod wire;

pub use category::{Category, CategoryDraft};
pub use customer::{Customer, CustomerDraft};
pub use product::{Product, ProductDraft};
pub use supplier::{Supplier, SupplierDraft};
pub use transaction::{NewTransaction, Purchase, Sale, Transaction, TransactionKind, TransactionLine};

use std::fmt;

/// Collections exposed by the remote REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Customers,
    Suppliers,
    Products,
    Categories,
    Purchases,
    Sales,
}

impl Resource {
    /// Path segment on the remote API (`{base}/{path}/`).
    pub fn path(self) -> &'static str {
        match self {
            Resource::Customers => "clientes",
            Resource::Suppliers => "proveedores",
            Resource::Products => "productos",
            Resource::Categories => "categorias",
            Resource::Purchases => "compras",
            Resource::Sales => "ventas",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
