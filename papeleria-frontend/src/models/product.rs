use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::editor::{Entity, EntityMessages};
use crate::models::{wire, Resource};
use crate::services::{ApiError, UpstreamContext};
use crate::validation::{Schema, PRODUCT_SCHEMA};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "codigo", default, deserialize_with = "wire::text")]
    pub code: String,
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(rename = "descripcion", default, deserialize_with = "wire::text")]
    pub description: String,
    #[serde(rename = "precio", default, deserialize_with = "wire::decimal")]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "categoria", default)]
    pub category_id: Option<i64>,
    #[serde(rename = "proveedor", default)]
    pub supplier_id: Option<i64>,
}

/// Form fields are kept as entered; numeric checks belong to the schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    #[serde(rename = "codigo", default, deserialize_with = "wire::text")]
    pub code: String,
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(rename = "descripcion", default, deserialize_with = "wire::text")]
    pub description: String,
    #[serde(rename = "precio", default, deserialize_with = "wire::text")]
    pub price: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub stock: String,
    #[serde(rename = "categoria", default, deserialize_with = "wire::reference")]
    pub category_id: i64,
    #[serde(rename = "proveedor", default, deserialize_with = "wire::reference")]
    pub supplier_id: i64,
}

impl Entity for Product {
    type Draft = ProductDraft;

    const RESOURCE: Resource = Resource::Products;
    const MESSAGES: EntityMessages = EntityMessages {
        load_failed: "No se pudieron cargar los productos",
        created: "Producto creado correctamente",
        updated: "Producto actualizado correctamente",
        deleted: "Producto eliminado correctamente",
        save_failed: "No se pudo guardar el producto",
        delete_failed: "No se pudo eliminar el producto",
        not_found: "Producto no encontrado",
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn schema() -> &'static Schema {
        &PRODUCT_SCHEMA
    }

    fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: format!("{:.2}", self.price),
            stock: self.stock.to_string(),
            category_id: self.category_id.unwrap_or_default(),
            supplier_id: self.supplier_id.unwrap_or_default(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase()) || self.code.contains(query)
    }

    /// Goes through the session's catalog so its carts see the same snapshot as the list.
    fn fetch_all(
        state: &AppState,
        ctx: &UpstreamContext,
    ) -> impl Future<Output = Result<Vec<Self>, ApiError>> + Send {
        async move {
            let products = state.catalog.revalidate(&state.api, ctx).await?;
            Ok((*products).clone())
        }
    }
}
