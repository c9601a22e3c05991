//! Purchases and sales as stored by the remote API.
//!
//! Both share one shape; [`TransactionKind`] pins down the field names and user messages that
//! differ between `ventas` and `compras`.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::marker::PhantomData;

use crate::cart::LineItem;
use crate::models::{wire, Resource};
use crate::services::CartStore;
use crate::validation::{Schema, PURCHASE_LINE_SCHEMA, SALE_LINE_SCHEMA};
use crate::AppState;

pub trait TransactionKind: Sized + Send + Sync + 'static {
    const RESOURCE: Resource;
    /// `cliente` for sales, `proveedor` for purchases.
    const COUNTERPARTY_FIELD: &'static str;
    const PRICE_FIELD: &'static str;
    /// Sales are checked against cached stock and refuse duplicate lines.
    const CHECKS_STOCK: bool;
    /// Lines without an explicit price take the catalog price.
    const PRICE_FROM_CATALOG: bool;

    const MISSING_COUNTERPARTY: &'static str;
    const PROCESS_ERROR: &'static str;
    const SUCCESS: &'static str;
    const LOAD_FAILED: &'static str;
    const NOT_FOUND: &'static str;

    fn line_schema() -> &'static Schema;

    /// Carts in progress for this kind, one per session.
    fn carts(state: &AppState) -> &CartStore<Self>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sale;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Purchase;

impl TransactionKind for Sale {
    const RESOURCE: Resource = Resource::Sales;
    const COUNTERPARTY_FIELD: &'static str = "cliente";
    const PRICE_FIELD: &'static str = "precio_venta";
    const CHECKS_STOCK: bool = true;
    const PRICE_FROM_CATALOG: bool = true;

    const MISSING_COUNTERPARTY: &'static str = "Debe seleccionar un cliente";
    const PROCESS_ERROR: &'static str = "Error al procesar la venta";
    const SUCCESS: &'static str = "Venta registrada con éxito";
    const LOAD_FAILED: &'static str = "Error al cargar datos";
    const NOT_FOUND: &'static str = "Venta no encontrada";

    fn line_schema() -> &'static Schema {
        &SALE_LINE_SCHEMA
    }

    fn carts(state: &AppState) -> &CartStore<Self> {
        &state.sale_carts
    }
}

impl TransactionKind for Purchase {
    const RESOURCE: Resource = Resource::Purchases;
    const COUNTERPARTY_FIELD: &'static str = "proveedor";
    const PRICE_FIELD: &'static str = "precio_compra";
    const CHECKS_STOCK: bool = false;
    const PRICE_FROM_CATALOG: bool = false;

    const MISSING_COUNTERPARTY: &'static str = "Debe seleccionar un proveedor";
    const PROCESS_ERROR: &'static str = "Error al procesar la compra";
    const SUCCESS: &'static str = "Compra registrada con éxito";
    const LOAD_FAILED: &'static str = "Error al cargar datos";
    const NOT_FOUND: &'static str = "Compra no encontrada";

    fn line_schema() -> &'static Schema {
        &PURCHASE_LINE_SCHEMA
    }

    fn carts(state: &AppState) -> &CartStore<Self> {
        &state.purchase_carts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    #[serde(alias = "cliente", alias = "proveedor", default)]
    pub counterparty_id: Option<i64>,
    #[serde(alias = "fecha", default = "Utc::now", deserialize_with = "wire::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<TransactionLine>,
    #[serde(default, deserialize_with = "wire::decimal")]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionLine {
    #[serde(alias = "producto")]
    pub product_id: i64,
    #[serde(alias = "cantidad")]
    pub quantity: i64,
    #[serde(
        alias = "precio_venta",
        alias = "precio_compra",
        alias = "precio",
        default,
        deserialize_with = "wire::decimal"
    )]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "wire::decimal")]
    pub subtotal: f64,
}

impl TransactionLine {
    /// Line amount; older records come back without `subtotal`.
    pub fn amount(&self) -> f64 {
        if self.subtotal > 0.0 {
            self.subtotal
        } else {
            self.quantity as f64 * self.unit_price
        }
    }
}

/// Creation payload, serialised with the kind's field names.
pub struct NewTransaction<'a, K> {
    pub counterparty_id: i64,
    pub items: &'a [LineItem],
    kind: PhantomData<K>,
}

impl<'a, K: TransactionKind> NewTransaction<'a, K> {
    pub fn new(counterparty_id: i64, items: &'a [LineItem]) -> Self {
        Self {
            counterparty_id,
            items,
            kind: PhantomData,
        }
    }
}

impl<K: TransactionKind> Serialize for NewTransaction<'_, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(K::COUNTERPARTY_FIELD, &self.counterparty_id)?;
        map.serialize_entry(
            "items",
            &Lines::<K> {
                items: self.items,
                kind: PhantomData,
            },
        )?;
        map.end()
    }
}

struct Lines<'a, K> {
    items: &'a [LineItem],
    kind: PhantomData<K>,
}

impl<K: TransactionKind> Serialize for Lines<'_, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in self.items {
            seq.serialize_element(&Line::<K> {
                item,
                kind: PhantomData,
            })?;
        }
        seq.end()
    }
}

struct Line<'a, K> {
    item: &'a LineItem,
    kind: PhantomData<K>,
}

impl<K: TransactionKind> Serialize for Line<'_, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("producto", &self.item.product_id)?;
        map.serialize_entry("cantidad", &self.item.quantity)?;
        map.serialize_entry(K::PRICE_FIELD, &self.item.unit_price)?;
        map.end()
    }
}
