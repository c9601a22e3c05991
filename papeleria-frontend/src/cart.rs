//! In-progress purchase or sale: an ordered list of line items kept until checkout.

use papeleria_core::error::AppError;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::models::{NewTransaction, Product, TransactionKind};
use crate::totals::Totals;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Why a cart operation was refused. The cart is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error("La cantidad debe ser mayor a 0")]
    InvalidQuantity,

    #[error("Seleccione un producto")]
    UnknownProduct(i64),

    #[error("Ingrese el precio de compra")]
    MissingPrice,

    #[error("El precio debe ser un número no negativo")]
    InvalidPrice,

    #[error("Stock insuficiente. Stock disponible: {available}")]
    InsufficientStock { available: i64 },

    #[error("El producto ya está en la lista. Elimínelo y vuelva a agregarlo.")]
    DuplicateProduct,

    #[error("No existe la línea {0}")]
    NoSuchLine(usize),

    #[error("Agregue al menos un producto")]
    Empty,

    #[error("{0}")]
    MissingCounterparty(&'static str),
}

impl CartError {
    /// Form field the message belongs next to.
    pub fn field(&self) -> &'static str {
        match self {
            CartError::InvalidQuantity | CartError::InsufficientStock { .. } => "quantity",
            CartError::UnknownProduct(_) | CartError::DuplicateProduct => "product_id",
            CartError::MissingPrice | CartError::InvalidPrice => "unit_price",
            CartError::NoSuchLine(_) | CartError::Empty => "items",
            CartError::MissingCounterparty(_) => "counterparty_id",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CartError::InvalidQuantity => "invalid_quantity",
            CartError::UnknownProduct(_) => "unknown_product",
            CartError::MissingPrice => "missing_price",
            CartError::InvalidPrice => "invalid_price",
            CartError::InsufficientStock { .. } => "insufficient_stock",
            CartError::DuplicateProduct => "duplicate_product",
            CartError::NoSuchLine(_) => "no_such_line",
            CartError::Empty => "empty",
            CartError::MissingCounterparty(_) => "missing_counterparty",
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        if let CartError::NoSuchLine(_) = err {
            return AppError::NotFound(anyhow::anyhow!(err.to_string()));
        }
        let mut error = ValidationError::new(err.code());
        error.message = Some(err.to_string().into());
        let mut errors = ValidationErrors::new();
        errors.add(err.field(), error);
        AppError::ValidationError(errors)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Cart<K> {
    pub counterparty_id: Option<i64>,
    items: Vec<LineItem>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K> Default for Cart<K> {
    fn default() -> Self {
        Self {
            counterparty_id: None,
            items: Vec::new(),
            kind: PhantomData,
        }
    }
}

impl<K: TransactionKind> Cart<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn totals(&self) -> Totals {
        Totals::from_items(&self.items)
    }

    /// Appends a line for a product of `catalog`. Without `unit_price`, sales charge the
    /// catalog price; purchases must state what was paid.
    ///
    /// Checks run in order: quantity, product, price, then for sales stock and duplicates.
    pub fn add(
        &mut self,
        catalog: &[Product],
        product_id: i64,
        quantity: i64,
        unit_price: Option<f64>,
    ) -> Result<&[LineItem], CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product = catalog
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(CartError::UnknownProduct(product_id))?;

        let unit_price = match unit_price {
            Some(price) => price,
            None if K::PRICE_FROM_CATALOG => product.price,
            None => return Err(CartError::MissingPrice),
        };
        if !unit_price.is_finite() || unit_price < 0.0 {
            return Err(CartError::InvalidPrice);
        }

        if K::CHECKS_STOCK {
            if quantity > product.stock {
                return Err(CartError::InsufficientStock {
                    available: product.stock,
                });
            }
            if self.items.iter().any(|item| item.product_id == product_id) {
                return Err(CartError::DuplicateProduct);
            }
        }

        self.items.push(LineItem {
            product_id,
            quantity,
            unit_price,
        });
        Ok(&self.items)
    }

    /// Removes the line at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Result<LineItem, CartError> {
        if index >= self.items.len() {
            return Err(CartError::NoSuchLine(index));
        }
        Ok(self.items.remove(index))
    }

    pub fn set_counterparty(&mut self, counterparty_id: i64) -> Result<(), CartError> {
        if counterparty_id <= 0 {
            return Err(CartError::MissingCounterparty(K::MISSING_COUNTERPARTY));
        }
        self.counterparty_id = Some(counterparty_id);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.counterparty_id = None;
    }

    /// Payload for the remote API, refused locally while the cart is incomplete.
    pub fn submission(&self) -> Result<NewTransaction<'_, K>, CartError> {
        if self.items.is_empty() {
            return Err(CartError::Empty);
        }
        let counterparty_id = self
            .counterparty_id
            .ok_or(CartError::MissingCounterparty(K::MISSING_COUNTERPARTY))?;
        Ok(NewTransaction::new(counterparty_id, &self.items))
    }
}
