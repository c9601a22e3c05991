//! Declarative form validation: a schema is an ordered list of `field -> rule -> message`
//! entries evaluated the same way for every screen.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use validator::{ValidationError, ValidationErrors};

static LETTERS_AND_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\s]+$").expect("letters pattern is valid"));
static TEN_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}$").expect("phone pattern is valid"));
static FIVE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}$").expect("product code pattern is valid"));

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Non-blank after trimming.
    Required,
    Pattern(&'static Lazy<Regex>),
    /// Finite number strictly greater than zero.
    PositiveNumber,
    /// Finite number, zero allowed.
    NonNegativeNumber,
    NonNegativeInteger,
    PositiveInteger,
    /// Id of another record; must be a positive integer.
    Reference,
}

impl Rule {
    pub fn code(self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Pattern(_) => "pattern",
            Rule::PositiveNumber => "positive_number",
            Rule::NonNegativeNumber => "non_negative_number",
            Rule::NonNegativeInteger => "non_negative_integer",
            Rule::PositiveInteger => "positive_integer",
            Rule::Reference => "reference",
        }
    }

    pub fn accepts(self, value: &str) -> bool {
        match self {
            Rule::Required => !value.trim().is_empty(),
            Rule::Pattern(regex) => regex.is_match(value),
            Rule::PositiveNumber => value
                .trim()
                .parse::<f64>()
                .map(|n| n.is_finite() && n > 0.0)
                .unwrap_or(false),
            Rule::NonNegativeNumber => value
                .trim()
                .parse::<f64>()
                .map(|n| n.is_finite() && n >= 0.0)
                .unwrap_or(false),
            Rule::NonNegativeInteger => value.trim().parse::<i64>().map(|n| n >= 0).unwrap_or(false),
            Rule::PositiveInteger | Rule::Reference => {
                value.trim().parse::<i64>().map(|n| n > 0).unwrap_or(false)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: &'static str, rule: Rule, message: &'static str) -> Self {
        self.rules.push(FieldRule {
            field,
            rule,
            message,
        });
        self
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Validates any draft that serializes to a JSON object.
    pub fn validate<D: Serialize>(&self, draft: &D) -> Result<(), ValidationErrors> {
        match serde_json::to_value(draft) {
            Ok(Value::Object(fields)) => self.validate_fields(&fields),
            _ => self.validate_fields(&Map::new()),
        }
    }

    /// Reports the first failing rule of every field.
    pub fn validate_fields(&self, fields: &Map<String, Value>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut failed: HashSet<&'static str> = HashSet::new();

        for entry in &self.rules {
            if failed.contains(entry.field) {
                continue;
            }
            let value = fields.get(entry.field).map(as_text).unwrap_or_default();
            if !entry.rule.accepts(&value) {
                let mut error = ValidationError::new(entry.rule.code());
                error.message = Some(entry.message.into());
                errors.add(entry.field, error);
                failed.insert(entry.field);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub static CUSTOMER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .rule(
            "nombre",
            Rule::Pattern(&LETTERS_AND_SPACES),
            "El nombre solo debe contener letras y espacios",
        )
        .rule("direccion", Rule::Required, "La dirección es requerida")
        .rule(
            "telefono",
            Rule::Pattern(&TEN_DIGITS),
            "El teléfono debe tener 10 dígitos",
        )
        .rule("email", Rule::Required, "El email es requerido")
});

pub static SUPPLIER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .rule(
            "nombre",
            Rule::Pattern(&LETTERS_AND_SPACES),
            "Solo se permiten letras y espacios",
        )
        .rule(
            "empresa",
            Rule::Pattern(&LETTERS_AND_SPACES),
            "Solo se permiten letras y espacios",
        )
        .rule(
            "telefono",
            Rule::Pattern(&TEN_DIGITS),
            "Debe ser un número de teléfono de 10 dígitos",
        )
        .rule("email", Rule::Required, "El email es requerido")
        .rule("direccion", Rule::Required, "La dirección es requerida")
});

pub static PRODUCT_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .rule(
            "codigo",
            Rule::Pattern(&FIVE_DIGITS),
            "El código debe ser de 5 dígitos",
        )
        .rule(
            "nombre",
            Rule::Pattern(&LETTERS_AND_SPACES),
            "El nombre solo debe contener letras y espacios",
        )
        .rule("descripcion", Rule::Required, "El campo es requerido")
        .rule(
            "precio",
            Rule::PositiveNumber,
            "El valor debe ser un número mayor a 0",
        )
        .rule(
            "stock",
            Rule::NonNegativeInteger,
            "El stock debe ser un entero no negativo",
        )
        .rule("categoria", Rule::Reference, "El campo es requerido")
        .rule("proveedor", Rule::Reference, "El campo es requerido")
});

pub static CATEGORY_SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::new().rule("nombre", Rule::Required, "El nombre es requerido"));

/// Line entry on the sale screen; the price comes from the product.
pub static SALE_LINE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .rule("product_id", Rule::Reference, "Seleccione un producto")
        .rule(
            "quantity",
            Rule::PositiveInteger,
            "La cantidad debe ser mayor a 0",
        )
});

pub static PURCHASE_LINE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .rule("product_id", Rule::Reference, "Seleccione un producto")
        .rule("quantity", Rule::Required, "Ingrese una cantidad")
        .rule(
            "quantity",
            Rule::PositiveInteger,
            "La cantidad debe ser mayor a 0",
        )
        .rule("unit_price", Rule::Required, "Ingrese el precio de compra")
        .rule(
            "unit_price",
            Rule::NonNegativeNumber,
            "El precio debe ser un número no negativo",
        )
});
