use serde::{Deserialize, Serialize};

use crate::editor::{Entity, EntityMessages};
use crate::models::{wire, Resource};
use crate::validation::{Schema, CUSTOMER_SCHEMA};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(rename = "direccion", default, deserialize_with = "wire::text")]
    pub address: String,
    #[serde(rename = "telefono", default, deserialize_with = "wire::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub email: String,
}

/// Editable fields of a customer, as sent to `clientes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerDraft {
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(rename = "direccion", default, deserialize_with = "wire::text")]
    pub address: String,
    #[serde(rename = "telefono", default, deserialize_with = "wire::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub email: String,
}

impl Entity for Customer {
    type Draft = CustomerDraft;

    const RESOURCE: Resource = Resource::Customers;
    const MESSAGES: EntityMessages = EntityMessages {
        load_failed: "No se pudieron cargar los clientes",
        created: "Cliente creado correctamente",
        updated: "Cliente actualizado correctamente",
        deleted: "Cliente eliminado correctamente",
        save_failed: "No se pudo guardar el cliente",
        delete_failed: "No se pudo eliminar el cliente",
        not_found: "Cliente no encontrado",
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn schema() -> &'static Schema {
        &CUSTOMER_SCHEMA
    }

    fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
            || self.phone.contains(&query)
    }
}
