use serde::{Deserialize, Serialize};

use crate::editor::{Entity, EntityMessages};
use crate::models::{wire, Resource};
use crate::validation::{Schema, SUPPLIER_SCHEMA};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(rename = "empresa", default, deserialize_with = "wire::text")]
    pub company: String,
    #[serde(rename = "telefono", default, deserialize_with = "wire::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub email: String,
    #[serde(rename = "direccion", default, deserialize_with = "wire::text")]
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SupplierDraft {
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
    #[serde(rename = "empresa", default, deserialize_with = "wire::text")]
    pub company: String,
    #[serde(rename = "telefono", default, deserialize_with = "wire::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub email: String,
    #[serde(rename = "direccion", default, deserialize_with = "wire::text")]
    pub address: String,
}

impl Entity for Supplier {
    type Draft = SupplierDraft;

    const RESOURCE: Resource = Resource::Suppliers;
    const MESSAGES: EntityMessages = EntityMessages {
        load_failed: "No se pudieron cargar los proveedores",
        created: "Proveedor creado correctamente",
        updated: "Proveedor actualizado correctamente",
        deleted: "Proveedor eliminado correctamente",
        save_failed: "No se pudo guardar el proveedor",
        delete_failed: "No se pudo eliminar el proveedor",
        not_found: "Proveedor no encontrado",
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn schema() -> &'static Schema {
        &SUPPLIER_SCHEMA
    }

    fn to_draft(&self) -> SupplierDraft {
        SupplierDraft {
            name: self.name.clone(),
            company: self.company.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.company, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}
