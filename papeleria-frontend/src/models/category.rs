use serde::{Deserialize, Serialize};

use crate::editor::{Entity, EntityMessages};
use crate::models::{wire, Resource};
use crate::validation::{Schema, CATEGORY_SCHEMA};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategoryDraft {
    #[serde(rename = "nombre", default, deserialize_with = "wire::text")]
    pub name: String,
}

impl Entity for Category {
    type Draft = CategoryDraft;

    const RESOURCE: Resource = Resource::Categories;
    const MESSAGES: EntityMessages = EntityMessages {
        load_failed: "No se pudieron cargar las categorías",
        created: "Categoría creada correctamente",
        updated: "Categoría actualizada correctamente",
        deleted: "Categoría eliminada correctamente",
        save_failed: "No se pudo guardar la categoría",
        delete_failed: "No se pudo eliminar la categoría",
        not_found: "Categoría no encontrada",
    };

    fn id(&self) -> i64 {
        self.id
    }

    fn schema() -> &'static Schema {
        &CATEGORY_SCHEMA
    }

    fn to_draft(&self) -> CategoryDraft {
        CategoryDraft {
            name: self.name.clone(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}
