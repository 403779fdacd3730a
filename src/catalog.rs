// 🏷️ Category Catalog - read-only view of the categories table
//
// Other components receive the catalog as a collaborator; they never
// reach into the table themselves.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use tracing::warn;

use crate::db::{Category, CategoryId};
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct CategoryCatalog<'a> {
    conn: &'a Connection,
}

impl<'a> CategoryCatalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every stored category as id → label.
    pub fn list_categories(&self) -> Result<BTreeMap<CategoryId, String>> {
        let mut stmt = self.conn.prepare("SELECT id, type FROM categories")?;
        let categories: BTreeMap<CategoryId, String> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .map_err(|e| {
                warn!(error = %e, "failed to read categories");
                e
            })?;
        Ok(categories)
    }

    /// Look up one category. `None` for ids with no row.
    pub fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, type FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        label: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }
}
