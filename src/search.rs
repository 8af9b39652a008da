//! Búsqueda de texto libre sobre el catálogo.
//!
//! Coincidencia por subcadena sin distinguir mayúsculas, sobre `title` o
//! `description`. No hay tokenización, ranking ni búsqueda difusa.

use crate::models::Product;

/// Devuelve la consulta recortada, o `None` si queda vacía.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Filtra `records` conservando su orden relativo.
/// Con una consulta vacía (o sólo espacios) devuelve todos los registros.
pub fn filter_products<'a>(records: &'a [Product], query: &str) -> Vec<&'a Product> {
    let Some(needle) = normalize_query(query) else {
        return records.iter().collect();
    };
    let needle = needle.to_lowercase();

    records
        .iter()
        .filter(|product| {
            product.title.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
        .collect()
}
