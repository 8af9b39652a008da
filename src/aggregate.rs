//! Agregación del catálogo: precio medio por categoría.

use std::collections::HashMap;

use crate::models::{AggregateRow, Product};

/// Orden de las categorías en la salida (y por tanto en el eje X del gráfico).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryOrder {
    /// Orden lexicográfico por nombre de categoría.
    #[default]
    Alphabetical,
    /// Orden de primera aparición recorriendo los registros.
    FirstSeen,
}

impl CategoryOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::FirstSeen => "first-seen",
        }
    }
}

/// Agrupa por categoría exacta (sin normalizar mayúsculas) y calcula el
/// precio medio de cada grupo. Un registro cae en exactamente un grupo.
pub fn average_price_by_category(records: &[Product], order: CategoryOrder) -> Vec<AggregateRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    // (categoría, suma, cantidad) en orden de primera aparición
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for product in records {
        let category = product.category.as_str();
        match index.get(category) {
            Some(&i) => {
                groups[i].1 += product.price;
                groups[i].2 += 1;
            }
            None => {
                index.insert(category, groups.len());
                groups.push((category, product.price, 1));
            }
        }
    }

    if order == CategoryOrder::Alphabetical {
        groups.sort_by(|a, b| a.0.cmp(b.0));
    }

    groups
        .into_iter()
        .map(|(category, sum, count)| AggregateRow {
            category: category.to_string(),
            mean_price: sum / count as f64,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::collections::HashSet;

    const EPS: f64 = 1e-9;

    fn scenario() -> Vec<Product> {
        vec![
            Product::new("Pro-Grade Wireless Mouse", 89.99, 4.7, "", "Peripherals").unwrap(),
            Product::new("Mechanical Keyboard (RGB)", 129.99, 4.8, "", "Peripherals").unwrap(),
            Product::new("4K Ultra-HD Monitor", 349.99, 4.5, "", "Monitors").unwrap(),
        ]
    }

    fn mean_of(rows: &[AggregateRow], category: &str) -> f64 {
        rows.iter()
            .find(|r| r.category == category)
            .map(|r| r.mean_price)
            .unwrap_or(f64::NAN)
    }

    #[test]
    fn scenario_means() {
        let rows = average_price_by_category(&scenario(), CategoryOrder::Alphabetical);
        assert_eq!(rows.len(), 2);
        assert!((mean_of(&rows, "Peripherals") - 109.99).abs() < EPS);
        assert!((mean_of(&rows, "Monitors") - 349.99).abs() < EPS);
    }

    #[test]
    fn alphabetical_order() {
        let rows = average_price_by_category(&scenario(), CategoryOrder::Alphabetical);
        let categories: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Monitors", "Peripherals"]);
    }

    #[test]
    fn first_seen_order() {
        let rows = average_price_by_category(&scenario(), CategoryOrder::FirstSeen);
        let categories: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Peripherals", "Monitors"]);
    }

    #[test]
    fn categories_match_distinct_set_and_counts_cover_all_records() {
        let catalog = Catalog::seed().unwrap();
        let records = catalog.all_records();
        let rows = average_price_by_category(records, CategoryOrder::Alphabetical);

        let expected: HashSet<&str> = records.iter().map(|p| p.category.as_str()).collect();
        let actual: HashSet<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(actual, expected);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), records.len());

        for row in &rows {
            let prices: Vec<f64> = records
                .iter()
                .filter(|p| p.category == row.category)
                .map(|p| p.price)
                .collect();
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            assert!((row.mean_price - mean).abs() < EPS, "{}", row.category);
        }
        assert!((mean_of(&rows, "Audio") - 224.745).abs() < EPS);
    }

    #[test]
    fn grouping_is_case_sensitive() {
        let records = vec![
            Product::new("A", 10.0, 1.0, "", "audio").unwrap(),
            Product::new("B", 20.0, 1.0, "", "Audio").unwrap(),
        ];
        let rows = average_price_by_category(&records, CategoryOrder::FirstSeen);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "audio");
        assert_eq!(rows[0].count, 1);
    }

    #[test]
    fn empty_input_gives_no_rows() {
        assert!(average_price_by_category(&[], CategoryOrder::FirstSeen).is_empty());
    }
}
