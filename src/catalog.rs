//! Catálogo de productos en memoria.
//!
//! Se construye una sola vez al arrancar y no se modifica nunca; los handlers
//! lo reciben compartido a través de `Arc<Catalog>`.

use anyhow::Result;

use crate::models::Product;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Catálogo fijo con el que arranca el servidor (simula datos extraídos
    /// de una tienda online).
    pub fn seed() -> Result<Self> {
        let products = vec![
            Product::new(
                "Pro-Grade Wireless Mouse",
                89.99,
                4.7,
                "Ergonomic wireless mouse with 8 programmable buttons and 16,000 DPI sensor.",
                "Peripherals",
            )?,
            Product::new(
                "4K Ultra-HD Monitor",
                349.99,
                4.5,
                "27-inch IPS panel with 1ms response time and HDR support. Perfect for gaming and design.",
                "Monitors",
            )?,
            Product::new(
                "Mechanical Keyboard (RGB)",
                129.99,
                4.8,
                "Full-size mechanical keyboard with custom blue switches and per-key RGB lighting.",
                "Peripherals",
            )?,
            Product::new(
                "Noise-Cancelling Headphones",
                249.50,
                4.6,
                "Over-ear headphones with industry-leading active noise cancellation and 30-hour battery life.",
                "Audio",
            )?,
            Product::new(
                "Portable SSD 1TB",
                119.99,
                4.9,
                "Blazing fast external SSD with read/write speeds up to 1,050 MB/s. USB-C compatible.",
                "Storage",
            )?,
            Product::new(
                "Smartwatch Series 8",
                399.00,
                4.4,
                "Advanced health tracking, GPS, and a stunning always-on display.",
                "Wearables",
            )?,
            Product::new(
                "Gaming Laptop 15-inch",
                1499.99,
                4.3,
                "High-performance gaming laptop with 12th-gen CPU and next-gen graphics card.",
                "Computers",
            )?,
            Product::new(
                "Wireless Earbuds Pro",
                199.99,
                4.7,
                "True wireless earbuds with adaptive EQ, noise cancellation, and spatial audio.",
                "Audio",
            )?,
        ];
        Ok(Self::new(products))
    }

    /// Vista de solo lectura sobre todos los productos, en orden de inserción.
    pub fn all_records(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Categorías distintas en orden de primera aparición.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_keeps_insertion_order() {
        let catalog = Catalog::seed().unwrap();
        assert_eq!(catalog.len(), 8);
        let titles: Vec<_> = catalog.all_records().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles[0], "Pro-Grade Wireless Mouse");
        assert_eq!(titles[1], "4K Ultra-HD Monitor");
        assert_eq!(titles[7], "Wireless Earbuds Pro");
    }

    #[test]
    fn seed_categories_in_first_seen_order() {
        let catalog = Catalog::seed().unwrap();
        assert_eq!(
            catalog.categories(),
            vec!["Peripherals", "Monitors", "Audio", "Storage", "Wearables", "Computers"]
        );
    }

    #[test]
    fn empty_catalog_returns_empty_slice() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.all_records().is_empty());
        assert!(catalog.categories().is_empty());
    }
}
