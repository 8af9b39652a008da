//! Modelos de dominio (productos del catálogo y resultados derivados).

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Un producto del catálogo.
/// No tiene identificador propio: su posición en el catálogo es su orden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub title: String,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    pub category: String,
}

impl Product {
    /// Construye un producto validando sus invariantes.
    pub fn new(
        title: impl Into<String>,
        price: f64,
        rating: f64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(anyhow!("El título del producto no puede estar vacío"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(anyhow!("Precio inválido para '{title}': {price}"));
        }
        if !(0.0..=5.0).contains(&rating) {
            return Err(anyhow!("Valoración fuera de rango [0, 5] para '{title}': {rating}"));
        }

        Ok(Self {
            title,
            price,
            rating,
            description: description.into(),
            category: category.into(),
        })
    }
}

/// Precio medio de una categoría.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub category: String,
    pub mean_price: f64,
    pub count: usize,
}

/// Imagen del gráfico ya codificada, lista para enviarse tal cual.
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub generated_at: DateTime<Utc>,
}

impl ChartArtifact {
    /// `data:<media-type>;base64,<payload>`, embebible directamente en un `<img>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

/// Resultado del renderizado: o hay gráfico o no lo hay. Nunca es un error.
#[derive(Debug, Clone)]
pub enum ChartOutcome {
    Chart(ChartArtifact),
    NoChart,
}

impl ChartOutcome {
    pub fn artifact(&self) -> Option<&ChartArtifact> {
        match self {
            Self::Chart(artifact) => Some(artifact),
            Self::NoChart => None,
        }
    }

    pub fn is_chart(&self) -> bool {
        matches!(self, Self::Chart(_))
    }
}
