//! Gráfico de barras del precio medio por categoría.
//!
//! Flujo:
//!   1. Agregación del catálogo completo (`aggregate::average_price_by_category`).
//!   2. Dibujo del gráfico con `plotters` sobre un backend SVG en memoria.
//!   3. Rasterizado a PNG con `resvg` (si el formato configurado es PNG).
//!   4. Empaquetado como `ChartArtifact` (bytes + tipo MIME).
//!
//! Cualquier fallo en estos pasos se registra y se convierte en
//! `ChartOutcome::NoChart`: el gráfico es opcional y el listado debe poder
//! mostrarse igualmente.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::Utc;
use plotters::prelude::*;
use resvg::{tiny_skia, usvg};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    aggregate,
    config::{ChartFormat, ChartSettings},
    models::{AggregateRow, ChartArtifact, ChartOutcome, Product},
};

const TITLE: &str = "Average Product Price by Category";
const X_DESC: &str = "Category";
const Y_DESC: &str = "Average Price ($)";

// Paleta tipo viridis, de oscuro a claro.
const PALETTE: [RGBColor; 8] = [
    RGBColor(68, 1, 84),
    RGBColor(70, 50, 126),
    RGBColor(54, 92, 141),
    RGBColor(39, 127, 142),
    RGBColor(31, 161, 135),
    RGBColor(74, 193, 109),
    RGBColor(160, 218, 57),
    RGBColor(253, 231, 37),
];

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("no hay categorías que representar")]
    NoGroups,
    #[error("error dibujando el gráfico: {0}")]
    Draw(String),
    #[error("SVG inválido: {0}")]
    Svg(String),
    #[error("error rasterizando a PNG: {0}")]
    Raster(String),
    #[error("la librería de dibujo entró en pánico")]
    Panicked,
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Renderizador reutilizable entre peticiones.
/// Sólo guarda configuración y la base de fuentes del sistema, cargada una vez.
pub struct ChartRenderer {
    settings: ChartSettings,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ChartRenderer {
    pub fn new(settings: ChartSettings) -> Self {
        let fontdb = match settings.format {
            ChartFormat::Png => load_fonts(),
            // En SVG el texto lo resuelve quien muestre la imagen.
            ChartFormat::Svg => usvg::fontdb::Database::new(),
        };
        Self {
            settings,
            fontdb: Arc::new(fontdb),
        }
    }

    /// Precio medio por categoría con el orden configurado.
    pub fn aggregate(&self, records: &[Product]) -> Vec<AggregateRow> {
        aggregate::average_price_by_category(records, self.settings.category_order)
    }

    /// Renderiza el gráfico de `records`. Nunca falla: ante cualquier problema
    /// devuelve `ChartOutcome::NoChart`.
    pub fn render(&self, records: &[Product]) -> ChartOutcome {
        if records.is_empty() {
            debug!("Catálogo vacío: no se genera gráfico.");
            return ChartOutcome::NoChart;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.try_render(records)))
            .unwrap_or(Err(ChartError::Panicked));

        match result {
            Ok(artifact) => {
                debug!(
                    "Gráfico generado ({}, {} bytes).",
                    artifact.media_type,
                    artifact.bytes.len()
                );
                ChartOutcome::Chart(artifact)
            }
            Err(err) => {
                warn!("No se pudo generar la visualización: {err}");
                ChartOutcome::NoChart
            }
        }
    }

    fn try_render(&self, records: &[Product]) -> Result<ChartArtifact, ChartError> {
        let rows = self.aggregate(records);
        let (width, height) = (self.settings.width, self.settings.height);
        let svg = draw_svg(&rows, width, height)?;

        let bytes = match self.settings.format {
            ChartFormat::Svg => svg.into_bytes(),
            ChartFormat::Png => rasterize(&svg, self.fontdb.clone())?,
        };

        Ok(ChartArtifact {
            media_type: self.settings.format.media_type(),
            bytes,
            width,
            height,
            generated_at: Utc::now(),
        })
    }
}

/// Dibuja una barra por fila. Devuelve el documento SVG completo.
pub fn draw_svg(rows: &[AggregateRow], width: u32, height: u32) -> Result<String, ChartError> {
    if rows.is_empty() {
        return Err(ChartError::NoGroups);
    }

    let n = rows.len() as u32;
    let max_price = rows.iter().map(|r| r.mean_price).fold(0.0_f64, f64::max);
    let y_max = if max_price > 0.0 { max_price * 1.1 } else { 1.0 };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(TITLE, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)
            .map_err(draw_err)?;

        let category_label = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => rows
                .get(*i as usize)
                .map(|row| row.category.clone())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&category_label)
            .y_label_formatter(&|price: &f64| format!("{price:.0}"))
            .x_desc(X_DESC)
            .y_desc(Y_DESC)
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let i = i as u32;
                let color = PALETTE[i as usize % PALETTE.len()];
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), row.mean_price),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 10, 10);
                bar
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}

/// Convierte el SVG en PNG sobre fondo blanco.
fn rasterize(svg: &str, fontdb: Arc<usvg::fontdb::Database>) -> Result<Vec<u8>, ChartError> {
    let mut options = usvg::Options::default();
    options.fontdb = fontdb;

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ChartError::Svg(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ChartError::Raster(format!("lienzo inválido {}x{}", size.width(), size.height())))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| ChartError::Raster(e.to_string()))
}

/// Carga las fuentes del sistema y elige una familia sans-serif disponible.
/// Sin fuentes el PNG se genera igualmente, sólo que sin textos.
fn load_fonts() -> usvg::fontdb::Database {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let families: Vec<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
        .collect();

    let preferred = ["Arial", "DejaVu Sans", "Liberation Sans", "Noto Sans", "Helvetica"];
    let chosen = preferred
        .iter()
        .find(|name| families.iter().any(|f| f == *name))
        .map(|name| name.to_string())
        .or_else(|| families.iter().find(|f| f.contains("Sans")).cloned())
        .or_else(|| families.first().cloned());

    match chosen {
        Some(family) => {
            info!("Fuentes cargadas: {} caras, sans-serif = '{family}'", db.len());
            db.set_sans_serif_family(family);
        }
        None => warn!("No se encontraron fuentes del sistema; el gráfico PNG no tendrá textos."),
    }
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate::CategoryOrder, catalog::Catalog};
    use base64::{engine::general_purpose::STANDARD, Engine};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn settings(format: ChartFormat) -> ChartSettings {
        ChartSettings {
            format,
            width: 640,
            height: 400,
            category_order: CategoryOrder::Alphabetical,
        }
    }

    #[test]
    fn empty_records_yield_no_chart() {
        let renderer = ChartRenderer::new(settings(ChartFormat::Svg));
        assert!(!renderer.render(&[]).is_chart());
    }

    #[test]
    fn svg_chart_has_one_label_per_category() {
        let catalog = Catalog::seed().unwrap();
        let renderer = ChartRenderer::new(settings(ChartFormat::Svg));
        let outcome = renderer.render(catalog.all_records());

        let artifact = outcome.artifact().expect("debería haber gráfico");
        assert_eq!(artifact.media_type, "image/svg+xml");
        assert_eq!((artifact.width, artifact.height), (640, 400));

        let svg = String::from_utf8(artifact.bytes.clone()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(TITLE));
        assert!(svg.contains(X_DESC));
        for category in catalog.categories() {
            assert!(svg.contains(category), "falta la categoría {category}");
        }
    }

    #[test]
    fn draw_svg_rejects_empty_rows() {
        assert!(matches!(draw_svg(&[], 100, 100), Err(ChartError::NoGroups)));
    }

    #[test]
    fn zero_prices_still_render() {
        let records = vec![Product::new("Gratis", 0.0, 3.0, "", "Promos").unwrap()];
        let renderer = ChartRenderer::new(settings(ChartFormat::Svg));
        assert!(renderer.render(&records).is_chart());
    }

    #[test]
    fn png_chart_data_uri_decodes_to_artifact_bytes() {
        let catalog = Catalog::seed().unwrap();
        let renderer = ChartRenderer::new(ChartSettings::default());
        let artifact = match renderer.render(catalog.all_records()) {
            ChartOutcome::Chart(artifact) => artifact,
            ChartOutcome::NoChart => panic!("el formato PNG por defecto debería generar gráfico"),
        };

        assert_eq!(artifact.media_type, "image/png");
        assert_eq!((artifact.width, artifact.height), (1000, 600));
        assert!(artifact.bytes.starts_with(&PNG_SIGNATURE));

        let uri = artifact.to_data_uri();
        let payload = uri
            .strip_prefix("data:image/png;base64,")
            .expect("prefijo data URI");
        let decoded = STANDARD.decode(payload).expect("base64 válido");
        assert_eq!(decoded, artifact.bytes);
    }

    #[test]
    fn aggregate_uses_configured_order() {
        let catalog = Catalog::seed().unwrap();
        let mut s = settings(ChartFormat::Svg);
        s.category_order = CategoryOrder::FirstSeen;
        let rows = ChartRenderer::new(s).aggregate(catalog.all_records());
        assert_eq!(rows[0].category, "Peripherals");
        assert_eq!(rows[1].category, "Monitors");
    }
}
