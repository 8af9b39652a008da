// Módulos de la aplicación
mod aggregate;
mod api;
mod app_state;
mod catalog;
mod chart;
mod config;
mod models;
mod search;

use crate::app_state::AppState;
use crate::catalog::Catalog;
use anyhow::Context;
use axum::Router;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().context("Error al cargar la configuración")?;

    // 3. Construir el catálogo (fijo durante toda la vida del proceso)
    let catalog = Catalog::seed().context("Error construyendo el catálogo inicial")?;
    if catalog.is_empty() {
        warn!("El catálogo está vacío: no habrá gráfico ni productos que listar.");
    }
    info!(
        "Catálogo cargado: {} productos en {} categorías.",
        catalog.len(),
        catalog.categories().len()
    );

    // Crear canal para la señal de apagado.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    // 4. Crear estado compartido de la aplicación
    let app_state = AppState::new(cfg.clone(), catalog, Some(shutdown_tx));
    info!(
        "Gráfico: {} {}x{}, orden {}.",
        cfg.chart.format.media_type(),
        cfg.chart.width,
        cfg.chart.height,
        cfg.chart.category_order.as_str()
    );

    // 5. Configurar el router de la API
    let app = Router::new()
        .merge(api::create_router(app_state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 6. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&cfg.server_addr)
        .await
        .with_context(|| format!("No se pudo escuchar en {}", cfg.server_addr))?;
    let server_url = format!("http://{}", cfg.server_addr);
    info!("🚀 Servidor escuchando en {}", &server_url);

    if cfg.open_browser && webbrowser::open(&server_url).is_err() {
        info!("No se pudo abrir el navegador. Por favor, accede a {} manualmente.", server_url);
    }

    // Configurar el apagado ordenado.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await
        .context("Error en el servidor HTTP")?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
