use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use crate::{catalog::Catalog, chart::ChartRenderer, config::AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub renderer: Arc<ChartRenderer>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        catalog: Catalog,
        shutdown_sender: Option<oneshot::Sender<()>>,
    ) -> Self {
        let renderer = ChartRenderer::new(config.chart.clone());
        Self {
            config,
            catalog: Arc::new(catalog),
            renderer: Arc::new(renderer),
            shutdown_sender: Arc::new(Mutex::new(shutdown_sender)),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Status {
    pub products: usize,
    pub categories: usize,
    pub chart_format: &'static str,
    pub category_order: &'static str,
}
