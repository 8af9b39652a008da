//! Carga y gestión de configuración de la aplicación (servidor + gráfico).

use std::env;
use anyhow::{anyhow, Result};

use crate::aggregate::CategoryOrder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartFormat {
    Png,
    Svg,
}

impl ChartFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            other => Err(anyhow!("Formato de gráfico no soportado: {other}")),
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl CategoryOrder {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "alphabetical" => Ok(Self::Alphabetical),
            "first-seen" | "first_seen" => Ok(Self::FirstSeen),
            other => Err(anyhow!("Orden de categorías no soportado: {other}")),
        }
    }
}

/// Parámetros del gráfico de precios por categoría.
#[derive(Clone, Debug)]
pub struct ChartSettings {
    pub format: ChartFormat,
    pub width: u32,
    pub height: u32,
    pub category_order: CategoryOrder,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            format: ChartFormat::Png,
            width: 1000,
            height: 600,
            category_order: CategoryOrder::default(),
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    pub open_browser: bool,
    pub chart: ChartSettings,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env`, pero leyendo de una función arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ChartSettings::default();

        let server_addr =
            lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:3322".to_string());

        let open_browser = match lookup("OPEN_BROWSER") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| anyhow!("OPEN_BROWSER debe ser true/false, no '{v}'"))?,
            None => false,
        };

        let format = match lookup("CHART_FORMAT") {
            Some(v) => ChartFormat::from_str(&v)?,
            None => defaults.format,
        };
        let category_order = match lookup("CHART_CATEGORY_ORDER") {
            Some(v) => CategoryOrder::from_str(&v)?,
            None => defaults.category_order,
        };
        let width = parse_dimension(lookup("CHART_WIDTH"), "CHART_WIDTH", defaults.width)?;
        let height = parse_dimension(lookup("CHART_HEIGHT"), "CHART_HEIGHT", defaults.height)?;

        Ok(Self {
            server_addr,
            open_browser,
            chart: ChartSettings {
                format,
                width,
                height,
                category_order,
            },
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_dimension(value: Option<String>, key: &str, default: u32) -> Result<u32> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(anyhow!("{key} debe ser un entero positivo, no '{raw}'")),
    }
}
