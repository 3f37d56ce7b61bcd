mod api;
mod app;
mod config;
mod doc_gen;
mod lookups;
mod models;
mod screens;
mod session;
#[cfg(test)]
mod testing;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use app::App;
use config::AppConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let endpoint = config.endpoint()?.to_string();

    iced::application(App::title, App::update, App::view)
        .theme(|app: &App| app.theme.clone())
        .window_size(iced::Size::new(1400.0, 800.0))
        .run_with(move || App::new(config, endpoint))
        .context("application window failed")
}
