mod app;
mod chrome;
mod config;
mod desktop;
mod events;
mod keymap;
mod panels;
mod session;
mod theme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, cfg_path) = config::Config::load()?;
    let _guard = paperclip_telemetry::init(&cfg.log_dir())?;
    tracing::info!(config = %cfg_path.display(), home = %cfg.home_dir().display(), "config loaded");
    theme::set_mode(theme::mode_from_name(&cfg.desk.theme));
    app::run(cfg).await
}
