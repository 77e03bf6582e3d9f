use anyhow::Context;
use folio_app::App;
use folio_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load Folio settings")?;
    folio_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "folio-app bootstrap starting"
    );

    let app = App::build(settings).await?;
    tracing::info!(
        core = app.registry.core_module_count(),
        custom = app.registry.custom_module_count(),
        "folio-app bootstrap complete"
    );

    app.serve().await
}
