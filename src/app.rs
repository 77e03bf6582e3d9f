//! Application bootstrap: pool, module registry, migrations and lifecycle.

use anyhow::Context;
use axum::Router;
use folio_db::DbPool;
use folio_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

pub struct App {
    pub settings: Settings,
    pub pool: DbPool,
    pub registry: ModuleRegistry,
}

impl App {
    /// Connect to the configured database and bring every module up to `init`
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let pool = folio_db::connect(&settings.database.url, settings.database.max_connections)
            .await
            .with_context(|| format!("failed to connect to {}", settings.database.url))?;
        Self::with_pool(settings, pool).await
    }

    pub async fn with_pool(settings: Settings, pool: DbPool) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &pool, &settings)?;

        registry.run_migrations(&pool).await?;

        let ctx = InitCtx {
            settings: &settings,
            db: &pool,
        };
        registry.init_core_modules(&ctx).await?;
        registry.init_custom_modules(&ctx).await?;

        Ok(Self {
            settings,
            pool,
            registry,
        })
    }

    pub fn router(&self) -> Router {
        folio_http::build_router(&self.registry, &self.settings)
    }

    /// Start the modules, serve until a shutdown signal, then stop them in reverse order
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
            db: &self.pool,
        };
        self.registry.start_core_modules(&ctx).await?;
        self.registry.start_custom_modules(&ctx).await?;

        let served = folio_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_custom_modules().await?;
        self.registry.stop_core_modules().await?;
        self.pool.close().await;

        served
    }
}
