//! Export orchestrator
//!
//! Runs the stages in dependency order: buyers → buyer currency structure →
//! customers → catalogs → categories → sellable items → category
//! assignments → catalog assignments. Assignment stages run after products
//! so the problem-object set is complete when references are emitted.
//!
//! The run always produces an [`ExportResult`]: an Error-severity abort
//! stops the remaining stages but preserves everything already counted.

use crate::adapters::ordercloud::OrderCloudApi;
use crate::adapters::source::SourceStore;
use crate::config::OcExportConfig;
use crate::core::context::RunContext;
use crate::core::result::ExportResult;
use std::sync::Arc;
use std::time::Instant;

use super::{
    buyers, buyers_extended, catalog_assignments, catalogs, categories, category_assignments,
    customers, products, StepResult,
};

/// Drives one export run end to end.
pub struct Orchestrator {
    ctx: RunContext,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn OrderCloudApi>,
        source: Arc<dyn SourceStore>,
        config: Arc<OcExportConfig>,
    ) -> Self {
        Self {
            ctx: RunContext::new(client, source, config),
        }
    }

    /// Runs every enabled stage and returns the final result.
    pub async fn run(mut self) -> ExportResult {
        let started = Instant::now();
        self.ctx.result.started_at = Some(chrono::Utc::now());

        tracing::info!(
            import_mode = ?self.ctx.config.export.import_mode,
            "Starting export run"
        );

        if let Err(abort) = self.run_stages().await {
            tracing::error!(reason = %abort.message, "Export run aborted");
            self.ctx.result.add_error(abort.message);
        }

        self.ctx.result.duration = started.elapsed();

        if !self.ctx.problem_objects.is_empty() {
            let problem_products: Vec<&str> = self.ctx.problem_objects.products().collect();
            tracing::warn!(
                count = problem_products.len(),
                products = ?problem_products,
                "Products failed irrecoverably; their assignments were skipped"
            );
        }

        self.ctx.result.log_summary();
        self.ctx.result
    }

    async fn run_stages(&mut self) -> StepResult<()> {
        let settings = self.ctx.config.export.clone();

        if settings.process_buyers {
            buyers::run(&mut self.ctx).await?;
            buyers_extended::run(&mut self.ctx).await?;
        }
        if settings.process_customers {
            customers::run(&mut self.ctx).await?;
        }
        if settings.process_catalogs {
            catalogs::run(&mut self.ctx).await?;
        }
        if settings.process_categories {
            categories::run(&mut self.ctx).await?;
        }
        if settings.process_products {
            products::run(&mut self.ctx).await?;
        }
        if settings.process_category_assignments {
            category_assignments::run(&mut self.ctx).await?;
        }
        if settings.process_catalog_assignments {
            catalog_assignments::run(&mut self.ctx).await?;
        }

        Ok(())
    }
}
