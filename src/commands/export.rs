//! Export command: render the stored catalog as an HTML report.

use crate::commands::Services;
use crate::config::Config;
use crate::exchange::Converter;
use crate::report::{render_report, ReportCurrencies};
use crate::sites::Catalog;
use crate::totals::Totals;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Renders the catalog and writes the report file.
pub struct ExportCommand {
    config: Config,
}

impl ExportCommand {
    /// Creates a new export command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Writes the report to `output`, or the configured report path.
    pub async fn execute(&self, output: Option<&Path>) -> Result<String> {
        let services = Services::from_config(&self.config)?;
        let output = output.unwrap_or(&self.config.report_path);
        self.execute_with(&services, output).await
    }

    /// Writes the report with provided services (for testing).
    pub async fn execute_with(&self, services: &Services, output: &Path) -> Result<String> {
        let html = self.render_with(services).await?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(output, html)
            .with_context(|| format!("Failed to write report: {}", output.display()))?;

        info!("Report written to {}", output.display());
        Ok(format!("HTML file saved to {}", output.display()))
    }

    /// Renders the report without writing it.
    ///
    /// Converted prices are refreshed with current rates, one lookup per base
    /// currency. Stored conversions are kept where no rate is available.
    pub async fn render_with(&self, services: &Services) -> Result<String> {
        let mut catalog = services.store.load();
        let targets = self.config.target_currencies();

        if !targets.is_empty() {
            self.refresh_conversions(services, &mut catalog, targets).await;
        }

        let totals = Totals::from_catalog(&catalog);
        let currencies = ReportCurrencies::new(self.config.base_currency(), targets);

        Ok(render_report(&catalog, &totals, &currencies, &self.config.categories))
    }

    async fn refresh_conversions(
        &self,
        services: &Services,
        catalog: &mut Catalog,
        targets: &[String],
    ) {
        let base = self.config.base_currency();
        let mut converter = Converter::new(services.rates.as_ref());

        for record in catalog.values_mut().flat_map(|items| items.values_mut()) {
            if record.price.currency.is_none() {
                record.price.currency = Some(base.to_string());
            }

            let fresh = converter.convert(&record.price, targets).await;
            debug!("Refreshed {} conversion(s) for {}", fresh.len(), record.name);
            record.exchange_price.retain(|code, _| targets.contains(code));
            record.exchange_price.extend(fresh);
        }
    }
}
