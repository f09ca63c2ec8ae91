//! Option Series Binary
//!
//! Resolves one filtered option series against a fixture-backed gateway and
//! prints one line per contract.
//!
//! # Usage
//!
//! ```bash
//! OPTION_SERIES_FIXTURE=apps/option-series/fixtures/twtr.json cargo run --bin option-series
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `OPTION_SERIES_FIXTURE`: Path to the JSON gateway fixture
//!
//! ## Optional
//! - `OPTION_SERIES_SYMBOL`: Underlying symbol (default: TWTR)
//! - `OPTION_SERIES_EXCHANGES`: Comma-separated exchange codes (default: Q)
//! - `OPTION_SERIES_CALL_PUT`: CALL | PUT | BOTH (default: BOTH)
//! - `OPTION_SERIES_START_DATE` / `OPTION_SERIES_END_DATE`: YYYY-MM-DD
//! - `OPTION_SERIES_LOW_STRIKE` / `OPTION_SERIES_HIGH_STRIKE`: Decimal strikes
//! - `OPTION_SERIES_AT_THE_MONEY`: Restrict to strikes near the underlying
//! - `OPTION_SERIES_AT_THE_MONEY_RANGE`: Distance from the underlying price
//! - `OPTION_SERIES_FIELDS`: Comma-separated field names to print
//! - `OPTION_SERIES_EXPAND_PATTERNS`: Always build per-contract patterns
//! - `OPTION_SERIES_PRINT_METRICS`: Print Prometheus exposition after the run
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use option_series::infrastructure::telemetry;
use option_series::{
    GatewayFixture, GetOptionSeriesUseCase, PatternBuilder, SeriesConfig, SlashAliasEncoder,
    init_metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = telemetry::init().context("failed to initialize telemetry")?;
    let metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let config = SeriesConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let gateway = GatewayFixture::load(&config.fixture)
        .and_then(|fixture| fixture.into_gateway(&SlashAliasEncoder))
        .with_context(|| format!("failed to load fixture {}", config.fixture.display()))?;

    let builder = PatternBuilder::new(SlashAliasEncoder).with_expansion(config.expansion());
    let use_case = GetOptionSeriesUseCase::new(Arc::new(gateway), builder);

    let series = use_case
        .execute(&config.symbol, &config.filter, &config.fields)
        .await
        .with_context(|| format!("failed to resolve option series for {}", config.symbol))?;

    for contract in &series.contracts {
        println!("{contract}");
    }

    if config.print_metrics {
        println!();
        print!("{}", metrics_handle.render());
    }

    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &SeriesConfig) {
    let filter = &config.filter;
    tracing::info!(
        symbol = %config.symbol,
        fixture = %config.fixture.display(),
        exchanges = ?filter.exchanges(),
        call_put = filter.call_put().as_str(),
        at_the_money = filter.at_the_money(),
        expansion = ?config.expansion(),
        "Configuration loaded"
    );
    tracing::debug!(
        start_date = ?filter.start_date(),
        end_date = ?filter.end_date(),
        low_strike = ?filter.low_strike(),
        high_strike = ?filter.high_strike(),
        at_the_money_range = ?filter.at_the_money_range(),
        fields = config.fields.len(),
        "Filter bounds"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
