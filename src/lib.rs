//! Portfolio index engine: aligns daily price histories, weights a basket of
//! assets, and synthesizes the basket's index series with its return and
//! drawdown statistics.
//!
//! Everything in [`services`] except [`services::generator_service`] is
//! synchronous and free of I/O. The generator drives the pipeline against a
//! [`external::market_data::MarketDataProvider`].
//!
//! A host process calls [`config::bootstrap`] once at start-up to load
//! `.env`, install logging and read the [`EngineConfig`].

pub mod config;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod services;

pub use config::{bootstrap, EngineConfig};
pub use errors::EngineError;
pub use services::allocation_service::{allocate, sort_assets};
pub use services::drawdown_service::max_drawdown;
pub use services::generator_service::{analyze_asset, generate_index, recompute_index};
pub use services::history_service::align;
pub use services::index_service::synthesize;
pub use services::portion_corrector::correct;
pub use services::profit_service::{history_overview, profit_over_window};
