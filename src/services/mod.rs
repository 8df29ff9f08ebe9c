pub mod calendar;
pub mod history_service;
pub mod drawdown_service;
pub mod profit_service;
pub mod allocation_service;
pub mod portion_corrector;
pub mod index_service;
pub mod generator_service;
