pub mod conflict_service;
pub mod import_service;
pub mod merge_service;
pub mod portfolio_service;
pub mod snapshot_service;
pub mod transaction_service;
