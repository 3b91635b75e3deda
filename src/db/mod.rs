pub mod portfolio_queries;
pub mod sync_queries;
pub mod sync_state_queries;
pub mod transaction_queries;
