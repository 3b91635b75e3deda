mod portfolio;
mod snapshot;
mod sync;
mod transaction;

pub use portfolio::{Portfolio, UpdatePortfolio, UpsertPortfolio};
pub use snapshot::{PortfolioEntry, PortfolioMeta, Snapshot, StockGroup, TransactionEntry};
pub use sync::{
    CheckConflictRequest, ConflictReport, DeleteOutcome, ImportError, ImportItem, ImportOutcome,
    ImportRequest, MergeStrategy, ResolveConflictRequest, ServerCounts,
};
pub use transaction::{normalize_symbol, StockTransaction, TransactionKind, UpsertTransaction};
