use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{portfolio_queries, sync_state_queries, transaction_queries};
use crate::errors::AppError;
use crate::models::{
    Portfolio, PortfolioEntry, PortfolioMeta, Snapshot, StockGroup, StockTransaction,
    TransactionEntry, TransactionKind,
};

/// Builds the full nested snapshot for a user. Every endpoint that returns
/// a snapshot goes through here, so the wire shape has a single source of
/// truth.
pub async fn build(pool: &PgPool, user_id: &str) -> Result<Snapshot, AppError> {
    let portfolios = portfolio_queries::fetch_for_user(pool, user_id).await?;
    let transactions = transaction_queries::fetch_for_user(pool, user_id).await?;
    let selected = sync_state_queries::fetch_selected(pool, user_id).await?;
    assemble(&portfolios, &transactions, selected).map_err(AppError::Validation)
}

/// Pure assembly of the wire shape from loaded rows. Deterministic:
/// portfolios by (created_at, id), stock groups by symbol, transactions by
/// (date, id). A portfolio's `last_updated` is the max of its own
/// `updated_at` and those of all its transactions.
pub fn assemble(
    portfolios: &[Portfolio],
    transactions: &[StockTransaction],
    selected: Option<Uuid>,
) -> Result<Snapshot, String> {
    let mut grouped: BTreeMap<Uuid, BTreeMap<String, Vec<&StockTransaction>>> = BTreeMap::new();
    for t in transactions {
        grouped
            .entry(t.portfolio_id)
            .or_default()
            .entry(t.stock_symbol.clone())
            .or_default()
            .push(t);
    }

    let mut ordered: Vec<&Portfolio> = portfolios.iter().collect();
    ordered.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

    let mut entries = Vec::with_capacity(ordered.len());
    let mut metadata = Vec::with_capacity(ordered.len());
    for portfolio in ordered {
        let mut last_updated = portfolio.updated_at;
        let mut stocks = Vec::new();
        if let Some(symbols) = grouped.get(&portfolio.id) {
            for (symbol, rows) in symbols {
                let mut rows = rows.clone();
                rows.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
                let mut group = StockGroup {
                    symbol: symbol.clone(),
                    transactions: Vec::with_capacity(rows.len()),
                };
                for row in rows {
                    if row.updated_at > last_updated {
                        last_updated = row.updated_at;
                    }
                    let kind = TransactionKind::parse(&row.kind).ok_or_else(|| {
                        format!("stored transaction {} has unrecognized type {}", row.id, row.kind)
                    })?;
                    group.transactions.push(TransactionEntry {
                        id: row.id,
                        kind,
                        quantity: row.quantity,
                        price: row.price.clone(),
                        date: row.date,
                        updated_at: Some(row.updated_at),
                    });
                }
                stocks.push(group);
            }
        }

        entries.push(PortfolioEntry {
            id: portfolio.id,
            name: portfolio.name.clone(),
            color: portfolio.color.clone(),
            stocks,
            last_updated,
        });
        metadata.push(PortfolioMeta {
            id: portfolio.id,
            name: portfolio.name.clone(),
            color: portfolio.color.clone(),
            created_at: portfolio.created_at,
            last_updated,
        });
    }

    // A selection pointing at a portfolio that no longer exists is dropped.
    let selected_portfolio_id = selected.filter(|id| portfolios.iter().any(|p| p.id == *id));

    Ok(Snapshot {
        portfolios: entries,
        metadata,
        selected_portfolio_id,
    })
}
