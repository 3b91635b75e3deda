use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{portfolio_queries, sync_queries, sync_state_queries, transaction_queries};
use crate::errors::AppError;
use crate::models::{
    normalize_symbol, MergeStrategy, Portfolio, Snapshot, StockTransaction,
};
use crate::services::snapshot_service;

/// Outcome of the pure merge step, ready to be committed as the user's new
/// entity set.
#[derive(Debug)]
pub struct MergedSet {
    pub portfolios: Vec<Portfolio>,
    pub transactions: Vec<StockTransaction>,
    pub selected_portfolio_id: Option<Uuid>,
}

/// Reconciles the caller's local replica with the server copy under an
/// explicit strategy and returns the new ground truth.
///
/// USE_LOCAL and MERGE validate the entire payload before touching storage;
/// the destructive delete-then-insert runs inside one transaction, so a
/// failed resolution leaves the server snapshot exactly as it was.
pub async fn resolve(
    pool: &PgPool,
    user_id: &str,
    strategy: MergeStrategy,
    local: Option<&Snapshot>,
) -> Result<Snapshot, AppError> {
    match strategy {
        MergeStrategy::UseServer => snapshot_service::build(pool, user_id).await,
        MergeStrategy::UseLocal => {
            let local = require_local(local, "USE_LOCAL")?;
            validate_local(local).map_err(AppError::Validation)?;
            let (portfolios, transactions) = materialize_local(user_id, local);
            let selected = local
                .selected_portfolio_id
                .filter(|id| portfolios.iter().any(|p| p.id == *id));
            sync_queries::replace_user_data(pool, user_id, &portfolios, &transactions, selected)
                .await?;
            snapshot_service::build(pool, user_id).await
        }
        MergeStrategy::Merge => {
            let local = require_local(local, "MERGE")?;
            validate_local(local).map_err(AppError::Validation)?;

            let server_portfolios = portfolio_queries::fetch_for_user(pool, user_id).await?;
            let server_transactions = transaction_queries::fetch_for_user(pool, user_id).await?;
            let server_selected = sync_state_queries::fetch_selected(pool, user_id).await?;

            let merged = merge_replicas(
                &server_portfolios,
                &server_transactions,
                server_selected,
                user_id,
                local,
            );
            sync_queries::replace_user_data(
                pool,
                user_id,
                &merged.portfolios,
                &merged.transactions,
                merged.selected_portfolio_id,
            )
            .await?;
            snapshot_service::build(pool, user_id).await
        }
    }
}

fn require_local<'a>(
    local: Option<&'a Snapshot>,
    strategy: &str,
) -> Result<&'a Snapshot, AppError> {
    local.ok_or_else(|| AppError::Validation(format!("local_data is required for {strategy}")))
}

/// Whole-payload validation, run before any delete executes. One malformed
/// entity anywhere rejects the entire resolution.
pub fn validate_local(local: &Snapshot) -> Result<(), String> {
    for entry in &local.portfolios {
        validate_name(entry.id, &entry.name)?;
        for group in &entry.stocks {
            if normalize_symbol(&group.symbol).is_empty() {
                return Err(format!(
                    "portfolio {}: stock symbol must not be empty",
                    entry.id
                ));
            }
            for t in &group.transactions {
                if t.quantity <= 0 {
                    return Err(format!("transaction {}: quantity must be positive", t.id));
                }
                if t.price < BigDecimal::from(0) {
                    return Err(format!("transaction {}: price must not be negative", t.id));
                }
            }
        }
    }
    for meta in &local.metadata {
        validate_name(meta.id, &meta.name)?;
    }
    Ok(())
}

fn validate_name(id: Uuid, name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return Err(format!("portfolio {id}: name must be 1-50 characters"));
    }
    Ok(())
}

/// Flattens a local snapshot into storable rows, verbatim: client ids and
/// field values are preserved. `created_at` comes from the matching
/// metadata entry when present. A metadata entry without a tree entry is
/// kept as an empty portfolio rather than silently discarded.
pub fn materialize_local(
    user_id: &str,
    local: &Snapshot,
) -> (Vec<Portfolio>, Vec<StockTransaction>) {
    let meta_by_id: HashMap<Uuid, _> = local.metadata.iter().map(|m| (m.id, m)).collect();

    let mut portfolios = Vec::new();
    let mut transactions = Vec::new();

    for entry in &local.portfolios {
        let created_at = meta_by_id
            .get(&entry.id)
            .map(|m| m.created_at)
            .unwrap_or(entry.last_updated);
        portfolios.push(Portfolio {
            id: entry.id,
            user_id: user_id.to_string(),
            name: entry.name.trim().to_string(),
            color: entry.color.clone(),
            created_at,
            updated_at: entry.last_updated,
        });

        for group in &entry.stocks {
            let symbol = normalize_symbol(&group.symbol);
            for t in &group.transactions {
                let updated_at = t.updated_at.unwrap_or(entry.last_updated);
                transactions.push(StockTransaction {
                    id: t.id,
                    portfolio_id: entry.id,
                    stock_symbol: symbol.clone(),
                    kind: t.kind.as_str().to_string(),
                    quantity: t.quantity,
                    price: t.price.clone(),
                    date: t.date,
                    created_at: t.date,
                    updated_at,
                });
            }
        }
    }

    for meta in &local.metadata {
        if local.portfolios.iter().any(|p| p.id == meta.id) {
            continue;
        }
        portfolios.push(Portfolio {
            id: meta.id,
            user_id: user_id.to_string(),
            name: meta.name.trim().to_string(),
            color: meta.color.clone(),
            created_at: meta.created_at,
            updated_at: meta.last_updated,
        });
    }

    (portfolios, transactions)
}

/// Entity-level last-write-wins merge of two replicas. Pure: no storage
/// access, fully deterministic for a given input.
///
/// For every portfolio id present in either replica the server version is
/// kept unless the local replica reports a strictly greater timestamp, in
/// which case the local header fields (name, color) win under that id.
/// Ties favor the server. Transactions follow the same rule using their own
/// timestamps and are merge-atomic: kept or fully replaced, never
/// field-spliced. Transactions whose portfolio is absent from the merged
/// set are dropped.
pub fn merge_replicas(
    server_portfolios: &[Portfolio],
    server_transactions: &[StockTransaction],
    server_selected: Option<Uuid>,
    user_id: &str,
    local: &Snapshot,
) -> MergedSet {
    let (local_portfolios, local_transactions) = materialize_local(user_id, local);

    let mut portfolios: BTreeMap<Uuid, Portfolio> = server_portfolios
        .iter()
        .map(|p| (p.id, p.clone()))
        .collect();
    for lp in local_portfolios {
        match portfolios.get_mut(&lp.id) {
            Some(sp) => {
                if lp.updated_at > sp.updated_at {
                    sp.name = lp.name;
                    sp.color = lp.color;
                    sp.updated_at = lp.updated_at;
                }
            }
            None => {
                portfolios.insert(lp.id, lp);
            }
        }
    }

    let mut transactions: BTreeMap<Uuid, StockTransaction> = server_transactions
        .iter()
        .map(|t| (t.id, t.clone()))
        .collect();
    for lt in local_transactions {
        match transactions.get_mut(&lt.id) {
            Some(st) => {
                if lt.updated_at > st.updated_at {
                    st.portfolio_id = lt.portfolio_id;
                    st.stock_symbol = lt.stock_symbol;
                    st.kind = lt.kind;
                    st.quantity = lt.quantity;
                    st.price = lt.price;
                    st.date = lt.date;
                    st.updated_at = lt.updated_at;
                }
            }
            None => {
                transactions.insert(lt.id, lt);
            }
        }
    }

    // Orphan safety: no transaction may reference a portfolio outside the
    // merged set.
    let transactions: Vec<StockTransaction> = transactions
        .into_values()
        .filter(|t| portfolios.contains_key(&t.portfolio_id))
        .collect();

    let selected_portfolio_id = local
        .selected_portfolio_id
        .filter(|id| portfolios.contains_key(id))
        .or_else(|| server_selected.filter(|id| portfolios.contains_key(id)));

    MergedSet {
        portfolios: portfolios.into_values().collect(),
        transactions,
        selected_portfolio_id,
    }
}

// Kept for parity with resolve(): routes use this when a client performs an
// unconditional local upload outside of conflict resolution.
pub async fn replace_with_local(
    pool: &PgPool,
    user_id: &str,
    local: &Snapshot,
) -> Result<Snapshot, AppError> {
    resolve(pool, user_id, MergeStrategy::UseLocal, Some(local)).await
}
