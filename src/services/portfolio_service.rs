use sqlx::PgPool;
use uuid::Uuid;

use crate::db::portfolio_queries;
use crate::errors::AppError;
use crate::models::{Portfolio, UpdatePortfolio, UpsertPortfolio};

fn validate_name(name: &str) -> Result<&str, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return Err(AppError::Validation(
            "Portfolio name must be 1-50 characters".into(),
        ));
    }
    Ok(trimmed)
}

pub async fn fetch_all(pool: &PgPool, user_id: &str) -> Result<Vec<Portfolio>, AppError> {
    let portfolios = portfolio_queries::fetch_for_user(pool, user_id).await?;
    Ok(portfolios)
}

// Insert-or-replace keyed by the client-generated id; retrying the same
// payload is a no-op. An id held by another user's portfolio surfaces as
// NotFound.
pub async fn upsert(
    pool: &PgPool,
    user_id: &str,
    input: UpsertPortfolio,
) -> Result<Portfolio, AppError> {
    let name = validate_name(&input.name)?.to_string();
    let mut portfolio = Portfolio::new(user_id.to_string(), name, input.color);
    if let Some(id) = input.id {
        portfolio.id = id;
    }
    portfolio_queries::upsert(pool, &portfolio)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn update(
    pool: &PgPool,
    user_id: &str,
    id: Uuid,
    input: UpdatePortfolio,
) -> Result<Portfolio, AppError> {
    let name = validate_name(&input.name)?;
    portfolio_queries::update(pool, user_id, id, name, &input.color)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete(pool: &PgPool, user_id: &str, id: Uuid) -> Result<(), AppError> {
    match portfolio_queries::delete(pool, user_id, id).await? {
        0 => Err(AppError::NotFound),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_bounded() {
        assert_eq!(validate_name("  Growth  ").unwrap(), "Growth");
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(50)).is_ok());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }
}
