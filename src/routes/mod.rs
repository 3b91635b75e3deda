pub(crate) mod health;
pub(crate) mod portfolios;
pub(crate) mod sync;
pub(crate) mod transactions;
