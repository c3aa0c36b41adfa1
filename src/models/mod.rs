//! Domain models for violations, the guideline catalog, reconciled
//! compliance results and the paginated document.

pub mod compliance;
pub mod document;
pub mod pagination;
pub mod report;
pub mod rule;
pub mod violation;
