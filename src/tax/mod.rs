//! Income tax: bracket configuration, loader, and the marginal-bracket engine

mod brackets;
mod engine;
pub mod loader;

pub use brackets::{
    us_federal_2023, us_federal_2024, BracketLadder, FilingStatus, TaxBracket, TaxTable, TaxTables,
};
pub use engine::{compute_tax, compute_tax_with_table, BracketSlice, TaxInput, TaxResult};
pub use loader::{load_default_tax_tables, load_tax_tables, load_tax_tables_from_readers};
