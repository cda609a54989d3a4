pub mod account_lookup;
pub mod sql;
