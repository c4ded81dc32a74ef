//! Database table operations

mod profile_table;
mod user_table;

pub use profile_table::ProfileTable;
pub use user_table::UserTable;
