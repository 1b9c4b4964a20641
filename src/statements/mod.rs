//! SQL statement builders
//!
//! Builders generate SQL text with positional `?` placeholders plus the
//! bind arguments, through [`Statement::build`]. They cover the statement
//! shapes the toolkit's own layers need (key-value store, migrations) and
//! the common application cases; anything beyond that is expressed as raw
//! SQL through [`Db::exec`](crate::Db::exec) and friends.
//!
//! ```
//! use sqlx_sqlite_dbkit::statements::{Statement, cond, select};
//!
//! let stmt = select(["Name"])
//!    .from("People")
//!    .filter(cond::and(cond::eq("Age", 30), cond::is_not_null("Email")))
//!    .limit(10);
//!
//! let (sql, args) = stmt.build().unwrap();
//! assert_eq!(
//!    sql,
//!    r#"SELECT "Name" FROM "People" WHERE ("Age" = ? AND "Email" IS NOT NULL) LIMIT 10"#
//! );
//! assert_eq!(args.len(), 1);
//! ```

pub mod cond;

mod create_table;
mod delete;
mod insert;
mod select;
mod update;

pub use create_table::{ColumnDef, ColumnType, CreateTable, column, create_table};
pub use delete::{Delete, delete_from};
pub use insert::{Insert, insert_into};
pub use select::{Exists, Order, Select, exists, select, select_all};
pub use update::{Update, update};

use crate::error::Result;
use crate::value::Value;

/// A buildable SQL statement: SQL text plus positional bind arguments.
pub trait Statement {
   fn build(&self) -> Result<(String, Vec<Value>)>;
}

/// Quote a SQLite identifier (table or column name), escaping embedded
/// quotes.
pub fn quote_identifier(name: &str) -> String {
   format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_quote_identifier() {
      assert_eq!(quote_identifier("Foo"), "\"Foo\"");
      assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
   }
}
