//! CREATE TABLE statement builder

use super::{Statement, quote_identifier};
use crate::error::Result;
use crate::value::Value;

/// SQLite column type affinities usable in table definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
   Text,
   Integer,
   Real,
   Blob,
}

impl ColumnType {
   fn as_sql(self) -> &'static str {
      match self {
         ColumnType::Text => "TEXT",
         ColumnType::Integer => "INTEGER",
         ColumnType::Real => "REAL",
         ColumnType::Blob => "BLOB",
      }
   }
}

/// One column definition within a [`CreateTable`]
#[derive(Debug, Clone)]
pub struct ColumnDef {
   name: String,
   column_type: ColumnType,
   nullable: bool,
   unique: bool,
   primary_key: bool,
   default_literal: Option<String>,
}

/// Define a column; nullable by default
pub fn column(name: impl Into<String>, column_type: ColumnType) -> ColumnDef {
   ColumnDef {
      name: name.into(),
      column_type,
      nullable: true,
      unique: false,
      primary_key: false,
      default_literal: None,
   }
}

impl ColumnDef {
   pub fn not_null(mut self) -> Self {
      self.nullable = false;
      self
   }

   pub fn unique(mut self) -> Self {
      self.unique = true;
      self
   }

   /// DEFAULT clause, written into the SQL verbatim (e.g.
   /// `CURRENT_TIMESTAMP`, `0`, `'none'`).
   pub fn default_literal(mut self, literal: impl Into<String>) -> Self {
      self.default_literal = Some(literal.into());
      self
   }

   fn render(&self) -> String {
      let mut sql = quote_identifier(&self.name);
      sql.push(' ');
      sql.push_str(self.column_type.as_sql());

      if self.primary_key {
         sql.push_str(" PRIMARY KEY");
      }
      if !self.nullable {
         sql.push_str(" NOT NULL");
      }
      if self.unique {
         sql.push_str(" UNIQUE");
      }
      if let Some(literal) = &self.default_literal {
         sql.push_str(" DEFAULT ");
         sql.push_str(literal);
      }

      sql
   }
}

/// Builder for CREATE TABLE statements
#[derive(Debug, Clone)]
pub struct CreateTable {
   table: String,
   if_not_exists: bool,
   primary_key: Option<ColumnDef>,
   columns: Vec<ColumnDef>,
}

/// Create the named table
pub fn create_table(table: impl Into<String>) -> CreateTable {
   CreateTable {
      table: table.into(),
      if_not_exists: false,
      primary_key: None,
      columns: Vec::new(),
   }
}

impl CreateTable {
   pub fn if_not_exists(mut self) -> Self {
      self.if_not_exists = true;
      self
   }

   /// Define the primary key column; rendered first, NOT NULL and UNIQUE.
   pub fn primary_key(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
      self.primary_key = Some(ColumnDef {
         name: name.into(),
         column_type,
         nullable: false,
         unique: true,
         primary_key: true,
         default_literal: None,
      });
      self
   }

   /// Append a column definition
   pub fn column(mut self, column: ColumnDef) -> Self {
      self.columns.push(column);
      self
   }
}

impl Statement for CreateTable {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      let mut sql = String::from("CREATE TABLE");

      if self.if_not_exists {
         sql.push_str(" IF NOT EXISTS");
      }

      sql.push(' ');
      sql.push_str(&quote_identifier(&self.table));
      sql.push_str(" (");

      let mut columns = Vec::with_capacity(self.columns.len() + 1);
      if let Some(primary_key) = &self.primary_key {
         columns.push(primary_key.render());
      }
      for column in &self.columns {
         columns.push(column.render());
      }
      sql.push_str(&columns.join(", "));

      sql.push(')');

      Ok((sql, Vec::new()))
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_create_table() {
      let stmt = create_table("People")
         .if_not_exists()
         .primary_key("ID", ColumnType::Integer)
         .column(column("Name", ColumnType::Text).not_null())
         .column(column("Email", ColumnType::Text).unique())
         .column(
            column("CreatedAt", ColumnType::Integer)
               .not_null()
               .default_literal("CURRENT_TIMESTAMP"),
         );

      let (sql, args) = stmt.build().unwrap();
      assert_eq!(
         sql,
         r#"CREATE TABLE IF NOT EXISTS "People" ("ID" INTEGER PRIMARY KEY NOT NULL UNIQUE, "Name" TEXT NOT NULL, "Email" TEXT UNIQUE, "CreatedAt" INTEGER NOT NULL DEFAULT CURRENT_TIMESTAMP)"#
      );
      assert!(args.is_empty());
   }

   #[test]
   fn test_create_table_without_primary_key() {
      let stmt = create_table("Log").column(column("Line", ColumnType::Text));
      let (sql, _) = stmt.build().unwrap();
      assert_eq!(sql, r#"CREATE TABLE "Log" ("Line" TEXT)"#);
   }
}
