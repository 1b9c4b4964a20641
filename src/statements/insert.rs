//! INSERT statement builder

use std::collections::BTreeMap;

use super::{Statement, quote_identifier};
use crate::error::Result;
use crate::value::Value;

/// Builder for INSERT statements
///
/// Columns render in sorted order, so the generated SQL is deterministic
/// regardless of the order values were added in.
#[derive(Debug, Clone)]
pub struct Insert {
   table: String,
   or_replace: bool,
   or_ignore: bool,
   values: BTreeMap<String, Value>,
   returning: Option<Vec<String>>,
}

/// Insert into the named table. With no values added, the statement renders
/// as `INSERT INTO … DEFAULT VALUES`.
pub fn insert_into(table: impl Into<String>) -> Insert {
   Insert {
      table: table.into(),
      or_replace: false,
      or_ignore: false,
      values: BTreeMap::new(),
      returning: None,
   }
}

impl Insert {
   /// Upsert: replace a conflicting row. Clears [`or_ignore`](Insert::or_ignore).
   pub fn or_replace(mut self) -> Self {
      self.or_replace = true;
      self.or_ignore = false;
      self
   }

   /// Skip conflicting rows. Clears [`or_replace`](Insert::or_replace).
   pub fn or_ignore(mut self) -> Self {
      self.or_ignore = true;
      self.or_replace = false;
      self
   }

   pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
      self.values.insert(column.into(), value.into());
      self
   }

   pub fn values<I, S, V>(mut self, values: I) -> Self
   where
      I: IntoIterator<Item = (S, V)>,
      S: Into<String>,
      V: Into<Value>,
   {
      for (column, value) in values {
         self.values.insert(column.into(), value.into());
      }
      self
   }

   /// Append a RETURNING clause; an empty column list renders as
   /// `RETURNING *`.
   pub fn returning<I, S>(mut self, columns: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.returning = Some(columns.into_iter().map(Into::into).collect());
      self
   }
}

impl Statement for Insert {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      let mut sql = String::from("INSERT ");
      let mut args = Vec::new();

      if self.or_replace {
         sql.push_str("OR REPLACE ");
      }
      if self.or_ignore {
         sql.push_str("OR IGNORE ");
      }

      sql.push_str("INTO ");
      sql.push_str(&quote_identifier(&self.table));

      if self.values.is_empty() {
         sql.push_str(" DEFAULT VALUES");
      } else {
         let mut columns = Vec::with_capacity(self.values.len());
         let mut placeholders = Vec::with_capacity(self.values.len());

         for (column, value) in &self.values {
            columns.push(quote_identifier(column));
            placeholders.push("?");
            args.push(value.clone());
         }

         sql.push_str(&format!(
            " ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
         ));
      }

      if let Some(returning) = &self.returning {
         sql.push_str(" RETURNING ");
         if returning.is_empty() {
            sql.push('*');
         } else {
            let columns: Vec<String> = returning.iter().map(|c| quote_identifier(c)).collect();
            sql.push_str(&columns.join(", "));
         }
      }

      Ok((sql, args))
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_insert_sorts_columns() {
      let stmt = insert_into("People").value("Name", "test").value("Age", 30);
      let (sql, args) = stmt.build().unwrap();
      assert_eq!(sql, r#"INSERT INTO "People" ("Age", "Name") VALUES (?, ?)"#);
      assert_eq!(args, vec![Value::Integer(30), Value::Text("test".into())]);
   }

   #[test]
   fn test_insert_default_values() {
      let (sql, args) = insert_into("People").build().unwrap();
      assert_eq!(sql, r#"INSERT INTO "People" DEFAULT VALUES"#);
      assert!(args.is_empty());
   }

   #[test]
   fn test_insert_or_replace_and_or_ignore_are_exclusive() {
      let (sql, _) = insert_into("kv").or_ignore().or_replace().value("k", 1).build().unwrap();
      assert_eq!(sql, r#"INSERT OR REPLACE INTO "kv" ("k") VALUES (?)"#);

      let (sql, _) = insert_into("kv").or_replace().or_ignore().value("k", 1).build().unwrap();
      assert_eq!(sql, r#"INSERT OR IGNORE INTO "kv" ("k") VALUES (?)"#);
   }

   #[test]
   fn test_insert_returning() {
      let (sql, _) = insert_into("People")
         .value("Name", "x")
         .returning(["ID"])
         .build()
         .unwrap();
      assert_eq!(
         sql,
         r#"INSERT INTO "People" ("Name") VALUES (?) RETURNING "ID""#
      );

      let (sql, _) = insert_into("People")
         .value("Name", "x")
         .returning(Vec::<String>::new())
         .build()
         .unwrap();
      assert_eq!(sql, r#"INSERT INTO "People" ("Name") VALUES (?) RETURNING *"#);
   }
}
