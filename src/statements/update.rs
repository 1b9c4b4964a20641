//! UPDATE statement builder

use super::cond::Cond;
use super::{Statement, quote_identifier};
use crate::error::{Error, Result};
use crate::value::Value;

/// Builder for UPDATE statements
#[derive(Debug, Clone)]
pub struct Update {
   table: String,
   set: Vec<(String, Value)>,
   filter: Option<Cond>,
   returning: Vec<(String, Option<String>)>,
}

/// Update rows of the named table
pub fn update(table: impl Into<String>) -> Update {
   Update {
      table: table.into(),
      set: Vec::new(),
      filter: None,
      returning: Vec::new(),
   }
}

impl Update {
   /// Append a `SET column = value` assignment
   pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
      self.set.push((column.into(), value.into()));
      self
   }

   /// Set the WHERE clause, replacing any previous one. Without one, every
   /// row updates.
   pub fn filter(mut self, cond: Cond) -> Self {
      self.filter = Some(cond);
      self
   }

   /// Append a RETURNING column
   pub fn returning(mut self, column: impl Into<String>) -> Self {
      self.returning.push((column.into(), None));
      self
   }

   /// Append an aliased RETURNING column (`column AS alias`)
   pub fn returning_as(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
      self.returning.push((column.into(), Some(alias.into())));
      self
   }
}

impl Statement for Update {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      if self.set.is_empty() {
         return Err(Error::MissingValues("UPDATE"));
      }

      let mut sql = String::from("UPDATE ");
      let mut args = Vec::new();

      sql.push_str(&quote_identifier(&self.table));
      sql.push_str(" SET ");

      let assignments: Vec<String> = self
         .set
         .iter()
         .map(|(column, value)| {
            args.push(value.clone());
            format!("{} = ?", quote_identifier(column))
         })
         .collect();
      sql.push_str(&assignments.join(", "));

      if let Some(filter) = &self.filter {
         sql.push_str(" WHERE ");
         filter.append(&mut sql, &mut args);
      }

      if !self.returning.is_empty() {
         let columns: Vec<String> = self
            .returning
            .iter()
            .map(|(column, alias)| match alias {
               Some(alias) => format!("{} AS {}", quote_identifier(column), quote_identifier(alias)),
               None => quote_identifier(column),
            })
            .collect();
         sql.push_str(" RETURNING ");
         sql.push_str(&columns.join(", "));
      }

      Ok((sql, args))
   }
}

#[cfg(test)]
mod tests {
   use super::super::cond;
   use super::*;

   #[test]
   fn test_update_set_and_filter() {
      let stmt = update("People")
         .set("Name", "updated")
         .set("Age", 31)
         .filter(cond::eq("ID", 7));

      let (sql, args) = stmt.build().unwrap();
      assert_eq!(
         sql,
         r#"UPDATE "People" SET "Name" = ?, "Age" = ? WHERE "ID" = ?"#
      );
      assert_eq!(
         args,
         vec![
            Value::Text("updated".into()),
            Value::Integer(31),
            Value::Integer(7),
         ]
      );
   }

   #[test]
   fn test_update_requires_values() {
      let err = update("People").build().unwrap_err();
      assert!(matches!(err, Error::MissingValues("UPDATE")));
   }

   #[test]
   fn test_update_returning_with_alias() {
      let stmt = update("People")
         .set("Age", 1)
         .returning("ID")
         .returning_as("Name", "PersonName");

      let (sql, _) = stmt.build().unwrap();
      assert_eq!(
         sql,
         r#"UPDATE "People" SET "Age" = ? RETURNING "ID", "Name" AS "PersonName""#
      );
   }
}
