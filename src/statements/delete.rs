//! DELETE statement builder

use super::cond::Cond;
use super::{Statement, quote_identifier};
use crate::error::Result;
use crate::value::Value;

/// Builder for DELETE statements
#[derive(Debug, Clone)]
pub struct Delete {
   table: String,
   filter: Option<Cond>,
}

/// Delete rows from the named table
pub fn delete_from(table: impl Into<String>) -> Delete {
   Delete {
      table: table.into(),
      filter: None,
   }
}

impl Delete {
   /// Set the WHERE clause, replacing any previous one. Without one, every
   /// row deletes.
   pub fn filter(mut self, cond: Cond) -> Self {
      self.filter = Some(cond);
      self
   }
}

impl Statement for Delete {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      let mut sql = String::from("DELETE FROM ");
      let mut args = Vec::new();

      sql.push_str(&quote_identifier(&self.table));

      if let Some(filter) = &self.filter {
         sql.push_str(" WHERE ");
         filter.append(&mut sql, &mut args);
      }

      Ok((sql, args))
   }
}
