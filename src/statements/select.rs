//! SELECT statement builder

use super::cond::Cond;
use super::{Statement, quote_identifier};
use crate::error::{Error, Result};
use crate::value::Value;

/// Sort direction for [`Select::order_by`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
   Asc,
   Desc,
}

impl Order {
   fn as_sql(self) -> &'static str {
      match self {
         Order::Asc => "ASC",
         Order::Desc => "DESC",
      }
   }
}

/// Builder for SELECT statements
#[derive(Debug, Clone, Default)]
pub struct Select {
   table: Option<String>,
   distinct: bool,
   columns: Vec<String>,
   filter: Option<Cond>,
   order_by: Vec<(String, Order)>,
   limit: Option<i64>,
   offset: Option<i64>,
}

/// Select the named columns
pub fn select<I, S>(columns: I) -> Select
where
   I: IntoIterator<Item = S>,
   S: Into<String>,
{
   Select {
      columns: columns.into_iter().map(Into::into).collect(),
      ..Default::default()
   }
}

/// Select `*`
pub fn select_all() -> Select {
   Select::default()
}

impl Select {
   pub fn from(mut self, table: impl Into<String>) -> Self {
      self.table = Some(table.into());
      self
   }

   pub fn distinct(mut self) -> Self {
      self.distinct = true;
      self
   }

   /// Set the WHERE clause, replacing any previous one. Combine conditions
   /// with [`cond::and`](super::cond::and) / [`cond::or`](super::cond::or).
   pub fn filter(mut self, cond: Cond) -> Self {
      self.filter = Some(cond);
      self
   }

   /// Append an ORDER BY column
   pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
      self.order_by.push((column.into(), order));
      self
   }

   pub fn limit(mut self, limit: i64) -> Self {
      self.limit = Some(limit);
      self
   }

   pub fn offset(mut self, offset: i64) -> Self {
      self.offset = Some(offset);
      self
   }
}

impl Statement for Select {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      let table = self.table.as_deref().ok_or(Error::MissingTable("SELECT"))?;

      let mut sql = String::from("SELECT ");
      let mut args = Vec::new();

      if self.distinct {
         sql.push_str("DISTINCT ");
      }

      if self.columns.is_empty() {
         sql.push('*');
      } else {
         let columns: Vec<String> = self.columns.iter().map(|c| quote_identifier(c)).collect();
         sql.push_str(&columns.join(", "));
      }

      sql.push_str(" FROM ");
      sql.push_str(&quote_identifier(table));

      if let Some(filter) = &self.filter {
         sql.push_str(" WHERE ");
         filter.append(&mut sql, &mut args);
      }

      if !self.order_by.is_empty() {
         let order: Vec<String> = self
            .order_by
            .iter()
            .map(|(column, order)| format!("{} {}", quote_identifier(column), order.as_sql()))
            .collect();
         sql.push_str(" ORDER BY ");
         sql.push_str(&order.join(", "));
      }

      if let Some(limit) = self.limit {
         sql.push_str(&format!(" LIMIT {limit}"));
      }

      if let Some(offset) = self.offset {
         sql.push_str(&format!(" OFFSET {offset}"));
      }

      Ok((sql, args))
   }
}

/// Wrap a SELECT in `SELECT EXISTS(…)`, producing a single 0/1 column.
pub fn exists(select: Select) -> Exists {
   Exists { select }
}

/// Builder for `SELECT EXISTS(…)` statements; see [`exists`].
#[derive(Debug, Clone)]
pub struct Exists {
   select: Select,
}

impl Statement for Exists {
   fn build(&self) -> Result<(String, Vec<Value>)> {
      let (sql, args) = self.select.build()?;
      Ok((format!("SELECT EXISTS({sql})"), args))
   }
}

#[cfg(test)]
mod tests {
   use super::super::cond;
   use super::*;

   #[test]
   fn test_select_all_columns() {
      let (sql, args) = select_all().from("People").build().unwrap();
      assert_eq!(sql, r#"SELECT * FROM "People""#);
      assert!(args.is_empty());
   }

   #[test]
   fn test_select_full_clause_order() {
      let stmt = select(["ID", "Name"])
         .from("People")
         .distinct()
         .filter(cond::gt("Age", 21))
         .order_by("Name", Order::Asc)
         .order_by("ID", Order::Desc)
         .limit(5)
         .offset(10);

      let (sql, args) = stmt.build().unwrap();
      assert_eq!(
         sql,
         r#"SELECT DISTINCT "ID", "Name" FROM "People" WHERE "Age" > ? ORDER BY "Name" ASC, "ID" DESC LIMIT 5 OFFSET 10"#
      );
      assert_eq!(args, vec![Value::Integer(21)]);
   }

   #[test]
   fn test_select_requires_table() {
      let err = select(["ID"]).build().unwrap_err();
      assert!(matches!(err, Error::MissingTable("SELECT")));
   }

   #[test]
   fn test_exists_wraps_select() {
      let stmt = exists(select(["1"]).from("People").filter(cond::eq("ID", 7)).limit(1));
      let (sql, args) = stmt.build().unwrap();
      assert_eq!(
         sql,
         r#"SELECT EXISTS(SELECT "1" FROM "People" WHERE "ID" = ? LIMIT 1)"#
      );
      assert_eq!(args, vec![Value::Integer(7)]);
   }
}
