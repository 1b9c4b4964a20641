//! Condition trees for WHERE clauses

use super::quote_identifier;
use crate::value::Value;

/// One node of a WHERE-clause condition tree. Build leaves with the
/// comparison functions ([`eq`], [`lt`], [`like`], …) and combine them with
/// [`and`] / [`or`].
#[derive(Debug, Clone)]
pub enum Cond {
   /// `"column" <op> ?`
   Compare {
      column: String,
      operator: &'static str,
      value: Value,
   },

   /// `"column" IS [NOT] NULL`
   Null { column: String, negated: bool },

   /// `"column" LIKE ?`
   Like { column: String, pattern: String },

   /// `(<left> AND|OR <right>)`
   Group {
      operator: &'static str,
      left: Box<Cond>,
      right: Box<Cond>,
   },
}

/// `column = value`; a null value becomes `IS NULL`.
pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Cond {
   match value.into() {
      Value::Null => is_null(column),
      value => compare(column, "=", value),
   }
}

/// `column != value`; a null value becomes `IS NOT NULL`.
pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Cond {
   match value.into() {
      Value::Null => is_not_null(column),
      value => compare(column, "!=", value),
   }
}

pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Cond {
   compare(column, "<", value.into())
}

pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Cond {
   compare(column, "<=", value.into())
}

pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Cond {
   compare(column, ">", value.into())
}

pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Cond {
   compare(column, ">=", value.into())
}

pub fn is_null(column: impl Into<String>) -> Cond {
   Cond::Null {
      column: column.into(),
      negated: false,
   }
}

pub fn is_not_null(column: impl Into<String>) -> Cond {
   Cond::Null {
      column: column.into(),
      negated: true,
   }
}

pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Cond {
   Cond::Like {
      column: column.into(),
      pattern: pattern.into(),
   }
}

pub fn and(left: Cond, right: Cond) -> Cond {
   Cond::Group {
      operator: "AND",
      left: Box::new(left),
      right: Box::new(right),
   }
}

pub fn or(left: Cond, right: Cond) -> Cond {
   Cond::Group {
      operator: "OR",
      left: Box::new(left),
      right: Box::new(right),
   }
}

fn compare(column: impl Into<String>, operator: &'static str, value: impl Into<Value>) -> Cond {
   Cond::Compare {
      column: column.into(),
      operator,
      value: value.into(),
   }
}

impl Cond {
   pub(crate) fn append(&self, sql: &mut String, args: &mut Vec<Value>) {
      match self {
         Cond::Compare {
            column,
            operator,
            value,
         } => {
            sql.push_str(&quote_identifier(column));
            sql.push(' ');
            sql.push_str(operator);
            sql.push_str(" ?");
            args.push(value.clone());
         }
         Cond::Null { column, negated } => {
            sql.push_str(&quote_identifier(column));
            sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
         }
         Cond::Like { column, pattern } => {
            sql.push_str(&quote_identifier(column));
            sql.push_str(" LIKE ?");
            args.push(Value::Text(pattern.clone()));
         }
         Cond::Group {
            operator,
            left,
            right,
         } => {
            sql.push('(');
            left.append(sql, args);
            sql.push(' ');
            sql.push_str(operator);
            sql.push(' ');
            right.append(sql, args);
            sql.push(')');
         }
      }
   }
}
