//! Integration tests for running built statements through the Db contract

use sqlx_sqlite_dbkit::statements::{ColumnType, Order, column, cond, create_table, delete_from, insert_into, select, update};
use sqlx_sqlite_dbkit::{Conn, Db, Error};

async fn test_conn() -> Conn {
   let conn = Conn::open(":memory:").await.unwrap();

   let stmt = create_table("People")
      .primary_key("ID", ColumnType::Integer)
      .column(column("Name", ColumnType::Text).not_null())
      .column(column("Age", ColumnType::Integer));

   conn.exec_statement(&stmt).await.unwrap();
   conn
}

#[tokio::test]
async fn test_insert_update_select_delete_round_trip() {
   let conn = test_conn().await;

   conn
      .exec_statement(&insert_into("People").value("ID", 1).value("Name", "ada").value("Age", 36))
      .await
      .unwrap();
   conn
      .exec_statement(&insert_into("People").value("ID", 2).value("Name", "grace").value("Age", 45))
      .await
      .unwrap();

   let rows = conn
      .query_statement(&select(["Name"]).from("People").order_by("Age", Order::Desc))
      .await
      .unwrap();
   let records = rows.records().unwrap();
   assert_eq!(records[0].get_str("Name"), Some("grace"));
   assert_eq!(records[1].get_str("Name"), Some("ada"));

   let result = conn
      .exec_statement(&update("People").set("Age", 37).filter(cond::eq("Name", "ada")))
      .await
      .unwrap();
   assert_eq!(result.rows_affected, 1);

   let age = conn
      .query_row_statement(&select(["Age"]).from("People").filter(cond::eq("ID", 1)))
      .await
      .record()
      .unwrap();
   assert_eq!(age.get_i64("Age"), Some(37));

   conn
      .exec_statement(&delete_from("People").filter(cond::lt("Age", 40)))
      .await
      .unwrap();

   let rows = conn.query_statement(&select_all_people()).await.unwrap();
   assert_eq!(rows.len(), 1);
}

fn select_all_people() -> sqlx_sqlite_dbkit::statements::Select {
   select(["ID", "Name", "Age"]).from("People")
}

#[tokio::test]
async fn test_failed_build_carries_error_in_row() {
   let conn = test_conn().await;

   // No table name: the build fails before reaching the database, but the
   // Row contract still holds.
   let row = conn.query_row_statement(&select(["ID"])).await;
   assert!(matches!(row.err(), Some(Error::MissingTable("SELECT"))));

   let err = conn.exec_statement(&select(["ID"])).await.unwrap_err();
   assert!(matches!(err, Error::MissingTable("SELECT")));
}

#[tokio::test]
async fn test_exists_statement() {
   let conn = test_conn().await;
   conn
      .exec_statement(&insert_into("People").value("ID", 1).value("Name", "ada"))
      .await
      .unwrap();

   let stmt = sqlx_sqlite_dbkit::statements::exists(
      select(["1"]).from("People").filter(cond::eq("Name", "ada")).limit(1),
   );
   let found = conn.query_row_statement(&stmt).await.value().unwrap();
   assert_eq!(found.as_bool(), Some(true));

   let stmt = sqlx_sqlite_dbkit::statements::exists(
      select(["1"]).from("People").filter(cond::eq("Name", "nobody")).limit(1),
   );
   let found = conn.query_row_statement(&stmt).await.value().unwrap();
   assert_eq!(found.as_bool(), Some(false));
}
