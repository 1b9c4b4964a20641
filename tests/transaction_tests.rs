//! Integration tests for savepoint transactions

use std::sync::{Arc, Mutex};

use sqlx_sqlite_dbkit::{Conn, Db, Error, QueryLogger, Transaction, Value, values};

/// Records the SQL each query sends, savepoint commands included
#[derive(Debug, Default)]
struct RecordingLogger {
   queries: Mutex<Vec<String>>,
}

impl RecordingLogger {
   fn queries(&self) -> Vec<String> {
      self.queries.lock().unwrap().clone()
   }
}

impl QueryLogger for RecordingLogger {
   fn log_query(&self, sql: &str, _args: &[Value]) {
      self.queries.lock().unwrap().push(sql.to_owned());
   }
}

async fn test_conn() -> Conn {
   let conn = Conn::open(":memory:").await.unwrap();

   conn
      .exec(
         r#"CREATE TABLE "TestTable" ("ID" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, "Name" TEXT)"#,
         values![],
      )
      .await
      .unwrap();

   conn
}

async fn count(db: &impl Db) -> i64 {
   db_sql_count(db, r#"SELECT COUNT(*) FROM "TestTable""#).await
}

async fn db_count_named(db: &impl Db, name: &str) -> i64 {
   db.query_row(
      r#"SELECT COUNT(*) FROM "TestTable" WHERE "Name" = ?"#,
      values![name],
   )
   .await
   .value()
   .unwrap()
   .as_i64()
   .unwrap()
}

async fn db_sql_count(db: &impl Db, sql: &str) -> i64 {
   db.query_row(sql, values![]).await.value().unwrap().as_i64().unwrap()
}

#[tokio::test]
async fn test_transact_commits_on_success() {
   let conn = test_conn().await;

   conn
      .transact(|tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![]).await?;
         Ok(())
      })
      .await
      .unwrap();

   assert_eq!(count(&conn).await, 1);
}

#[tokio::test]
async fn test_transact_rolls_back_on_error() {
   let conn = test_conn().await;

   let boom = conn
      .transact(|tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![]).await?;
         Err(Error::Other("boom".into()))
      })
      .await
      .unwrap_err();

   assert!(matches!(boom, Error::Other(message) if message == "boom"));
   assert_eq!(count(&conn).await, 0);
}

#[tokio::test]
async fn test_transact_rollback_sentinel_is_success() {
   let conn = test_conn().await;

   conn
      .transact(|tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![]).await?;
         Err(Error::RollbackRequested)
      })
      .await
      .unwrap();

   assert_eq!(count(&conn).await, 0);
}

#[tokio::test]
async fn test_error_rollback_issues_savepoint_commands() {
   let conn = test_conn().await;
   let logger = Arc::new(RecordingLogger::default());
   conn.set_logger(logger.clone());

   let _ = conn
      .transact(|_tx| async move { Err(Error::Other("trigger rollback".into())) })
      .await
      .unwrap_err();

   let queries = logger.queries();
   assert_eq!(queries.len(), 2);
   assert!(queries[0].starts_with("SAVEPOINT "));
   assert!(queries[1].starts_with("ROLLBACK TRANSACTION TO SAVEPOINT "));
}

#[tokio::test]
async fn test_panic_rolls_back_before_unwinding() {
   let conn = test_conn().await;
   let logger = Arc::new(RecordingLogger::default());

   let task_conn = conn.clone();
   let task_logger = logger.clone();
   let task = tokio::spawn(async move {
      task_conn.set_logger(task_logger);
      task_conn
         .transact(|tx| async move {
            tx.exec(r#"INSERT INTO "TestTable" ("Name") VALUES ('doomed')"#, values![])
               .await?;
            panic!("expected to panic");
         })
         .await
   });

   let join_error = task.await.unwrap_err();
   assert!(join_error.is_panic());

   // The savepoint was unwound before the panic escaped
   assert_eq!(count(&conn).await, 0);

   let queries = logger.queries();
   assert!(queries.first().unwrap().starts_with("SAVEPOINT "));
   assert!(
      queries
         .last()
         .unwrap()
         .starts_with("ROLLBACK TRANSACTION TO SAVEPOINT ")
   );
}

#[tokio::test]
async fn test_nested_transactions_commit_together() {
   let conn = test_conn().await;

   conn
      .transact(|tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" ("Name") VALUES ('outer')"#, values![])
            .await?;

         tx.transact(|inner| async move {
            inner
               .exec(r#"INSERT INTO "TestTable" ("Name") VALUES ('inner')"#, values![])
               .await?;
            Ok(())
         })
         .await
      })
      .await
      .unwrap();

   assert_eq!(count(&conn).await, 2);
}

#[tokio::test]
async fn test_inner_rollback_keeps_outer_writes() {
   let conn = test_conn().await;

   conn
      .transact(|tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" ("Name") VALUES ('outer')"#, values![])
            .await?;

         // The inner scope asks for a soft rollback: its write disappears,
         // but the overall call succeeds and the outer scope commits.
         tx.transact(|inner| async move {
            inner
               .exec(r#"INSERT INTO "TestTable" ("Name") VALUES ('inner')"#, values![])
               .await?;
            Err(Error::RollbackRequested)
         })
         .await?;

         // The inner write is already invisible inside the outer scope
         let inner_count = inner_count_named(&tx, "inner").await;
         assert_eq!(inner_count, 0);

         Ok(())
      })
      .await
      .unwrap();

   assert_eq!(db_count_named(&conn, "outer").await, 1);
   assert_eq!(db_count_named(&conn, "inner").await, 0);
}

async fn inner_count_named(tx: &Transaction, name: &str) -> i64 {
   tx.query_row(
      r#"SELECT COUNT(*) FROM "TestTable" WHERE "Name" = ?"#,
      values![name],
   )
   .await
   .value()
   .unwrap()
   .as_i64()
   .unwrap()
}

#[tokio::test]
async fn test_query_inside_transaction_sees_own_writes() {
   let conn = test_conn().await;

   conn
      .transact(|tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![]).await?;

         let rows = tx.query(r#"SELECT * FROM "TestTable""#, values![]).await?;
         assert_eq!(rows.len(), 1);

         Err(Error::RollbackRequested)
      })
      .await
      .unwrap();

   assert_eq!(count(&conn).await, 0);
}

#[tokio::test]
async fn test_escaped_handle_fails_every_operation() {
   let conn = test_conn().await;
   let escaped: Arc<Mutex<Option<Transaction>>> = Arc::new(Mutex::new(None));

   let stash = escaped.clone();
   conn
      .transact(move |tx| async move {
         *stash.lock().unwrap() = Some(tx.clone());
         Ok(())
      })
      .await
      .unwrap();

   let tx = escaped.lock().unwrap().take().unwrap();

   let err = tx
      .exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::TransactionNotRunning));

   let err = tx.query(r#"SELECT 1"#, values![]).await.unwrap_err();
   assert!(matches!(err, Error::TransactionNotRunning));

   let row = tx.query_row(r#"SELECT 1"#, values![]).await;
   assert!(matches!(row.err(), Some(Error::TransactionNotRunning)));

   let err = tx.transact(|_inner| async move { Ok(()) }).await.unwrap_err();
   assert!(matches!(err, Error::TransactionNotRunning));

   // Nothing leaked through
   assert_eq!(count(&conn).await, 0);
}

#[tokio::test]
async fn test_commit_failure_surfaces() {
   let conn = test_conn().await;

   // Closing the connection mid-transaction forces the release-savepoint
   // command to fail.
   let to_close = conn.clone();
   let err = conn
      .transact(move |tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![]).await?;
         to_close.close().await?;
         Ok(())
      })
      .await
      .unwrap_err();

   assert!(matches!(err, Error::ConnectionClosed));
}

#[tokio::test]
async fn test_failed_rollback_reports_composite_error() {
   let conn = test_conn().await;

   let to_close = conn.clone();
   let err = conn
      .transact(move |tx| async move {
         tx.exec(r#"INSERT INTO "TestTable" DEFAULT VALUES"#, values![]).await?;
         to_close.close().await?;
         Err(Error::Other("original failure".into()))
      })
      .await
      .unwrap_err();

   match err {
      Error::RollbackFailed { source, rollback } => {
         assert!(matches!(*source, Error::Other(message) if message == "original failure"));
         assert!(matches!(*rollback, Error::ConnectionClosed));
      }
      other => panic!("expected RollbackFailed, got {other:?}"),
   }
}
