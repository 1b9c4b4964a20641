//! Schema migration runner
//!
//! Each [`Migration`] carries ordered `up` and `down` SQL steps. [`up`]
//! applies pending migrations transactionally and records them in a ledger
//! table; [`down`] reverts applied migrations in reverse order. Migrations
//! can be declared inline or loaded from a directory of
//! `<name>.up.sql` / `<name>.down.sql` files with [`from_dir`].

use std::path::{Path, PathBuf};

use crate::db::Db;
use crate::error::Result;
use crate::statements::{ColumnType, cond, create_table, delete_from, exists, insert_into, select};

/// Table recording which migrations have been applied
pub const MIGRATION_TABLE: &str = "dbkit_migrations";

/// File suffix marking an up step in [`from_dir`]
pub const UP_SUFFIX: &str = ".up.sql";

/// File suffix marking a down step in [`from_dir`]
pub const DOWN_SUFFIX: &str = ".down.sql";

/// One named migration: SQL steps to apply and to revert.
#[derive(Debug, Clone, Default)]
pub struct Migration {
   pub name: String,
   pub up: Vec<String>,
   pub down: Vec<String>,
}

/// Apply every migration that has not been applied yet, in order.
///
/// Each pending migration's steps run inside one transaction that also
/// records the migration's name, so a failing step leaves neither partial
/// schema changes nor a ledger entry.
pub async fn up<D: Db>(db: &D, migrations: &[Migration]) -> Result<()> {
   ensure_ledger(db).await?;

   for migration in migrations {
      if applied(db, &migration.name).await? {
         continue;
      }

      let name = migration.name.clone();
      let steps = migration.up.clone();

      db.transact(move |tx| async move {
         for sql in &steps {
            tx.exec(sql, Vec::new()).await?;
         }

         tx.exec_statement(&insert_into(MIGRATION_TABLE).value("name", name)).await?;
         Ok(())
      })
      .await?;
   }

   Ok(())
}

/// Revert every applied migration, most recent first.
pub async fn down<D: Db>(db: &D, migrations: &[Migration]) -> Result<()> {
   ensure_ledger(db).await?;

   for migration in migrations.iter().rev() {
      if !applied(db, &migration.name).await? {
         continue;
      }

      let name = migration.name.clone();
      let steps = migration.down.clone();

      db.transact(move |tx| async move {
         for sql in &steps {
            tx.exec(sql, Vec::new()).await?;
         }

         tx.exec_statement(&delete_from(MIGRATION_TABLE).filter(cond::eq("name", name)))
            .await?;
         Ok(())
      })
      .await?;
   }

   Ok(())
}

/// Load migrations from a directory tree of `*.up.sql` / `*.down.sql`
/// files.
///
/// Files are visited in sorted path order; files sharing a name (the path
/// with the suffix stripped) merge into one migration, and files with
/// neither suffix are ignored.
pub fn from_dir(dir: impl AsRef<Path>) -> Result<Vec<Migration>> {
   let dir = dir.as_ref();

   let mut files = Vec::new();
   collect_files(dir, &mut files)?;
   files.sort();

   let mut migrations: Vec<Migration> = Vec::new();

   for path in files {
      let relative = path.strip_prefix(dir).unwrap_or(&path).to_string_lossy();

      let (name, is_up) = if let Some(name) = relative.strip_suffix(UP_SUFFIX) {
         (name.to_string(), true)
      } else if let Some(name) = relative.strip_suffix(DOWN_SUFFIX) {
         (name.to_string(), false)
      } else {
         continue;
      };

      let content = std::fs::read_to_string(&path)?;

      let start_new = migrations.last().is_none_or(|last| last.name != name);
      if start_new {
         migrations.push(Migration {
            name,
            ..Default::default()
         });
      }
      let migration = migrations.last_mut().expect("pushed above when empty");

      if is_up {
         migration.up.push(content);
      } else {
         migration.down.push(content);
      }
   }

   Ok(migrations)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
   for entry in std::fs::read_dir(dir)? {
      let entry = entry?;
      let path = entry.path();

      if entry.file_type()?.is_dir() {
         collect_files(&path, files)?;
      } else {
         files.push(path);
      }
   }

   Ok(())
}

async fn ensure_ledger<D: Db>(db: &D) -> Result<()> {
   let stmt = create_table(MIGRATION_TABLE)
      .if_not_exists()
      .primary_key("name", ColumnType::Text);

   db.exec_statement(&stmt).await?;
   Ok(())
}

async fn applied<D: Db>(db: &D, name: &str) -> Result<bool> {
   let stmt = exists(select(["name"]).from(MIGRATION_TABLE).filter(cond::eq("name", name)));
   let value = db.query_row_statement(&stmt).await.value()?;
   Ok(value.as_bool().unwrap_or(false))
}

#[cfg(test)]
mod tests {
   use super::*;

   fn write(dir: &Path, name: &str, content: &str) {
      let path = dir.join(name);
      if let Some(parent) = path.parent() {
         std::fs::create_dir_all(parent).unwrap();
      }
      std::fs::write(path, content).unwrap();
   }

   #[test]
   fn test_from_dir_groups_by_name_in_sorted_order() {
      let dir = tempfile::tempdir().unwrap();
      write(dir.path(), "0002_people.up.sql", "CREATE TABLE people (id)");
      write(dir.path(), "0002_people.down.sql", "DROP TABLE people");
      write(dir.path(), "0001_init.up.sql", "CREATE TABLE init (id)");
      write(dir.path(), "notes.txt", "ignored");

      let migrations = from_dir(dir.path()).unwrap();

      assert_eq!(migrations.len(), 2);
      assert_eq!(migrations[0].name, "0001_init");
      assert_eq!(migrations[0].up, vec!["CREATE TABLE init (id)"]);
      assert!(migrations[0].down.is_empty());
      assert_eq!(migrations[1].name, "0002_people");
      assert_eq!(migrations[1].up, vec!["CREATE TABLE people (id)"]);
      assert_eq!(migrations[1].down, vec!["DROP TABLE people"]);
   }

   #[test]
   fn test_from_dir_recurses_subdirectories() {
      let dir = tempfile::tempdir().unwrap();
      write(dir.path(), "nested/0001_a.up.sql", "SELECT 1");

      let migrations = from_dir(dir.path()).unwrap();
      assert_eq!(migrations.len(), 1);
      assert_eq!(migrations[0].name, "nested/0001_a");
   }

   #[test]
   fn test_from_dir_empty() {
      let dir = tempfile::tempdir().unwrap();
      assert!(from_dir(dir.path()).unwrap().is_empty());
   }
}
