use hoshi_pipeline::infrastructure::persistence::Database;
use uuid::Uuid;

/// File-backed SQLite database, unique per test so tests can run in parallel.
/// The file (and its WAL companions) is removed on drop.
pub struct TestDatabase {
    db: Database,
    path: String,
}

impl TestDatabase {
    pub fn db(&self) -> Database {
        self.db.clone()
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path, suffix));
        }
    }
}

pub async fn setup_test_db() -> TestDatabase {
    let path = std::env::temp_dir()
        .join(format!("hoshi_test_{}.db", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    let db_url = format!("sqlite://{}?mode=rwc", path);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    TestDatabase { db, path }
}
