// src/state.rs
use crate::services::student_store::{SqliteStudentStore, StudentStore};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub students: Arc<dyn StudentStore>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        let students = Arc::new(SqliteStudentStore::new(db_pool.clone()));
        Self { db_pool, students }
    }
}
