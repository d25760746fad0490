// src/services/student_store.rs
use crate::{
    error::StoreError,
    models::student::{Student, StudentPayload},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Acesso à tabela `students`. Cada chamada é uma única ida à base de dados,
/// sem repetições.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Todos os alunos, ordenados por nome completo.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    async fn get(&self, id: &str) -> Result<Student, StoreError>;

    async fn insert(&self, payload: &StudentPayload, created_by: &str) -> Result<Student, StoreError>;

    async fn update(&self, id: &str, payload: &StudentPayload) -> Result<Student, StoreError>;

    /// Apaga se existir. Um id inexistente não é erro.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

const STUDENT_COLUMNS: &str = "id, matricula, nome_completo, email, cpf, data_nascimento, \
                               curso, status, created_at, updated_at, created_by";

#[derive(Clone)]
pub struct SqliteStudentStore {
    db_pool: SqlitePool,
}

impl SqliteStudentStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl StudentStore for SqliteStudentStore {
    async fn list(&self) -> Result<Vec<Student>, StoreError> {
        tracing::debug!("Buscando todos os alunos...");
        let sql = format!(
            "SELECT {} FROM students ORDER BY nome_completo COLLATE NOCASE ASC, id ASC",
            STUDENT_COLUMNS
        );
        let students = sqlx::query_as::<_, Student>(&sql)
            .fetch_all(&self.db_pool)
            .await?;
        tracing::debug!("Encontrados {} alunos.", students.len());
        Ok(students)
    }

    async fn get(&self, id: &str) -> Result<Student, StoreError> {
        tracing::debug!("Buscando aluno por ID: {}", id);
        let sql = format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS);
        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, payload: &StudentPayload, created_by: &str) -> Result<Student, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        tracing::info!("Cadastrando aluno '{}' (matrícula {})", id, payload.matricula);

        let sql = format!(
            r#"
            INSERT INTO students
                (id, matricula, nome_completo, email, cpf, data_nascimento,
                 curso, status, created_at, updated_at, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, ?10)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(&id)
            .bind(&payload.matricula)
            .bind(&payload.nome_completo)
            .bind(&payload.email)
            .bind(&payload.cpf)
            .bind(payload.data_nascimento)
            .bind(&payload.curso)
            .bind(payload.status.as_str())
            .bind(now)
            .bind(created_by)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| {
                let err = StoreError::from(e);
                if let StoreError::Conflict(_) = err {
                    tracing::warn!("Matrícula '{}' já cadastrada.", payload.matricula);
                }
                err
            })?;

        tracing::info!("✅ Aluno '{}' cadastrado.", student.id);
        Ok(student)
    }

    async fn update(&self, id: &str, payload: &StudentPayload) -> Result<Student, StoreError> {
        tracing::info!("Atualizando aluno: {}", id);
        let sql = format!(
            r#"
            UPDATE students
            SET
                matricula = ?1,
                nome_completo = ?2,
                email = ?3,
                cpf = ?4,
                data_nascimento = ?5,
                curso = ?6,
                status = ?7,
                updated_at = ?8
            WHERE id = ?9
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(&payload.matricula)
            .bind(&payload.nome_completo)
            .bind(&payload.email)
            .bind(&payload.cpf)
            .bind(payload.data_nascimento)
            .bind(&payload.curso)
            .bind(payload.status.as_str())
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        match student {
            Some(student) => {
                tracing::info!("✅ Aluno '{}' atualizado.", id);
                Ok(student)
            }
            None => {
                tracing::warn!("Falha ao atualizar: aluno '{}' não encontrado.", id);
                Err(StoreError::NotFound)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        tracing::info!("Excluindo aluno: {}", id);
        let rows_affected = sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            tracing::debug!("Aluno '{}' já não existia; nada a excluir.", id);
        } else {
            tracing::info!("✅ Aluno '{}' excluído.", id);
        }
        Ok(())
    }
}
