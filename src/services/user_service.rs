// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::User,
    services::auth_service,
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Busca um utilizador na base de dados pelo seu ID.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando utilizador por ID: {}", user_id);
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, password_hash, name
        FROM users
        WHERE id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;

    if user.is_some() {
        tracing::debug!("Utilizador '{}' encontrado.", user_id);
    } else {
        tracing::debug!("Utilizador '{}' não encontrado.", user_id);
    }
    Ok(user)
}

/// Cria uma conta nova. Devolve `UserAlreadyExists` se o ID já estiver em uso.
pub async fn create_user(
    db_pool: &SqlitePool,
    id: &str,
    name: &str,
    raw_password: &str,
) -> AppResult<User> {
    tracing::info!("Tentando criar utilizador: {}", id);
    let password_hash = auth_service::hash_password(raw_password).await?;
    insert_user(db_pool, id, name, &password_hash).await
}

async fn insert_user(db_pool: &SqlitePool, id: &str, name: &str, password_hash: &str) -> AppResult<User> {
    let now = Utc::now();
    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, password_hash, name, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        RETURNING id, password_hash, name
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .bind(name)
    .bind(now)
    .fetch_one(db_pool)
    .await;

    match result {
        Ok(user) => {
            tracing::info!("✅ Utilizador '{}' criado com sucesso.", id);
            Ok(user)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!("Falha ao criar user: ID '{}' já existe.", id);
            Err(AppError::UserAlreadyExists)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn create_then_find() {
        let pool = db::test_pool().await;
        let created = create_user(&pool, "secretaria", "Secretaria Acadêmica", "segredo123")
            .await
            .unwrap();

        let found = find_user_by_id(&pool, "secretaria").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Secretaria Acadêmica");
        assert!(auth_service::verify_password("segredo123", &found.password_hash).await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_case_insensitive_and_unique() {
        let pool = db::test_pool().await;
        insert_user(&pool, "secretaria", "A", "hash").await.unwrap();

        let err = insert_user(&pool, "SECRETARIA", "B", "hash").await.unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists));
        assert!(find_user_by_id(&pool, "Secretaria").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let pool = db::test_pool().await;
        assert!(find_user_by_id(&pool, "ninguem").await.unwrap().is_none());
    }
}
