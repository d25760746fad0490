// src/error.rs
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

/// Falhas da camada de persistência de alunos.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Registo não encontrado")]
    NotFound,

    // Violação de UNIQUE (ex: matrícula repetida)
    #[error("Registo em conflito: {0}")]
    Conflict(String),

    #[error("Erro na base de dados: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return StoreError::NotFound;
        }
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de configuração: {0}")]
    ConfigError(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Utilizador já existe")]
    UserAlreadyExists,

    #[error("Erro na sessão: {0}")]
    SessionError(String),

    #[error("Erro ao renderizar página: {0}")]
    TemplateError(#[from] askama::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Erro interno inesperado")]
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Erro processado: {:?}", self);

        let (status, user_message) = match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao aceder aos dados.")
            }
            AppError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Registo não encontrado.")
            }
            AppError::Store(StoreError::Conflict(_)) | AppError::UserAlreadyExists => {
                (StatusCode::CONFLICT, "O registo já existe.")
            }
            AppError::Store(StoreError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao aceder aos dados.")
            }
            AppError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Erro de configuração."),
            AppError::PasswordHashingError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro ao processar credenciais.")
            }
            AppError::SessionError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro na gestão da sua sessão.")
            }
            AppError::TemplateError(_) | AppError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        (status, Html(format!(r#"
            <!DOCTYPE html><html><head><title>Erro</title><style>body{{font-family:sans-serif;}}</style></head>
            <body><h1>Erro {status_code}</h1><p>{message}</p><a href="/">Voltar</a></body></html>
         "#, status_code = status.as_u16(), message = user_message))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;
