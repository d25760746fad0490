// src/models/user.rs
use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

// Representa um utilizador lido da tabela 'users'
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub password_hash: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "username")] // Mapeia do HTML 'username'
    pub id: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(rename = "username")]
    #[validate(length(min = 3, max = 32, message = "Usuário deve ter entre 3 e 32 caracteres"))]
    pub id: String,
    #[validate(length(min = 3, message = "Nome deve ter no mínimo 3 caracteres"))]
    pub name: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub password: String,
}
