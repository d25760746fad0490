// src/web/mw_auth.rs
use crate::{error::AppError, services::user_service, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Chave da sessão onde fica o ID do utilizador autenticado.
pub const SESSION_USER_KEY: &str = "user_id";

/// Utilizador autenticado, posto nas extensões da requisição por `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
}

// Middleware que verifica se o utilizador está logado
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = match session.get::<String>(SESSION_USER_KEY).await {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            tracing::debug!("Autenticação MW: Não autenticado. Redirecionando para /auth");
            return Ok(Redirect::to("/auth").into_response());
        }
        Err(e) => {
            tracing::error!("Autenticação MW: Erro ao ler sessão: {:?}", e);
            return Err(AppError::SessionError(format!("Erro ao verificar sessão: {}", e)));
        }
    };

    match user_service::find_user_by_id(&state.db_pool, &user_id).await? {
        Some(user) => {
            tracing::debug!("Autenticação MW: Utilizador '{}' autenticado.", user.id);
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                name: user.name,
            });
            Ok(next.run(request).await)
        }
        None => {
            // Conta removida depois do login
            tracing::warn!("Autenticação MW: user_id '{}' da sessão não existe. Limpando sessão.", user_id);
            session
                .flush()
                .await
                .map_err(|e| AppError::SessionError(format!("Falha ao limpar sessão: {}", e)))?;
            Ok(Redirect::to("/auth").into_response())
        }
    }
}
