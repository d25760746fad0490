// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, SignupForm},
    services::{auth_service, user_service},
    state::AppState,
    templates::{render, AuthPage},
    web::mw_auth::SESSION_USER_KEY,
};
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use validator::Validate;

const MSG_INVALID_CREDENTIALS: &str = "Usuário ou senha inválidos.";

fn auth_page(error: Option<String>, username: &str) -> AppResult<Response> {
    let page = AuthPage {
        error,
        username: username.to_string(),
    };
    Ok(render(&page)?.into_response())
}

/// Autentica a sessão para `user_id`, com novo ID de sessão.
async fn start_session(session: &Session, user_id: &str) -> AppResult<()> {
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao rodar ID: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, user_id)
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao inserir na sessão: {}", e)))?;
    Ok(())
}

// GET /auth
pub async fn show_auth_form(session: Session) -> AppResult<Response> {
    if session.get::<String>(SESSION_USER_KEY).await.ok().flatten().is_some() {
        tracing::debug!("GET /auth: Utilizador já logado, redirecionando para /");
        return Ok(Redirect::to("/").into_response());
    }
    auth_page(None, "")
}

// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Tentativa de login para ID: {}", form.id);

    let Some(user) = user_service::find_user_by_id(&state.db_pool, &form.id).await? else {
        tracing::warn!("Utilizador não encontrado: {}", form.id);
        return auth_page(Some(MSG_INVALID_CREDENTIALS.to_string()), &form.id);
    };

    if !auth_service::verify_password(&form.password, &user.password_hash).await? {
        tracing::warn!("Senha incorreta para ID: {}", form.id);
        return auth_page(Some(MSG_INVALID_CREDENTIALS.to_string()), &form.id);
    }

    start_session(&session, &user.id).await?;
    tracing::info!("✅ Login bem-sucedido para: {}", user.id);
    Ok(Redirect::to("/").into_response())
}

// POST /auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    tracing::info!("Tentativa de cadastro para ID: {}", form.id);

    if let Err(errors) = form.validate() {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        messages.sort();
        tracing::warn!("Cadastro rejeitado para {}: {:?}", form.id, messages);
        return auth_page(Some(messages.join(" ")), "");
    }

    let user = match user_service::create_user(&state.db_pool, &form.id, &form.name, &form.password).await {
        Ok(user) => user,
        Err(AppError::UserAlreadyExists) => {
            return auth_page(Some("Usuário já existe.".to_string()), "");
        }
        Err(e) => return Err(e),
    };

    start_session(&session, &user.id).await?;
    Ok(Redirect::to("/").into_response())
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();

    session
        .flush()
        .await
        .map_err(|e| AppError::SessionError(format!("Falha ao apagar sessão: {}", e)))?;

    if let Some(id) = user_id {
        tracing::info!("🚪 Utilizador '{}' desligado.", id);
    } else {
        tracing::info!("🚪 Sessão anónima desligada.");
    }

    Ok(Redirect::to("/auth"))
}
