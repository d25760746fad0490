// src/web/routes.rs
use crate::{
    state::AppState,
    web::{auth_handlers, mw_auth, student_handlers},
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/auth", get(auth_handlers::show_auth_form))
        .route("/auth/login", post(auth_handlers::handle_login))
        .route("/auth/signup", post(auth_handlers::handle_signup))
        .route("/logout", get(auth_handlers::handle_logout));

    // --- Rotas de Alunos --- (exigem login)
    let student_routes = Router::new()
        .route("/", get(student_handlers::list_students))
        .route(
            "/alunos/novo",
            get(student_handlers::show_new_form).post(student_handlers::handle_create),
        )
        .route("/alunos/{id}", get(student_handlers::show_student))
        .route(
            "/alunos/{id}/editar",
            get(student_handlers::show_edit_form).post(student_handlers::handle_edit),
        )
        .route("/alunos/{id}/excluir", post(student_handlers::handle_delete))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(student_routes)
        .fallback(student_handlers::not_found_handler)
        .with_state(app_state)
}
