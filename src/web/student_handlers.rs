// src/web/student_handlers.rs
use crate::{
    error::{AppResult, StoreError},
    models::student::StudentForm,
    services::{
        student_form::{LoadOutcome, StudentFormController, SubmitOutcome, MSG_NOT_FOUND},
        student_listing::StudentListing,
    },
    state::AppState,
    templates::{render, NotFoundPage, StudentDetailsPage, StudentFormPage, StudentRow, StudentsPage},
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Extension, Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    #[serde(default)]
    q: String,
    success: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DeleteForm {
    #[serde(default)]
    nome: String,
}

/// Post/Redirect/Get com mensagem na query string.
fn redirect_with(path: &str, key: &str, message: &str) -> Response {
    let redirect_url = format!("{}?{}={}", path, key, urlencoding::encode(message));
    Redirect::to(&redirect_url).into_response()
}

fn not_found(message: &str) -> AppResult<Response> {
    let page = NotFoundPage {
        message: message.to_string(),
    };
    Ok((StatusCode::NOT_FOUND, render(&page)?).into_response())
}

// Rota não encontrada
pub async fn not_found_handler() -> AppResult<Response> {
    not_found("Página não encontrada")
}

// GET /
pub async fn list_students(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    tracing::debug!("GET /: listagem para {} (busca {:?})", user.id, params.q);

    let mut listing = StudentListing::default();
    let mut error_message = params.error;
    let loaded = match listing.refresh(state.students.as_ref()).await {
        Ok(()) => {
            tracing::debug!("{} alunos carregados.", listing.students().len());
            true
        }
        Err(e) => {
            tracing::error!("Erro ao buscar alunos: {:?}", e);
            error_message = Some("Falha ao carregar lista de alunos.".to_string());
            false
        }
    };
    listing.set_search_term(params.q);

    let page = StudentsPage {
        user_name: user.name,
        search_term: listing.search_term().to_string(),
        rows: listing.filtered().into_iter().map(StudentRow::from).collect(),
        empty_message: if loaded {
            listing.empty_state().map(|s| s.message())
        } else {
            None
        },
        success_message: params.success,
        error_message,
    };
    Ok(render(&page)?.into_response())
}

// GET /alunos/{id}
pub async fn show_student(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.students.get(&id).await {
        Ok(student) => Ok(render(&StudentDetailsPage::new(&user.name, &student))?.into_response()),
        Err(StoreError::NotFound) => {
            tracing::warn!("Aluno '{}' não encontrado.", id);
            not_found(MSG_NOT_FOUND)
        }
        Err(e) => Err(e.into()),
    }
}

// GET /alunos/novo
pub async fn show_new_form(Extension(user): Extension<CurrentUser>) -> AppResult<Response> {
    let page = StudentFormPage::new(&user.name, "/alunos/novo".to_string(), false, StudentForm::blank());
    Ok(render(&page)?.into_response())
}

// POST /alunos/novo
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<StudentForm>,
) -> AppResult<Response> {
    tracing::info!("POST /alunos/novo: {} cadastrando matrícula {}", user.id, form.matricula);

    let mut controller = StudentFormController::create(state.students.as_ref());
    let outcome = controller.submit(form, &user.id).await;
    tracing::debug!("Cadastro terminou em {:?}", controller.state());
    submit_response(
        outcome,
        controller.values(),
        &user,
        "/alunos/novo".to_string(),
        false,
        "Aluno cadastrado com sucesso!",
    )
}

// GET /alunos/{id}/editar
pub async fn show_edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let mut controller = StudentFormController::edit(state.students.as_ref(), id.clone());
    match controller.load().await {
        LoadOutcome::Loaded(student) => {
            tracing::debug!("Editando aluno {} ({}).", student.id, student.matricula);
            let page = StudentFormPage::new(
                &user.name,
                format!("/alunos/{}/editar", id),
                true,
                controller.values().clone(),
            );
            Ok(render(&page)?.into_response())
        }
        LoadOutcome::Blank | LoadOutcome::Missing => not_found(MSG_NOT_FOUND),
        LoadOutcome::Failed(message) => Ok(redirect_with("/", "error", &message)),
    }
}

// POST /alunos/{id}/editar
pub async fn handle_edit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<StudentForm>,
) -> AppResult<Response> {
    tracing::info!("POST /alunos/{}/editar: processando edição de {}", id, user.id);
    let action = format!("/alunos/{}/editar", id);

    let mut controller = StudentFormController::edit(state.students.as_ref(), id.clone());
    match controller.load().await {
        LoadOutcome::Loaded(_) | LoadOutcome::Blank => {}
        LoadOutcome::Missing => return not_found(MSG_NOT_FOUND),
        LoadOutcome::Failed(message) => {
            let page = StudentFormPage::new(&user.name, action, true, form).with_error_message(message);
            return Ok(render(&page)?.into_response());
        }
    }

    let outcome = controller.submit(form, &user.id).await;
    tracing::debug!("Edição terminou em {:?}", controller.state());
    submit_response(
        outcome,
        controller.values(),
        &user,
        action,
        true,
        "Aluno atualizado com sucesso!",
    )
}

fn submit_response(
    outcome: SubmitOutcome,
    values: &StudentForm,
    user: &CurrentUser,
    action: String,
    is_edit: bool,
    success_message: &str,
) -> AppResult<Response> {
    let page = StudentFormPage::new(&user.name, action, is_edit, values.clone());
    match outcome {
        SubmitOutcome::Success(student) => {
            tracing::info!("✅ Aluno '{}' gravado.", student.id);
            Ok(redirect_with("/", "success", success_message))
        }
        SubmitOutcome::ValidationFailed(errors) => {
            let html = render(&page.with_errors(errors))?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
        }
        SubmitOutcome::StoreFailed(message) => {
            Ok(render(&page.with_error_message(message))?.into_response())
        }
        SubmitOutcome::Busy => {
            let html = render(&page.with_error_message("Formulário ocupado. Tente novamente."))?;
            Ok((StatusCode::CONFLICT, html).into_response())
        }
    }
}

// POST /alunos/{id}/excluir
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    tracing::info!("POST /alunos/{}/excluir por {}", id, user.id);

    match state.students.delete(&id).await {
        Ok(()) => {
            let message = if form.nome.trim().is_empty() {
                "Aluno excluído com sucesso".to_string()
            } else {
                format!("Aluno {} excluído com sucesso", form.nome.trim())
            };
            Ok(redirect_with("/", "success", &message))
        }
        Err(e) => {
            tracing::error!("Erro ao excluir aluno {}: {:?}", id, e);
            Ok(redirect_with("/", "error", "Erro ao excluir aluno"))
        }
    }
}
