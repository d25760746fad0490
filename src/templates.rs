// src/templates.rs
use crate::{
    error::AppResult,
    models::student::{Student, StudentForm, StudentStatus},
    services::student_validator::FieldErrors,
};
use askama::Template;
use axum::response::Html;
use chrono::{DateTime, Local, NaiveDate, Utc};

const MESES: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho",
    "julho", "agosto", "setembro", "outubro", "novembro", "dezembro",
];

/// "15 de março de 2004"
pub fn format_data_longa(data: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{:02} de {} de {}", data.day(), MESES[data.month0() as usize], data.year())
}

/// "15/03/2024 às 14:30", na hora local do servidor.
pub fn format_data_hora(instante: DateTime<Utc>) -> String {
    instante
        .with_timezone(&Local)
        .format("%d/%m/%Y às %H:%M")
        .to_string()
}

/// Renderiza um template e converte falhas em `AppError`.
pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Falha ao renderizar template: {}", e);
        e.into()
    })
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthPage {
    pub error: Option<String>,
    pub username: String,
}

/// Linha da tabela de alunos já formatada para exibição.
#[derive(Clone, Debug)]
pub struct StudentRow {
    pub id: String,
    pub matricula: String,
    pub nome_completo: String,
    pub email: String,
    pub curso: String,
    pub status: &'static str,
    pub status_class: &'static str,
}

impl From<&Student> for StudentRow {
    fn from(student: &Student) -> Self {
        StudentRow {
            id: student.id.clone(),
            matricula: student.matricula.clone(),
            nome_completo: student.nome_completo.clone(),
            email: student.email.clone(),
            curso: student.curso.clone(),
            status: student.status.as_str(),
            status_class: student.status.badge_class(),
        }
    }
}

#[derive(Template)]
#[template(path = "students.html")]
pub struct StudentsPage {
    pub user_name: String,
    pub search_term: String,
    pub rows: Vec<StudentRow>,
    pub empty_message: Option<&'static str>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Opção do select de estado.
#[derive(Clone, Debug)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "student_form.html")]
pub struct StudentFormPage {
    pub user_name: String,
    pub is_edit: bool,
    pub action: String,
    pub values: StudentForm,
    pub errors: FieldErrors,
    pub status_options: Vec<StatusOption>,
    pub error_message: Option<String>,
}

impl StudentFormPage {
    pub fn new(user_name: &str, action: String, is_edit: bool, values: StudentForm) -> Self {
        let status_options = StudentStatus::ALL
            .iter()
            .map(|status| StatusOption {
                value: status.as_str(),
                selected: status.as_str() == values.status,
            })
            .collect();
        StudentFormPage {
            user_name: user_name.to_string(),
            is_edit,
            action,
            values,
            errors: FieldErrors::new(),
            status_options,
            error_message: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Mensagem do campo, ou vazio.
    pub fn error_for(&self, field: &str) -> &str {
        self.errors.get(field).map(String::as_str).unwrap_or("")
    }
}

#[derive(Template)]
#[template(path = "student_details.html")]
pub struct StudentDetailsPage {
    pub user_name: String,
    pub id: String,
    pub matricula: String,
    pub nome_completo: String,
    pub email: String,
    pub curso: String,
    pub cpf: Option<String>,
    pub data_nascimento: Option<String>,
    pub status: &'static str,
    pub status_class: &'static str,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: String,
}

impl StudentDetailsPage {
    pub fn new(user_name: &str, student: &Student) -> Self {
        StudentDetailsPage {
            user_name: user_name.to_string(),
            id: student.id.clone(),
            matricula: student.matricula.clone(),
            nome_completo: student.nome_completo.clone(),
            email: student.email.clone(),
            curso: student.curso.clone(),
            cpf: student.cpf.clone(),
            data_nascimento: student.data_nascimento.map(format_data_longa),
            status: student.status.as_str(),
            status_class: student.status.badge_class(),
            created_at: format_data_hora(student.created_at),
            updated_at: format_data_hora(student.updated_at),
            created_by: student.created_by.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub message: String,
}
