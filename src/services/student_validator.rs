// src/services/student_validator.rs
use crate::models::student::{StudentForm, StudentPayload, StudentStatus};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Mensagem de erro por campo do formulário.
pub type FieldErrors = BTreeMap<String, String>;

/// Valida o formulário inteiro (sem parar no primeiro erro) e devolve os
/// campos tipados ou uma mensagem por campo inválido.
pub fn validate_student(form: &StudentForm) -> Result<StudentPayload, FieldErrors> {
    let mut errors = form.validate().err().unwrap_or_else(ValidationErrors::new);

    let status = if form.status.trim().is_empty() {
        Some(StudentStatus::default())
    } else {
        match form.status.parse::<StudentStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add("status", field_error("status", "Status inválido"));
                None
            }
        }
    };

    let data_nascimento = match blank_to_none(&form.data_nascimento) {
        None => None,
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(
                    "data_nascimento",
                    field_error("data_nascimento", "Data de nascimento inválida"),
                );
                None
            }
        },
    };

    match status {
        Some(status) if errors.field_errors().is_empty() => Ok(StudentPayload {
            matricula: form.matricula.clone(),
            nome_completo: form.nome_completo.clone(),
            email: form.email.clone(),
            cpf: blank_to_none(&form.cpf),
            data_nascimento,
            curso: form.curso.clone(),
            status,
        }),
        _ => {
            let messages = field_messages(&errors);
            tracing::debug!("Formulário de aluno rejeitado: {:?}", messages);
            Err(messages)
        }
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Primeira mensagem de cada campo.
fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            field_errors.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}
