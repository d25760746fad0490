// src/models/student.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Situação académica do aluno.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StudentStatus {
    #[default]
    Ativo,
    Trancado,
    Concluido,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 3] = [
        StudentStatus::Ativo,
        StudentStatus::Trancado,
        StudentStatus::Concluido,
    ];

    /// Valor gravado na coluna `status` e enviado pelo formulário.
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Ativo => "Ativo",
            StudentStatus::Trancado => "Trancado",
            StudentStatus::Concluido => "Concluído",
        }
    }

    /// Classe CSS do selo de estado.
    pub fn badge_class(&self) -> &'static str {
        match self {
            StudentStatus::Ativo => "badge badge-default",
            StudentStatus::Trancado => "badge badge-secondary",
            StudentStatus::Concluido => "badge badge-outline",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Status desconhecido: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for StudentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for StudentStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Linha da tabela `students`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Student {
    pub id: String,
    pub matricula: String,
    pub nome_completo: String,
    pub email: String,
    pub cpf: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub curso: String,
    #[sqlx(try_from = "String")]
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// Campos de um aluno já validados, prontos para gravar.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentPayload {
    pub matricula: String,
    pub nome_completo: String,
    pub email: String,
    pub cpf: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub curso: String,
    pub status: StudentStatus,
}

/// O domínio do email precisa de pelo menos um ponto e de um TLD com 2+ letras.
fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let domain = email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("");
    let valid = match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty()
                && host.split('.').all(|label| !label.is_empty())
                && tld.len() >= 2
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    };
    if valid {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("Email inválido".into());
    Err(err)
}

/// Dados brutos do formulário de cadastro/edição, tal como chegam do browser.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(default)]
pub struct StudentForm {
    #[validate(length(min = 1, message = "Matrícula é obrigatória"))]
    pub matricula: String,
    #[validate(length(min = 3, message = "Nome completo deve ter no mínimo 3 caracteres"))]
    pub nome_completo: String,
    #[validate(email(message = "Email inválido"), custom(function = "validate_email_domain"))]
    pub email: String,
    pub cpf: String,
    pub data_nascimento: String,
    #[validate(length(min = 1, message = "Curso é obrigatório"))]
    pub curso: String,
    pub status: String,
}

impl StudentForm {
    /// Formulário vazio de cadastro, com o estado por omissão.
    pub fn blank() -> Self {
        StudentForm {
            status: StudentStatus::default().as_str().to_string(),
            ..Default::default()
        }
    }
}

impl From<&Student> for StudentForm {
    fn from(student: &Student) -> Self {
        StudentForm {
            matricula: student.matricula.clone(),
            nome_completo: student.nome_completo.clone(),
            email: student.email.clone(),
            cpf: student.cpf.clone().unwrap_or_default(),
            data_nascimento: student
                .data_nascimento
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            curso: student.curso.clone(),
            status: student.status.as_str().to_string(),
        }
    }
}
