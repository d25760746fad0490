// src/services/student_form.rs
use crate::{
    error::StoreError,
    models::student::{Student, StudentForm},
    services::{
        student_store::StudentStore,
        student_validator::{validate_student, FieldErrors},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Estado do formulário de aluno.
///
/// `Idle -> Submitting -> {Success, ValidationFailed, StoreFailed}`; no modo de
/// edição começa em `Loading` até o registo ser carregado. Os detalhes de cada
/// desfecho seguem no `SubmitOutcome`.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Loading,
    Idle,
    Submitting,
    Success,
    ValidationFailed,
    StoreFailed,
}

/// Resultado de uma submissão.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Success(Student),
    ValidationFailed(FieldErrors),
    StoreFailed(String),
    /// Formulário ainda a carregar ou com outra submissão em curso.
    Busy,
}

/// Resultado do carregamento no modo de edição.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Modo de cadastro: formulário em branco.
    Blank,
    Loaded(Student),
    Missing,
    Failed(String),
}

pub const MSG_STORE_FAILED: &str = "Erro ao salvar aluno";
pub const MSG_DUPLICATE_MATRICULA: &str = "Já existe um aluno com esta matrícula";
pub const MSG_NOT_FOUND: &str = "Aluno não encontrado";
pub const MSG_LOAD_FAILED: &str = "Erro ao carregar aluno";

pub struct StudentFormController<'a> {
    store: &'a dyn StudentStore,
    mode: FormMode,
    state: FormState,
    values: StudentForm,
}

impl<'a> StudentFormController<'a> {
    pub fn create(store: &'a dyn StudentStore) -> Self {
        Self {
            store,
            mode: FormMode::Create,
            state: FormState::Idle,
            values: StudentForm::blank(),
        }
    }

    pub fn edit(store: &'a dyn StudentStore, id: impl Into<String>) -> Self {
        Self {
            store,
            mode: FormMode::Edit { id: id.into() },
            state: FormState::Loading,
            values: StudentForm::default(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &StudentForm {
        &self.values
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self.state, FormState::Loading | FormState::Submitting)
    }

    /// Carrega o registo a editar. Se falhar, o formulário continua em
    /// `Loading` e não aceita submissões.
    pub async fn load(&mut self) -> LoadOutcome {
        let id = match &self.mode {
            FormMode::Edit { id } => id.clone(),
            FormMode::Create => {
                self.state = FormState::Idle;
                return LoadOutcome::Blank;
            }
        };

        match self.store.get(&id).await {
            Ok(student) => {
                self.values = StudentForm::from(&student);
                self.state = FormState::Idle;
                LoadOutcome::Loaded(student)
            }
            Err(StoreError::NotFound) => {
                tracing::warn!("Aluno '{}' não encontrado para edição.", id);
                LoadOutcome::Missing
            }
            Err(e) => {
                tracing::error!("Erro ao carregar aluno '{}': {:?}", id, e);
                LoadOutcome::Failed(MSG_LOAD_FAILED.to_string())
            }
        }
    }

    /// Valida e grava. `created_by` só é usado no cadastro.
    pub async fn submit(&mut self, form: StudentForm, created_by: &str) -> SubmitOutcome {
        if !self.is_interactive() {
            tracing::debug!("Submissão ignorada: formulário em {:?}", self.state);
            return SubmitOutcome::Busy;
        }
        self.state = FormState::Submitting;
        self.values = form;

        let payload = match validate_student(&self.values) {
            Ok(payload) => payload,
            Err(errors) => {
                self.state = FormState::ValidationFailed;
                return SubmitOutcome::ValidationFailed(errors);
            }
        };

        let result = match &self.mode {
            FormMode::Create => self.store.insert(&payload, created_by).await,
            FormMode::Edit { id } => self.store.update(id, &payload).await,
        };

        match result {
            Ok(student) => {
                self.state = FormState::Success;
                SubmitOutcome::Success(student)
            }
            Err(e) => {
                tracing::error!("Erro ao salvar aluno ({:?}): {:?}", self.mode, e);
                let message = match e {
                    StoreError::Conflict(_) => MSG_DUPLICATE_MATRICULA,
                    StoreError::NotFound => MSG_NOT_FOUND,
                    StoreError::Database(_) => MSG_STORE_FAILED,
                };
                self.state = FormState::StoreFailed;
                SubmitOutcome::StoreFailed(message.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        models::student::StudentPayload,
        services::student_store::{
            tests::{payload, BrokenStore},
            SqliteStudentStore,
        },
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Conta as escritas feitas na base.
    struct CountingStore {
        inner: SqliteStudentStore,
        writes: AtomicUsize,
    }

    impl CountingStore {
        async fn new() -> Self {
            Self {
                inner: SqliteStudentStore::new(db::test_pool().await),
                writes: AtomicUsize::new(0),
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StudentStore for CountingStore {
        async fn list(&self) -> Result<Vec<Student>, StoreError> {
            self.inner.list().await
        }
        async fn get(&self, id: &str) -> Result<Student, StoreError> {
            self.inner.get(id).await
        }
        async fn insert(&self, payload: &StudentPayload, created_by: &str) -> Result<Student, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(payload, created_by).await
        }
        async fn update(&self, id: &str, payload: &StudentPayload) -> Result<Student, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update(id, payload).await
        }
        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(id).await
        }
    }

    fn form(matricula: &str, nome: &str) -> StudentForm {
        StudentForm {
            matricula: matricula.into(),
            nome_completo: nome.into(),
            email: "ana@x.com".into(),
            curso: "CS".into(),
            status: "Ativo".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_success_inserts_with_creator() {
        let store = CountingStore::new().await;
        let mut controller = StudentFormController::create(&store);
        assert!(controller.is_interactive());

        let outcome = controller.submit(form("2024001", "Ana Souza"), "secretaria").await;

        let SubmitOutcome::Success(student) = &outcome else {
            panic!("esperava sucesso, obteve {:?}", outcome);
        };
        assert_eq!(student.created_by, "secretaria");
        assert_eq!(controller.state(), &FormState::Success);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_store() {
        let store = CountingStore::new().await;
        let mut controller = StudentFormController::create(&store);

        let outcome = controller.submit(form("2024001", "Al"), "u").await;

        let SubmitOutcome::ValidationFailed(errors) = &outcome else {
            panic!("esperava erro de validação, obteve {:?}", outcome);
        };
        assert_eq!(
            errors.get("nome_completo").map(String::as_str),
            Some("Nome completo deve ter no mínimo 3 caracteres")
        );
        assert_eq!(store.writes(), 0);
        assert!(controller.is_interactive());
        // Mantém o que foi digitado para voltar a mostrar
        assert_eq!(controller.values().nome_completo, "Al");
    }

    #[tokio::test]
    async fn store_failure_is_a_single_message_and_resubmittable() {
        let mut controller = StudentFormController::create(&BrokenStore);

        let outcome = controller.submit(form("2024001", "Ana Souza"), "u").await;
        assert_eq!(outcome, SubmitOutcome::StoreFailed(MSG_STORE_FAILED.to_string()));
        assert!(controller.is_interactive());

        let again = controller.submit(form("2024001", "Ana Souza"), "u").await;
        assert!(matches!(again, SubmitOutcome::StoreFailed(_)));
    }

    #[tokio::test]
    async fn duplicate_matricula_gets_its_own_message() {
        let store = CountingStore::new().await;
        store.insert(&payload("2024001", "Ana Souza"), "u").await.unwrap();

        let mut controller = StudentFormController::create(&store);
        let outcome = controller.submit(form("2024001", "Outra Pessoa"), "u").await;
        assert_eq!(outcome, SubmitOutcome::StoreFailed(MSG_DUPLICATE_MATRICULA.to_string()));
    }

    #[tokio::test]
    async fn edit_requires_load_before_submit() {
        let store = CountingStore::new().await;
        let ana = store.insert(&payload("2024001", "Ana Souza"), "u").await.unwrap();

        let mut controller = StudentFormController::edit(&store, ana.id.clone());
        assert!(!controller.is_interactive());
        assert_eq!(controller.submit(form("2024001", "Ana Lima"), "u").await, SubmitOutcome::Busy);

        assert_eq!(controller.load().await, LoadOutcome::Loaded(ana.clone()));
        assert_eq!(controller.values().nome_completo, "Ana Souza");
        assert!(controller.is_interactive());

        let outcome = controller.submit(form("2024001", "Ana Lima"), "outra").await;
        let SubmitOutcome::Success(updated) = &outcome else {
            panic!("esperava sucesso, obteve {:?}", outcome);
        };
        assert_eq!(updated.id, ana.id);
        assert_eq!(updated.nome_completo, "Ana Lima");
        // created_by não muda na edição
        assert_eq!(updated.created_by, "u");
    }

    #[tokio::test]
    async fn edit_of_missing_record_stays_non_interactive() {
        let store = CountingStore::new().await;
        let mut controller = StudentFormController::edit(&store, "nao-existe");

        assert_eq!(controller.load().await, LoadOutcome::Missing);
        assert!(!controller.is_interactive());
        assert_eq!(controller.submit(form("1", "Ana Souza"), "u").await, SubmitOutcome::Busy);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn edit_load_failure_is_reported() {
        let mut controller = StudentFormController::edit(&BrokenStore, "x");
        assert_eq!(controller.load().await, LoadOutcome::Failed(MSG_LOAD_FAILED.to_string()));
    }

    #[tokio::test]
    async fn create_mode_load_is_blank() {
        let store = CountingStore::new().await;
        let mut controller = StudentFormController::create(&store);
        assert_eq!(controller.load().await, LoadOutcome::Blank);
        assert_eq!(controller.values(), &StudentForm::blank());
    }
}
