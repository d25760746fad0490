// src/services/student_listing.rs
use crate::{error::StoreError, models::student::Student, services::student_store::StudentStore};

/// Porque a lista filtrada está vazia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoStudents,
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoStudents => {
                "Nenhum aluno cadastrado. Clique em 'Novo Aluno' para começar."
            }
            EmptyState::NoMatches => "Nenhum aluno encontrado com esses critérios.",
        }
    }
}

/// Última lista obtida da base e o termo de busca atual.
#[derive(Debug, Default)]
pub struct StudentListing {
    students: Vec<Student>,
    search_term: String,
}

impl StudentListing {
    /// Volta a buscar a lista. Em caso de erro a lista anterior é mantida.
    pub async fn refresh(&mut self, store: &dyn StudentStore) -> Result<(), StoreError> {
        self.students = store.list().await?;
        Ok(())
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn filtered(&self) -> Vec<&Student> {
        let needle = self.search_term.to_lowercase();
        self.students
            .iter()
            .filter(|student| matches_term(student, &needle))
            .collect()
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.filtered().is_empty() {
            None
        } else if self.search_term.is_empty() {
            Some(EmptyState::NoStudents)
        } else {
            Some(EmptyState::NoMatches)
        }
    }
}

/// `needle` já deve vir em minúsculas.
fn matches_term(student: &Student, needle: &str) -> bool {
    needle.is_empty()
        || student.nome_completo.to_lowercase().contains(needle)
        || student.matricula.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::StudentStatus;
    use crate::services::student_store::tests::BrokenStore;
    use chrono::Utc;

    fn student(id: &str, matricula: &str, nome: &str) -> Student {
        let now = Utc::now();
        Student {
            id: id.into(),
            matricula: matricula.into(),
            nome_completo: nome.into(),
            email: format!("{}@escola.br", id),
            cpf: None,
            data_nascimento: None,
            curso: "Direito".into(),
            status: StudentStatus::Ativo,
            created_at: now,
            updated_at: now,
            created_by: "u".into(),
        }
    }

    fn listing() -> StudentListing {
        StudentListing {
            students: vec![
                student("a", "2024001", "Ana Souza"),
                student("b", "2024002", "Bruno Lima"),
                student("c", "ADM-77", "Carla Souza Dias"),
            ],
            search_term: String::new(),
        }
    }

    fn ids(students: Vec<&Student>) -> Vec<&str> {
        students.into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        let listing = listing();
        assert_eq!(ids(listing.filtered()), vec!["a", "b", "c"]);
        assert_eq!(listing.empty_state(), None);
    }

    #[test]
    fn matches_name_case_insensitively() {
        let mut listing = listing();
        listing.set_search_term("SOUZA");
        assert_eq!(ids(listing.filtered()), vec!["a", "c"]);
    }

    #[test]
    fn matches_matricula_substring() {
        let mut listing = listing();
        listing.set_search_term("002");
        assert_eq!(ids(listing.filtered()), vec!["b"]);

        listing.set_search_term("adm");
        assert_eq!(ids(listing.filtered()), vec!["c"]);
    }

    #[test]
    fn does_not_match_other_fields() {
        let mut listing = listing();
        listing.set_search_term("direito");
        assert!(listing.filtered().is_empty());
        assert_eq!(listing.empty_state(), Some(EmptyState::NoMatches));
    }

    #[test]
    fn filtered_is_always_a_subset() {
        let listing_all = listing();
        for term in ["", "a", "S", "20240", "zzz", "lima"] {
            let mut l = listing();
            l.set_search_term(term);
            let needle = term.to_lowercase();
            for s in listing_all.students() {
                let included = l.filtered().iter().any(|f| f.id == s.id);
                let expected = s.nome_completo.to_lowercase().contains(&needle)
                    || s.matricula.to_lowercase().contains(&needle);
                assert_eq!(included, expected, "termo {term:?}, aluno {}", s.id);
            }
        }
    }

    #[test]
    fn empty_listing_reports_no_students() {
        let listing = StudentListing::default();
        assert_eq!(listing.empty_state(), Some(EmptyState::NoStudents));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let mut listing = listing();
        assert!(listing.refresh(&BrokenStore).await.is_err());
        assert_eq!(listing.students().len(), 3);
    }

    #[tokio::test]
    async fn refresh_picks_up_inserted_and_deleted_records() {
        use crate::services::student_store::{tests::payload, SqliteStudentStore};

        let store = SqliteStudentStore::new(crate::db::test_pool().await);
        let mut listing = StudentListing::default();

        let ana = store.insert(&payload("1", "Ana Souza"), "u").await.unwrap();
        listing.refresh(&store).await.unwrap();
        assert_eq!(listing.students().iter().filter(|s| s.id == ana.id).count(), 1);

        store.delete(&ana.id).await.unwrap();
        listing.refresh(&store).await.unwrap();
        assert!(listing.students().iter().all(|s| s.id != ana.id));
    }
}
