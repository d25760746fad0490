pub mod auth_service;
pub mod student_form;
pub mod student_listing;
pub mod student_store;
pub mod student_validator;
pub mod user_service;
