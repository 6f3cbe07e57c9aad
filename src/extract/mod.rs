pub mod agenda;
pub mod pdf;
