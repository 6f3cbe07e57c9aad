pub mod calendar;
pub mod ingest;
pub mod init;
pub mod source;
pub mod stats;
pub mod terms;
