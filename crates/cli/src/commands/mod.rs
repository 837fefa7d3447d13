pub mod chat;
pub mod course;
pub mod doctor;
pub mod probe;
pub mod serve;
