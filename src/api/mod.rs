pub mod emergency_contacts;
pub mod news;
pub mod sos;
