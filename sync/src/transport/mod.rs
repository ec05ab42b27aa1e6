pub mod broadcast;
pub mod local;
