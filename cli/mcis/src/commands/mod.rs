pub mod clean;
pub mod doctor;
pub mod find;
pub mod init;
pub mod inspect;
pub mod mvm;
