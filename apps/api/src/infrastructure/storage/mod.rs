pub mod drive_storage_service;
pub mod local_storage_service;
pub mod retry;
pub mod traits;
