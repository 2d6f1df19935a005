pub mod drive;
pub mod imaging;
pub mod repositories;
pub mod storage;
