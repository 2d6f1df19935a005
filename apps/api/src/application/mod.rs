pub mod get_graphic;
pub mod report;
pub mod upload_graphic;
