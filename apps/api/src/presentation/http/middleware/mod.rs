pub mod logging;
pub mod request_id;
pub mod upload_gate;
