pub mod aspect_ratio;
pub mod entity;
pub mod errors;
pub mod repository;
pub mod value_objects;
