pub mod json_catalog_repository;
