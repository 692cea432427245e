pub mod error_dto;
pub mod pagination;
