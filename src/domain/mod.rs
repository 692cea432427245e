pub mod conversion;
pub mod history;
pub mod shared;
