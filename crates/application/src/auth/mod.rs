pub mod dtos;
pub mod tokens;
