pub mod dtos;
pub mod get_message;
pub mod list_messages;
pub mod mutate_message;
pub mod send_message;
pub mod update_status;

#[cfg(test)]
mod use_cases_test;
