pub mod dto;
pub mod tracker;
