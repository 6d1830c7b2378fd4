pub mod db;
pub mod entities;
pub mod error;
pub mod memory;
pub mod repository;
pub mod sqlite;
pub mod tracked;
