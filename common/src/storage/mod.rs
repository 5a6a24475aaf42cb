pub mod corpus;
pub mod db;
pub mod types;
