/// Game, player, question and answer storage operations.
pub mod duel_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
