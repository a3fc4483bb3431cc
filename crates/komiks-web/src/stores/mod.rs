pub mod auth_store;
pub mod reader_store;

pub use auth_store::AuthStore;
pub use reader_store::ReaderStore;
