pub mod extract;
pub mod handlers;
pub mod records;
pub mod storage;
