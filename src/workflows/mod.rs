pub mod discovery;
pub mod pipeline;
pub mod postings;
pub mod report;
pub mod screening;
pub mod session;
pub mod storage;
