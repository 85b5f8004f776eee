pub mod history;
pub mod migrate;
pub mod serve;
