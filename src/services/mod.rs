pub mod backend;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod twscrape;
