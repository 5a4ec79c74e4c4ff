pub mod crawler;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod seed;
pub mod session;
mod worker;

pub use crawler::{Crawler, CrawlerBuilder, CrawlerConfig};
pub use error::CrawlError;
pub use pipeline::{ConsolePipeline, Pipeline};
pub use processor::{CrawlResult, Processor};
pub use seed::{Seed, SeedManager};
pub use session::{BlankSessionFactory, Session, SessionFactory, SessionPool};
