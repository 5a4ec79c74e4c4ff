//! Ferret is a crawling toolkit built around an XPath-like path-query
//! engine for parsed HTML/XML document trees.
//!
//! The engine lives in `ferret-pathquery`: expressions are compiled once
//! into a [`PathExpression`] and evaluated any number of times against any
//! tree implementing [`DocumentNode`]. The crawl orchestration (worker
//! pool, seed queue, session pool, pipelines) lives in `ferret-crawler`
//! and consumes the engine's output through [`Processor`] implementations.
//!
//! ```no_run
//! use ferret::{HtmlDocument, Registry, compile};
//!
//! let document = HtmlDocument::parse("<ul><li><a href='/x'>x</a></li></ul>");
//! let expression = compile("//a/@href").unwrap();
//! let registry = Registry::new();
//! let links = expression.evaluate(&[document.root()], &registry).unwrap();
//! assert_eq!(links[0].to_string(), "/x");
//! ```

pub mod html;

pub use ferret_pathquery::{
    DocumentNode, OpValue, PathError, PathExpression, QueryResult, Registry, compile, evaluate,
};

pub use ferret_crawler::{
    BlankSessionFactory, CrawlError, CrawlResult, Crawler, CrawlerBuilder, CrawlerConfig,
    ConsolePipeline, Pipeline, Processor, Seed, SeedManager, Session, SessionFactory, SessionPool,
};

pub use html::{HtmlDocument, HtmlNode};
