pub mod advanced;
pub mod config;
pub mod inference;
pub mod knowledge_base;
pub mod league;
pub mod metrics;
pub mod normalize;
pub mod parser;
pub mod players;
pub mod query;
pub mod season;
pub mod stat_type;
pub mod teams;

pub use config::ParserConfig;
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseError};
pub use parser::QueryParser;
pub use query::{ChartType, FieldValue, MetricType, QueryDescriptor, StatType};
