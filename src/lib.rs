pub mod agent;
pub mod analyst;
pub mod api;
pub mod config;
pub mod data;
pub mod debate;
pub mod domain;
pub mod error;
pub mod sim;
pub mod trader;

pub use agent::{ClaudeCliReasoner, CliReasonerConfig, Judgment, Reasoned, Reasoner, ScriptedReasoner};
pub use config::AppConfig;
pub use data::{PriceSource, SentimentSource, SyntheticPriceSource, SyntheticSentimentSource, YahooPriceSource};
pub use debate::{DebateEngine, DebateTranscript, Verdict};
pub use domain::{AnalysisSnapshot, DebateSide, TradeAction};
pub use error::{BullbearError, Result};
pub use sim::{JobRegistry, JobStatus, SimulationResult, SimulationRunner};
pub use trader::{Portfolio, Trader, TraderDecision};
