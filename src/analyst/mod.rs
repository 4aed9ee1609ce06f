//! Rule-based analysts that condense raw market and social data into the
//! structured snapshots the debate consumes.

mod sentiment;
mod technical;

pub use sentiment::SentimentAnalyst;
pub use technical::TechnicalAnalyst;
