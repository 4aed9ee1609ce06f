//! Prompt construction for the debate, synthesis, and trader roles.

use std::fmt::Write;

use crate::debate::DebateArgument;
use crate::domain::{AnalysisSnapshot, DebateSide};
use crate::trader::DecisionContext;

/// Render the two analysis snapshots into the market-data block shared by
/// every debate turn.
pub fn format_market_context(technical: &AnalysisSnapshot, sentiment: &AnalysisSnapshot) -> String {
    let rsi = technical
        .indicator_f64("rsi")
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "N/A".to_string());
    let score = sentiment
        .indicator_f64("sentiment_score")
        .map(|v| format!("{v:.3}"))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "Technical Analysis:\n\
         - Trend: {}\n\
         - RSI: {}\n\
         - Confidence: {:.2}\n\
         \n\
         Sentiment Analysis:\n\
         - Overall Sentiment: {}\n\
         - Impact: {}\n\
         - Confidence: {:.2}\n",
        technical.tag, rsi, technical.confidence, score, sentiment.tag, sentiment.confidence
    )
}

/// Prompt for one bull or bear argument turn
pub fn argument_prompt(
    side: DebateSide,
    ticker: &str,
    date: &str,
    market_context: &str,
    prior_arguments: &[String],
) -> String {
    let previous = if prior_arguments.is_empty() {
        "This is your opening argument.".to_string()
    } else {
        prior_arguments
            .iter()
            .map(|a| format!("- {a}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let (role, stance) = match side {
        DebateSide::Bull => ("BULL", format!("a BULLISH argument for why to BUY {ticker}")),
        DebateSide::Bear => (
            "BEAR",
            format!("a BEARISH argument for why to be cautious about {ticker}"),
        ),
    };

    format!(
        "You are the {role} advocate in a trading debate for {ticker} on {date}.\n\
         \n\
         MARKET DATA:\n{market_context}\n\
         PREVIOUS ARGUMENTS:\n{previous}\n\
         \n\
         Provide {stance}. Be specific, data-driven, and persuasive.\n\
         Respond in JSON format with keys:\n\
         - argument: your main case (string)\n\
         - key_points: list of 3-5 supporting points\n\
         - conviction: your confidence level (0-1)\n"
    )
}

/// Prompt for the synthesis step; unlike argument turns this sees the full
/// transcript.
pub fn synthesis_prompt(ticker: &str, date: &str, arguments: &[DebateArgument]) -> String {
    let mut transcript = String::new();
    for arg in arguments {
        let _ = writeln!(transcript, "Round {} - {}: {}", arg.round, arg.side, arg.text);
    }

    format!(
        "You are a neutral judge reviewing a trading debate for {ticker} on {date}.\n\
         \n\
         DEBATE TRANSCRIPT:\n{transcript}\n\
         Based on the arguments presented, decide which side made the stronger\n\
         case and what action follows.\n\
         Respond in JSON format with keys: winning_side (Bull or Bear),\n\
         action (BUY, SELL, or HOLD), confidence (0-1), key_reasons (list)\n"
    )
}

/// Prompt for the trader action proposal
pub fn decision_prompt(ctx: &DecisionContext) -> String {
    let market_context = format_market_context(&ctx.technical, &ctx.sentiment);
    format!(
        "You are an expert trader making a decision for {} on {}.\n\
         \n\
         CURRENT PORTFOLIO:\n\
         - Cash: ${}\n\
         - Current Position in {}: {} shares\n\
         - Portfolio Value: ${}\n\
         \n\
         MARKET ANALYSIS:\n\
         Current Price: ${}\n\
         {market_context}\n\
         Debate Outcome:\n\
         - Winning Side: {}\n\
         - Recommended Action: {}\n\
         - Debate Confidence: {:.2}\n\
         - Key Reasons: {}\n\
         \n\
         Consider your current position, available cash, and risk management\n\
         (max {:.0}% of portfolio per position).\n\
         Respond in JSON format with keys: action (BUY, SELL, or HOLD),\n\
         quantity (number of shares, 0 if HOLD), reasoning, confidence (0-1)\n",
        ctx.ticker,
        ctx.date,
        ctx.cash,
        ctx.ticker,
        ctx.position,
        ctx.portfolio_value,
        ctx.price,
        ctx.verdict.winning_side,
        ctx.verdict.action,
        ctx.verdict.confidence,
        ctx.verdict.reasons.join(", "),
        ctx.max_position_pct * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnalysisKind;
    use chrono::NaiveDate;

    fn snapshot(kind: AnalysisKind, tag: &str) -> AnalysisSnapshot {
        AnalysisSnapshot {
            kind,
            ticker: "AAPL".to_string(),
            date: NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            indicators: serde_json::Map::new(),
            tag: tag.to_string(),
            confidence: 0.7,
        }
    }

    #[test]
    fn test_argument_prompt_marks_opening_turn() {
        let prompt = argument_prompt(DebateSide::Bull, "AAPL", "2020-07-01", "ctx", &[]);
        assert!(prompt.contains("opening argument"));
        assert!(prompt.contains("BULL advocate"));
    }

    #[test]
    fn test_argument_prompt_lists_priors() {
        let priors = vec!["first point".to_string(), "second point".to_string()];
        let prompt = argument_prompt(DebateSide::Bear, "AAPL", "2020-07-01", "ctx", &priors);
        assert!(prompt.contains("- first point"));
        assert!(prompt.contains("- second point"));
        assert!(!prompt.contains("opening argument"));
    }

    #[test]
    fn test_market_context_includes_tags() {
        let technical = snapshot(AnalysisKind::Technical, "BULLISH");
        let sentiment = snapshot(AnalysisKind::Sentiment, "POSITIVE");
        let ctx = format_market_context(&technical, &sentiment);
        assert!(ctx.contains("BULLISH"));
        assert!(ctx.contains("POSITIVE"));
    }
}
