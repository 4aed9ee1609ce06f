//! Reasoner backed by the `claude` CLI via subprocess communication.
//!
//! Transport failures (spawn, timeout, non-zero exit) surface as errors;
//! responses that arrive but fail to parse surface as `Reasoned::Fallback`
//! so the debate protocol can continue.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::agent::prompts;
use crate::agent::{Judgment, Reasoned, Reasoner};
use crate::debate::{DebateArgument, Verdict};
use crate::domain::{DebateSide, TradeAction};
use crate::error::{BullbearError, Result};
use crate::trader::{DecisionContext, TradeProposal};

/// Configuration for the CLI reasoner
#[derive(Debug, Clone)]
pub struct CliReasonerConfig {
    /// Path to the claude CLI executable
    pub cli_path: String,
    /// Timeout for one reasoner call
    pub timeout: Duration,
    /// Model to pass through to the CLI
    pub model: Option<String>,
}

impl Default for CliReasonerConfig {
    fn default() -> Self {
        Self {
            cli_path: "claude".to_string(),
            timeout: Duration::from_secs(120),
            model: None,
        }
    }
}

/// Claude CLI subprocess reasoner
pub struct ClaudeCliReasoner {
    config: CliReasonerConfig,
}

impl ClaudeCliReasoner {
    pub fn new() -> Self {
        Self {
            config: CliReasonerConfig::default(),
        }
    }

    pub fn with_config(config: CliReasonerConfig) -> Self {
        Self { config }
    }

    /// Check if the claude CLI is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.config.cli_path)
            .arg("--version")
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => Ok(true),
            Ok(_) => {
                warn!("claude CLI returned error status");
                Ok(false)
            }
            Err(e) => {
                warn!("claude CLI not found at '{}': {}", self.config.cli_path, e);
                Ok(false)
            }
        }
    }

    /// Run one prompt through the CLI and return raw stdout
    async fn run_prompt(&self, prompt: &str) -> Result<String> {
        let mut cmd = Command::new(&self.config.cli_path);
        cmd.arg("--print")
            .arg("--output-format")
            .arg("text")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(ref model) = self.config.model {
            cmd.arg("--model").arg(model);
        }

        debug!("spawning claude process");
        let mut child = cmd
            .spawn()
            .map_err(|e| BullbearError::Reasoner(format!("failed to spawn claude process: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| BullbearError::Reasoner(format!("failed to write prompt: {e}")))?;
        }

        let output = timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| BullbearError::Reasoner("reasoner call timed out".to_string()))?
            .map_err(|e| BullbearError::Reasoner(format!("failed to read claude output: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BullbearError::Reasoner(format!(
                "claude process failed: {stderr}"
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for ClaudeCliReasoner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reasoner for ClaudeCliReasoner {
    async fn judge(
        &self,
        side: DebateSide,
        ticker: &str,
        date: NaiveDate,
        market_context: &str,
        prior_arguments: &[String],
    ) -> Result<Reasoned<Judgment>> {
        let prompt = prompts::argument_prompt(
            side,
            ticker,
            &date.to_string(),
            market_context,
            prior_arguments,
        );
        let response = self.run_prompt(&prompt).await?;
        let json_str = extract_json(&response);

        match serde_json::from_str::<RawArgument>(json_str) {
            Ok(raw) => Ok(Reasoned::Structured(Judgment {
                text: raw.argument,
                supporting_points: raw.key_points,
                confidence: raw.conviction.clamp(0.0, 1.0),
            })),
            Err(e) => {
                warn!(%side, %date, "unparsable argument response, using filler: {e}");
                Ok(Reasoned::Fallback(Judgment::fallback_for(side)))
            }
        }
    }

    async fn synthesize(
        &self,
        ticker: &str,
        date: NaiveDate,
        arguments: &[DebateArgument],
    ) -> Result<Reasoned<Verdict>> {
        let prompt = prompts::synthesis_prompt(ticker, &date.to_string(), arguments);
        let response = self.run_prompt(&prompt).await?;
        let json_str = extract_json(&response);

        match parse_verdict(json_str) {
            Some(verdict) => Ok(Reasoned::Structured(verdict)),
            None => {
                warn!(%date, "unparsable synthesis response, using fallback verdict");
                Ok(Reasoned::Fallback(Verdict::fallback()))
            }
        }
    }

    async fn propose(&self, context: &DecisionContext) -> Result<Reasoned<TradeProposal>> {
        let prompt = prompts::decision_prompt(context);
        let response = self.run_prompt(&prompt).await?;
        let json_str = extract_json(&response);

        match parse_proposal(json_str) {
            Some(proposal) => Ok(Reasoned::Structured(proposal)),
            None => {
                warn!(trader = %context.trader, "unparsable proposal, holding");
                Ok(Reasoned::Fallback(TradeProposal::fallback()))
            }
        }
    }
}

/// Extract JSON from a response that may contain markdown code blocks
fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            let content = text[start + 3..start + 3 + end].trim();
            if let Some(newline) = content.find('\n') {
                return content[newline + 1..].trim();
            }
            return content;
        }
    }

    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            return &text[start..=end];
        }
    }

    text.trim()
}

#[derive(Debug, Deserialize)]
struct RawArgument {
    argument: String,
    #[serde(default)]
    key_points: Vec<String>,
    #[serde(default = "default_conviction")]
    conviction: f64,
}

fn default_conviction() -> f64 {
    0.5
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    winning_side: String,
    action: String,
    #[serde(default = "default_conviction")]
    confidence: f64,
    #[serde(default)]
    key_reasons: Vec<String>,
}

fn parse_verdict(json_str: &str) -> Option<Verdict> {
    let raw: RawVerdict = serde_json::from_str(json_str).ok()?;
    Some(Verdict {
        winning_side: DebateSide::parse(&raw.winning_side)?,
        action: TradeAction::parse(&raw.action)?,
        confidence: raw.confidence.clamp(0.0, 1.0),
        reasons: raw.key_reasons,
    })
}

#[derive(Debug, Deserialize)]
struct RawProposal {
    action: String,
    #[serde(default)]
    quantity: u64,
    #[serde(default)]
    reasoning: String,
    #[serde(default = "default_conviction")]
    confidence: f64,
}

fn parse_proposal(json_str: &str) -> Option<TradeProposal> {
    let raw: RawProposal = serde_json::from_str(json_str).ok()?;
    Some(TradeProposal {
        action: TradeAction::parse(&raw.action)?,
        quantity: raw.quantity,
        reasoning: raw.reasoning,
        confidence: raw.confidence.clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let text = "Here's my analysis:\n\n```json\n{\"argument\": \"up\", \"conviction\": 0.9}\n```\n\nDone.";
        let json = extract_json(text);
        assert!(json.starts_with('{'));
        assert!(json.contains("argument"));
    }

    #[test]
    fn test_extract_json_raw_object() {
        let text = r#"{"argument": "up", "conviction": 0.9}"#;
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_parse_verdict_lenient_casing() {
        let verdict = parse_verdict(
            r#"{"winning_side": "bull", "action": "buy", "confidence": 0.8, "key_reasons": ["momentum"]}"#,
        )
        .unwrap();
        assert_eq!(verdict.winning_side, DebateSide::Bull);
        assert_eq!(verdict.action, TradeAction::Buy);
    }

    #[test]
    fn test_parse_verdict_rejects_unknown_action() {
        assert!(parse_verdict(r#"{"winning_side": "Bull", "action": "YOLO"}"#).is_none());
    }

    #[test]
    fn test_parse_proposal_defaults() {
        let proposal = parse_proposal(r#"{"action": "HOLD"}"#).unwrap();
        assert_eq!(proposal.action, TradeAction::Hold);
        assert_eq!(proposal.quantity, 0);
        assert_eq!(proposal.confidence, 0.5);
    }

    #[test]
    fn test_confidence_clamped() {
        let proposal =
            parse_proposal(r#"{"action": "BUY", "quantity": 10, "confidence": 3.5}"#).unwrap();
        assert_eq!(proposal.confidence, 1.0);
    }
}
