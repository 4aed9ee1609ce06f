//! End-to-end tests for the simulation HTTP API, driven through the router
//! without binding a socket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use bullbear::agent::{Judgment, Reasoned, Reasoner, ScriptedReasoner};
use bullbear::api::{create_router, AppState};
use bullbear::config::AppConfig;
use bullbear::debate::{DebateArgument, Verdict};
use bullbear::domain::DebateSide;
use bullbear::error::Result;
use bullbear::sim::{JobRegistry, SimulationRunner};
use bullbear::trader::{DecisionContext, TradeProposal};
use bullbear::{SyntheticPriceSource, SyntheticSentimentSource};

/// Scripted reasoner that stalls each debate turn, keeping jobs running
/// long enough to observe in-flight behavior.
struct SlowReasoner {
    inner: ScriptedReasoner,
    delay: Duration,
}

#[async_trait]
impl Reasoner for SlowReasoner {
    async fn judge(
        &self,
        side: DebateSide,
        ticker: &str,
        date: NaiveDate,
        market_context: &str,
        prior_arguments: &[String],
    ) -> Result<Reasoned<Judgment>> {
        tokio::time::sleep(self.delay).await;
        self.inner
            .judge(side, ticker, date, market_context, prior_arguments)
            .await
    }

    async fn synthesize(
        &self,
        ticker: &str,
        date: NaiveDate,
        arguments: &[DebateArgument],
    ) -> Result<Reasoned<Verdict>> {
        self.inner.synthesize(ticker, date, arguments).await
    }

    async fn propose(&self, context: &DecisionContext) -> Result<Reasoned<TradeProposal>> {
        self.inner.propose(context).await
    }
}

fn router_with_reasoner(reasoner: Arc<dyn Reasoner>) -> Router {
    let config = AppConfig::default();
    let runner = SimulationRunner::new(
        reasoner,
        Arc::new(SyntheticPriceSource::new()),
        Arc::new(SyntheticSentimentSource::new()),
        Arc::new(RwLock::new(JobRegistry::new())),
        config.clone(),
    );
    create_router(AppState::new(runner, config))
}

fn test_router() -> Router {
    router_with_reasoner(Arc::new(ScriptedReasoner::new()))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}

fn run_request() -> Value {
    json!({
        "ticker": "AAPL",
        "start_date": "2020-07-01",
        "end_date": "2020-07-03",
    })
}

async fn wait_for_completion(router: &Router, job_id: &str) {
    for _ in 0..200 {
        let (status, body) = send(
            router,
            "GET",
            &format!("/api/simulation/status?job_id={job_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        match body["status"].as_str() {
            Some("completed") => return,
            Some("error") => panic!("simulation failed: {}", body["error"]),
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
    panic!("simulation did not complete in time");
}

#[tokio::test]
async fn full_simulation_lifecycle() {
    let router = test_router();

    let (status, body) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "AAPL");
    assert_eq!(body["total_days"], 3);
    let job_id = body["job_id"].as_str().unwrap().to_string();

    wait_for_completion(&router, &job_id).await;

    let (status, results) = send(&router, "GET", "/api/simulation/results", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["total_days"], 3);
    assert_eq!(results["daily"].as_array().unwrap().len(), 3);
    // 2 rounds -> 4 arguments per debate
    assert_eq!(
        results["daily"][0]["debate"]["arguments"]
            .as_array()
            .unwrap()
            .len(),
        4
    );

    let (status, summary) = send(&router, "GET", "/api/simulation/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    let traders = summary["traders"].as_array().unwrap();
    assert_eq!(traders.len(), 3);
    for trader in traders {
        assert_eq!(trader["total_trades"], 3);
    }

    let (status, _) = send(&router, "POST", "/api/simulation/reset", None).await;
    assert_eq!(status, StatusCode::OK);

    // registry is empty again
    let (status, _) = send(&router, "GET", "/api/simulation/status", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // and a new run is accepted
    let (status, _) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn concurrent_run_is_rejected() {
    let router = router_with_reasoner(Arc::new(SlowReasoner {
        inner: ScriptedReasoner::new(),
        delay: Duration::from_millis(200),
    }));

    let (status, _) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reset_is_rejected_while_running() {
    let router = router_with_reasoner(Arc::new(SlowReasoner {
        inner: ScriptedReasoner::new(),
        delay: Duration::from_millis(200),
    }));

    let (status, _) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "POST", "/api/simulation/reset", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn inverted_date_range_is_rejected() {
    let router = test_router();
    let (status, _) = send(
        &router,
        "POST",
        "/api/simulation/run",
        Some(json!({
            "ticker": "AAPL",
            "start_date": "2020-07-10",
            "end_date": "2020-07-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn weekend_only_range_is_rejected() {
    let router = test_router();
    let (status, _) = send(
        &router,
        "POST",
        "/api/simulation/run",
        Some(json!({
            "start_date": "2020-07-04",
            "end_date": "2020-07-05",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn results_while_running_is_a_client_error() {
    let router = router_with_reasoner(Arc::new(SlowReasoner {
        inner: ScriptedReasoner::new(),
        delay: Duration::from_millis(200),
    }));

    let (status, _) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "GET", "/api/simulation/results", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agents_roster_and_lookup() {
    let router = test_router();

    let (status, agents) = send(&router, "GET", "/api/agents", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agents.as_array().unwrap().len(), 3);

    let (status, agent) = send(&router, "GET", "/api/agents/Claude%20Trader", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agent["name"], "Claude Trader");
    // no completed run yet, so no performance block
    assert!(agent.get("performance").is_none());

    let (status, _) = send(&router, "GET", "/api/agents/Nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn agent_performance_appears_after_run() {
    let router = test_router();

    let (_, body) = send(&router, "POST", "/api/simulation/run", Some(run_request())).await;
    let job_id = body["job_id"].as_str().unwrap().to_string();
    wait_for_completion(&router, &job_id).await;

    let (status, agent) = send(&router, "GET", "/api/agents/Claude%20Trader", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agent["performance"]["total_trades"], 3);
}

#[tokio::test]
async fn debate_rounds_override_shapes_the_transcript() {
    let router = test_router();

    let (status, body) = send(
        &router,
        "POST",
        "/api/simulation/run",
        Some(json!({
            "ticker": "AAPL",
            "start_date": "2020-07-01",
            "end_date": "2020-07-01",
            "debate_rounds": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let job_id = body["job_id"].as_str().unwrap().to_string();
    wait_for_completion(&router, &job_id).await;

    let (_, results) = send(&router, "GET", "/api/simulation/results", None).await;
    assert_eq!(
        results["daily"][0]["debate"]["arguments"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn zero_debate_rounds_is_rejected() {
    let router = test_router();
    let (status, _) = send(
        &router,
        "POST",
        "/api/simulation/run",
        Some(json!({
            "start_date": "2020-07-01",
            "end_date": "2020-07-01",
            "debate_rounds": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn one_off_analysis_and_debate_endpoints() {
    let router = test_router();

    let (status, technical) = send(
        &router,
        "GET",
        "/api/agents/technical/AAPL?date=2020-07-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(technical["kind"], "technical");
    assert_eq!(technical["ticker"], "AAPL");

    let (status, sentiment) = send(
        &router,
        "GET",
        "/api/agents/sentiment/AAPL?date=2020-07-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sentiment["kind"], "sentiment");

    let (status, transcript) = send(
        &router,
        "POST",
        "/api/agents/debate",
        Some(json!({"ticker": "AAPL", "date": "2020-07-01", "rounds": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcript["arguments"].as_array().unwrap().len(), 4);
    assert!(transcript["verdict"]["confidence"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn health_reports_job_counts() {
    let router = test_router();
    let (status, health) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["jobs"], 0);
    assert_eq!(health["simulation_running"], false);
}
