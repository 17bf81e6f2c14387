use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use sparc_simulator::client::{ClientError, Delivery, MeasurementSink, StoreClient};
use sparc_simulator::config::Config;
use sparc_simulator::device::default_roster;
use sparc_simulator::measurement::{MeasurementGenerator, MeasurementPayload};
use sparc_simulator::simulator::{Outcome, Simulator};

type Received = Arc<Mutex<Vec<Value>>>;

/// Mimics the metering backend: known tokens get 201, others 401.
async fn store_data(State(received): State<Received>, Json(body): Json<Value>) -> Response {
    received.lock().unwrap().push(body.clone());

    match body["apiToken"].as_str() {
        Some("TOKEN-AGUA-123") | Some("TOKEN-ENERGIA-123") => {
            (StatusCode::CREATED, Json(json!({ "message": "data stored." }))).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid api token." })),
        )
            .into_response(),
    }
}

async fn broken() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "server error")
}

async fn spawn_backend() -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/store-data", post(store_data))
        .route("/broken/api/store-data", post(broken))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn client_for(api_url: &str) -> StoreClient {
    let config = Config::default().with_api_url(api_url);
    StoreClient::with_settings(config.store_url, Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn test_created_response_is_accepted() {
    let (base, received) = spawn_backend().await;
    let client = client_for(&base);

    let payload = MeasurementPayload::for_device(&default_roster()[0], 12.37);
    let delivery = client.deliver(&payload).await.unwrap();

    assert!(delivery.is_accepted());
    assert_eq!(delivery.status().as_u16(), 201);
    match delivery {
        Delivery::Accepted { message, .. } => {
            assert_eq!(message.as_deref(), Some("data stored."))
        }
        other => panic!("expected acceptance, got {:?}", other),
    }

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        json!({
            "macAddress": "AA:BB:CC:DD:EE:FF",
            "apiToken": "TOKEN-AGUA-123",
            "measure": [{ "type": 1, "value": 12.37 }]
        })
    );
}

#[tokio::test]
async fn test_server_error_body_is_kept() {
    let (base, _) = spawn_backend().await;
    let client = client_for(&format!("{}/broken", base));

    let payload = MeasurementPayload::for_device(&default_roster()[1], 3.5);
    let delivery = client.deliver(&payload).await.unwrap();

    assert_eq!(delivery.status().as_u16(), 500);
    match delivery {
        Delivery::Rejected { body, .. } => assert_eq!(body, "server error"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    let payload = MeasurementPayload::for_device(&default_roster()[0], 1.0);

    let err = client.deliver(&payload).await.unwrap_err();
    assert!(matches!(err, ClientError::Request(_)));
    assert!(err.to_string().starts_with("HTTP request failed"));
}

#[tokio::test]
async fn test_cycle_against_backend() {
    let (base, received) = spawn_backend().await;

    let mut roster = default_roster();
    roster[0].api_token = "TOKEN-REVOKED".to_string();

    let mut simulator = Simulator::new(
        roster,
        client_for(&base),
        MeasurementGenerator::seeded(11),
        Duration::from_secs(5),
    );

    let reports = simulator.run_cycle().await;

    assert_eq!(reports.len(), 2);
    match &reports[0].outcome {
        Outcome::Rejected { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("invalid api token."));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(reports[1].outcome, Outcome::Delivered { status: 201 });

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1]["macAddress"], "11:22:33:44:55:66");
    assert_eq!(received[1]["measure"][0]["type"], 2);
    assert_eq!(
        received[1]["measure"][0]["value"].as_f64(),
        Some(reports[1].value)
    );
}

#[tokio::test]
async fn test_unreachable_backend_keeps_cycling() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut simulator = Simulator::new(
        default_roster(),
        client_for(&format!("http://{}", addr)),
        MeasurementGenerator::seeded(3),
        Duration::from_secs(5),
    );

    let reports = simulator.run_cycle().await;

    assert_eq!(reports.len(), 2);
    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, Outcome::Failed { .. })));
    assert_eq!(simulator.stats().failed, 2);
    assert_eq!(simulator.stats().cycles, 1);
}
