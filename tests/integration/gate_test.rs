use plus_billing::{
    error::BillingError,
    models::{
        eligibility::EligibilityResponse,
        purchase::{GateState, RatingEligibility},
        receipt::{AuthToken, Receipt},
    },
    services::{
        EligibilityClient, EligibilityGate, ReceiptEligibility, StaticTokenProvider,
        TransportResponse,
    },
};
use std::sync::{atomic::Ordering, Arc};

use crate::support::{FailingTokens, FixedReceipt, HeldCheck, RecordingTransport};

fn ok_response(eligible: bool) -> Result<TransportResponse, BillingError> {
    Ok(TransportResponse {
        status: 200,
        body: EligibilityResponse { eligible }.encode(),
    })
}

fn receipt_gate(receipt: Option<Receipt>, transport: Arc<RecordingTransport>) -> EligibilityGate {
    let client = EligibilityClient::new(
        transport,
        Arc::new(StaticTokenProvider::new(Some(AuthToken::new("token")))),
    );
    EligibilityGate::new(Arc::new(ReceiptEligibility::new(
        Arc::new(FixedReceipt(receipt)),
        Arc::new(client),
    )))
}

async fn resolve(gate: &EligibilityGate) -> RatingEligibility {
    gate.start().expect("first start runs").await.unwrap();
    gate.state()
}

#[tokio::test]
async fn eligible_receipt_allows() {
    let transport = RecordingTransport::replying(ok_response(true));
    let gate = receipt_gate(Some(Receipt::new(b"receipt".to_vec())), transport.clone());

    assert_eq!(gate.state(), GateState::Checking);
    assert_eq!(resolve(&gate).await, GateState::Allowed);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn ineligible_receipt_disallows() {
    let transport = RecordingTransport::replying(ok_response(false));
    let gate = receipt_gate(Some(Receipt::new(b"receipt".to_vec())), transport);

    assert_eq!(resolve(&gate).await, GateState::Disallowed);
}

#[tokio::test]
async fn missing_receipt_disallows_without_network() {
    let transport = RecordingTransport::replying(ok_response(true));
    let gate = receipt_gate(None, transport.clone());

    assert_eq!(resolve(&gate).await, GateState::Disallowed);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn token_failure_disallows_without_network() {
    let transport = RecordingTransport::replying(ok_response(true));
    let client = EligibilityClient::new(transport.clone(), Arc::new(FailingTokens));

    let result = client
        .check_eligibility(&Receipt::new(b"receipt".to_vec()))
        .await;
    assert!(matches!(result, Err(BillingError::Auth(_))));

    let gate = EligibilityGate::new(Arc::new(ReceiptEligibility::new(
        Arc::new(FixedReceipt(Some(Receipt::new(b"receipt".to_vec())))),
        Arc::new(client),
    )));
    assert_eq!(resolve(&gate).await, GateState::Disallowed);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn every_error_kind_disallows() {
    let failures = [
        Err(BillingError::Network("timeout".to_string())),
        Ok(TransportResponse {
            status: 401,
            body: Vec::new(),
        }),
        Ok(TransportResponse {
            status: 500,
            body: Vec::new(),
        }),
        Ok(TransportResponse {
            status: 200,
            body: vec![0x0a, 0x05, 0x01],
        }),
    ];

    for failure in failures {
        let transport = RecordingTransport::replying(failure);
        let gate = receipt_gate(Some(Receipt::new(b"receipt".to_vec())), transport);
        assert_eq!(resolve(&gate).await, GateState::Disallowed);
    }
}

#[tokio::test]
async fn only_first_start_runs() {
    let check = HeldCheck::new(Ok(true));
    let gate = EligibilityGate::new(check.clone());

    let pending = gate.start().expect("first start runs");
    assert!(gate.start().is_none());

    check.release.notify_one();
    pending.await.unwrap();

    assert!(gate.start().is_none(), "resolved gate stays frozen");
    assert_eq!(gate.state(), GateState::Allowed);
    assert_eq!(check.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropped_gate_ignores_late_result() {
    let check = HeldCheck::new(Ok(true));
    let gate = EligibilityGate::new(check.clone());
    let mut updates = gate.observe();

    let pending = gate.start().unwrap();
    drop(gate);

    check.release.notify_one();
    pending.await.expect("late result must not panic");

    assert!(updates.changed().await.is_err());
    assert_eq!(*updates.borrow(), GateState::Checking);
}
