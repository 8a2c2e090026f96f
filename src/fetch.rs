//! Background fetch worker.
//!
//! The TUI loop never blocks on the network. It queues [`FetchRequest`]s
//! over a channel; the worker spawns one task per request and sends the
//! completion back as a [`FetchEvent`] carrying the raw response body.
//! Nothing is cancelled: a newly queued request may race an earlier one's
//! completion for the same pane, and the last event to arrive wins.

use tokio::sync::mpsc;
use tracing::warn;

use crate::client::{ClientError, GatewayClient};

/// A queued fetch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// POST `ajax/getsms` with the `all` switch and the date filter.
    Sms { all: bool, date: String },
    /// POST the filter form's `date` and `mobile` values to `ajax/getsms`.
    SmsForm { date: String, mobile: String },
    /// GET `ajax/getrouting`.
    Routing,
    /// POST `ajax/status`.
    Status,
}

/// A completed fetch, delivered back to the orchestrator.
#[derive(Debug)]
pub enum FetchEvent {
    Sms {
        body: Result<String, ClientError>,
        /// Whether this completion came from the filter-form path, which
        /// presents without fixed column widths.
        from_form: bool,
    },
    Routing(Result<String, ClientError>),
    Status(Result<String, ClientError>),
}

/// Run the fetch worker until the request channel closes.
///
/// Each request runs in its own task so a slow call never delays the next
/// one; completion order is arrival order, not request order.
pub async fn run_worker(
    client: GatewayClient,
    mut requests: mpsc::UnboundedReceiver<FetchRequest>,
    events: mpsc::UnboundedSender<FetchEvent>,
) {
    while let Some(request) = requests.recv().await {
        let client = client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let event = perform(&client, request).await;
            if events.send(event).is_err() {
                warn!("fetch completion dropped: event channel closed");
            }
        });
    }
}

async fn perform(client: &GatewayClient, request: FetchRequest) -> FetchEvent {
    match request {
        FetchRequest::Sms { all, date } => FetchEvent::Sms {
            body: client.get_sms(all, &date).await,
            from_form: false,
        },
        FetchRequest::SmsForm { date, mobile } => FetchEvent::Sms {
            body: client.post_sms_form(&date, &mobile).await,
            from_form: true,
        },
        FetchRequest::Routing => FetchEvent::Routing(client.get_routing().await),
        FetchRequest::Status => FetchEvent::Status(client.get_status().await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn start_worker(
        server: &MockServer,
    ) -> (
        mpsc::UnboundedSender<FetchRequest>,
        mpsc::UnboundedReceiver<FetchEvent>,
    ) {
        let client = GatewayClient::builder()
            .endpoint(format!("{}/smsgateway", server.uri()))
            .build()
            .unwrap();
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (evt_tx, evt_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(client, req_rx, evt_tx));
        (req_tx, evt_rx)
    }

    #[tokio::test]
    async fn routing_request_completes_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/smsgateway/ajax/getrouting"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<table></table>"))
            .mount(&server)
            .await;

        let (req_tx, mut evt_rx) = start_worker(&server).await;
        req_tx.send(FetchRequest::Routing).unwrap();

        match evt_rx.recv().await.unwrap() {
            FetchEvent::Routing(Ok(body)) => assert_eq!(body, "<table></table>"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn form_submission_is_flagged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/smsgateway/ajax/getsms"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let (req_tx, mut evt_rx) = start_worker(&server).await;
        req_tx
            .send(FetchRequest::SmsForm {
                date: "2024-03-07%".to_string(),
                mobile: String::new(),
            })
            .unwrap();

        match evt_rx.recv().await.unwrap() {
            FetchEvent::Sms { body: Ok(_), from_form } => assert!(from_form),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_delivered_as_error_event() {
        // Point at a server that is not listening.
        let client = GatewayClient::builder()
            .endpoint("http://127.0.0.1:1/smsgateway")
            .timeout(std::time::Duration::from_millis(500))
            .build()
            .unwrap();
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (evt_tx, mut evt_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(client, req_rx, evt_tx));

        req_tx.send(FetchRequest::Status).unwrap();
        match evt_rx.recv().await.unwrap() {
            FetchEvent::Status(Err(_)) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
