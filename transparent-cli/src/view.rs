//! Acting on dispatcher events: the CLI is the view layer.

use std::time::Duration;

use transparent_net::{Config, DispatchEvent, RequestDispatcher};
use transparent_types::ActionRequest;

/// Extra time past the transport timeout before the CLI stops waiting.
const SETTLE_MARGIN: Duration = Duration::from_secs(5);

/// How long to wait for outstanding requests.
pub fn settle_timeout(config: &Config) -> Duration {
    config.timeout() + SETTLE_MARGIN
}

/// Send `action`, wait for it, and react to the outcome. Returns the exit code.
pub fn run(dispatcher: &mut RequestDispatcher, action: ActionRequest, settle: Duration) -> i32 {
    let kind = action.kind();
    dispatcher.dispatch(action);

    if !dispatcher.wait_idle(settle) {
        eprintln!("{} still waiting for a response, giving up", kind);
        return 1;
    }

    let mut failed = false;
    for event in dispatcher.poll_events() {
        match event {
            DispatchEvent::ReloadRequested { action, bid } => {
                println!("{} {}: ok", action, bid);
                match dispatcher.reload() {
                    Ok(res) => println!("reloaded {} ({})", dispatcher.page(), res.status),
                    Err(e) => {
                        log::warn!("Reload failed: {}", e);
                        eprintln!("reload failed: {}", e);
                    }
                }
            }
            DispatchEvent::Failed { action, bid, reason } => {
                eprintln!("{} {}: {}", action, bid, reason);
                failed = true;
            }
        }
    }

    if !kind.reloads_on_success() {
        println!("{} sent", kind);
    }
    i32::from(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use transparent_net::{DispatchError, OutgoingRequest, Response, Transport};

    struct StubTransport {
        status: u16,
        sent: Mutex<Vec<OutgoingRequest>>,
    }

    impl Transport for StubTransport {
        fn send(&self, request: &OutgoingRequest) -> Result<Response, DispatchError> {
            self.sent.lock().unwrap().push(request.clone());
            Ok(Response { status: self.status })
        }
    }

    fn setup(status: u16) -> (RequestDispatcher, Arc<StubTransport>) {
        let transport = Arc::new(StubTransport {
            status,
            sent: Mutex::new(Vec::new()),
        });
        let config = Config::parse("[site]\npage_url = \"http://transparent.example/p/\"").unwrap();
        let dispatcher =
            RequestDispatcher::from_config_with_transport(&config, "csrftoken=t", transport.clone())
                .unwrap();
        (dispatcher, transport)
    }

    fn methods(transport: &StubTransport) -> Vec<String> {
        let sent = transport.sent.lock().unwrap();
        sent.iter().map(|r| r.method.clone()).collect()
    }

    #[test]
    fn test_upvote_success_reloads_once() {
        let (mut dispatcher, transport) = setup(200);
        let code = run(&mut dispatcher, ActionRequest::upvote("7"), Duration::from_secs(2));
        assert_eq!(code, 0);
        assert_eq!(methods(&transport), vec!["POST", "GET"]);
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[1].url.as_str(), "http://transparent.example/p/");
    }

    #[test]
    fn test_rejected_vote_fails_without_reload() {
        let (mut dispatcher, transport) = setup(403);
        let code = run(&mut dispatcher, ActionRequest::downvote("7"), Duration::from_secs(2));
        assert_eq!(code, 1);
        assert_eq!(methods(&transport), vec!["POST"]);
    }

    #[test]
    fn test_toggle_succeeds_whatever_the_status() {
        for status in [200, 403, 500] {
            let (mut dispatcher, transport) = setup(status);
            let action = ActionRequest::toggle("42", true);
            assert_eq!(run(&mut dispatcher, action, Duration::from_secs(2)), 0);
            assert_eq!(methods(&transport), vec!["POST"]);
        }
    }

    #[test]
    fn test_settle_timeout_follows_config() {
        let config = Config::parse("[http]\ntimeout_secs = 300").unwrap();
        assert_eq!(settle_timeout(&config), Duration::from_secs(305));
        let config = Config::parse("").unwrap();
        assert_eq!(settle_timeout(&config), Duration::from_secs(35));
    }
}
