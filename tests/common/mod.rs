//! Shared utilities for integration testing.

// Each test binary uses a different slice of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use payrail::config::{ClientConfig, ProviderConfig};
use payrail::transport::{Transport, TransportRequest, TransportResponse, TransportError};

/// One scripted reply. `TransportError` is not `Clone`, so failures are
/// represented structurally and rebuilt per call.
#[derive(Debug, Clone)]
pub enum Reply {
    Response(TransportResponse),
    Timeout,
    ConnectRefused,
}

/// Scripted transport: routes each request to the first rule whose URL
/// fragment matches, replaying its reply sequence. The last reply in a
/// sequence repeats once the queue is exhausted.
pub struct MockTransport {
    rules: Mutex<Vec<Rule>>,
    log: Mutex<Vec<TransportRequest>>,
}

struct Rule {
    url_part: String,
    replies: Vec<Reply>,
    served: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Script replies for every request whose URL contains `url_part`.
    pub fn script(&self, url_part: &str, replies: Vec<Reply>) {
        assert!(!replies.is_empty(), "a rule needs at least one reply");
        self.rules.lock().unwrap().push(Rule {
            url_part: url_part.to_string(),
            replies,
            served: 0,
        });
    }

    /// Number of requests sent to URLs containing `url_part`.
    pub fn calls(&self, url_part: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(url_part))
            .count()
    }

    /// All requests matching `url_part`, for header/body assertions.
    pub fn requests(&self, url_part: &str) -> Vec<TransportRequest> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(url_part))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());

        let reply = {
            let mut rules = self.rules.lock().unwrap();
            let rule = rules
                .iter_mut()
                .find(|r| request.url.contains(&r.url_part))
                .unwrap_or_else(|| panic!("unscripted request: {}", request.url));
            let index = rule.served.min(rule.replies.len() - 1);
            rule.served += 1;
            rule.replies[index].clone()
        };

        match reply {
            Reply::Response(response) => Ok(response),
            Reply::Timeout => Err(TransportError::Timeout),
            Reply::ConnectRefused => Err(TransportError::Connect("connection refused".into())),
        }
    }
}

/// 200 response with the given body.
pub fn ok(body: &str) -> Reply {
    with_status(200, body)
}

pub fn with_status(status: u16, body: &str) -> Reply {
    Reply::Response(TransportResponse {
        status,
        headers: HashMap::new(),
        body: body.as_bytes().to_vec(),
    })
}

/// Bearer grant body in the PIN gateway's shape.
pub fn auth_ok(token: &str) -> Reply {
    ok(&format!(
        r#"{{"access_token":"{token}","expires_in":"3600","refresh_token":"r-1"}}"#
    ))
}

/// Grant that expires immediately, forcing the next use to re-issue.
pub fn auth_expiring(token: &str) -> Reply {
    ok(&format!(
        r#"{{"access_token":"{token}","expires_in":"0"}}"#
    ))
}

pub fn pinpay_config() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://pin.example.test".into(),
        credentials: HashMap::from([
            ("username".to_string(), "merchant".to_string()),
            ("password".to_string(), "secret".to_string()),
            ("client_id".to_string(), "client-1".to_string()),
        ]),
        ..Default::default()
    }
}

pub fn webpay_config() -> ProviderConfig {
    ProviderConfig {
        base_url: "https://web.example.test".into(),
        credentials: HashMap::from([("merchant_id".to_string(), "m-1".to_string())]),
        ..Default::default()
    }
}

/// Both providers enabled, pinpay default, millisecond-scale retry delays.
pub fn client_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.default_provider = "pinpay".into();
    config.providers.insert("pinpay".into(), pinpay_config());
    config.providers.insert("webpay".into(), webpay_config());
    config.retry.max_attempts = 3;
    config.retry.initial_delay_ms = 10;
    config.retry.max_delay_ms = 50;
    config.retry.enable_jitter = false;
    config
}
