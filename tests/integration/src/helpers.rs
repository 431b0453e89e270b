//! Test helpers for integration tests
//!
//! A [`TestCluster`] holds one set of in-memory repositories, collaborators
//! and one in-process bus. API servers and gateway hubs started from the
//! same cluster share all of it, the way separate processes would share
//! PostgreSQL and Redis.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use chat_api::AppState;
use chat_cache::{CachingBus, LocalBus, MemoryRecentMessages, MessageBus};
use chat_common::{AppConfig, HubConfig, StaticTokenVerifier};
use chat_core::{Snowflake, SnowflakeGenerator};
use chat_db::{MemoryChannelRepository, MemoryInviteRepository};
use chat_gateway::broadcast::{BusBridge, Fanout};
use chat_gateway::connection::ConnectionManager;
use chat_gateway::GatewayState;
use chat_service::{
    MemoryIdentityService, MemoryIntegrationLookup, RecordingEventPublisher, ServiceContext,
};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::{TestUser, GHOST, INTEGRATION, USERS};

/// How long a client waits for a frame before giving up
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared backing state for every server in a test
pub struct TestCluster {
    pub channels: Arc<MemoryChannelRepository>,
    pub invites: Arc<MemoryInviteRepository>,
    pub identity: Arc<MemoryIdentityService>,
    pub integrations: Arc<MemoryIntegrationLookup>,
    pub events: Arc<RecordingEventPublisher>,
    pub verifier: Arc<StaticTokenVerifier>,
    pub bus: LocalBus,
    /// Recent-message cache written by every server's bus
    pub recent: Arc<MemoryRecentMessages>,
    ids: Arc<SnowflakeGenerator>,
}

impl TestCluster {
    /// Cluster with the fixture users and integration registered
    pub fn new() -> Self {
        let identity = MemoryIdentityService::new();
        let verifier = StaticTokenVerifier::new();
        for user in USERS {
            identity.insert(user.profile());
            verifier.insert(user.token, user.id, user.email());
        }
        verifier.insert(GHOST.token, GHOST.id, GHOST.email());

        let channels = Arc::new(MemoryChannelRepository::new());
        Self {
            invites: channels.invites(),
            channels,
            identity: Arc::new(identity),
            integrations: Arc::new(
                MemoryIntegrationLookup::new().with_integration(INTEGRATION, "ci-bot"),
            ),
            events: Arc::new(RecordingEventPublisher::new()),
            verifier: Arc::new(verifier),
            bus: LocalBus::default(),
            recent: Arc::new(MemoryRecentMessages::default()),
            ids: Arc::new(SnowflakeGenerator::new(1)),
        }
    }

    /// A fresh service context over the shared repositories
    pub fn service_context(&self) -> Result<ServiceContext> {
        let ctx = ServiceContext::builder()
            .channel_repo(self.channels.clone())
            .invite_repo(self.invites.clone())
            .identity(self.identity.clone())
            .integrations(self.integrations.clone())
            .event_publisher(self.events.clone())
            .snowflake_generator(self.ids.clone())
            .build()?;
        Ok(ctx)
    }

    fn shared_bus(&self) -> Arc<dyn MessageBus> {
        Arc::new(CachingBus::new(Arc::new(self.bus.clone()), self.recent.clone()))
    }

    /// Start an API server publishing to the shared bus
    pub async fn start_api(&self) -> Result<TestApi> {
        let state = AppState::new(self.service_context()?, self.verifier.clone())
            .with_bus(self.shared_bus())
            .with_recent_messages(self.recent.clone());
        let app = chat_api::create_app(state, &test_config()?);

        let (addr, handle) = serve(app).await?;
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(TestApi {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Start a gateway hub bridged to the shared bus
    pub async fn start_gateway(&self) -> Result<TestGateway> {
        let fanout = Arc::new(Fanout::new(
            ConnectionManager::new_shared(),
            Some(self.shared_bus()),
        ));
        let bridge = BusBridge::new(fanout.clone());
        bridge
            .clone()
            .start()
            .ok_or_else(|| anyhow!("bus bridge did not start"))?;

        let state = GatewayState::new(
            self.service_context()?,
            fanout,
            self.verifier.clone(),
            HubConfig::default(),
        );
        let (addr, handle) = serve(chat_gateway::create_app(state.clone())).await?;

        Ok(TestGateway {
            addr,
            state,
            bridge,
            _handle: handle,
        })
    }
}

impl Default for TestCluster {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for in-process servers: required values only, a rate
/// limit no test will hit
pub fn test_config() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => "postgres://unused/unused",
            "JWT_SECRET" => "integration-test-secret",
            "RATE_LIMIT_REQUESTS_PER_SECOND" => "10000",
            "RATE_LIMIT_BURST" => "10000",
            _ => return None,
        };
        Some(value.to_string())
    })?;
    Ok(config)
}

async fn serve(app: axum::Router) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok((addr, handle))
}

/// API server bound to an ephemeral port
pub struct TestApi {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestApi {
    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Send a request, with a bearer token and JSON body when given
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> Result<Response> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url(), path));
        if let Some(user) = user {
            request = request.bearer_auth(user.token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }

    pub async fn get(&self, path: &str, user: &TestUser) -> Result<(StatusCode, Value)> {
        read(self.request(Method::GET, path, Some(user), None).await?).await
    }

    pub async fn post(&self, path: &str, user: &TestUser, body: Value) -> Result<(StatusCode, Value)> {
        read(self.request(Method::POST, path, Some(user), Some(body)).await?).await
    }

    pub async fn put(&self, path: &str, user: &TestUser) -> Result<(StatusCode, Value)> {
        read(self.request(Method::PUT, path, Some(user), None).await?).await
    }

    pub async fn patch(&self, path: &str, user: &TestUser, body: Value) -> Result<(StatusCode, Value)> {
        read(self.request(Method::PATCH, path, Some(user), Some(body)).await?).await
    }

    pub async fn delete(&self, path: &str, user: &TestUser) -> Result<(StatusCode, Value)> {
        read(self.request(Method::DELETE, path, Some(user), None).await?).await
    }

    /// Create a channel and return its id
    pub async fn create_channel(&self, owner: &TestUser, name: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/v1/channels", owner, json!({ "name": name }))
            .await?;
        if status != StatusCode::CREATED {
            bail!("create channel returned {status}: {body}");
        }
        id_of(&body)
    }

    /// Join `user` to the channel, failing on any non-200 answer
    pub async fn join(&self, channel_id: &str, user: &TestUser) -> Result<()> {
        let (status, body) = self
            .post(&format!("/api/v1/channels/{channel_id}/members"), user, json!({}))
            .await?;
        if status != StatusCode::OK {
            bail!("join returned {status}: {body}");
        }
        Ok(())
    }

    /// Post a message and return its id
    pub async fn send_message(&self, channel_id: &str, user: &TestUser, content: &str) -> Result<String> {
        let (status, body) = self
            .post(
                &format!("/api/v1/channels/{channel_id}/messages"),
                user,
                json!({ "content": content }),
            )
            .await?;
        if status != StatusCode::CREATED {
            bail!("post message returned {status}: {body}");
        }
        id_of(&body)
    }
}

/// Read status and JSON body; empty bodies read as `null`
pub async fn read(response: Response) -> Result<(StatusCode, Value)> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

/// The `id` field of a response body, as the string form snowflakes use
pub fn id_of(body: &Value) -> Result<String> {
    body["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no id in {body}"))
}

/// Parse a snowflake from its JSON string form
pub fn snowflake(id: &str) -> Result<Snowflake> {
    Ok(Snowflake::parse(id)?)
}

/// Gateway hub bound to an ephemeral port
pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: GatewayState,
    pub bridge: Arc<BusBridge>,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    /// Connect `user` and consume the `connected` frame
    pub async fn connect(&self, user: &TestUser) -> Result<WsClient> {
        let mut client = WsClient::connect(&self.ws_url(user.token)).await?;
        let hello = client.next_frame().await?;
        if hello["type"] != "connected" {
            bail!("expected connected frame, got {hello}");
        }
        Ok(client)
    }

    pub fn connection_count(&self) -> usize {
        self.state.connection_manager().connection_count()
    }
}

/// WebSocket client speaking `{type, payload}` frames
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    pub async fn send(&mut self, frame_type: &str, payload: Value) -> Result<()> {
        let frame = json!({ "type": frame_type, "payload": payload });
        self.send_raw(frame.to_string()).await
    }

    pub async fn send_raw(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Next text frame, skipping control frames
    pub async fn next_frame(&mut self) -> Result<Value> {
        self.next_frame_within(FRAME_TIMEOUT)
            .await?
            .ok_or_else(|| anyhow!("no frame within {FRAME_TIMEOUT:?}"))
    }

    /// Next frame of type `frame_type`, discarding typing indicators on the way
    pub async fn expect(&mut self, frame_type: &str) -> Result<Value> {
        loop {
            let frame = self.next_frame().await?;
            if frame["type"] == frame_type {
                return Ok(frame);
            }
            if !is_typing(&frame) {
                bail!("expected {frame_type}, got {frame}");
            }
        }
    }

    /// Fail if any text frame arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        match self.next_frame_within(window).await? {
            None => Ok(()),
            Some(frame) => bail!("unexpected frame {frame}"),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn next_frame_within(&mut self, window: Duration) -> Result<Option<Value>> {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            let next = match tokio::time::timeout_at(deadline, self.stream.next()).await {
                Ok(next) => next,
                Err(_) => return Ok(None),
            };
            match next {
                Some(Ok(Message::Text(text))) => return Ok(Some(serde_json::from_str(&text)?)),
                Some(Ok(Message::Close(_))) | None => bail!("connection closed"),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
}

fn is_typing(frame: &Value) -> bool {
    matches!(frame["type"].as_str(), Some("typing_start" | "typing_stop"))
}

/// Poll `check` until it holds or a second passes
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
