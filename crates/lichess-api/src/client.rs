//! HTTP client for the lichess bot API

use reqwest::header::USER_AGENT;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{ApiError, Result};
use crate::pool::OpponentPool;
use crate::stream::NdjsonStream;

/// Product name reported in the User-Agent header
const USER_AGENT_PRODUCT: &str = "lichess-bot";

/// Username reported before the first successful profile fetch
const USERNAME_PLACEHOLDER: &str = "?";

/// Clock limit requested for outgoing challenges, in seconds
const CHALLENGE_CLOCK_LIMIT_SECS: u32 = 60;

/// Clock increment requested for outgoing challenges, in seconds
const CHALLENGE_CLOCK_INCREMENT_SECS: u32 = 0;

/// Reason sent when declining or cancelling without an explicit one
const DEFAULT_CHALLENGE_REASON: &str = "generic";

/// Request body for a POST operation.
enum Payload<'a> {
    Empty,
    Form(&'a [(&'a str, &'a str)]),
    Json(Value),
}

/// Client for the lichess bot API.
///
/// Holds a persistent connection pool, the bearer token, and the challenger
/// pool loaded at construction. Every non-streaming call runs under the
/// configured [`RetryPolicy`](crate::RetryPolicy); the two streaming calls
/// bypass it and surface failures immediately so external reconnect logic
/// can take over.
///
/// A client instance is meant to be driven from a single logical task.
/// [`get_profile`](Self::get_profile) mutates the identity header, which is
/// why it takes `&mut self`.
pub struct BotClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
    user_agent: String,
    pool: OpponentPool,
}

impl BotClient {
    /// Create a new client from the given configuration.
    ///
    /// Reads the challenger list eagerly; a missing or unreadable file fails
    /// construction with [`ApiError::Config`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        ensure_crypto_provider();

        let base_url = Url::parse(&config.base_url)?;
        let pool = OpponentPool::load(&config.challengers_path)?;

        let client = Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .build()?;

        let user_agent = format_user_agent(&config.version, USERNAME_PLACEHOLDER);

        debug!(base_url = %base_url, challengers = pool.len(), "client initialized");

        Ok(Self {
            client,
            base_url,
            config,
            user_agent,
            pool,
        })
    }

    /// Current User-Agent header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Challenger pool loaded at construction.
    pub fn pool(&self) -> &OpponentPool {
        &self.pool
    }

    /// Update the username reported in the User-Agent header.
    pub fn set_username(&mut self, username: &str) {
        self.user_agent = format_user_agent(&self.config.version, username);
    }

    /// Fetch the bot's own profile.
    ///
    /// On success the username from the payload is folded into the identity
    /// header for all subsequent requests.
    pub async fn get_profile(&mut self) -> Result<Value> {
        let profile = self.api_get(&Endpoint::Profile.path(), true).await?;
        if let Some(username) = profile.get("username").and_then(Value::as_str) {
            self.set_username(username);
        }
        Ok(profile)
    }

    /// Games the account is currently playing, from the `nowPlaying` field.
    pub async fn get_ongoing_games(&self) -> Result<Vec<Value>> {
        let mut playing = self.api_get(&Endpoint::Playing.path(), true).await?;
        match playing.get_mut("nowPlaying").map(Value::take) {
            Some(Value::Array(games)) => Ok(games),
            _ => Ok(Vec::new()),
        }
    }

    /// Fetch the detail payload for one game.
    pub async fn get_game(&self, game_id: &str) -> Result<Value> {
        self.api_get(&Endpoint::Game { game_id }.path(), true).await
    }

    /// Play a move, optionally offering a draw alongside it.
    ///
    /// The draw flag travels as the `offeringDraw` query parameter, encoded
    /// as the literal strings `true` / `false`.
    pub async fn make_move(&self, game_id: &str, mv: &str, draw_offered: bool) -> Result<Value> {
        let query = [("offeringDraw", draw_offered.to_string())];
        self.api_post(
            &Endpoint::Move { game_id, mv }.path(),
            &query,
            Payload::Empty,
        )
        .await
    }

    /// Send a chat message to the given room (`player` or `spectator`).
    pub async fn chat(&self, game_id: &str, room: &str, text: &str) -> Result<Value> {
        let form = [("room", room), ("text", text)];
        self.api_post(
            &Endpoint::Chat { game_id }.path(),
            &[],
            Payload::Form(&form),
        )
        .await
    }

    /// Abort a game that has not really started yet.
    pub async fn abort(&self, game_id: &str) -> Result<Value> {
        self.api_post(&Endpoint::Abort { game_id }.path(), &[], Payload::Empty)
            .await
    }

    /// Resign the game. The response payload is discarded.
    pub async fn resign(&self, game_id: &str) -> Result<()> {
        self.api_post(&Endpoint::Resign { game_id }.path(), &[], Payload::Empty)
            .await?;
        Ok(())
    }

    /// Accept an incoming challenge.
    pub async fn accept_challenge(&self, challenge_id: &str) -> Result<Value> {
        self.api_post(
            &Endpoint::AcceptChallenge { challenge_id }.path(),
            &[],
            Payload::Empty,
        )
        .await
    }

    /// Decline an incoming challenge, with `reason` defaulting to `generic`.
    pub async fn decline_challenge(
        &self,
        challenge_id: &str,
        reason: Option<&str>,
    ) -> Result<Value> {
        let form = [("reason", reason.unwrap_or(DEFAULT_CHALLENGE_REASON))];
        self.api_post(
            &Endpoint::DeclineChallenge { challenge_id }.path(),
            &[],
            Payload::Form(&form),
        )
        .await
    }

    /// Issue a rated challenge with a fixed 60+0 clock.
    ///
    /// The opponent is drawn uniformly at random from the challenger pool;
    /// `challenge_id` does not pick the target and is only carried through
    /// to the request log. Longstanding quirk, kept as-is so challenge
    /// rotation behaves the same as it always has.
    pub async fn create_challenge(&self, challenge_id: &str) -> Result<Value> {
        let opponent = self.pool.choose()?;
        debug!(requested = challenge_id, opponent, "issuing challenge");

        let body = json!({
            "rated": true,
            "clock.limit": CHALLENGE_CLOCK_LIMIT_SECS,
            "clock.increment": CHALLENGE_CLOCK_INCREMENT_SECS,
        });
        self.api_post(
            &Endpoint::CreateChallenge { opponent }.path(),
            &[],
            Payload::Json(body),
        )
        .await
    }

    /// Cancel an outgoing challenge, with `reason` defaulting to `generic`.
    pub async fn cancel_challenge(
        &self,
        challenge_id: &str,
        reason: Option<&str>,
    ) -> Result<Value> {
        let form = [("reason", reason.unwrap_or(DEFAULT_CHALLENGE_REASON))];
        self.api_post(
            &Endpoint::CancelChallenge { challenge_id }.path(),
            &[],
            Payload::Form(&form),
        )
        .await
    }

    /// Upgrade the account to a bot account. Irreversible on the server side.
    pub async fn upgrade_to_bot_account(&self) -> Result<Value> {
        self.api_post(&Endpoint::Upgrade.path(), &[], Payload::Empty)
            .await
    }

    /// Open the account-wide event stream.
    ///
    /// Streaming calls bypass the retry policy and the per-request timeout;
    /// a failure to connect surfaces immediately and reads may block for as
    /// long as the server keeps the connection open.
    pub async fn get_event_stream(&self) -> Result<NdjsonStream> {
        self.open_stream(&Endpoint::EventStream.path()).await
    }

    /// Open the per-game state stream.
    pub async fn get_game_stream(&self, game_id: &str) -> Result<NdjsonStream> {
        self.open_stream(&Endpoint::GameStream { game_id }.path())
            .await
    }

    /// GET under the retry policy, decoding the body as JSON.
    ///
    /// With `raise_for_status` disabled a non-2xx response is not an error
    /// and its body is still decoded.
    pub(crate) async fn api_get(&self, path: &str, raise_for_status: bool) -> Result<Value> {
        self.config
            .retry_policy
            .execute(|| async move {
                trace!(path, "GET");
                let response = self
                    .request(Method::GET, path)?
                    .timeout(self.config.request_timeout)
                    .send()
                    .await?;

                let status = response.status();
                if raise_for_status && !status.is_success() {
                    return Err(ApiError::from_status(status));
                }

                let text = response.text().await?;
                Ok(serde_json::from_str(&text)?)
            })
            .await
    }

    /// POST under the retry policy. Always raises on non-2xx.
    async fn api_post(
        &self,
        path: &str,
        query: &[(&str, String)],
        payload: Payload<'_>,
    ) -> Result<Value> {
        let payload = &payload;
        self.config
            .retry_policy
            .execute(|| async move {
                trace!(path, "POST");
                let mut request = self
                    .request(Method::POST, path)?
                    .timeout(self.config.request_timeout);
                if !query.is_empty() {
                    request = request.query(query);
                }
                request = match payload {
                    Payload::Empty => request,
                    Payload::Form(fields) => request.form(fields),
                    Payload::Json(body) => request.json(body),
                };

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ApiError::from_status(status));
                }

                let text = response.text().await?;
                Ok(serde_json::from_str(&text)?)
            })
            .await
    }

    /// Open a long-lived streaming GET without retry or request timeout.
    async fn open_stream(&self, path: &str) -> Result<NdjsonStream> {
        debug!(path, "opening stream");
        let response = self
            .request(Method::GET, path)?
            .send()
            .await
            .map_err(ApiError::Stream)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::StreamStatus(status));
        }
        Ok(NdjsonStream::new(response))
    }

    /// Resolve `path` against the base URL and attach the standing headers.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(USER_AGENT, &self.user_agent))
    }
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("challengers", &self.pool.len())
            .finish_non_exhaustive()
    }
}

fn format_user_agent(version: &str, username: &str) -> String {
    format!("{USER_AGENT_PRODUCT}/{version} user:{username}")
}

/// Install the ring crypto provider for rustls. Safe to call repeatedly;
/// installation fails harmlessly once a process-wide provider exists.
fn ensure_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
