//! Bird Buddy account client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use birdbuddy_core::defaults::{
    FEEDER_POLL_ATTEMPTS, FEEDER_POLL_INTERVAL_MS, FEED_PAGE_SIZE, POWER_PROFILE_SETTLE_MS,
};
use birdbuddy_core::{
    take_root, Collection, CollectionMedia, Error, Feed, FeedNode, FeedNodeType, Feeder,
    FeederOptions, FeederRecord, FeederUpdateStatus, GraphqlExecutor, Media, Operation,
    PostcardSighting, PowerProfile, Result, SightingReport, User,
};

use crate::config::{normalize_language_tag, ClientConfig};
use crate::finish::{FinishOptions, PostcardFinisher};
use crate::queries::{auth, feeder, me};
use crate::transport::GraphqlTransport;

/// Server code for a firmware update that is already running.
const FIRMWARE_ALREADY_IN_PROGRESS: &str = "FEEDER_FIRMWARE_UPGRADE_ALREADY_IN_PROGRESS";

const POWER_PROFILE_IN_PROGRESS: &str = "FeederUpdatePowerProfileInProgressResult";

#[derive(Default)]
struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    fn needs_login(&self) -> bool {
        self.refresh_token.is_none()
    }

    fn needs_refresh(&self) -> bool {
        self.access_token.is_none()
    }
}

#[derive(Default)]
struct AccountState {
    user: Option<User>,
    feeders: HashMap<String, FeederRecord>,
    collections: HashMap<String, Collection>,
    last_feed_date: Option<DateTime<Utc>>,
}

impl AccountState {
    /// Store a `Me` payload. Returns `false` when there was nothing to store.
    fn save_me(&mut self, me: Option<MePayload>) -> bool {
        let Some(me) = me else {
            return false;
        };
        self.user = Some(me.user);
        for fields in me.feeders {
            let Some(id) = fields.get("id").and_then(JsonValue::as_str).map(str::to_string) else {
                warn!("Skipping feeder without id");
                continue;
            };
            match self.feeders.get_mut(&id) {
                Some(record) => record.merge(&fields),
                None => {
                    self.feeders.insert(id, FeederRecord::new(fields));
                }
            }
        }
        true
    }

    fn merge_feeder(&mut self, feeder_id: &str, fields: &Map<String, JsonValue>) {
        match self.feeders.get_mut(feeder_id) {
            Some(record) => record.merge(fields),
            None => {
                let mut fields = fields.clone();
                fields.insert("id".to_string(), JsonValue::String(feeder_id.to_string()));
                self.feeders
                    .insert(feeder_id.to_string(), FeederRecord::new(fields));
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct MePayload {
    user: User,
    #[serde(default)]
    feeders: Vec<Map<String, JsonValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    #[serde(rename = "__typename", default)]
    kind: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    me: Option<MePayload>,
    #[serde(default)]
    items: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct MeFeed {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct MeCollections {
    #[serde(default)]
    collections: Vec<Collection>,
}

#[derive(Debug, Deserialize)]
struct CollectionMediaPage {
    media: CollectionMediaConnection,
}

#[derive(Debug, Deserialize)]
struct CollectionMediaConnection {
    #[serde(default)]
    edges: Vec<CollectionMediaEdge>,
}

#[derive(Debug, Deserialize)]
struct CollectionMediaEdge {
    node: CollectionMedia,
}

#[derive(Debug, Deserialize)]
struct FeederResult {
    #[serde(rename = "__typename", default)]
    kind: Option<String>,
    #[serde(default)]
    feeder: Option<Map<String, JsonValue>>,
}

impl FeederResult {
    fn field(&self, name: &str) -> Option<&JsonValue> {
        self.feeder.as_ref()?.get(name)
    }
}

/// Bird Buddy account client.
///
/// Authenticates lazily: the first request logs in (or refreshes the access
/// token), and an expired access token is renewed and the request retried
/// once. Account data is cached between calls.
pub struct BirdBuddy {
    transport: GraphqlTransport,
    email: Option<String>,
    password: Option<String>,
    session: Mutex<Session>,
    state: RwLock<AccountState>,
    language_code: RwLock<String>,
}

impl BirdBuddy {
    /// Create a client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = GraphqlTransport::new(&config.url, config.timeout_seconds)?;
        Ok(Self {
            transport,
            email: config.email,
            password: config.password,
            session: Mutex::new(Session {
                access_token: config.access_token,
                refresh_token: config.refresh_token,
            }),
            state: RwLock::new(AccountState::default()),
            language_code: RwLock::new(normalize_language_tag(&config.language_code)),
        })
    }

    /// Create a client from `BIRDBUDDY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The current refresh token, to persist a session.
    pub async fn refresh_token(&self) -> Option<String> {
        self.session.lock().await.refresh_token.clone()
    }

    /// The current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.session.lock().await.access_token.clone()
    }

    pub async fn language_code(&self) -> String {
        self.language_code.read().await.clone()
    }

    /// Override the `Accept-Language` of requests, e.g. for localized
    /// species names.
    pub async fn set_language_code(&self, language_code: &str) {
        *self.language_code.write().await = normalize_language_tag(language_code);
    }

    // =========================================================================
    // REQUESTS AND AUTHENTICATION
    // =========================================================================

    async fn check_auth(&self, session: &mut Session) -> Result<()> {
        if session.needs_login() {
            debug!("Login required");
            self.login(session).await
        } else if session.needs_refresh() {
            debug!("Access token needs to be refreshed");
            self.refresh_access_token(session).await
        } else {
            Ok(())
        }
    }

    #[instrument(skip(self, session), fields(subsystem = "birdbuddy", component = "auth", op = "login"))]
    async fn login(&self, session: &mut Session) -> Result<()> {
        let (Some(email), Some(password)) = (&self.email, &self.password) else {
            return Err(Error::AuthenticationFailed(
                "no email and password to log in with".to_string(),
            ));
        };
        let variables = json!({
            "emailSignInInput": {"email": email, "password": password}
        });
        let language = self.language_code().await;
        let data = self
            .transport
            .post(&auth::SIGN_IN, &variables, None, &language)
            .await
            .map_err(|err| {
                error!(error = %err, "Error logging in");
                Error::AuthenticationFailed(err.to_string())
            })?;

        let result: AuthPayload = take_root(&auth::SIGN_IN, data)?;
        if result.kind.as_deref() == Some("Problem") {
            let problems = result.items.unwrap_or(JsonValue::Null);
            return Err(Error::AuthenticationFailed(format!("sign-in problem: {}", problems)));
        }
        let (Some(access_token), Some(refresh_token)) = (result.access_token, result.refresh_token)
        else {
            return Err(Error::AuthenticationFailed(
                "sign-in response has no tokens".to_string(),
            ));
        };
        session.access_token = Some(access_token);
        session.refresh_token = Some(refresh_token);
        self.state.write().await.save_me(result.me);
        info!("Logged in");
        Ok(())
    }

    #[instrument(skip(self, session), fields(subsystem = "birdbuddy", component = "auth", op = "refresh_access_token"))]
    async fn refresh_access_token(&self, session: &mut Session) -> Result<()> {
        let variables = json!({
            "refreshTokenInput": {"token": session.refresh_token}
        });
        let language = self.language_code().await;
        let data = match self
            .transport
            .post(&auth::REFRESH_AUTH_TOKEN, &variables, None, &language)
            .await
        {
            Ok(data) => data,
            Err(err) => {
                error!(error = %err, "Error refreshing access token");
                session.refresh_token = None;
                return Err(Error::AuthenticationFailed(err.to_string()));
            }
        };

        let tokens: AuthPayload = take_root(&auth::REFRESH_AUTH_TOKEN, data)?;
        session.access_token = tokens.access_token;
        if tokens.refresh_token.is_some() {
            session.refresh_token = tokens.refresh_token;
        }
        if session.needs_refresh() {
            return Err(Error::AuthenticationFailed(
                "token refresh returned no access token".to_string(),
            ));
        }
        info!("Access token refreshed");
        Ok(())
    }

    async fn send(
        &self,
        session: &mut Session,
        operation: &Operation,
        variables: &JsonValue,
    ) -> Result<Map<String, JsonValue>> {
        self.check_auth(session).await?;
        let language = self.language_code().await;
        let result = self
            .transport
            .post(operation, variables, session.access_token.as_deref(), &language)
            .await;
        if matches!(&result, Err(err) if err.is_auth_expired()) {
            session.access_token = None;
        }
        result
    }

    /// Execute an authenticated operation, renewing an expired access token
    /// and retrying once.
    async fn request(&self, operation: &Operation, variables: JsonValue) -> Result<Map<String, JsonValue>> {
        let mut session = self.session.lock().await;
        match self.send(&mut session, operation, &variables).await {
            Err(err) if err.is_auth_expired() => {
                info!(op = operation.name, "Access token expired, retrying after re-authentication");
                self.send(&mut session, operation, &variables).await
            }
            other => other,
        }
    }

    // =========================================================================
    // ACCOUNT
    // =========================================================================

    /// Reload the user and feeder data.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "refresh"))]
    pub async fn refresh(&self) -> Result<bool> {
        let data = self.request(&me::ME, json!({})).await?;
        let payload: Option<MePayload> = take_root(&me::ME, data)?;
        let saved = self.state.write().await.save_me(payload);
        debug!(saved, "Feeder data refreshed");
        Ok(saved)
    }

    /// The logged-in user, once known.
    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Cached feeders by id. Empty when not logged in.
    pub async fn feeders(&self) -> HashMap<String, Feeder> {
        if self.session.lock().await.needs_login() {
            warn!("Bird Buddy is not logged in. Call refresh() first");
            return HashMap::new();
        }
        let state = self.state.read().await;
        state
            .feeders
            .iter()
            .filter_map(|(id, record)| match record.feeder() {
                Ok(feeder) => Some((id.clone(), feeder)),
                Err(err) => {
                    warn!(feeder_id = %id, error = %err, "Unreadable feeder data");
                    None
                }
            })
            .collect()
    }

    /// A single cached feeder.
    pub async fn feeder(&self, feeder_id: &str) -> Option<Feeder> {
        self.state
            .read()
            .await
            .feeders
            .get(feeder_id)
            .and_then(|record| record.feeder().ok())
    }

    // =========================================================================
    // FEED
    // =========================================================================

    /// One page of the feed, most recent first. `after` is the end cursor of
    /// a previous page.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "feed"))]
    pub async fn feed(&self, first: u32, after: Option<&str>) -> Result<Feed> {
        let mut variables = json!({"first": first});
        if let Some(after) = after {
            variables["after"] = JsonValue::String(after.to_string());
        }
        let data = self.request(&me::FEED, variables).await?;
        let me: MeFeed = take_root(&me::FEED, data)?;
        Ok(me.feed)
    }

    /// Feed items newer than `since`, or than the newest item seen by the
    /// previous call when `since` is `None`.
    pub async fn refresh_feed(&self, since: Option<DateTime<Utc>>) -> Result<Vec<FeedNode>> {
        let since = match since {
            Some(since) => Some(since),
            None => self.state.read().await.last_feed_date,
        };
        let feed = self.feed(FEED_PAGE_SIZE, None).await?;
        if let Some(newest) = feed.newest_edge().map(|edge| edge.node.created_at) {
            let mut state = self.state.write().await;
            if state.last_feed_date != Some(newest) {
                debug!(previous = ?state.last_feed_date, latest = %newest, "Updating latest seen feed timestamp");
                state.last_feed_date = Some(newest);
            }
        }
        Ok(feed.filter(&[], since))
    }

    /// The timestamp of the newest feed item seen so far.
    pub async fn last_feed_date(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_feed_date
    }

    /// Feed items of `node_type` from the first feed page.
    pub async fn feed_nodes(&self, node_type: FeedNodeType) -> Result<Vec<FeedNode>> {
        let feed = self.feed(FEED_PAGE_SIZE, None).await?;
        Ok(feed.filter(&[node_type], None))
    }

    /// New postcards, to be converted with [`Self::sighting_from_postcard`].
    pub async fn new_postcards(&self) -> Result<Vec<FeedNode>> {
        self.feed_nodes(FeedNodeType::NewPostcard).await
    }

    // =========================================================================
    // SIGHTINGS
    // =========================================================================

    /// Convert a postcard into a sighting report.
    pub async fn sighting_from_postcard(&self, feed_item_id: &str) -> Result<PostcardSighting> {
        PostcardFinisher::new(self)
            .sighting_from_postcard(feed_item_id)
            .await
    }

    /// Manually assign a species to a sighting.
    pub async fn sighting_choose_species(
        &self,
        sighting_id: &str,
        species_id: &str,
        report_token: Option<&str>,
    ) -> Result<SightingReport> {
        PostcardFinisher::new(self)
            .choose_species(sighting_id, species_id, report_token)
            .await
    }

    /// Convert a sighting into a mystery visitor.
    pub async fn sighting_choose_mystery(
        &self,
        sighting_id: &str,
        report_token: Option<&str>,
    ) -> Result<SightingReport> {
        PostcardFinisher::new(self)
            .choose_mystery(sighting_id, report_token)
            .await
    }

    /// Toggle community sharing of media.
    pub async fn share_medias(&self, media_ids: &[String], share: bool) -> Result<bool> {
        PostcardFinisher::new(self)
            .share_medias(media_ids, share)
            .await
    }

    /// Collect a postcard into the account's collections.
    pub async fn finish_postcard(
        &self,
        feed_item_id: &str,
        sighting: &PostcardSighting,
        options: FinishOptions,
    ) -> Result<bool> {
        PostcardFinisher::new(self)
            .finish(feed_item_id, sighting, options)
            .await
    }

    /// Collect a postcard from a raw `sightingCreateFromPostcard` payload.
    ///
    /// Returns `Ok(false)` without any request when the payload is not a
    /// postcard sighting.
    pub async fn finish_postcard_value(
        &self,
        feed_item_id: &str,
        sighting: &JsonValue,
        options: FinishOptions,
    ) -> Result<bool> {
        PostcardFinisher::new(self)
            .finish_value(feed_item_id, sighting, options)
            .await
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// Reload collections of `kind` (`"bird"` or `"mysteryVisitor"`).
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "refresh_collections"))]
    pub async fn refresh_collections(&self, kind: &str) -> Result<HashMap<String, Collection>> {
        let data = self.request(&me::COLLECTIONS, json!({})).await?;
        let me: MeCollections = take_root(&me::COLLECTIONS, data)?;
        let typename = collection_typename(kind);

        let mut state = self.state.write().await;
        for collection in me.collections {
            if collection.kind.as_deref() == Some(typename.as_str()) {
                state.collections.insert(collection.id.clone(), collection);
            }
        }
        Ok(state.collections.clone())
    }

    /// Cached collections, dropping those whose cover media URL has expired.
    pub async fn collections(&self) -> HashMap<String, Collection> {
        if self.session.lock().await.needs_login() {
            warn!("Bird Buddy is not logged in. Call refresh_collections() first");
            return HashMap::new();
        }
        let now = Utc::now();
        let mut state = self.state.write().await;
        state.collections.retain(|_, collection| {
            collection
                .cover_media()
                .and_then(|media| media.is_expired_at(now))
                != Some(true)
        });
        state.collections.clone()
    }

    /// Media of one collection, keyed by media id.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "collection"))]
    pub async fn collection(&self, collection_id: &str) -> Result<HashMap<String, Media>> {
        let data = self
            .request(&me::COLLECTIONS_MEDIA, json!({"collectionId": collection_id}))
            .await?;
        let page: CollectionMediaPage = take_root(&me::COLLECTIONS_MEDIA, data)?;
        Ok(page
            .media
            .edges
            .into_iter()
            .map(|edge| (edge.node.media.id.clone(), edge.node.media))
            .collect())
    }

    // =========================================================================
    // FEEDER SETTINGS
    // =========================================================================

    async fn warn_unless_owner(&self, feeder_id: &str, setting: &str) {
        if let Some(feeder) = self.feeder(feeder_id).await {
            if !feeder.is_owner() {
                warn!(feeder_id, "{} is available only to owner accounts", setting);
            }
        }
    }

    /// Refresh until `applied` holds for the cached feeder.
    async fn wait_for_feeder<F>(&self, feeder_id: &str, setting: &str, applied: F) -> Result<Feeder>
    where
        F: Fn(&Feeder) -> bool,
    {
        for _ in 0..FEEDER_POLL_ATTEMPTS {
            if let Some(feeder) = self.feeder(feeder_id).await {
                if applied(&feeder) {
                    return Ok(feeder);
                }
            }
            debug!(feeder_id, "Waiting for {} to update", setting);
            tokio::time::sleep(Duration::from_millis(FEEDER_POLL_INTERVAL_MS)).await;
            self.refresh().await?;
        }
        match self.feeder(feeder_id).await {
            Some(feeder) if applied(&feeder) => Ok(feeder),
            _ => Err(Error::UnexpectedResponse(format!(
                "feeder {} did not apply {} after {} refreshes",
                feeder_id, setting, FEEDER_POLL_ATTEMPTS
            ))),
        }
    }

    /// Toggle off-grid mode and wait until the feeder reports it.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "toggle_off_grid"))]
    pub async fn toggle_off_grid(&self, feeder_id: &str, off_grid: bool) -> Result<Feeder> {
        self.warn_unless_owner(feeder_id, "Off-grid").await;
        let variables = json!({
            "feederId": feeder_id,
            "feederToggleOffGridInput": {"offGrid": off_grid},
        });
        let data = self.request(&feeder::TOGGLE_OFF_GRID, variables).await?;
        let result: FeederResult = take_root(&feeder::TOGGLE_OFF_GRID, data)?;
        if result.field("offGrid").and_then(JsonValue::as_bool) == Some(off_grid) {
            let mut update = Map::new();
            update.insert("offGrid".to_string(), JsonValue::Bool(off_grid));
            self.state.write().await.merge_feeder(feeder_id, &update);
        }
        self.wait_for_feeder(feeder_id, "off-grid", |f| f.is_off_grid() == Some(off_grid))
            .await
    }

    /// Toggle audio and wait until the feeder reports it.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "toggle_audio_enabled"))]
    pub async fn toggle_audio_enabled(&self, feeder_id: &str, audio_enabled: bool) -> Result<Feeder> {
        self.warn_unless_owner(feeder_id, "Audio setting").await;
        let variables = json!({
            "feederId": feeder_id,
            "feederToggleAudioInput": {"audioEnabled": audio_enabled},
        });
        let data = self.request(&feeder::TOGGLE_AUDIO_ENABLED, variables).await?;
        let result: FeederResult = take_root(&feeder::TOGGLE_AUDIO_ENABLED, data)?;
        if result.field("audioEnabled").and_then(JsonValue::as_bool) == Some(audio_enabled) {
            let mut update = Map::new();
            update.insert("audioEnabled".to_string(), JsonValue::Bool(audio_enabled));
            self.state.write().await.merge_feeder(feeder_id, &update);
        }
        self.wait_for_feeder(feeder_id, "audio setting", |f| {
            f.is_audio_enabled() == Some(audio_enabled)
        })
        .await
    }

    /// Update feeder options. Returns the updated feeder fields.
    #[instrument(skip(self, options), fields(subsystem = "birdbuddy", component = "client", op = "set_feeder_options"))]
    pub async fn set_feeder_options(
        &self,
        feeder_id: &str,
        options: &FeederOptions,
    ) -> Result<Map<String, JsonValue>> {
        self.warn_unless_owner(feeder_id, "Setting feeder options").await;
        let variables = json!({
            "feederId": feeder_id,
            "feederUpdateInput": options,
        });
        let data = self.request(&feeder::SET_OPTIONS, variables).await?;
        let updated: Map<String, JsonValue> = take_root(&feeder::SET_OPTIONS, data)?;
        self.state.write().await.merge_feeder(feeder_id, &updated);
        Ok(updated)
    }

    /// Set the feeder power profile. Returns the profile the feeder reports.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "set_power_profile"))]
    pub async fn set_power_profile(
        &self,
        feeder_id: &str,
        profile: PowerProfile,
    ) -> Result<Option<PowerProfile>> {
        self.warn_unless_owner(feeder_id, "Power profile setting").await;
        let variables = json!({
            "feederId": feeder_id,
            "feederUpdatePowerProfileInput": {"powerProfile": profile.as_str()},
        });
        let data = self.request(&feeder::UPDATE_POWER_PROFILE, variables).await?;
        let result: FeederResult = take_root(&feeder::UPDATE_POWER_PROFILE, data)?;

        if result.kind.as_deref() == Some(POWER_PROFILE_IN_PROGRESS) {
            debug!(feeder_id, "Power profile update is in progress");
            tokio::time::sleep(Duration::from_millis(POWER_PROFILE_SETTLE_MS)).await;
            self.refresh().await?;
            return Ok(self.feeder(feeder_id).await.map(|f| f.power_profile()));
        }

        let reported = result.field("powerProfile").cloned().unwrap_or(JsonValue::Null);
        let mut update = Map::new();
        update.insert("powerProfile".to_string(), reported.clone());
        self.state.write().await.merge_feeder(feeder_id, &update);
        Ok(reported.as_str().map(PowerProfile::from))
    }

    // =========================================================================
    // FIRMWARE
    // =========================================================================

    /// Check the progress of a firmware update.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "update_firmware_check"))]
    pub async fn update_firmware_check(&self, feeder_id: &str) -> Result<FeederUpdateStatus> {
        self.warn_unless_owner(feeder_id, "Firmware update").await;
        let operation = feeder::UPDATE_FIRMWARE_PROGRESS;
        let data = self.request(&operation, json!({"feederId": feeder_id})).await?;
        let status: FeederUpdateStatus = take_root(&operation, data)?;
        self.merge_completed_update(feeder_id, &status).await;
        Ok(status)
    }

    /// Start a firmware update, unless one is already in progress.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "client", op = "update_firmware_start"))]
    pub async fn update_firmware_start(&self, feeder_id: &str) -> Result<FeederUpdateStatus> {
        let current = self.update_firmware_check(feeder_id).await?;
        if current.is_in_progress() {
            return Ok(current);
        }

        let operation = feeder::UPDATE_FIRMWARE;
        let data = match self.request(&operation, json!({"feederId": feeder_id})).await {
            Ok(data) => data,
            Err(err) if err.error_code() == Some(FIRMWARE_ALREADY_IN_PROGRESS) => {
                return Ok(current)
            }
            Err(err) => return Err(err),
        };
        let status: FeederUpdateStatus = take_root(&operation, data)?;
        debug!(feeder_id, kind = %status.kind, "Firmware update started");
        self.merge_completed_update(feeder_id, &status).await;
        Ok(status)
    }

    async fn merge_completed_update(&self, feeder_id: &str, status: &FeederUpdateStatus) {
        if !status.is_complete() {
            return;
        }
        if let Some(fields) = &status.feeder {
            self.state.write().await.merge_feeder(feeder_id, fields);
        }
    }
}

#[async_trait]
impl GraphqlExecutor for BirdBuddy {
    async fn execute(
        &self,
        operation: &Operation,
        variables: JsonValue,
    ) -> Result<Map<String, JsonValue>> {
        self.request(operation, variables).await
    }
}

/// `CollectionBird` for `bird`, `CollectionMysteryVisitor` for `mysteryVisitor`.
fn collection_typename(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => format!("Collection{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "Collection".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_typename() {
        assert_eq!(collection_typename("bird"), "CollectionBird");
        assert_eq!(collection_typename("mysteryVisitor"), "CollectionMysteryVisitor");
    }

    #[test]
    fn test_save_me_merges_feeders() {
        let mut state = AccountState::default();
        let first: MePayload = serde_json::from_value(json!({
            "user": {"id": "u1", "name": "Me"},
            "feeders": [{"id": "f1", "name": "Backyard", "offGrid": false}]
        }))
        .unwrap();
        assert!(state.save_me(Some(first)));

        let second: MePayload = serde_json::from_value(json!({
            "user": {"id": "u1"},
            "feeders": [{"id": "f1", "offGrid": true}]
        }))
        .unwrap();
        state.save_me(Some(second));

        let feeder = state.feeders["f1"].feeder().unwrap();
        assert_eq!(feeder.name(), "Backyard");
        assert_eq!(feeder.is_off_grid(), Some(true));
        assert!(!state.save_me(None));
    }

    #[test]
    fn test_merge_unknown_feeder_inserts_record() {
        let mut state = AccountState::default();
        let mut update = Map::new();
        update.insert("powerProfile".to_string(), json!("FRENZY_MODE"));
        state.merge_feeder("f9", &update);
        let feeder = state.feeders["f9"].feeder().unwrap();
        assert_eq!(feeder.id, "f9");
        assert_eq!(feeder.power_profile(), PowerProfile::Frenzy);
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(matches!(
            BirdBuddy::new(ClientConfig::default()),
            Err(Error::Config(_))
        ));
        assert!(BirdBuddy::new(ClientConfig::with_login("me@example.com", "pw")).is_ok());
    }

    #[tokio::test]
    async fn test_language_code_normalized() {
        let client = BirdBuddy::new(ClientConfig::with_tokens("refresh", None)).unwrap();
        assert_eq!(client.language_code().await, "en");
        client.set_language_code("pt_br").await;
        assert_eq!(client.language_code().await, "pt-BR");
    }

    #[tokio::test]
    async fn test_feeders_empty_when_logged_out() {
        let client = BirdBuddy::new(ClientConfig::with_login("me@example.com", "pw")).unwrap();
        assert!(client.feeders().await.is_empty());
        assert!(client.collections().await.is_empty());
        assert!(client.user().await.is_none());
    }
}
