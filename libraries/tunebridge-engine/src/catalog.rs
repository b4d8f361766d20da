//! Per-platform playlist catalog.
//!
//! Written only by [`Catalog::refresh`] and the demo/live switches, and
//! always by replacing a platform's whole listing. A failed refresh keeps
//! the previous listing.

use crate::demo;
use crate::events::{EventBus, SessionEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};
use tunebridge_core::{FetchError, FetchResult, Platform, PlatformClient, Playlist};

/// Where listings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    /// Static fixtures, no platform is contacted
    Demo,
    /// Fetched through the registered platform clients
    Live,
}

/// Options for [`Catalog::refresh`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Bypass the server-side cache
    pub force: bool,
}

impl RefreshOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// One platform's playlists and when they were fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub playlists: Vec<Playlist>,
    pub last_updated: Option<DateTime<Utc>>,
}

struct CatalogState {
    mode: CatalogMode,
    /// Bumped on every mode switch; fetches started under an older epoch are dropped
    epoch: u64,
    listings: HashMap<Platform, Listing>,
    /// Last ticket handed out per platform
    issued: HashMap<Platform, u64>,
    /// Ticket of the fetch that wrote the current listing
    written: HashMap<Platform, u64>,
}

struct CatalogInner {
    state: RwLock<CatalogState>,
    clients: RwLock<HashMap<Platform, Arc<dyn PlatformClient>>>,
    events: EventBus,
}

/// Shared, read-mostly playlist catalog. Clones share state.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

impl Catalog {
    /// Empty catalog in live mode
    pub fn new(events: EventBus) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                state: RwLock::new(CatalogState {
                    mode: CatalogMode::Live,
                    epoch: 0,
                    listings: HashMap::new(),
                    issued: HashMap::new(),
                    written: HashMap::new(),
                }),
                clients: RwLock::new(HashMap::new()),
                events,
            }),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register (or replace) the client for `client.platform()`
    pub fn register_client(&self, client: Arc<dyn PlatformClient>) {
        let platform = client.platform();
        self.inner
            .clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(platform, client);
        debug!(platform = %platform, "Platform client registered");
    }

    pub fn client(&self, platform: Platform) -> Option<Arc<dyn PlatformClient>> {
        self.inner
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&platform)
            .cloned()
    }

    pub fn mode(&self) -> CatalogMode {
        self.read_state().mode
    }

    /// Current playlists for `platform` (empty if never fetched)
    pub fn playlists(&self, platform: Platform) -> Vec<Playlist> {
        self.read_state()
            .listings
            .get(&platform)
            .map(|listing| listing.playlists.clone())
            .unwrap_or_default()
    }

    /// When `platform` was last refreshed successfully
    pub fn last_updated(&self, platform: Platform) -> Option<DateTime<Utc>> {
        self.read_state()
            .listings
            .get(&platform)
            .and_then(|listing| listing.last_updated)
    }

    pub fn listing(&self, platform: Platform) -> Option<Listing> {
        self.read_state().listings.get(&platform).cloned()
    }

    /// Refresh one platform's listing.
    ///
    /// In demo mode this returns the fixtures without contacting any client.
    /// In live mode a success replaces the listing; any failure leaves it as
    /// it was and is returned to the caller. A response that arrives after a
    /// later-started refresh already wrote the listing is dropped as
    /// [`FetchError::Superseded`].
    pub async fn refresh(
        &self,
        platform: Platform,
        options: RefreshOptions,
    ) -> FetchResult<Vec<Playlist>> {
        let (epoch, ticket) = {
            let mut state = self.write_state();
            if state.mode == CatalogMode::Demo {
                return Ok(state
                    .listings
                    .get(&platform)
                    .map(|listing| listing.playlists.clone())
                    .unwrap_or_default());
            }
            let issued = state.issued.entry(platform).or_insert(0);
            *issued += 1;
            let ticket = *issued;
            (state.epoch, ticket)
        };

        let client = self
            .client(platform)
            .ok_or(FetchError::NotConnected(platform))?;

        debug!(platform = %platform, force = options.force, ticket, "Refreshing catalog");
        let fetched = client.get_user_playlists(options.force).await;

        let outcome = {
            let mut state = self.write_state();
            if state.epoch != epoch {
                debug!(platform = %platform, "Discarding fetch from before a mode switch");
                return Err(FetchError::Superseded(platform));
            }

            match fetched {
                Ok(page) => {
                    if state
                        .written
                        .get(&platform)
                        .is_some_and(|written| *written > ticket)
                    {
                        debug!(platform = %platform, ticket, "Discarding fetch overtaken by a newer refresh");
                        return Err(FetchError::Superseded(platform));
                    }
                    state.written.insert(platform, ticket);
                    state.listings.insert(
                        platform,
                        Listing {
                            playlists: page.playlists.clone(),
                            last_updated: Some(page.updated_at.unwrap_or_else(Utc::now)),
                        },
                    );
                    Ok(page.playlists)
                }
                Err(e) => Err(e),
            }
        };

        match &outcome {
            Ok(playlists) => {
                debug!(platform = %platform, count = playlists.len(), "Catalog refreshed");
                self.inner.events.emit(&SessionEvent::CatalogUpdated {
                    platform,
                    count: playlists.len(),
                });
            }
            Err(e) => {
                warn!(platform = %platform, error = %e, "Catalog refresh failed");
                self.inner.events.emit(&SessionEvent::CatalogRefreshFailed {
                    platform,
                    auth: e.is_auth(),
                });
                if e.is_auth() {
                    self.inner
                        .events
                        .emit(&SessionEvent::AuthChanged { platform });
                }
            }
        }

        outcome
    }

    /// Refresh every platform that has a client (all platforms in demo mode)
    pub async fn refresh_all(
        &self,
        options: RefreshOptions,
    ) -> Vec<(Platform, FetchResult<Vec<Playlist>>)> {
        let platforms: Vec<Platform> = match self.mode() {
            CatalogMode::Demo => Platform::ALL.to_vec(),
            CatalogMode::Live => Platform::ALL
                .into_iter()
                .filter(|platform| self.client(*platform).is_some())
                .collect(),
        };

        let refreshes = platforms.iter().map(|platform| self.refresh(*platform, options));
        let results = futures_util::future::join_all(refreshes).await;
        platforms.into_iter().zip(results).collect()
    }

    /// Whether `platform` has a linked, valid session. Always false in demo mode.
    pub async fn is_logged_in(&self, platform: Platform) -> FetchResult<bool> {
        if self.mode() == CatalogMode::Demo {
            return Ok(false);
        }
        let client = self
            .client(platform)
            .ok_or(FetchError::NotConnected(platform))?;
        client.is_logged_in().await
    }

    /// Replace all listings with fixtures. Returns false if already in demo mode.
    pub fn enter_demo(&self) -> bool {
        let counts: Vec<(Platform, usize)> = {
            let mut state = self.write_state();
            if state.mode == CatalogMode::Demo {
                return false;
            }
            state.mode = CatalogMode::Demo;
            state.epoch += 1;
            state.listings = Platform::ALL
                .into_iter()
                .map(|platform| {
                    let listing = Listing {
                        playlists: demo::playlists(platform),
                        last_updated: None,
                    };
                    (platform, listing)
                })
                .collect();
            Platform::ALL
                .into_iter()
                .map(|platform| (platform, state.listings[&platform].playlists.len()))
                .collect()
        };

        info!("Catalog switched to demo mode");
        self.inner.events.emit(&SessionEvent::ModeChanged {
            mode: CatalogMode::Demo,
        });
        self.inner.events.emit_all(
            counts
                .into_iter()
                .map(|(platform, count)| SessionEvent::CatalogUpdated { platform, count }),
        );
        true
    }

    /// Drop fixtures and return to live fetching. Returns false if already live.
    pub fn enter_live(&self) -> bool {
        {
            let mut state = self.write_state();
            if state.mode == CatalogMode::Live {
                return false;
            }
            state.mode = CatalogMode::Live;
            state.epoch += 1;
            state.listings.clear();
        }

        info!("Catalog switched to live mode");
        self.inner.events.emit(&SessionEvent::ModeChanged {
            mode: CatalogMode::Live,
        });
        true
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("Catalog")
            .field("mode", &state.mode)
            .field("platforms", &state.listings.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tunebridge_core::{MockPlatformClient, PlaylistPage};

    fn recorder(events: &EventBus) -> Arc<Mutex<Vec<SessionEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        events.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        seen
    }

    fn page(names: &[&str]) -> PlaylistPage {
        PlaylistPage {
            playlists: names
                .iter()
                .map(|name| Playlist::new(*name, *name, Platform::Spotify, 1))
                .collect(),
            updated_at: None,
        }
    }

    fn spotify_client(
        result: impl Fn() -> FetchResult<PlaylistPage> + Send + Sync + 'static,
    ) -> Arc<dyn PlatformClient> {
        let mut client = MockPlatformClient::new();
        client.expect_platform().return_const(Platform::Spotify);
        client
            .expect_get_user_playlists()
            .returning(move |_| result());
        Arc::new(client)
    }

    #[tokio::test]
    async fn successful_refresh_replaces_listing() {
        let events = EventBus::new();
        let seen = recorder(&events);
        let catalog = Catalog::new(events);
        catalog.register_client(spotify_client(|| Ok(page(&["a", "b"]))));

        let playlists = catalog
            .refresh(Platform::Spotify, RefreshOptions::forced())
            .await
            .unwrap();

        assert_eq!(playlists.len(), 2);
        assert_eq!(catalog.playlists(Platform::Spotify).len(), 2);
        assert!(catalog.last_updated(Platform::Spotify).is_some());
        assert!(seen.lock().unwrap().contains(&SessionEvent::CatalogUpdated {
            platform: Platform::Spotify,
            count: 2
        }));
    }

    #[tokio::test]
    async fn server_timestamp_wins_over_local_clock() {
        let stamp: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().unwrap();
        let catalog = Catalog::new(EventBus::new());
        catalog.register_client(spotify_client(move || {
            Ok(PlaylistPage {
                updated_at: Some(stamp),
                ..page(&["a"])
            })
        }));

        catalog
            .refresh(Platform::Spotify, RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(catalog.last_updated(Platform::Spotify), Some(stamp));
    }

    #[tokio::test]
    async fn missing_client_is_not_connected() {
        let catalog = Catalog::new(EventBus::new());
        let err = catalog
            .refresh(Platform::SoundCloud, RefreshOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::NotConnected(Platform::SoundCloud));
    }

    #[tokio::test]
    async fn demo_refresh_never_contacts_clients() {
        let catalog = Catalog::new(EventBus::new());
        let mut client = MockPlatformClient::new();
        client.expect_platform().return_const(Platform::Spotify);
        client.expect_get_user_playlists().never();
        catalog.register_client(Arc::new(client));

        assert!(catalog.enter_demo());
        assert!(!catalog.enter_demo());

        let playlists = catalog
            .refresh(Platform::Spotify, RefreshOptions::forced())
            .await
            .unwrap();
        assert_eq!(playlists, demo::playlists(Platform::Spotify));
        assert!(!catalog.is_logged_in(Platform::Spotify).await.unwrap());
    }

    #[tokio::test]
    async fn demo_and_live_data_never_mix() {
        let events = EventBus::new();
        let seen = recorder(&events);
        let catalog = Catalog::new(events);
        catalog.register_client(spotify_client(|| Ok(page(&["live"]))));

        catalog
            .refresh(Platform::Spotify, RefreshOptions::default())
            .await
            .unwrap();

        catalog.enter_demo();
        assert_eq!(
            catalog.playlists(Platform::Spotify),
            demo::playlists(Platform::Spotify)
        );

        catalog.enter_live();
        assert!(catalog.playlists(Platform::Spotify).is_empty());
        assert!(catalog.last_updated(Platform::Spotify).is_none());

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&SessionEvent::ModeChanged {
            mode: CatalogMode::Demo
        }));
        assert!(seen.contains(&SessionEvent::ModeChanged {
            mode: CatalogMode::Live
        }));
    }

    #[tokio::test]
    async fn refresh_all_covers_connected_platforms() {
        let catalog = Catalog::new(EventBus::new());
        catalog.register_client(spotify_client(|| Ok(page(&["a"]))));

        let results = catalog.refresh_all(RefreshOptions::default()).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, Platform::Spotify);
        assert!(results[0].1.is_ok());
    }

    /// Answers forced fetches at once; unforced ones wait for `release`
    struct SlowCacheClient {
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl PlatformClient for SlowCacheClient {
        fn platform(&self) -> Platform {
            Platform::Spotify
        }

        async fn is_logged_in(&self) -> FetchResult<bool> {
            Ok(true)
        }

        async fn get_user_playlists(&self, force: bool) -> FetchResult<PlaylistPage> {
            if force {
                return Ok(page(&["fresh"]));
            }
            self.release.notified().await;
            Ok(page(&["cached"]))
        }

        async fn request_with_auth(
            &self,
            _request: tunebridge_core::AuthedRequest,
        ) -> FetchResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
    }

    #[tokio::test]
    async fn older_fetch_never_overwrites_newer_listing() {
        let release = Arc::new(tokio::sync::Notify::new());
        let catalog = Catalog::new(EventBus::new());
        catalog.register_client(Arc::new(SlowCacheClient {
            release: Arc::clone(&release),
        }));

        let slow = tokio::spawn({
            let catalog = catalog.clone();
            async move {
                catalog
                    .refresh(Platform::Spotify, RefreshOptions::default())
                    .await
            }
        });
        // Let the unforced fetch take its ticket first
        while catalog.read_state().issued.get(&Platform::Spotify).is_none() {
            tokio::task::yield_now().await;
        }

        catalog
            .refresh(Platform::Spotify, RefreshOptions::forced())
            .await
            .unwrap();
        release.notify_one();

        assert_eq!(
            slow.await.unwrap(),
            Err(FetchError::Superseded(Platform::Spotify))
        );
        let names: Vec<String> = catalog
            .playlists(Platform::Spotify)
            .into_iter()
            .map(|playlist| playlist.name)
            .collect();
        assert_eq!(names, vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn sequential_refreshes_keep_replacing() {
        let catalog = Catalog::new(EventBus::new());
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        catalog.register_client(spotify_client(move || {
            match counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) {
                0 => Ok(page(&["a", "b"])),
                _ => Ok(page(&["c"])),
            }
        }));

        catalog
            .refresh(Platform::Spotify, RefreshOptions::default())
            .await
            .unwrap();
        catalog
            .refresh(Platform::Spotify, RefreshOptions::default())
            .await
            .unwrap();
        assert_eq!(catalog.playlists(Platform::Spotify).len(), 1);
    }
}
