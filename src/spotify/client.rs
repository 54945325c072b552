use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    Res,
    config::Settings,
    management::TokenManager,
    pipeline::TrackDetailsLookup,
    source::{EventSource, Page, PAGE_SIZE},
    spotify::{SpotifyError, auth},
    stats::{GenreLookup, MAX_LOOKUP_IDS},
    types::{
        FullArtist, FullTrack, RecentlyPlayedResponse, SavedTracksResponse,
        SeveralArtistsResponse, SeveralTracksResponse, TrackDetails,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Authenticated client for the Spotify Web API.
pub struct SpotifyClient {
    client: Client,
    api_url: String,
    token: String,
    retry_delay: Duration,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, SpotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            retry_delay: Duration::from_secs(10),
        })
    }

    /// Delay before retrying a `502 Bad Gateway`.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Obtains an access token and builds the client.
    ///
    /// A configured refresh token wins over the token stored by `spotdash auth`.
    pub async fn connect(settings: &Settings) -> Result<Self, SpotifyError> {
        let access_token = match &settings.spotify_refresh_token {
            Some(refresh_token) => {
                auth::refresh_with_client_credentials(settings, refresh_token)
                    .await?
                    .access_token
            }
            None => {
                let mut token_mgr = TokenManager::load().await.map_err(|e| {
                    SpotifyError::Auth(format!(
                        "no stored token, please run spotdash auth ({})",
                        e
                    ))
                })?;
                token_mgr.get_valid_token(settings).await?
            }
        };

        Self::new(&settings.spotify_api_url, access_token)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SpotifyError> {
        let url = format!("{}{}", self.api_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }

            if status == StatusCode::BAD_GATEWAY && attempt < MAX_ATTEMPTS {
                sleep(self.retry_delay).await;
                continue; // retry
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(0);
                if retry_after <= MAX_RETRY_AFTER_SECS && attempt < MAX_ATTEMPTS {
                    sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
                return Err(SpotifyError::RateLimited(retry_after));
            }

            let message = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }
    }

    pub async fn saved_tracks(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<SavedTracksResponse, SpotifyError> {
        self.get(&format!("/me/tracks?limit={limit}&offset={offset}"))
            .await
    }

    pub async fn recently_played(&self, limit: usize) -> Result<Vec<Value>, SpotifyError> {
        let res: RecentlyPlayedResponse = self
            .get(&format!("/me/player/recently-played?limit={limit}"))
            .await?;
        Ok(res.items)
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<FullArtist>, SpotifyError> {
        let res: SeveralArtistsResponse =
            self.get(&format!("/artists?ids={}", ids.join(","))).await?;
        Ok(res.artists.into_iter().flatten().collect())
    }

    /// Genres of the primary artist of each track.
    ///
    /// Tracks the API does not know are missing from the result; tracks whose
    /// artist has no genres map to an empty list.
    pub async fn genres_for_tracks(
        &self,
        track_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, SpotifyError> {
        let mut seen = HashSet::new();
        let ids: Vec<&str> = track_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .take(MAX_LOOKUP_IDS)
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let tracks: SeveralTracksResponse =
            self.get(&format!("/tracks?ids={}", ids.join(","))).await?;

        let mut track_to_artist: Vec<(String, String)> = Vec::new();
        for track in tracks.tracks.into_iter().flatten() {
            let primary = track.artists.first().and_then(|a| a.id.clone());
            if let (Some(track_id), Some(artist_id)) = (track.id, primary) {
                track_to_artist.push((track_id, artist_id));
            }
        }

        let mut artist_ids: Vec<String> = Vec::new();
        for (_, artist_id) in &track_to_artist {
            if !artist_ids.contains(artist_id) {
                artist_ids.push(artist_id.clone());
            }
        }
        artist_ids.truncate(MAX_LOOKUP_IDS);
        if artist_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let artist_genres: HashMap<String, Vec<String>> = self
            .artists(&artist_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a.genres))
            .collect();

        Ok(track_to_artist
            .into_iter()
            .map(|(track_id, artist_id)| {
                let genres = artist_genres.get(&artist_id).cloned().unwrap_or_default();
                (track_id, genres)
            })
            .collect())
    }

    /// Popularity, album and artist genres of one track. `None` for an empty id.
    pub async fn track_details(&self, track_id: &str) -> Result<Option<TrackDetails>, SpotifyError> {
        if track_id.is_empty() {
            return Ok(None);
        }

        let track: FullTrack = self.get(&format!("/tracks/{track_id}")).await?;
        let album = track.album.clone();
        let mut details = TrackDetails {
            popularity: track.popularity,
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            album_name: album
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            release_date: album
                .map(|a| a.release_date)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            artist_genres: Vec::new(),
            artist_popularity: 0,
        };

        // Artist info only adds genres, the track details stand on their own.
        if let Some(artist_id) = track.artists.first().and_then(|a| a.id.as_deref()) {
            if let Ok(artist) = self
                .get::<FullArtist>(&format!("/artists/{artist_id}"))
                .await
            {
                details.artist_genres = artist.genres;
                details.artist_popularity = artist.popularity;
            }
        }

        Ok(Some(details))
    }
}

#[async_trait]
impl EventSource for SpotifyClient {
    async fn fetch_events(&self, offset: usize) -> Res<Page> {
        let res = self.saved_tracks(offset, PAGE_SIZE).await?;
        let next = match res.next {
            Some(_) if !res.items.is_empty() => Some(offset + res.items.len()),
            _ => None,
        };
        Ok(Page {
            items: res.items,
            next,
        })
    }

    async fn fetch_recent(&self, limit: usize) -> Res<Vec<Value>> {
        Ok(self.recently_played(limit).await?)
    }
}

#[async_trait]
impl GenreLookup for SpotifyClient {
    async fn fetch_genres(&self, ids: &[String]) -> Res<HashMap<String, Vec<String>>> {
        Ok(self.genres_for_tracks(ids).await?)
    }
}

#[async_trait]
impl TrackDetailsLookup for SpotifyClient {
    async fn track_details(&self, track_id: &str) -> Res<Option<TrackDetails>> {
        Ok(SpotifyClient::track_details(self, track_id).await?)
    }
}
