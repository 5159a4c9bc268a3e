//! Emotion → catalog search mapping and track selection

use moodify_common::{Emotion, TrackResult};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use super::spotify_client::{SpotifyClient, SpotifyError, SpotifyTrack};

/// Tracks requested from the catalog per recommendation
pub const SEARCH_LIMIT: u32 = 40;
/// Tracks returned to the client
pub const MAX_RECOMMENDATIONS: usize = 8;

/// Qualifier appended to every query so repeated refreshes vary
pub const QUALIFIER_TERMS: [&str; 6] = ["popular", "trending", "hit", "top", "best", "latest"];

const DEFAULT_PHRASINGS: [&str; 3] = [
    "popular bollywood hindi songs 2023 2024",
    "classic hindi songs collection evergreen",
    "best bollywood songs all time",
];

/// Alternative search phrasings for a mood (latest, classic, popular artists)
///
/// `None` selects the default phrasings used for unrecognized labels.
pub fn phrasings(emotion: Option<Emotion>) -> &'static [&'static str; 3] {
    let Some(emotion) = emotion else {
        return &DEFAULT_PHRASINGS;
    };
    match emotion {
        Emotion::Happy => &[
            "bollywood hindi happy songs 2023 2024",
            "classic bollywood happy songs 90s 2000s",
            "hindi upbeat dance songs arijit singh",
        ],
        Emotion::Sad => &[
            "bollywood hindi sad songs 2023 2024",
            "classic hindi sad songs kumar sanu udit narayan",
            "hindi emotional songs arijit singh rahat",
        ],
        Emotion::Angry => &[
            "bollywood hindi intense songs 2023 2024",
            "classic hindi powerful songs 90s rock",
            "hindi motivational songs energetic",
        ],
        Emotion::Neutral => &[
            "bollywood hindi melodious songs 2023 2024",
            "classic hindi songs evergreen collection",
            "hindi chill songs lofi indian",
        ],
        Emotion::Surprised => &[
            "bollywood hindi upbeat songs 2023 2024",
            "classic hindi exciting songs energetic",
            "hindi party songs dance bollywood",
        ],
        Emotion::Fearful => &[
            "bollywood hindi soothing songs 2023 2024",
            "classic hindi calming songs peaceful",
            "hindi meditation relaxing instrumental",
        ],
        Emotion::Disgusted => &[
            "bollywood hindi atmospheric songs 2023 2024",
            "classic hindi moody songs deep",
            "hindi ambient instrumental peaceful",
        ],
    }
}

/// Pick one phrasing and append one qualifier term
pub fn build_query<R: Rng + ?Sized>(emotion: Option<Emotion>, rng: &mut R) -> String {
    let options = phrasings(emotion);
    let phrasing = options.choose(rng).copied().unwrap_or(options[0]);
    let qualifier = QUALIFIER_TERMS.choose(rng).copied().unwrap_or(QUALIFIER_TERMS[0]);
    format!("{} {}", phrasing, qualifier)
}

/// Keep up to `max` tracks, preferring ones with a playable preview
///
/// Falls back to the first `max` unfiltered tracks when none has a preview.
pub fn select_tracks(items: Vec<SpotifyTrack>, emotion: Emotion, max: usize) -> Vec<TrackResult> {
    let has_preview = |t: &SpotifyTrack| t.preview_url.as_deref().is_some_and(|u| !u.is_empty());

    let playable = items.iter().filter(|t| has_preview(*t)).count();
    tracing::debug!(total = items.len(), playable, "Filtering tracks for previews");

    let chosen: Vec<SpotifyTrack> = if playable > 0 {
        items.into_iter().filter(has_preview).take(max).collect()
    } else {
        items.into_iter().take(max).collect()
    };

    chosen
        .into_iter()
        .map(|track| to_track_result(track, emotion))
        .collect()
}

fn to_track_result(track: SpotifyTrack, emotion: Emotion) -> TrackResult {
    let artist = track
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .unwrap_or_else(|| "Unknown Artist".to_string());

    let (album, cover_url) = match track.album {
        Some(album) => {
            let cover = album.images.into_iter().next().map(|i| i.url);
            let name = Some(album.name).filter(|n| !n.is_empty());
            (name, cover)
        }
        None => (None, None),
    };

    TrackResult {
        id: track.id,
        title: track.name,
        artist,
        album,
        cover_url,
        preview_url: track.preview_url.filter(|u| !u.is_empty()),
        emotion,
    }
}

/// Builds recommendation queries and runs them against the catalog
pub struct Recommender {
    spotify: Arc<SpotifyClient>,
    market: String,
}

impl Recommender {
    pub fn new(spotify: Arc<SpotifyClient>, market: impl Into<String>) -> Self {
        Self {
            spotify,
            market: market.into(),
        }
    }

    /// Recommend up to [`MAX_RECOMMENDATIONS`] tracks for a mood
    ///
    /// `emotion` is `None` for unrecognized labels; those use the default
    /// phrasings and the results are tagged `neutral`.
    pub async fn recommend(&self, emotion: Option<Emotion>) -> Result<Vec<TrackResult>, SpotifyError> {
        let query = build_query(emotion, &mut rand::thread_rng());
        let tag = emotion.unwrap_or(Emotion::Neutral);
        tracing::info!(emotion = %tag, query = %query, "Getting recommendations");

        let items = self
            .spotify
            .search_tracks(&query, SEARCH_LIMIT, Some(&self.market))
            .await?;

        let tracks = select_tracks(items, tag, MAX_RECOMMENDATIONS);
        tracing::info!(emotion = %tag, count = tracks.len(), "Recommendations ready");
        Ok(tracks)
    }
}
