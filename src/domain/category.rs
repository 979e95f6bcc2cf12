use std::{fmt::Display, str::FromStr};

pub mod columns {
    pub const POSITION: &str = "Position";
    pub const TITLE: &str = "Title";
    pub const ARTIST: &str = "Artist";
    pub const ALBUM: &str = "Album";
    pub const DURATION_SECONDS: &str = "DurationSeconds";
    pub const PREVIEW_URL: &str = "PreviewUrl";
    pub const NAME: &str = "Name";
    pub const LINK: &str = "Link";
}

use columns::*;

const TRACK_COLUMNS: &[&str] = &[POSITION, TITLE, ARTIST, ALBUM, DURATION_SECONDS, PREVIEW_URL];
const TITLED_COLUMNS: &[&str] = &[POSITION, TITLE, LINK];
const ARTIST_COLUMNS: &[&str] = &[POSITION, NAME, LINK];

/// Content type of a chart, as published by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ChartCategory {
    #[value(name = "tracks")]
    Track,
    #[value(name = "albums")]
    Album,
    #[value(name = "artists")]
    Artist,
    #[value(name = "playlists")]
    Playlist,
    #[value(name = "podcasts")]
    Podcast,
}

impl ChartCategory {
    pub const ALL: [ChartCategory; 5] = [
        ChartCategory::Track,
        ChartCategory::Album,
        ChartCategory::Artist,
        ChartCategory::Playlist,
        ChartCategory::Podcast,
    ];

    /// Slot of this category in [`ChartCategory::ALL`].
    pub fn index(self) -> usize {
        match self {
            ChartCategory::Track => 0,
            ChartCategory::Album => 1,
            ChartCategory::Artist => 2,
            ChartCategory::Playlist => 3,
            ChartCategory::Podcast => 4,
        }
    }

    /// Field of the upstream payload holding this category's `data` array.
    pub fn api_field(self) -> &'static str {
        match self {
            ChartCategory::Track => "tracks",
            ChartCategory::Album => "albums",
            ChartCategory::Artist => "artists",
            ChartCategory::Playlist => "playlists",
            ChartCategory::Podcast => "podcasts",
        }
    }

    /// Label shown to the user in selectors and messages.
    pub fn label(self) -> &'static str {
        match self {
            ChartCategory::Track => "Canciones",
            ChartCategory::Album => "Álbumes",
            ChartCategory::Artist => "Artistas",
            ChartCategory::Playlist => "Playlists",
            ChartCategory::Podcast => "Podcasts",
        }
    }

    /// Column order of every record normalized for this category.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ChartCategory::Track => TRACK_COLUMNS,
            ChartCategory::Album | ChartCategory::Playlist | ChartCategory::Podcast => {
                TITLED_COLUMNS
            }
            ChartCategory::Artist => ARTIST_COLUMNS,
        }
    }
}

impl Display for ChartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_field())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown chart category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for ChartCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartCategory::ALL
            .into_iter()
            .find(|category| category.api_field() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
