//! Song library discovery and search.
//!
//! A song is an audio file with a sibling `.txt` lyric file of the same stem,
//! e.g. `data/Amazing Grace.mp3` and `data/Amazing Grace.txt`.

// Allow unwrap for compile-time constant regex patterns
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::Regex;
use walkdir::WalkDir;

use crate::constants::library::{AUDIO_EXTENSIONS, MIN_SEARCH_SCORE};
use crate::error::{Error, Result};
use crate::types::{Song, SongId};

/// Songs found in a directory.
#[derive(Debug, Clone, Default)]
pub struct SongLibrary {
    songs: Vec<Song>,
}

impl SongLibrary {
    /// Scan `dir` (not recursively) for songs, sorted by title.
    pub fn scan(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Library(format!(
                "Songs directory does not exist or is not a directory: {}",
                dir.display()
            )));
        }

        let start = Instant::now();
        let mut songs: Vec<Song> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            })
            .filter_map(|entry| {
                let stem = entry.path().file_stem()?.to_str()?;
                let lyrics_path = entry.path().with_extension("txt");
                if !lyrics_path.is_file() {
                    tracing::debug!("Skipping {}: no lyrics file", entry.path().display());
                    return None;
                }
                Some(Song {
                    id: SongId::new(stem),
                    title: display_title(stem),
                    music_path: entry.path().to_path_buf(),
                    lyrics_path,
                })
            })
            .collect();

        songs.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        songs.dedup_by(|a, b| a.id == b.id);

        tracing::info!("Found {} songs in {} in {:?}", songs.len(), dir.display(), start.elapsed());
        Ok(Self { songs })
    }

    /// All songs.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Songs matching `query`, best match first. An empty query returns all.
    pub fn filter(&self, query: &str) -> Vec<&Song> {
        let query = query.trim();
        if query.is_empty() {
            return self.songs.iter().collect();
        }

        let matcher = SkimMatcherV2::default();
        let query_lower = query.to_lowercase();
        let mut scored: Vec<_> = self
            .songs
            .iter()
            .filter_map(|song| {
                let score = matcher.fuzzy_match(&song.title.to_lowercase(), &query_lower)?;
                (score >= MIN_SEARCH_SCORE).then_some((song, score))
            })
            .collect();

        // Stable sort keeps alphabetical order among equal scores
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(song, _)| song).collect()
    }
}

/// Human-readable title from a file stem: drops track numbers and underscores.
pub fn display_title(stem: &str) -> String {
    static RE_TRACK_NUM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*\d+[\.\-\s_]+").unwrap());
    static RE_SPACES: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\s_]+").unwrap());

    let s = RE_TRACK_NUM.replace(stem, "");
    let s = RE_SPACES.replace_all(&s, " ");
    let s = s.trim();
    if s.is_empty() { stem.to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "la la la").unwrap();
    }

    #[test]
    fn display_title_strips_track_numbers() {
        assert_eq!(display_title("01 - Amazing Grace"), "Amazing Grace");
        assert_eq!(display_title("07_how_great"), "how great");
        assert_eq!(display_title("1999"), "1999");
    }

    #[test]
    fn scan_pairs_audio_with_lyrics() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b song.mp3");
        touch(dir.path(), "b song.txt");
        touch(dir.path(), "A Song.wav");
        touch(dir.path(), "A Song.txt");
        touch(dir.path(), "no lyrics.mp3");
        touch(dir.path(), "notes.txt");

        let library = SongLibrary::scan(dir.path()).unwrap();
        let titles: Vec<_> = library.songs().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["A Song", "b song"]);
        assert_eq!(library.songs()[1].id, SongId::from("b song"));
    }

    #[test]
    fn scan_missing_dir_fails() {
        let err = SongLibrary::scan(Path::new("/nonexistent/lyricsync/songs")).unwrap_err();
        assert!(matches!(err, Error::Library(_)));
    }

    #[test]
    fn filter_ranks_fuzzy_matches() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Amazing Grace", "Great Is Thy Faithfulness", "Be Thou My Vision"] {
            touch(dir.path(), &format!("{name}.mp3"));
            touch(dir.path(), &format!("{name}.txt"));
        }
        let library = SongLibrary::scan(dir.path()).unwrap();

        assert_eq!(library.filter("").len(), 3);
        let hits = library.filter("grace");
        assert_eq!(hits[0].title, "Amazing Grace");
        assert!(library.filter("zzzz").is_empty());
    }
}
