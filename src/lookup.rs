//! Boundary types for text handed in by lookup collaborators.

use core::fmt;

/// Sentinel some text sources return instead of an error.
const NOT_FOUND_SENTINEL: &str = "Not Found";

/// Outcome of a passage or lyric lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The source produced content.
    Found(T),
    /// The source had nothing for the request.
    NotFound,
}

impl<'a> Lookup<&'a str> {
    /// Interpret raw source output, treating blank text and the
    /// `"Not Found"` sentinel as a miss.
    pub fn from_source_text(text: &'a str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == NOT_FOUND_SENTINEL {
            Self::NotFound
        } else {
            Self::Found(text)
        }
    }
}

impl<T> Lookup<T> {
    /// True for [`Lookup::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Transform found content.
    pub fn map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
        }
    }

    /// Borrow found content.
    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Self::Found(value) => Lookup::Found(value),
            Self::NotFound => Lookup::NotFound,
        }
    }

    /// Convert to `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

/// One stored hymn stanza as kept by a hymn database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HymnStanzaRow {
    /// Hymn title as stored.
    pub title: String,
    /// 1-based stanza counter.
    pub number: u32,
    /// Total stanza count recorded for the hymn.
    pub total: u32,
    /// Stanza text.
    pub text: String,
}

/// Stanza counters that disagree after assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsistencyWarning {
    /// Counter of the last stanza read.
    pub found: u32,
    /// Total the rows claimed.
    pub expected: u32,
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hymn consistency: {}/{} stanzas found",
            self.found, self.expected
        )
    }
}

/// Lyrics assembled from stanza rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HymnAssembly {
    /// Stored title of the hymn.
    pub title: String,
    /// Stanzas joined by blank lines.
    pub lyrics: String,
    /// Set when the stanza counters did not line up.
    pub warning: Option<ConsistencyWarning>,
}

/// Join the stanza rows of the first hymn in `rows`.
///
/// Rows are read in order while the title matches the first row and stop at
/// the row whose `number` equals its `total`. Whatever was read is returned
/// even when the counters disagree; the disagreement is reported through
/// [`HymnAssembly::warning`].
pub fn assemble_hymn(rows: &[HymnStanzaRow]) -> Lookup<HymnAssembly> {
    let Some(first) = rows.first() else {
        return Lookup::NotFound;
    };

    let mut lyrics = String::new();
    let mut last = (0u32, 0u32);
    for row in rows.iter().take_while(|row| row.title == first.title) {
        let text = row.text.trim_matches(|c| c == '\n' || c == '\r');
        if !text.trim().is_empty() {
            if !lyrics.is_empty() {
                lyrics.push_str("\n\n");
            }
            lyrics.push_str(text);
        }
        last = (row.number, row.total);
        if row.number == row.total {
            break;
        }
    }

    if lyrics.is_empty() {
        log::debug!("Hymn {:?} has no stanza text", first.title);
        return Lookup::NotFound;
    }

    let warning = (last.0 != last.1).then(|| ConsistencyWarning {
        found: last.0,
        expected: last.1,
    });
    if let Some(warning) = warning {
        log::warn!("{} for {:?}", warning, first.title);
    }

    Lookup::Found(HymnAssembly {
        title: first.title.clone(),
        lyrics,
        warning,
    })
}
