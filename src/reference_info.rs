//! Biographical text that grounds every reply about the subject.
//!
//! Loaded once at startup from the first readable candidate file, falling back
//! to a built-in description when none exists.

use log::{info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Candidate locations tried after any explicitly configured path.
pub const DEFAULT_CANDIDATES: &[&str] = &["re.txt", "../re.txt"];

pub const DEFAULT_REFERENCE_INFO: &str = "Bejawada Sai Mahendra is a young, brilliant student developer who is passionate about technology and innovation. \
He's a god-tier programmer with exceptional talent for coding and problem-solving. Currently pursuing BTech CSE 4th year \
and BBA 2nd year at KLEF with excellent academics (CSE CGPA: 9.45, BBA CGPA: 8.5). \
Skills include C, Java, Python, React.js, Express.js, sql and what not. Notable projects include Skillcert (full-stack microservices) \
and Generative AI realtime video integration and more. He loves anime and is always exploring new technologies.";

/// Where the loaded text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoSource {
    File(PathBuf),
    BuiltIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceInfo {
    text: String,
    source: InfoSource,
}

impl ReferenceInfo {
    pub fn new(text: impl Into<String>) -> Self {
        ReferenceInfo {
            text: text.into(),
            source: InfoSource::BuiltIn,
        }
    }

    pub fn built_in() -> Self {
        Self::new(DEFAULT_REFERENCE_INFO)
    }

    /// Tries `configured` first, then each default candidate. Unreadable or
    /// empty files are skipped.
    pub fn load(configured: Option<&str>) -> Self {
        let candidates = configured
            .into_iter()
            .chain(DEFAULT_CANDIDATES.iter().copied())
            .map(PathBuf::from);
        Self::load_from(candidates)
    }

    pub fn load_from<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        for path in candidates {
            match read_candidate(&path) {
                Ok(Some(text)) => {
                    info!("Loaded reference info from {}", path.display());
                    return ReferenceInfo {
                        text,
                        source: InfoSource::File(path),
                    };
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!("Could not read reference info from {}: {}", path.display(), e);
                }
            }
        }

        warn!("No reference info file found, using built-in default");
        Self::built_in()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &InfoSource {
        &self.source
    }
}

fn read_candidate(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sai-bot-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_falls_back_to_built_in() {
        let dir = scratch_dir("missing");
        let info = ReferenceInfo::load_from(vec![dir.join("nope.txt"), dir.join("also-nope.txt")]);

        assert_eq!(info.source(), &InfoSource::BuiltIn);
        assert!(info.text().contains("Sai Mahendra"));
    }

    #[test]
    fn test_first_readable_candidate_wins() {
        let dir = scratch_dir("first");
        let first = dir.join("first.txt");
        let second = dir.join("second.txt");
        std::fs::write(&first, "  First bio.\n").unwrap();
        std::fs::write(&second, "Second bio.").unwrap();

        let info = ReferenceInfo::load_from(vec![dir.join("missing.txt"), first.clone(), second]);

        assert_eq!(info.text(), "First bio.");
        assert_eq!(info.source(), &InfoSource::File(first));
    }

    #[test]
    fn test_empty_file_is_skipped() {
        let dir = scratch_dir("empty");
        let empty = dir.join("empty.txt");
        let real = dir.join("real.txt");
        std::fs::write(&empty, "   \n").unwrap();
        std::fs::write(&real, "Real bio.").unwrap();

        let info = ReferenceInfo::load_from(vec![empty, real]);
        assert_eq!(info.text(), "Real bio.");
    }

    #[test]
    fn test_directory_candidate_is_skipped() {
        let dir = scratch_dir("dir");
        let info = ReferenceInfo::load_from(vec![dir.clone()]);
        assert_eq!(info.source(), &InfoSource::BuiltIn);
    }
}
