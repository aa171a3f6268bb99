//! §6.2 versioning: `ftml_version` gate, checked before the rest of the
//! pipeline runs (spec §7: "Version errors are fatal and raised before
//! other processing").

use crate::error::VersionError;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Alpha,
    Beta,
    Rc,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub stage: Stage,
}

impl Version {
    pub const fn release(major: u32, minor: u32) -> Self {
        Self { major, minor, stage: Stage::Release }
    }

    /// Parses `MAJOR.MINOR` optionally suffixed by `(a|b|rc)N`.
    pub fn parse(text: &str, pos: Position) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat { pos, text: text.to_string() };

        let mut rest = text;
        let stage_start = rest.find(|c: char| c == 'a' || c == 'b' || c == 'r');
        let (numeric, stage) = match stage_start {
            Some(idx) if idx > 0 => {
                let (num, suffix) = rest.split_at(idx);
                let stage = if let Some(n) = suffix.strip_prefix("rc") {
                    if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid());
                    }
                    Stage::Rc
                } else if let Some(n) = suffix.strip_prefix('a') {
                    if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid());
                    }
                    Stage::Alpha
                } else if let Some(n) = suffix.strip_prefix('b') {
                    if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid());
                    }
                    Stage::Beta
                } else {
                    return Err(invalid());
                };
                (num, stage)
            }
            _ => {
                rest = text;
                (rest, Stage::Release)
            }
        };

        let mut parts = numeric.splitn(2, '.');
        let major = parts.next().ok_or_else(invalid)?;
        let minor = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        let major: u32 = major.parse().map_err(|_| invalid())?;
        let minor: u32 = minor.parse().map_err(|_| invalid())?;
        Ok(Self { major, minor, stage })
    }

    /// True if a parser at `self` can read a document declaring `doc`.
    pub fn is_compatible_with(&self, doc: &Version) -> bool {
        if doc.major != self.major {
            return doc.major < self.major;
        }
        if doc.minor != self.minor {
            return doc.minor < self.minor;
        }
        doc.stage <= self.stage
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        match self.stage {
            Stage::Alpha => write!(f, "a"),
            Stage::Beta => write!(f, "b"),
            Stage::Rc => write!(f, "rc"),
            Stage::Release => Ok(()),
        }
    }
}

/// The version this crate's parser implements.
pub const PARSER_VERSION: Version = Version::release(1, 0);

/// Checks `ftml_version` (if present) against [`PARSER_VERSION`].
/// Absence implies compatibility (spec §6.2).
#[tracing::instrument(level = "debug")]
pub fn check_compatibility(declared: Option<(&str, Position)>) -> Result<(), VersionError> {
    let Some((text, pos)) = declared else {
        return Ok(());
    };
    let doc_version = Version::parse(text, pos)?;
    if PARSER_VERSION.is_compatible_with(&doc_version) {
        Ok(())
    } else {
        Err(VersionError::Incompatible {
            doc: doc_version.to_string(),
            parser: PARSER_VERSION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0", 1, 0, Stage::Release)]
    #[case("2.3rc1", 2, 3, Stage::Rc)]
    #[case("0.1a2", 0, 1, Stage::Alpha)]
    #[case("0.1b9", 0, 1, Stage::Beta)]
    fn parses(#[case] text: &str, #[case] major: u32, #[case] minor: u32, #[case] stage: Stage) {
        let v = Version::parse(text, Position::start()).unwrap();
        assert_eq!(v.major, major);
        assert_eq!(v.minor, minor);
        assert_eq!(v.stage, stage);
    }

    #[test]
    fn gate_rejects_newer_major() {
        let err = check_compatibility(Some(("2.0", Position::start()))).unwrap_err();
        assert!(matches!(err, VersionError::Incompatible { .. }));
    }

    #[test]
    fn gate_accepts_absent() {
        assert!(check_compatibility(None).is_ok());
    }

    #[test]
    fn stage_ordering() {
        assert!(Stage::Alpha < Stage::Beta);
        assert!(Stage::Beta < Stage::Rc);
        assert!(Stage::Rc < Stage::Release);
    }
}
