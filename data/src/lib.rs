//! Builtin destination, behavior, and attack-pattern data for websim
//!
//! [`StaticTargetSource`] implements the core [`TargetSource`] trait over
//! fixed in-memory tables, optionally replacing the benign site list with
//! one loaded from a file (one URL per line, `#` for comments).

#![warn(missing_docs)]
#![warn(clippy::all)]

mod tables;

use rand::seq::SliceRandom;
use rand::RngCore;
use std::io::{self, BufRead};
use std::path::Path;
use websim_core::{AttackPattern, CompromiseBehavior, TargetSource};

use tables::{
    ATTACK_PATTERNS, C2_DOMAINS, COMPROMISE_BEHAVIORS, EXFIL_HOST, INTERNAL_HOST,
    MALICIOUS_DOMAINS, WEBSITES,
};

/// Target source over fixed in-memory tables
#[derive(Debug, Clone)]
pub struct StaticTargetSource {
    websites: Vec<String>,
    malicious: Vec<String>,
    c2: Vec<String>,
}

impl StaticTargetSource {
    /// Source backed by the builtin tables
    pub fn builtin() -> Self {
        Self {
            websites: WEBSITES.iter().map(|s| s.to_string()).collect(),
            malicious: MALICIOUS_DOMAINS.iter().map(|s| s.to_string()).collect(),
            c2: C2_DOMAINS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builtin source with the benign site list replaced by the contents of
    /// a site file.
    ///
    /// Fails when the file is unreadable or contains no sites; an empty
    /// destination list is a startup error, not something to paper over.
    pub fn from_site_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let sites = load_sites(path.as_ref())?;
        if sites.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no sites found in {}", path.as_ref().display()),
            ));
        }
        Ok(Self {
            websites: sites,
            ..Self::builtin()
        })
    }

    /// Number of benign destinations available
    pub fn website_count(&self) -> usize {
        self.websites.len()
    }

    /// Sample up to `count` distinct benign destinations, for connectivity
    /// self-tests.
    pub fn sample_benign(&self, rng: &mut dyn RngCore, count: usize) -> Vec<String> {
        self.websites
            .choose_multiple(rng, count.min(self.websites.len()))
            .cloned()
            .collect()
    }
}

impl TargetSource for StaticTargetSource {
    fn benign_target(&self, rng: &mut dyn RngCore) -> String {
        self.websites
            .choose(rng)
            .expect("builtin website table is non-empty")
            .clone()
    }

    fn malicious_target(&self, rng: &mut dyn RngCore) -> String {
        self.malicious
            .choose(rng)
            .expect("builtin malicious table is non-empty")
            .clone()
    }

    fn attack_pattern(&self, rng: &mut dyn RngCore) -> AttackPattern {
        let def = ATTACK_PATTERNS
            .choose(rng)
            .expect("builtin attack table is non-empty");
        AttackPattern {
            name: def.name.to_string(),
            payload: def
                .payloads
                .choose(rng)
                .expect("pattern payload pool is non-empty")
                .to_string(),
            field: def
                .fields
                .choose(rng)
                .expect("pattern field pool is non-empty")
                .to_string(),
        }
    }

    fn compromise_behavior(&self, rng: &mut dyn RngCore) -> CompromiseBehavior {
        let def = COMPROMISE_BEHAVIORS
            .choose(rng)
            .expect("builtin behavior table is non-empty");
        let target = match def.name {
            "credential_theft" => self.benign_target(rng),
            "data_exfiltration" => EXFIL_HOST.to_string(),
            "c2_communication" => self
                .c2
                .choose(rng)
                .expect("builtin c2 table is non-empty")
                .clone(),
            _ => {
                let path = def
                    .target_paths
                    .choose(rng)
                    .copied()
                    .unwrap_or("internal");
                format!("{}/{}", INTERNAL_HOST, path)
            }
        };
        CompromiseBehavior {
            name: def.name.to_string(),
            target,
            method: def
                .methods
                .choose(rng)
                .expect("behavior method pool is non-empty")
                .to_string(),
            indicator: def
                .indicators
                .choose(rng)
                .expect("behavior indicator pool is non-empty")
                .to_string(),
        }
    }
}

/// Read a site list from a file, ignoring blank lines and `#` comments.
pub fn load_sites(path: &Path) -> io::Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let mut sites = Vec::new();
    for line in io::BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        sites.push(line.to_string());
    }
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::io::Write;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_builtin_tables_are_populated() {
        let source = StaticTargetSource::builtin();
        assert!(source.website_count() > 50);
        let mut r = rng();
        assert!(source.benign_target(&mut r).starts_with("http"));
        assert!(source.malicious_target(&mut r).starts_with("http"));
    }

    #[test]
    fn test_attack_patterns_are_complete() {
        let source = StaticTargetSource::builtin();
        let mut r = rng();
        let mut names = HashSet::new();
        for _ in 0..200 {
            let pattern = source.attack_pattern(&mut r);
            assert!(!pattern.payload.is_empty());
            assert!(!pattern.field.is_empty());
            names.insert(pattern.name);
        }
        for expected in [
            "sql_injection",
            "xss",
            "directory_traversal",
            "command_injection",
        ] {
            assert!(names.contains(expected), "missing pattern {}", expected);
        }
    }

    #[test]
    fn test_all_five_behaviors_appear() {
        let source = StaticTargetSource::builtin();
        let mut r = rng();
        let mut names = HashSet::new();
        for _ in 0..300 {
            let behavior = source.compromise_behavior(&mut r);
            assert!(!behavior.method.is_empty());
            assert!(!behavior.indicator.is_empty());
            assert!(!behavior.target.is_empty());
            names.insert(behavior.name);
        }
        for expected in [
            "credential_theft",
            "data_exfiltration",
            "lateral_movement",
            "persistence",
            "c2_communication",
        ] {
            assert!(names.contains(expected), "missing behavior {}", expected);
        }
    }

    #[test]
    fn test_behavior_targets_match_their_kind() {
        let source = StaticTargetSource::builtin();
        let mut r = rng();
        for _ in 0..300 {
            let behavior = source.compromise_behavior(&mut r);
            match behavior.name.as_str() {
                "data_exfiltration" => assert_eq!(behavior.target, EXFIL_HOST),
                "lateral_movement" | "persistence" => {
                    assert!(behavior.target.starts_with(INTERNAL_HOST))
                }
                "c2_communication" => assert!(!behavior.target.starts_with("http")),
                "credential_theft" => assert!(behavior.target.starts_with("https://")),
                other => panic!("unexpected behavior {}", other),
            }
        }
    }

    #[test]
    fn test_sample_benign_is_distinct_and_bounded() {
        let source = StaticTargetSource::builtin();
        let mut r = rng();
        let sample = source.sample_benign(&mut r, 15);
        assert_eq!(sample.len(), 15);
        let distinct: HashSet<_> = sample.iter().collect();
        assert_eq!(distinct.len(), 15);

        let oversized = source.sample_benign(&mut r, 10_000);
        assert_eq!(oversized.len(), source.website_count());
    }

    #[test]
    fn test_load_sites_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# benign sites").unwrap();
        writeln!(file, "https://a.example").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  https://b.example  ").unwrap();
        writeln!(file, "# trailing comment").unwrap();

        let sites = load_sites(file.path()).unwrap();
        assert_eq!(sites, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_from_site_file_replaces_benign_list_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://only.example").unwrap();

        let source = StaticTargetSource::from_site_file(file.path()).unwrap();
        let mut r = rng();
        assert_eq!(source.benign_target(&mut r), "https://only.example");
        // Malicious tables are untouched
        assert!(source.malicious_target(&mut r).starts_with("http://"));
    }

    #[test]
    fn test_from_empty_site_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing but comments").unwrap();
        assert!(StaticTargetSource::from_site_file(file.path()).is_err());
    }
}
