//! Station registry and frequency derivation.
//!
//! A station is a name the user has broadcast under, paired with a display
//! frequency. The frequency is a pure function of `name + token`, so a
//! station shows the same dial position on every visit without asking the
//! server. The registry is one JSON object (`{name: frequency}`) persisted
//! under the data directory, rewritten whole on every upsert — there is a
//! single writer, the UI event loop.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

const STATIONS_FILE: &str = "stations.json";

/// Map a seed string onto the FM dial.
///
/// 32-bit Java-style string hash (`h = h*31 + unit` over UTF-16 code units,
/// two's-complement wraparound), folded into the 200 tenth-of-a-MHz slots
/// between 87.0 and 106.9. `unsigned_abs` keeps `i32::MIN` at 2^31 rather
/// than overflowing.
pub fn derive_frequency(seed: &str) -> f64 {
    let mut hash: i32 = 0;
    for unit in seed.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    f64::from(hash.unsigned_abs() % 200 + 870) / 10.0
}

pub struct StationRegistry {
    path: PathBuf,
}

impl StationRegistry {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATIONS_FILE),
        }
    }

    /// All known stations. Empty when nothing has been stored yet; a
    /// corrupt file is treated the same way rather than wedging startup.
    pub fn list(&self) -> BTreeMap<String, f64> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Ignoring unreadable station registry: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Record a station. Last write wins per name.
    pub fn upsert(&self, name: &str, frequency: f64) -> anyhow::Result<()> {
        let mut stations = self.list();
        stations.insert(name.to_string(), frequency);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&stations)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_is_deterministic() {
        let a = derive_frequency("alice5f2c1b3a-aaaa-4bbb-8ccc-123456789abc");
        let b = derive_frequency("alice5f2c1b3a-aaaa-4bbb-8ccc-123456789abc");
        assert_eq!(a, b);
    }

    #[test]
    fn test_frequency_range_and_step() {
        for seed in ["", "a", "alice", "Françoise", "bob-token", "🎙️"] {
            let f = derive_frequency(seed);
            assert!((87.0..=106.9).contains(&f), "{seed}: {f}");
            // tenth-of-a-MHz grid
            let tenths = f * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9, "{seed}: {f}");
        }
    }

    #[test]
    fn test_distinct_tokens_diverge() {
        let a = derive_frequency("alicetoken-one");
        let b = derive_frequency("alicetoken-two");
        assert_ne!(a, b);
    }

    #[test]
    fn test_known_vectors() {
        // h("a") = 97 -> 97 % 200 = 97 -> 96.7
        assert_eq!(derive_frequency("a"), 96.7);
        // h("") = 0 -> 87.0
        assert_eq!(derive_frequency(""), 87.0);
        // h("alice") = 92903040 -> % 200 = 40 -> 91.0
        assert_eq!(derive_frequency("alice"), 91.0);
    }

    #[test]
    fn test_registry_upsert_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let registry = StationRegistry::new(dir.path());
        assert!(registry.list().is_empty());

        registry.upsert("alice", 91.2).unwrap();
        assert_eq!(registry.list().get("alice"), Some(&91.2));

        // last write wins
        registry.upsert("alice", 95.0).unwrap();
        let stations = registry.list();
        assert_eq!(stations.get("alice"), Some(&95.0));
        assert_eq!(stations.len(), 1);
    }

    #[test]
    fn test_registry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        StationRegistry::new(dir.path()).upsert("bob", 99.9).unwrap();
        let reopened = StationRegistry::new(dir.path());
        assert_eq!(reopened.list().get("bob"), Some(&99.9));
    }
}
