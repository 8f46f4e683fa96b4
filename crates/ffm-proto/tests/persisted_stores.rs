//! Persistence behavior of the token store and station registry across
//! simulated restarts (fresh store instances over the same directory).

use ffm_proto::stations::{derive_frequency, StationRegistry};
use ffm_proto::token::TokenStore;

#[test]
fn token_and_frequency_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let token = TokenStore::new(dir.path()).get_or_create().unwrap();
    let frequency = derive_frequency(&format!("alice{token}"));

    // "restart": everything rebuilt from disk
    let token_again = TokenStore::new(dir.path()).get_or_create().unwrap();
    assert_eq!(token, token_again);
    assert_eq!(frequency, derive_frequency(&format!("alice{token_again}")));
}

#[test]
fn registry_accumulates_stations() {
    let dir = tempfile::tempdir().unwrap();
    let registry = StationRegistry::new(dir.path());

    registry.upsert("alice", 91.0).unwrap();
    registry.upsert("bob", 103.4).unwrap();

    let stations = StationRegistry::new(dir.path()).list();
    assert_eq!(stations.len(), 2);
    assert_eq!(stations.get("alice"), Some(&91.0));
    assert_eq!(stations.get("bob"), Some(&103.4));
}
