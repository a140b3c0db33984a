use crate::{
    connectivity::analyzer::{ALGORITHM_VERSION, RegionRadii},
    foundation::core::Point3,
};

use super::*;

fn report(name: &str) -> RegionReport {
    RegionReport {
        map_name: name.to_string(),
        analysis_date: "2026-01-01T00:00:00+00:00".to_string(),
        algorithm_version: ALGORITHM_VERSION.to_string(),
        target_sample_count: 3,
        num_seeds: 2,
        points_per_seed: 2,
        radii: RegionRadii {
            global: 1000.0,
            reachable: 350.0,
        },
        num_components: 1,
        largest_region_size: 3,
        largest_region: vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
            Point3::new(0.0, 100.0, 5.0),
        ],
        all_component_scores: vec![3],
    }
}

#[test]
fn scene_key_is_last_path_component() {
    assert_eq!(cache_key_for_scene("/Game/Maps/Harbor"), "Harbor");
    assert_eq!(cache_key_for_scene("Harbor"), "Harbor");
    assert_eq!(cache_key_for_scene("maps/harbor/"), "harbor");
}

#[test]
fn memory_cache_hits_and_misses_on_version() {
    let mut cache = MemoryRegionCache::new();
    assert!(cache.get("a", ALGORITHM_VERSION).unwrap().is_none());

    cache.put("a", ALGORITHM_VERSION, &report("a")).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.get("a", ALGORITHM_VERSION).unwrap(),
        Some(report("a"))
    );
    assert!(cache.get("a", "other-version").unwrap().is_none());
}

#[test]
fn file_cache_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = JsonFileRegionCache::new(dir.path().join("cache"));
    assert!(cache.get("harbor", ALGORITHM_VERSION).unwrap().is_none());

    cache.put("harbor", ALGORITHM_VERSION, &report("harbor")).unwrap();
    let path = cache.entry_path("harbor");
    assert!(path.ends_with("navmesh_connectivity_harbor.json"));
    assert!(path.is_file());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"largestRegion\""));
    assert_eq!(
        cache.get("harbor", ALGORITHM_VERSION).unwrap(),
        Some(report("harbor"))
    );
}

#[test]
fn stale_version_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = JsonFileRegionCache::new(dir.path());
    cache.put("harbor", "seed-graph-v0", &report("harbor")).unwrap();
    assert!(cache.get("harbor", ALGORITHM_VERSION).unwrap().is_none());
}

#[test]
fn corrupt_entry_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let cache = JsonFileRegionCache::new(dir.path());
    std::fs::write(cache.entry_path("bad"), b"{ not json").unwrap();
    assert!(cache.get("bad", ALGORITHM_VERSION).unwrap().is_none());
}

#[test]
fn unsafe_key_characters_are_replaced() {
    let cache = JsonFileRegionCache::new("/tmp/x");
    let path = cache.entry_path("a b/c");
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "navmesh_connectivity_a_b_c.json"
    );
}

#[test]
fn clear_single_and_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = JsonFileRegionCache::new(dir.path());
    for key in ["a", "b", "c"] {
        cache.put(key, ALGORITHM_VERSION, &report(key)).unwrap();
    }
    std::fs::write(dir.path().join("unrelated.json"), b"{}").unwrap();

    assert_eq!(cache.clear(Some("a")).unwrap(), 1);
    assert_eq!(cache.clear(Some("a")).unwrap(), 0);
    assert_eq!(cache.clear(None).unwrap(), 2);
    assert!(dir.path().join("unrelated.json").is_file());
}

#[test]
fn clear_missing_dir_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let cache = JsonFileRegionCache::new(dir.path().join("never-created"));
    assert_eq!(cache.clear(None).unwrap(), 0);
}

#[test]
fn file_cache_keeps_coordinates_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = JsonFileRegionCache::new(dir.path());
    let mut original = report("precise");
    original.largest_region = vec![
        Point3::new(263.6864713132228, 1515.4744384567525, 0.1 + 0.2),
        Point3::new(1.0 / 3.0, -2.0f64.sqrt(), 1e-300),
        Point3::new(std::f64::consts::PI * 1e5, 5e-324, -0.0),
    ];
    original.largest_region_size = original.largest_region.len();
    cache.put("precise", ALGORITHM_VERSION, &original).unwrap();

    let back = cache.get("precise", ALGORITHM_VERSION).unwrap().unwrap();
    for (a, b) in original.largest_region.iter().zip(&back.largest_region) {
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.z.abs().to_bits(), b.z.abs().to_bits());
    }
}
