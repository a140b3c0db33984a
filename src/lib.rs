//! navtrack synthesizes camera motion tracks over a navigable 3D surface.
//!
//! Given a duration and frame rate it produces a timestamped sequence of camera poses that
//! explores the largest reachable part of a scene, mixing path-following roams with short
//! straight moves, idles and in-place turns.
//!
//! # Pipeline overview
//!
//! 1. **Analyze**: sample a seed graph through a [`NavigationOracle`] and keep the best-connected
//!    region ([`ConnectivityAnalyzer`]); reports are cached per scene ([`RegionCache`]).
//! 2. **Spawn**: pick a start point from the region ([`select_spawn`]).
//! 3. **Execute**: draw weighted behaviors until the frame budget is filled ([`BehaviorExecutor`]).
//! 4. **Assemble**: flatten accepted segments into a contiguous [`Timeline`].
//! 5. **Resample**: emit [`Keyframe`]s at a fixed frame interval, then unwrap and rate-limit
//!   rotations.
//!
//! [`generate_connectivity_region`], [`generate_motion_track`] and [`generate_batch`] run the
//! whole pipeline. Engine integrations implement [`NavigationOracle`]; [`GridNavMesh`] is a
//! self-contained implementation over a walkable cell grid.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Seeded**: a track is reproducible from its recorded seed against a deterministic oracle.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod behavior;
mod config;
mod connectivity;
mod foundation;
mod nav;
mod timeline;
mod track;

pub use behavior::executor::{BehaviorExecutor, ExecutionOutcome, StopReason};
pub use behavior::kind::{BehaviorKind, BehaviorWeights};
pub use behavior::primitives::BehaviorContext;
pub use behavior::segment::BehaviorSegment;
pub use config::{AnalyzerConfig, BehaviorConfig, CameraConfig, TrackConfig};
pub use connectivity::analyzer::{
    ALGORITHM_VERSION, ConnectivityAnalyzer, NavRegion, RegionAnalysis, RegionRadii,
    RegionReport, seed_count, target_sample_count,
};
pub use connectivity::cache::{
    JsonFileRegionCache, MemoryRegionCache, RegionCache, cache_key_for_scene,
};
pub use connectivity::spawn::{SpawnStrategy, fallback_connected_point, select as select_spawn};
pub use foundation::core::{Fps, Orientation, Point3, Pose, SceneBounds};
pub use foundation::error::{BehaviorFailure, NavTrackError, NavTrackResult};
pub use nav::grid::{GridNavMesh, GridSceneDef};
pub use nav::oracle::{NavigationOracle, wait_for_navigation_ready};
pub use timeline::assembler::{SegmentSpan, Timeline, TimelineAssembler};
pub use timeline::resample::{Keyframe, resample};
pub use timeline::sanitize::sanitize;
pub use track::{MotionTrack, generate_batch, generate_connectivity_region, generate_motion_track};
