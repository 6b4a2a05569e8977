//! Grow-on-demand cache of terrain chunks keyed by chunk coordinate.
//!
//! Generation is synchronous and idempotent: at most one chunk ever exists per
//! coordinate. By default nothing is evicted and the cache grows as the player explores.
//! An [`EvictionStrategy`] can bound it; chunks inside the currently visible square are
//! never offered to the strategy.

use std::collections::HashMap;

use crate::heightfield::HeightField;
use crate::terrain::{visible_chunks, ChunkCoord, ChunkSettings, TerrainChunk};

/// Snapshot of a cached chunk offered to an eviction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionCandidate {
    pub coord: ChunkCoord,
    /// Cache clock value of the last frame this chunk was requested.
    pub last_used: u64,
    /// Chessboard distance (in chunks) from the player's chunk.
    pub distance: i32,
}

/// Decides which chunks to drop when the cache grows.
pub trait EvictionStrategy: Send {
    fn name(&self) -> &'static str;

    /// Most chunks the cache may hold before `select` is consulted. `None` never evicts.
    fn capacity(&self) -> Option<usize>;

    /// Pick coordinates to evict. `cached` is the total number of chunks in the cache;
    /// `candidates` are the ones outside the visible square.
    fn select(&mut self, cached: usize, candidates: &[EvictionCandidate]) -> Vec<ChunkCoord>;
}

/// Never evict (unbounded growth).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEviction;

impl EvictionStrategy for NoEviction {
    fn name(&self) -> &'static str {
        "none"
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn select(&mut self, _cached: usize, _candidates: &[EvictionCandidate]) -> Vec<ChunkCoord> {
        Vec::new()
    }
}

/// Over capacity, drop the chunks farthest from the player first.
#[derive(Debug, Clone, Copy)]
pub struct FarthestFirst {
    pub max_chunks: usize,
}

impl EvictionStrategy for FarthestFirst {
    fn name(&self) -> &'static str {
        "farthest-first"
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.max_chunks)
    }

    fn select(&mut self, cached: usize, candidates: &[EvictionCandidate]) -> Vec<ChunkCoord> {
        let excess = cached.saturating_sub(self.max_chunks);
        if excess == 0 {
            return Vec::new();
        }
        let mut sorted = candidates.to_vec();
        // Farthest first; ties broken by staleness then coordinate so results are stable.
        sorted.sort_by(|a, b| {
            b.distance
                .cmp(&a.distance)
                .then(a.last_used.cmp(&b.last_used))
                .then(a.coord.cmp(&b.coord))
        });
        sorted.into_iter().take(excess).map(|c| c.coord).collect()
    }
}

/// Over capacity, drop the chunks that have gone unrequested the longest.
#[derive(Debug, Clone, Copy)]
pub struct LeastRecentlyUsed {
    pub max_chunks: usize,
}

impl EvictionStrategy for LeastRecentlyUsed {
    fn name(&self) -> &'static str {
        "least-recently-used"
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.max_chunks)
    }

    fn select(&mut self, cached: usize, candidates: &[EvictionCandidate]) -> Vec<ChunkCoord> {
        let excess = cached.saturating_sub(self.max_chunks);
        if excess == 0 {
            return Vec::new();
        }
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| {
            a.last_used
                .cmp(&b.last_used)
                .then(b.distance.cmp(&a.distance))
                .then(a.coord.cmp(&b.coord))
        });
        sorted.into_iter().take(excess).map(|c| c.coord).collect()
    }
}

struct CachedChunk {
    chunk: TerrainChunk,
    last_used: u64,
}

/// Terrain chunk cache.
pub struct ChunkCache {
    settings: ChunkSettings,
    heights: HeightField,
    chunks: HashMap<ChunkCoord, CachedChunk>,
    strategy: Box<dyn EvictionStrategy>,
    /// Incremented once per `update`; stamps chunk usage for LRU.
    clock: u64,
    generated_total: u64,
}

impl ChunkCache {
    /// Create an empty cache that never evicts.
    pub fn new(settings: ChunkSettings, heights: HeightField) -> Self {
        Self {
            settings,
            heights,
            chunks: HashMap::new(),
            strategy: Box::new(NoEviction),
            clock: 0,
            generated_total: 0,
        }
    }

    /// Builder: replace the eviction strategy.
    pub fn with_strategy(mut self, strategy: Box<dyn EvictionStrategy>) -> Self {
        log::info!("Terrain chunk eviction: {}", strategy.name());
        self.strategy = strategy;
        self
    }

    pub fn settings(&self) -> &ChunkSettings {
        &self.settings
    }

    pub fn chunk_size(&self) -> f32 {
        self.settings.chunk_size
    }

    /// Generate the chunk at `coord` if it is not cached yet. Calling this again for
    /// the same coordinate only refreshes its usage stamp.
    pub fn ensure_chunk(&mut self, coord: ChunkCoord) -> &TerrainChunk {
        let clock = self.clock;
        let settings = self.settings;
        let heights = &self.heights;
        let generated = &mut self.generated_total;
        let entry = self.chunks.entry(coord).or_insert_with(|| {
            *generated += 1;
            CachedChunk {
                chunk: TerrainChunk::generate(coord, &settings, heights),
                last_used: clock,
            }
        });
        entry.last_used = clock;
        &entry.chunk
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord).map(|c| &c.chunk)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunk generations since creation (regenerations after eviction count).
    pub fn generated_total(&self) -> u64 {
        self.generated_total
    }

    /// Visible square around a world position, using this cache's chunk size.
    pub fn visible_chunks(&self, player_x: f32, player_z: f32, radius: i32) -> Vec<ChunkCoord> {
        visible_chunks(player_x, player_z, self.settings.chunk_size, radius)
    }

    /// Per-frame maintenance: ensure every visible chunk exists, then let the eviction
    /// strategy trim what lies outside the visible square. Returns evicted coordinates
    /// so callers can release anything derived from them (GPU buffers).
    pub fn update(&mut self, player_x: f32, player_z: f32, radius: i32) -> Vec<ChunkCoord> {
        self.clock += 1;
        let visible = self.visible_chunks(player_x, player_z, radius);
        for &coord in &visible {
            self.ensure_chunk(coord);
        }
        match self.strategy.capacity() {
            Some(max) if self.chunks.len() > max => {}
            _ => return Vec::new(),
        }

        let center = ChunkCoord::containing(player_x, player_z, self.settings.chunk_size);
        let radius = radius.max(0);
        let candidates: Vec<EvictionCandidate> = self
            .chunks
            .iter()
            .filter_map(|(&coord, cached)| {
                let distance = coord.chebyshev_distance(center);
                (distance > radius).then_some(EvictionCandidate {
                    coord,
                    last_used: cached.last_used,
                    distance,
                })
            })
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let victims = self.strategy.select(self.chunks.len(), &candidates);
        let mut evicted = Vec::with_capacity(victims.len());
        for coord in victims {
            // Strategies only see candidates, but never trust them with visible chunks.
            if coord.chebyshev_distance(center) <= radius {
                continue;
            }
            if self.chunks.remove(&coord).is_some() {
                evicted.push(coord);
            }
        }
        if !evicted.is_empty() {
            log::debug!(
                "Evicted {} terrain chunks ({} cached)",
                evicted.len(),
                self.chunks.len()
            );
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn cache() -> ChunkCache {
        ChunkCache::new(
            ChunkSettings {
                chunk_size: 40.0,
                resolution: 4,
            },
            HeightField::new(2024),
        )
    }

    #[test]
    fn ensure_chunk_is_idempotent() {
        let mut cache = cache();
        let first = cache.ensure_chunk(ChunkCoord::new(2, 3)).vertices.clone();
        let second = cache.ensure_chunk(ChunkCoord::new(2, 3)).vertices.clone();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.generated_total(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn get_misses_until_generated() {
        let mut cache = cache();
        assert!(cache.get(ChunkCoord::new(0, 0)).is_none());
        cache.ensure_chunk(ChunkCoord::new(0, 0));
        assert!(cache.get(ChunkCoord::new(0, 0)).is_some());
    }

    #[test]
    fn update_fills_the_visible_square() {
        let mut cache = cache();
        let evicted = cache.update(0.0, 0.0, 2);
        assert!(evicted.is_empty());
        assert_eq!(cache.len(), 25);
        for coord in cache.visible_chunks(0.0, 0.0, 2) {
            assert!(cache.contains(coord));
        }
    }

    #[test]
    fn default_cache_never_evicts() {
        let mut cache = cache();
        for step in 0..10 {
            cache.update(step as f32 * 40.0, 0.0, 1);
        }
        // 10 overlapping 3x3 windows sliding along x cover 12 columns of 3.
        assert_eq!(cache.len(), 36);
    }

    #[test]
    fn farthest_first_respects_capacity_and_keeps_visible() {
        let mut cache = cache().with_strategy(Box::new(FarthestFirst { max_chunks: 12 }));
        for step in 0..10 {
            cache.update(step as f32 * 40.0, 0.0, 1);
        }
        assert_eq!(cache.len(), 12);
        for coord in cache.visible_chunks(9.0 * 40.0, 0.0, 1) {
            assert!(cache.contains(coord), "visible chunk {:?} was evicted", coord);
        }
        // The origin column is the farthest away and must be gone.
        assert!(!cache.contains(ChunkCoord::new(-1, 0)));
    }

    #[test]
    fn lru_drops_stalest_chunks() {
        let mut cache = cache().with_strategy(Box::new(LeastRecentlyUsed { max_chunks: 9 }));
        cache.update(0.0, 0.0, 1);
        cache.update(40.0 * 5.0, 0.0, 1);
        assert_eq!(cache.len(), 9);
        assert!(!cache.contains(ChunkCoord::new(0, 0)));
        assert!(cache.contains(ChunkCoord::new(5, 0)));
    }

    #[test]
    fn evicted_chunk_regenerates_identically() {
        let mut cache = cache().with_strategy(Box::new(FarthestFirst { max_chunks: 1 }));
        let first = cache.ensure_chunk(ChunkCoord::new(0, 0)).vertices.clone();
        let evicted = cache.update(400.0, 400.0, 0);
        assert!(evicted.contains(&ChunkCoord::new(0, 0)));
        let again = cache.ensure_chunk(ChunkCoord::new(0, 0)).vertices.clone();
        assert_eq!(first, again);
        assert_eq!(cache.generated_total(), 3);
    }

    struct CountingStrategy {
        capacity: Option<usize>,
        calls: Arc<AtomicUsize>,
    }

    impl EvictionStrategy for CountingStrategy {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn capacity(&self) -> Option<usize> {
            self.capacity
        }

        fn select(&mut self, _cached: usize, _candidates: &[EvictionCandidate]) -> Vec<ChunkCoord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        }
    }

    #[test]
    fn strategy_is_not_consulted_within_capacity() {
        let unbounded = Arc::new(AtomicUsize::new(0));
        let mut cache = cache().with_strategy(Box::new(CountingStrategy {
            capacity: None,
            calls: unbounded.clone(),
        }));
        for step in 0..10 {
            cache.update(step as f32 * 40.0, 0.0, 1);
        }
        assert_eq!(unbounded.load(Ordering::SeqCst), 0);

        let roomy = Arc::new(AtomicUsize::new(0));
        let mut cache = self::cache().with_strategy(Box::new(CountingStrategy {
            capacity: Some(36),
            calls: roomy.clone(),
        }));
        for step in 0..10 {
            cache.update(step as f32 * 40.0, 0.0, 1);
        }
        assert_eq!(cache.len(), 36);
        assert_eq!(roomy.load(Ordering::SeqCst), 0);
        cache.update(10.0 * 40.0, 0.0, 1);
        assert_eq!(roomy.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn strategies_rank_candidates() {
        let candidates = [
            EvictionCandidate { coord: ChunkCoord::new(5, 0), last_used: 9, distance: 5 },
            EvictionCandidate { coord: ChunkCoord::new(2, 0), last_used: 1, distance: 2 },
            EvictionCandidate { coord: ChunkCoord::new(3, 0), last_used: 4, distance: 3 },
        ];
        let mut far = FarthestFirst { max_chunks: 8 };
        assert_eq!(far.select(10, &candidates), vec![ChunkCoord::new(5, 0), ChunkCoord::new(3, 0)]);
        let mut lru = LeastRecentlyUsed { max_chunks: 9 };
        assert_eq!(lru.select(10, &candidates), vec![ChunkCoord::new(2, 0)]);
        assert!(NoEviction.select(100, &candidates).is_empty());
        assert!(far.select(8, &candidates).is_empty());
    }
}
