//! Cosmetic decorations scattered over floor surfaces

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::sim::PlacementConfig;
use crate::streaming::{GRASS_MODEL, ROCK_MODEL};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Rock,
    Grass,
}

impl DecorationKind {
    pub fn model(self) -> &'static str {
        match self {
            DecorationKind::Rock => ROCK_MODEL,
            DecorationKind::Grass => GRASS_MODEL,
        }
    }

    pub fn scale(self, config: &PlacementConfig) -> f32 {
        match self {
            DecorationKind::Rock => config.rock_scale,
            DecorationKind::Grass => config.grass_scale,
        }
    }
}

/// One decoration to place, relative to its surface's center.
#[derive(Clone, Debug, PartialEq)]
pub struct DecorationSpawn {
    pub kind: DecorationKind,
    pub offset: Vec3,
    pub scale: f32,
}

/// Pick a random count of decorations with random kinds and positions
/// uniformly inside `extent`, resting on the surface.
pub fn scatter<R: Rng>(rng: &mut R, extent: Vec2, config: &PlacementConfig) -> Vec<DecorationSpawn> {
    let max = config.decoration_max.max(config.decoration_min);
    let count = rng.gen_range(config.decoration_min..=max);

    (0..count)
        .map(|_| {
            let kind = if rng.gen_bool(0.5) {
                DecorationKind::Rock
            } else {
                DecorationKind::Grass
            };
            // gen::<f32>() is in [0, 1); a degenerate extent still yields the center
            let x = (rng.r#gen::<f32>() - 0.5) * extent.x;
            let z = (rng.r#gen::<f32>() - 0.5) * extent.y;
            DecorationSpawn {
                kind,
                offset: Vec3::new(x, 0.0, z),
                scale: kind.scale(config),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scatter_count_and_bounds() {
        let config = PlacementConfig::default();
        let extent = Vec2::new(2.0, 1.0);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let spawns = scatter(&mut rng, extent, &config);
            assert!((5..=8).contains(&spawns.len()));
            for s in &spawns {
                assert!(s.offset.x.abs() <= 1.0 && s.offset.z.abs() <= 0.5);
                assert_eq!(s.offset.y, 0.0);
                assert_eq!(s.scale, s.kind.scale(&config));
            }
        }
    }

    #[test]
    fn test_scatter_uses_both_kinds() {
        let config = PlacementConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let kinds: Vec<_> = (0..20)
            .flat_map(|_| scatter(&mut rng, Vec2::ONE, &config))
            .map(|s| s.kind)
            .collect();
        assert!(kinds.contains(&DecorationKind::Rock));
        assert!(kinds.contains(&DecorationKind::Grass));
    }

    #[test]
    fn test_zero_extent_is_safe() {
        let config = PlacementConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let spawns = scatter(&mut rng, Vec2::ZERO, &config);
        assert!(spawns.iter().all(|s| s.offset == Vec3::ZERO));
    }

    #[test]
    fn test_fixed_scales() {
        let config = PlacementConfig::default();
        assert_eq!(DecorationKind::Rock.scale(&config), 0.0007);
        assert_eq!(DecorationKind::Grass.scale(&config), 0.008);
    }
}
