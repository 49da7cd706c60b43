use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a simulated work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Draw a new id from the given random source.
    ///
    /// Ids come from the simulation RNG rather than the OS so that a seeded
    /// run replays the same ids.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; 16] = rng.gen();
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point in the line layout coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cube category assigned at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeColor {
    Red,
    Blue,
    Green,
    Defected,
}

impl CubeColor {
    pub const ALL: [CubeColor; 4] = [
        CubeColor::Red,
        CubeColor::Blue,
        CubeColor::Green,
        CubeColor::Defected,
    ];

    /// Uniform draw over all categories
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Lower-case name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CubeColor::Red => "red",
            CubeColor::Blue => "blue",
            CubeColor::Green => "green",
            CubeColor::Defected => "defected",
        }
    }
}

impl std::fmt::Display for CubeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named position in the sorting pipeline.
///
/// Variants are declared in pipeline order, so `Ord` follows the flow of a
/// cube through the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Entry capacitor (CAP3)
    Entry,
    /// Horizontal conveyor (CONV1)
    ConveyorA,
    /// Transfer point between conveyors (CAP2)
    Junction,
    /// Vertical conveyor (CONV2)
    ConveyorB,
    /// Camera detection point (CAP1)
    Detection,
    /// Robot picking the cube up
    Pickup,
    /// Robot carrying the cube to its basket
    Sorting,
    /// Cube placed in its basket
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Entry,
        Stage::ConveyorA,
        Stage::Junction,
        Stage::ConveyorB,
        Stage::Detection,
        Stage::Pickup,
        Stage::Sorting,
        Stage::Complete,
    ];

    /// Ordinal of the stage in the pipeline
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_stage_order_follows_pipeline() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
        assert!(Stage::Complete.is_terminal());
        assert!(!Stage::Detection.is_terminal());
    }

    #[test]
    fn test_item_ids_replay_with_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let first = ItemId::generate(&mut a);
        assert_eq!(first, ItemId::generate(&mut b));
        assert_ne!(first, ItemId::generate(&mut a));
    }

    #[test]
    fn test_color_draw_covers_all_categories() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(CubeColor::random(&mut rng));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let json = serde_json::to_string(&CubeColor::Defected).unwrap();
        assert_eq!(json, "\"defected\"");
        let stage = serde_json::to_string(&Stage::ConveyorA).unwrap();
        assert_eq!(stage, "\"conveyor_a\"");
    }
}
