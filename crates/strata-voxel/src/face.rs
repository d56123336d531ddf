//! The six axis-aligned block faces.

/// One of the six cardinal directions a block face can point.
///
/// The `repr(u8)` discriminant doubles as the bit index inside visibility
/// masks and as the column index of per-face lookup tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction ("right").
    PosX = 0,
    /// −X direction ("left").
    NegX = 1,
    /// +Y direction ("top").
    PosY = 2,
    /// −Y direction ("bottom").
    NegY = 3,
    /// +Z direction ("front").
    PosZ = 4,
    /// −Z direction ("back").
    NegZ = 5,
}

impl FaceDirection {
    /// All six directions in order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// The four horizontal directions.
    pub const HORIZONTAL: [FaceDirection; 4] = [Self::PosX, Self::NegX, Self::PosZ, Self::NegZ];

    /// Returns the unit normal as `[f32; 3]` for this face direction.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Returns the integer unit step `(dx, dy, dz)`.
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// Returns the neighbor coordinate offset for this direction.
    pub fn offset(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        let (dx, dy, dz) = self.delta();
        (x + dx, y + dy, z + dz)
    }

    /// Returns the opposite face direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Face name used as the atlas lookup key.
    pub fn name(self) -> &'static str {
        match self {
            Self::PosX => "right",
            Self::NegX => "left",
            Self::PosY => "top",
            Self::NegY => "bottom",
            Self::PosZ => "front",
            Self::NegZ => "back",
        }
    }

    /// Parses a face name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.name() == name)
    }

    /// Flat brightness multiplier baked into every vertex of this face.
    ///
    /// Top is brightest, bottom darkest, the Z sides brighter than the X sides.
    pub fn light_factor(self) -> f32 {
        match self {
            Self::PosY => 1.0,
            Self::NegY => 0.5,
            Self::PosZ | Self::NegZ => 0.8,
            Self::PosX | Self::NegX => 0.7,
        }
    }

    /// Returns `true` for the four horizontal faces.
    pub fn is_side(self) -> bool {
        !matches!(self, Self::PosY | Self::NegY)
    }
}
