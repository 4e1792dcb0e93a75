use crate::geom::Mirror;

/// Globally unique tile identity within a map. `TileId(0)` is "no tile".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TileId(pub u32);

pub const FLIP_H: u32 = 0x8000_0000; // bit 31
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits (bit 28 is free)

impl TileId {
    pub const EMPTY: TileId = TileId(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A GID as it appears in Tiled data: index plus flip bits packed in the top three bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawGid(pub u32);

impl RawGid {
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }

    #[inline]
    pub fn orientation(self) -> Orientation {
        Orientation::from_flags(self.flip_h(), self.flip_v(), self.flip_d())
    }
}

/// The eight visual orientations a tile reference can take.
///
/// Each variant corresponds to exactly one combination of the
/// flip-horizontal / flip-vertical / flip-diagonal flags, and each maps to
/// exactly one rotation + mirror pair for the copy primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// H=0 V=0 D=0
    #[default]
    Identity,
    /// H=1 V=0 D=1
    Rotate90,
    /// H=1 V=1 D=0
    Rotate180,
    /// H=0 V=1 D=1
    Rotate270,
    /// H=1 V=0 D=0
    FlipH,
    /// H=1 V=1 D=1
    Rotate90FlipH,
    /// H=0 V=1 D=0
    FlipV,
    /// H=0 V=0 D=1
    Transpose,
}

impl Orientation {
    pub const ALL: [Orientation; 8] = [
        Orientation::Identity,
        Orientation::Rotate90,
        Orientation::Rotate180,
        Orientation::Rotate270,
        Orientation::FlipH,
        Orientation::Rotate90FlipH,
        Orientation::FlipV,
        Orientation::Transpose,
    ];

    pub fn from_flags(h: bool, v: bool, d: bool) -> Self {
        match (h, v, d) {
            (false, false, false) => Orientation::Identity,
            (true, false, true) => Orientation::Rotate90,
            (true, true, false) => Orientation::Rotate180,
            (false, true, true) => Orientation::Rotate270,
            (true, false, false) => Orientation::FlipH,
            (true, true, true) => Orientation::Rotate90FlipH,
            (false, true, false) => Orientation::FlipV,
            (false, false, true) => Orientation::Transpose,
        }
    }

    /// `(h, v, d)` flags for this orientation.
    pub fn flags(self) -> (bool, bool, bool) {
        match self {
            Orientation::Identity => (false, false, false),
            Orientation::Rotate90 => (true, false, true),
            Orientation::Rotate180 => (true, true, false),
            Orientation::Rotate270 => (false, true, true),
            Orientation::FlipH => (true, false, false),
            Orientation::Rotate90FlipH => (true, true, true),
            Orientation::FlipV => (false, true, false),
            Orientation::Transpose => (false, false, true),
        }
    }

    /// Packs the flags back into the top bits of a Tiled GID.
    pub fn bits(self) -> u32 {
        let (h, v, d) = self.flags();
        (if h { FLIP_H } else { 0 }) | (if v { FLIP_V } else { 0 }) | (if d { FLIP_D } else { 0 })
    }

    /// Rotation in degrees and mirror mode to hand to the copy primitive.
    pub fn transform(self) -> (f32, Mirror) {
        match self {
            Orientation::Identity => (0.0, Mirror::None),
            Orientation::Rotate90 => (90.0, Mirror::None),
            Orientation::Rotate180 => (180.0, Mirror::None),
            Orientation::Rotate270 => (-90.0, Mirror::None),
            Orientation::FlipH => (0.0, Mirror::Horizontal),
            Orientation::Rotate90FlipH => (90.0, Mirror::Horizontal),
            Orientation::FlipV => (180.0, Mirror::Horizontal),
            Orientation::Transpose => (-90.0, Mirror::Horizontal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn transform_table_matches_flag_combinations() {
        let expected = [
            ((false, false, false), 0.0, Mirror::None),
            ((true, false, true), 90.0, Mirror::None),
            ((true, true, false), 180.0, Mirror::None),
            ((false, true, true), -90.0, Mirror::None),
            ((true, false, false), 0.0, Mirror::Horizontal),
            ((true, true, true), 90.0, Mirror::Horizontal),
            ((false, true, false), 180.0, Mirror::Horizontal),
            ((false, false, true), -90.0, Mirror::Horizontal),
        ];

        for ((h, v, d), rot, mirror) in expected {
            let o = Orientation::from_flags(h, v, d);
            assert_eq!(o.transform(), (rot, mirror), "flags {:?}", (h, v, d));
            assert_eq!(o.flags(), (h, v, d));
        }
    }

    #[test]
    fn orientation_is_a_bijection_over_flags() {
        let mut seen = HashSet::new();
        for bits in 0u8..8 {
            let o = Orientation::from_flags(bits & 4 != 0, bits & 2 != 0, bits & 1 != 0);
            assert!(seen.insert(o));
        }
        assert_eq!(seen.len(), Orientation::ALL.len());

        let transforms: HashSet<_> = Orientation::ALL
            .iter()
            .map(|o| {
                let (rot, mirror) = o.transform();
                (rot as i32, mirror)
            })
            .collect();
        assert_eq!(transforms.len(), 8);
    }

    #[test]
    fn raw_gid_strips_flip_bits() {
        let raw = RawGid(7 | FLIP_H | FLIP_D);
        assert_eq!(raw.clean(), 7);
        assert_eq!(raw.orientation(), Orientation::Rotate90);
        assert_eq!(raw.orientation().bits() | 7, raw.0);
    }
}
