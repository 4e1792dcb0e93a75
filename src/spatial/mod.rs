mod gid;

pub use gid::{Orientation, RawGid, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
