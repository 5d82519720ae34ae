/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts, reveal counts and cell indices.
pub type CellCount = u16;

/// Row-major index of a cell, `y * width + x`.
pub type CellIndex = CellCount;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Converts a row-major index into coordinates, `None` when it falls outside `size`.
pub const fn index_to_coords(size: Coord2, index: CellIndex) -> Option<Coord2> {
    if size.0 == 0 || index >= mult(size.0, size.1) {
        return None;
    }
    let width = size.0 as CellCount;
    Some(((index % width) as Coord, (index / width) as Coord))
}

/// Converts coordinates into a row-major index, `None` when they fall outside `size`.
pub const fn coords_to_index(size: Coord2, coords: Coord2) -> Option<CellIndex> {
    if coords.0 >= size.0 || coords.1 >= size.1 {
        return None;
    }
    Some(coords.1 as CellIndex * size.0 as CellIndex + coords.0 as CellIndex)
}
