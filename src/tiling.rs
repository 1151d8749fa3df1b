//! Row bands and column tiles shared by the packers and the kernel.
//!
//! The packed layout and the kernel's traversal must agree exactly, so both
//! sides walk the same iterators instead of recomputing the split.

/// One row tile of the left operand / result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowBand {
    /// `mr` rows starting at `start`.
    Full { start: usize },
    /// One packet (`LANES` rows) starting at `start`.
    Packet { start: usize },
    /// A single trailing row.
    Single { row: usize },
}

impl RowBand {
    /// First row of the band.
    #[inline(always)]
    pub fn start(self) -> usize {
        match self {
            RowBand::Full { start } | RowBand::Packet { start } => start,
            RowBand::Single { row } => row,
        }
    }

    /// Number of rows in the band.
    #[inline(always)]
    pub fn height(self, mr: usize, lanes: usize) -> usize {
        match self {
            RowBand::Full { .. } => mr,
            RowBand::Packet { .. } => lanes,
            RowBand::Single { .. } => 1,
        }
    }
}

/// Iterator over the bands of `rows` rows: full tiles, at most one packet
/// tile, then single rows.
#[derive(Clone, Debug)]
pub struct RowBands {
    next: usize,
    rows: usize,
    mr: usize,
    lanes: usize,
    peeled_mc: usize,
    peeled_mc2: usize,
}

/// Splits `rows` into bands for tile height `mr` and packet width `lanes`.
#[inline(always)]
pub fn row_bands(rows: usize, mr: usize, lanes: usize) -> RowBands {
    debug_assert!(lanes > 0 && mr >= lanes && mr % lanes == 0);
    let peeled_mc = (rows / mr) * mr;
    let peeled_mc2 = peeled_mc + if rows - peeled_mc >= lanes { lanes } else { 0 };
    RowBands {
        next: 0,
        rows,
        mr,
        lanes,
        peeled_mc,
        peeled_mc2,
    }
}

impl Iterator for RowBands {
    type Item = RowBand;

    #[inline(always)]
    fn next(&mut self) -> Option<RowBand> {
        let start = self.next;
        if start < self.peeled_mc {
            self.next += self.mr;
            Some(RowBand::Full { start })
        } else if start < self.peeled_mc2 {
            self.next += self.lanes;
            Some(RowBand::Packet { start })
        } else if start < self.rows {
            self.next += 1;
            Some(RowBand::Single { row: start })
        } else {
            None
        }
    }
}

/// One column tile of the right operand / result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColTile {
    /// `nr` columns starting at `start`.
    Full { start: usize },
    /// A single trailing column.
    Single { col: usize },
}

impl ColTile {
    /// First column of the tile.
    #[inline(always)]
    pub fn start(self) -> usize {
        match self {
            ColTile::Full { start } => start,
            ColTile::Single { col } => col,
        }
    }

    /// Number of columns in the tile.
    #[inline(always)]
    pub fn width(self, nr: usize) -> usize {
        match self {
            ColTile::Full { .. } => nr,
            ColTile::Single { .. } => 1,
        }
    }
}

/// Iterator over the column tiles of `cols` columns.
#[derive(Clone, Debug)]
pub struct ColTiles {
    next: usize,
    cols: usize,
    nr: usize,
    packet_cols: usize,
}

/// Splits `cols` into full `nr`-wide tiles followed by single columns.
#[inline(always)]
pub fn col_tiles(cols: usize, nr: usize) -> ColTiles {
    debug_assert!(nr > 0);
    ColTiles {
        next: 0,
        cols,
        nr,
        packet_cols: (cols / nr) * nr,
    }
}

impl Iterator for ColTiles {
    type Item = ColTile;

    #[inline(always)]
    fn next(&mut self) -> Option<ColTile> {
        let start = self.next;
        if start < self.packet_cols {
            self.next += self.nr;
            Some(ColTile::Full { start })
        } else if start < self.cols {
            self.next += 1;
            Some(ColTile::Single { col: start })
        } else {
            None
        }
    }
}
