//! Storage orders and strided coefficient access for packer sources.

use std::fmt::Debug;
use std::marker::PhantomData;

/// Where coefficient `(row, col)` lives relative to the start of a matrix with
/// leading dimension `stride`.
pub trait StorageOrder: Copy + Default + Debug + Send + Sync + 'static {
    /// `true` for row-major storage.
    const IS_ROW_MAJOR: bool;

    /// Linear offset of `(row, col)`.
    fn offset(row: usize, col: usize, stride: usize) -> usize;
}

/// Consecutive elements of a column are adjacent; `stride` separates columns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ColMajor;

/// Consecutive elements of a row are adjacent; `stride` separates rows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowMajor;

impl StorageOrder for ColMajor {
    const IS_ROW_MAJOR: bool = false;

    #[inline(always)]
    fn offset(row: usize, col: usize, stride: usize) -> usize {
        col * stride + row
    }
}

impl StorageOrder for RowMajor {
    const IS_ROW_MAJOR: bool = true;

    #[inline(always)]
    fn offset(row: usize, col: usize, stride: usize) -> usize {
        row * stride + col
    }
}

/// Read-only `(row, col)` access into a strided slice.
#[derive(Copy, Clone, Debug)]
pub struct DataMapper<'a, T, O> {
    data: &'a [T],
    stride: usize,
    _order: PhantomData<O>,
}

impl<'a, T: Copy, O: StorageOrder> DataMapper<'a, T, O> {
    /// Wraps `data` whose first element is coefficient `(0, 0)`.
    #[inline(always)]
    pub fn new(data: &'a [T], stride: usize) -> Self {
        Self {
            data,
            stride,
            _order: PhantomData,
        }
    }

    /// Whether every coefficient of a `rows × cols` window is inside the slice.
    pub fn covers(&self, rows: usize, cols: usize) -> bool {
        rows == 0 || cols == 0 || O::offset(rows - 1, cols - 1, self.stride) < self.data.len()
    }

    /// Coefficient `(row, col)` without bounds checks.
    ///
    /// # Safety
    ///
    /// `O::offset(row, col, stride)` must be less than the slice length.
    #[inline(always)]
    pub unsafe fn get(&self, row: usize, col: usize) -> T {
        *self.data.get_unchecked(O::offset(row, col, self.stride))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2x3 matrix
    // 1 2 3
    // 4 5 6
    const COL_MAJOR: [f32; 6] = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
    const ROW_MAJOR: [f32; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

    #[test]
    fn test_offsets() {
        assert_eq!(ColMajor::offset(1, 2, 2), 5);
        assert_eq!(RowMajor::offset(1, 2, 3), 5);
        assert_eq!(ColMajor::offset(0, 1, 7), 7);
        assert_eq!(RowMajor::offset(1, 0, 7), 7);
    }

    #[test]
    fn test_both_orders_read_the_same_matrix() {
        let col = DataMapper::<_, ColMajor>::new(&COL_MAJOR, 2);
        let row = DataMapper::<_, RowMajor>::new(&ROW_MAJOR, 3);
        for i in 0..2 {
            for j in 0..3 {
                unsafe { assert_eq!(col.get(i, j), row.get(i, j)) };
            }
        }
        assert_eq!(unsafe { col.get(1, 1) }, 5.0);
    }

    #[test]
    fn test_covers() {
        let col = DataMapper::<_, ColMajor>::new(&COL_MAJOR, 2);
        assert!(col.covers(2, 3));
        assert!(!col.covers(2, 4));
        assert!(col.covers(0, 100));

        // Padded leading dimension: a 2x2 window with stride 4 needs 6 elements.
        let padded = DataMapper::<_, ColMajor>::new(&COL_MAJOR, 4);
        assert!(padded.covers(2, 2));
        assert!(!padded.covers(3, 2));
    }
}
