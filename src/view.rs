//! Strided matrix views over scalar slices.
//!
//! Coefficient `(i, j)` of a view lives at `data[i * row_stride + j * col_stride]`.
//! Constructors check that every addressed coefficient is inside the slice, so
//! the driver can hand the raw slice and a leading dimension to the packers.

use crate::error::{buffer_error, overlap_error, Result};

/// How a view maps onto a packer source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    /// Unit row stride; the payload is the column stride.
    ColMajor(usize),
    /// Unit column stride; the payload is the row stride.
    RowMajor(usize),
    /// Anything else.
    Strided,
}

/// Number of scalars a `rows × cols` view with the given strides spans.
fn required_len(rows: usize, cols: usize, row_stride: usize, col_stride: usize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        return Some(0);
    }
    (rows - 1)
        .checked_mul(row_stride)?
        .checked_add((cols - 1).checked_mul(col_stride)?)?
        .checked_add(1)
}

fn check_len(
    len: usize,
    rows: usize,
    cols: usize,
    row_stride: usize,
    col_stride: usize,
) -> Result<()> {
    match required_len(rows, cols, row_stride, col_stride) {
        Some(required) if required <= len => Ok(()),
        Some(required) => Err(buffer_error(
            required,
            len,
            format!(
                "{}x{} view with strides ({}, {})",
                rows, cols, row_stride, col_stride
            ),
        )),
        None => Err(buffer_error(
            usize::MAX,
            len,
            format!(
                "{}x{} view with strides ({}, {}) overflows usize",
                rows, cols, row_stride, col_stride
            ),
        )),
    }
}

/// `true` when two distinct coefficients share an address.
fn self_overlapping(rows: usize, cols: usize, row_stride: usize, col_stride: usize) -> bool {
    if rows == 0 || cols == 0 {
        return false;
    }
    let ((inner_n, inner_s), (outer_n, outer_s)) = if row_stride <= col_stride {
        ((rows, row_stride), (cols, col_stride))
    } else {
        ((cols, col_stride), (rows, row_stride))
    };
    (inner_n > 1 && inner_s == 0) || (outer_n > 1 && (inner_n - 1) * inner_s >= outer_s)
}

fn classify(rows: usize, cols: usize, row_stride: usize, col_stride: usize) -> Layout {
    if rows <= 1 || row_stride == 1 {
        Layout::ColMajor(if cols <= 1 { rows.max(1) } else { col_stride })
    } else if cols <= 1 || col_stride == 1 {
        Layout::RowMajor(row_stride)
    } else {
        Layout::Strided
    }
}

/// Read-only `rows × cols` view.
#[derive(Copy, Clone, Debug)]
pub struct MatRef<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    row_stride: usize,
    col_stride: usize,
}

impl<'a, T: Copy> MatRef<'a, T> {
    /// Column-major view with leading dimension `rows`.
    pub fn from_col_major(data: &'a [T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_strided(data, rows, cols, 1, rows)
    }

    /// Row-major view with leading dimension `cols`.
    pub fn from_row_major(data: &'a [T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_strided(data, rows, cols, cols, 1)
    }

    /// View with arbitrary strides. Strides may overlap (e.g. a zero stride
    /// broadcasts a row or column).
    pub fn from_strided(
        data: &'a [T],
        rows: usize,
        cols: usize,
        row_stride: usize,
        col_stride: usize,
    ) -> Result<Self> {
        check_len(data.len(), rows, cols, row_stride, col_stride)?;
        Ok(Self {
            data,
            rows,
            cols,
            row_stride,
            col_stride,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(row_stride, col_stride)`.
    pub fn strides(&self) -> (usize, usize) {
        (self.row_stride, self.col_stride)
    }

    /// Coefficient `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    pub fn coeff(&self, i: usize, j: usize) -> T {
        assert!(
            i < self.rows && j < self.cols,
            "({i}, {j}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        self.data[i * self.row_stride + j * self.col_stride]
    }

    /// The same coefficients seen as a `cols × rows` matrix.
    pub fn transpose(self) -> Self {
        Self {
            data: self.data,
            rows: self.cols,
            cols: self.rows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    /// Backing slice, starting at coefficient `(0, 0)`.
    pub(crate) fn data(&self) -> &'a [T] {
        self.data
    }

    pub(crate) fn layout(&self) -> Layout {
        classify(self.rows, self.cols, self.row_stride, self.col_stride)
    }

    /// Copies the coefficients into a dense column-major buffer.
    pub fn to_col_major_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.rows * self.cols);
        for j in 0..self.cols {
            out.extend((0..self.rows).map(|i| self.data[i * self.row_stride + j * self.col_stride]));
        }
        out
    }
}

/// Mutable `rows × cols` view. Distinct coefficients never share storage.
#[derive(Debug)]
pub struct MatMut<'a, T> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    row_stride: usize,
    col_stride: usize,
}

impl<'a, T: Copy> MatMut<'a, T> {
    /// Column-major view with leading dimension `rows`.
    pub fn from_col_major(data: &'a mut [T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_strided(data, rows, cols, 1, rows)
    }

    /// Row-major view with leading dimension `cols`.
    pub fn from_row_major(data: &'a mut [T], rows: usize, cols: usize) -> Result<Self> {
        Self::from_strided(data, rows, cols, cols, 1)
    }

    /// View with arbitrary non-overlapping strides.
    pub fn from_strided(
        data: &'a mut [T],
        rows: usize,
        cols: usize,
        row_stride: usize,
        col_stride: usize,
    ) -> Result<Self> {
        check_len(data.len(), rows, cols, row_stride, col_stride)?;
        if self_overlapping(rows, cols, row_stride, col_stride) {
            return Err(overlap_error(format!(
                "{}x{} view with strides ({}, {})",
                rows, cols, row_stride, col_stride
            )));
        }
        Ok(Self {
            data,
            rows,
            cols,
            row_stride,
            col_stride,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(row_stride, col_stride)`.
    pub fn strides(&self) -> (usize, usize) {
        (self.row_stride, self.col_stride)
    }

    /// Coefficient `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    pub fn coeff(&self, i: usize, j: usize) -> T {
        self.rb().coeff(i, j)
    }

    /// Overwrites coefficient `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(
            i < self.rows && j < self.cols,
            "({i}, {j}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        self.data[i * self.row_stride + j * self.col_stride] = value;
    }

    /// Read-only reborrow.
    pub fn rb(&self) -> MatRef<'_, T> {
        MatRef {
            data: &*self.data,
            rows: self.rows,
            cols: self.cols,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }

    /// The same coefficients seen as a `cols × rows` matrix.
    pub fn transpose(self) -> Self {
        Self {
            data: self.data,
            rows: self.cols,
            cols: self.rows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    pub(crate) fn layout(&self) -> Layout {
        classify(self.rows, self.cols, self.row_stride, self.col_stride)
    }

    /// Backing slice, starting at coefficient `(0, 0)`.
    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Copies a dense column-major buffer back into the view.
    pub(crate) fn copy_from_col_major(&mut self, src: &[T]) {
        for j in 0..self.cols {
            for i in 0..self.rows {
                self.data[i * self.row_stride + j * self.col_stride] = src[j * self.rows + i];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GebpError;

    #[test]
    fn test_col_and_row_major_agree() {
        let col = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
        let row = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let a = MatRef::from_col_major(&col, 2, 3).unwrap();
        let b = MatRef::from_row_major(&row, 2, 3).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(a.coeff(i, j), b.coeff(i, j));
            }
        }
        assert_eq!(a.to_col_major_vec(), col);
        assert_eq!(b.to_col_major_vec(), col);
        assert_eq!(b.transpose().to_col_major_vec(), row);
        assert_eq!(a.strides(), (1, 2));
        assert_eq!(b.strides(), (3, 1));
        assert_eq!(b.transpose().strides(), (1, 3));
    }

    #[test]
    fn test_too_small_buffer_is_rejected() {
        let data = [0.0f32; 5];
        let err = MatRef::from_col_major(&data, 2, 3).unwrap_err();
        assert_eq!(
            err,
            GebpError::BufferTooSmall {
                required: 6,
                actual: 5,
                message: "2x3 view with strides (1, 2)".to_string(),
            }
        );
        // Padded leading dimension: the last column need not be padded.
        assert!(MatRef::from_strided(&data, 2, 2, 1, 3).is_ok());
        assert!(MatRef::<f32>::from_col_major(&[], 0, 7).is_ok());
    }

    #[test]
    fn test_overlap_detection() {
        let mut data = [0.0f64; 16];
        assert!(MatMut::from_strided(&mut data, 4, 4, 1, 4).is_ok());
        assert!(MatMut::from_strided(&mut data, 4, 4, 4, 1).is_ok());
        assert!(MatMut::from_strided(&mut data, 2, 3, 2, 5).is_ok());
        assert!(matches!(
            MatMut::from_strided(&mut data, 4, 3, 1, 3),
            Err(GebpError::OverlappingView { .. })
        ));
        assert!(matches!(
            MatMut::from_strided(&mut data, 3, 2, 0, 1),
            Err(GebpError::OverlappingView { .. })
        ));
        // A zero stride is harmless along a dimension of extent 1.
        assert!(MatMut::from_strided(&mut data, 1, 4, 0, 2).is_ok());

        // Read-only views may broadcast.
        assert!(MatRef::from_strided(&data, 3, 2, 0, 1).is_ok());
    }

    #[test]
    fn test_layout_classification() {
        let data = [0.0f32; 64];
        let view = |r, c, rs, cs| MatRef::from_strided(&data, r, c, rs, cs).unwrap().layout();
        assert_eq!(view(4, 3, 1, 6), Layout::ColMajor(6));
        assert_eq!(view(4, 3, 5, 1), Layout::RowMajor(5));
        assert_eq!(view(4, 3, 2, 9), Layout::Strided);
        assert_eq!(view(1, 5, 7, 3), Layout::ColMajor(3));
        assert_eq!(view(5, 1, 3, 2), Layout::RowMajor(3));
        assert_eq!(view(1, 1, 9, 9), Layout::ColMajor(1));
    }

    #[test]
    fn test_mat_mut_set_and_copy_back() {
        let mut data = [0i32; 6];
        {
            let mut view = MatMut::from_row_major(&mut data, 2, 3).unwrap();
            view.set(1, 2, 7);
            assert_eq!(view.coeff(1, 2), 7);
            view.copy_from_col_major(&[1, 4, 2, 5, 3, 6]);
        }
        assert_eq!(data, [1, 2, 3, 4, 5, 6]);
    }
}
