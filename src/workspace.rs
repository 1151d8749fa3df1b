//! Packing buffers owned by one multiplication call (or one parallel task).

use std::alloc::{self, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::blocking::Blocking;
use crate::error::{blocking_error, Result};
use crate::kernel::unpacked_len;
use crate::scalar::Scalar;
use crate::NR;

/// Alignment of every packing buffer, in bytes. Matches a 256-bit register.
pub const ALIGNMENT: usize = 32;

/// Zero-initialised heap buffer aligned to [`ALIGNMENT`].
pub struct AlignedBuf<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

impl<T: Scalar> AlignedBuf<T> {
    /// Allocates `len` zeroed scalars.
    pub fn zeroed(len: usize) -> Result<Self> {
        let layout = Layout::array::<T>(len)
            .and_then(|layout| layout.align_to(ALIGNMENT))
            .map_err(|_| blocking_error(format!("buffer of {} scalars overflows", len)))?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len,
                layout,
            });
        }

        // Every `Scalar` is valid when all of its bytes are zero.
        let raw_ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = match NonNull::new(raw_ptr.cast::<T>()) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        };
        Ok(Self { ptr, len, layout })
    }
}

impl<T> Deref for AlignedBuf<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for AlignedBuf<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Drop for AlignedBuf<T> {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            unsafe {
                alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout);
            }
        }
    }
}

// The buffer uniquely owns its allocation.
unsafe impl<T: Send> Send for AlignedBuf<T> {}
unsafe impl<T: Sync> Sync for AlignedBuf<T> {}

/// The three buffers of the blocked loops: packed lhs block, packed rhs panel
/// and the broadcast scratch of the kernel.
pub struct Workspace<T> {
    pub(crate) lhs: AlignedBuf<T>,
    pub(crate) rhs: AlignedBuf<T>,
    pub(crate) unpacked: AlignedBuf<T>,
}

impl<T: Scalar> Workspace<T> {
    /// Buffers large enough for an `m × k` by `k × n` product under `blocking`.
    pub fn new(blocking: &Blocking, m: usize, k: usize, n: usize) -> Result<Self> {
        let mc = blocking.mc.min(m);
        let kc = blocking.kc.min(k);
        let nc = blocking.nc.min(n);
        Ok(Self {
            lhs: AlignedBuf::zeroed(mc * kc)?,
            rhs: AlignedBuf::zeroed(kc * nc)?,
            unpacked: AlignedBuf::zeroed(unpacked_len::<T::Packet, NR>(kc))?,
        })
    }

    /// Capacity of the packed lhs buffer, in scalars.
    pub fn lhs_len(&self) -> usize {
        self.lhs.len()
    }

    /// Capacity of the packed rhs buffer, in scalars.
    pub fn rhs_len(&self) -> usize {
        self.rhs.len()
    }

    /// Capacity of the broadcast scratch buffer, in scalars.
    pub fn unpacked_len(&self) -> usize {
        self.unpacked.len()
    }
}
