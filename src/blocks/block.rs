//! A single fixed-capacity block and the element weight trait.

/// Weight of an element inside a [`BlockArray`](super::BlockArray).
///
/// The container keeps a running sum of weights per block so that callers can
/// binary-search by weight as well as by element index. Characters weigh 1,
/// a document line weighs its character count.
pub trait Weighted {
    fn weight(&self) -> usize {
        1
    }
}

macro_rules! unit_weight {
    ($($t:ty),* $(,)?) => {
        $(impl Weighted for $t {})*
    };
}

unit_weight!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, char, String);

/// Contiguous run of elements inside a block array.
///
/// `offset` is the index of the first element in the owning array and
/// `weight_offset` the sum of weights before it. Both are rewritten by the
/// array's re-indexing pass, never by the block itself.
#[derive(Debug, Clone)]
pub struct Block<T> {
    pub(super) values: Vec<T>,
    pub(super) offset: usize,
    pub(super) weight_offset: usize,
    pub(super) weight: usize,
    /// False after a mutation until the next re-index recomputes `weight`.
    pub(super) valid: bool,
    /// Cached visual row count as `(wrap width, rows)`; dropped on any mutation.
    wrapped_rows: Option<(usize, usize)>,
}

impl<T> Block<T> {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity), capacity)
    }

    pub(super) fn from_vec(mut values: Vec<T>, capacity: usize) -> Self {
        if values.capacity() < capacity {
            values.reserve_exact(capacity - values.len());
        }
        Self {
            values,
            offset: 0,
            weight_offset: 0,
            weight: 0,
            valid: false,
            wrapped_rows: None,
        }
    }

    /// Invalidate every derived value of this block.
    #[inline]
    pub(super) fn touch(&mut self) {
        self.valid = false;
        self.wrapped_rows = None;
    }

    /// Drop the cached row count only; weights stay valid.
    #[inline]
    pub(super) fn forget_wrapped_rows(&mut self) {
        self.wrapped_rows = None;
    }

    /// Index of the first element in the owning array
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of elements in this block
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Sum of element weights before this block
    pub fn weight_offset(&self) -> usize {
        self.weight_offset
    }

    /// Sum of element weights inside this block
    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Cached visual row count for the given wrap width, if still valid
    pub fn wrapped_rows(&self, width: usize) -> Option<usize> {
        match self.wrapped_rows {
            Some((w, rows)) if w == width => Some(rows),
            _ => None,
        }
    }

    pub fn set_wrapped_rows(&mut self, width: usize, rows: usize) {
        self.wrapped_rows = Some((width, rows));
    }
}
