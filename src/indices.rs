//! Owned storage for item ids that may be either `u16` or `u32` to save space.

/// A buffer of item ids, stored as `u16` when every id fits and `u32` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    /// Allocate storage for `num_items` ids, initialised to the identity permutation.
    pub fn identity(num_items: usize) -> Self {
        if num_items < 65536 {
            Self::U16((0..num_items as u16).collect())
        } else {
            Self::U32((0..num_items as u32).collect())
        }
    }

    #[inline]
    pub fn bytes_per_element(&self) -> usize {
        match self {
            Self::U16(_) => 2,
            Self::U32(_) => 4,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U16(arr) => arr.len(),
            Self::U32(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        match self {
            Self::U16(arr) => arr[index] as usize,
            Self::U32(arr) => arr[index] as usize,
        }
    }

    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        match self {
            Self::U16(arr) => arr.swap(a, b),
            Self::U32(arr) => arr.swap(a, b),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn picks_narrowest_width() {
        let small = Indices::identity(10);
        assert_eq!(small.bytes_per_element(), 2);
        assert_eq!(small.len(), 10);
        assert_eq!(small.get(7), 7);

        let large = Indices::identity(70_000);
        assert_eq!(large.bytes_per_element(), 4);
        assert_eq!(large.get(69_999), 69_999);

        assert!(Indices::identity(0).is_empty());
    }

    #[test]
    fn swaps_in_place() {
        let mut ids = Indices::identity(3);
        ids.swap(0, 2);
        assert_eq!(ids, Indices::U16(vec![2, 1, 0]));
    }
}
