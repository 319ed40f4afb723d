use std::cmp;

use crate::indices::Indices;
use crate::kdtree::KDTree;

/// The default node size used by [`KDTreeBuilder::new`]
pub const DEFAULT_KDTREE_NODE_SIZE: usize = 64;

/// A builder to create a [`KDTree`].
///
/// ```
/// use geo_cluster::kdtree::KDTreeBuilder;
///
/// let mut builder = KDTreeBuilder::new(3);
/// builder.add(0., 0.);
/// builder.add(1., 1.);
/// builder.add(2., 2.);
/// let tree = builder.finish();
/// assert_eq!(tree.range(0.5, 0.5, 3., 3.).len(), 2);
/// ```
#[derive(Debug)]
pub struct KDTreeBuilder {
    coords: Vec<f64>,
    ids: Indices,
    num_items: usize,
    node_size: usize,
}

impl KDTreeBuilder {
    /// Create a new builder with the provided number of items and the default node size.
    pub fn new(num_items: usize) -> Self {
        Self::new_with_node_size(num_items, DEFAULT_KDTREE_NODE_SIZE)
    }

    /// Create a new builder with the provided number of items and node size.
    pub fn new_with_node_size(num_items: usize, node_size: usize) -> Self {
        assert!((2..=65535).contains(&node_size));
        assert!(num_items <= u32::MAX as usize);

        Self {
            coords: Vec::with_capacity(num_items * 2),
            ids: Indices::identity(num_items),
            num_items,
            node_size,
        }
    }

    /// Add a point to the index, returning its insertion index.
    pub fn add(&mut self, x: f64, y: f64) -> usize {
        let index = self.coords.len() >> 1;
        self.coords.push(x);
        self.coords.push(y);
        index
    }

    /// Consume this builder, performing the k-d sort and generating a KDTree ready for queries.
    pub fn finish(mut self) -> KDTree {
        assert_eq!(
            self.coords.len() >> 1,
            self.num_items,
            "Added {} items when expected {}.",
            self.coords.len() >> 1,
            self.num_items
        );

        if self.num_items > 0 {
            // kd-sort both arrays for efficient search
            sort(
                &mut self.ids,
                &mut self.coords,
                self.node_size,
                0,
                self.num_items - 1,
                0,
            );
        }

        KDTree {
            coords: self.coords,
            ids: self.ids,
            node_size: self.node_size,
        }
    }
}

fn sort(
    ids: &mut Indices,
    coords: &mut [f64],
    node_size: usize,
    left: usize,
    right: usize,
    axis: usize,
) {
    if right - left <= node_size {
        return;
    }

    // middle index
    let m = (left + right) >> 1;

    // sort ids and coords around the middle index so that the halves lie either left/right or
    // top/bottom correspondingly (taking turns)
    select(ids, coords, m, left, right, axis);

    // recursively kd-sort first half and second half on the opposite axis
    sort(ids, coords, node_size, left, m - 1, 1 - axis);
    sort(ids, coords, node_size, m + 1, right, 1 - axis);
}

/// Custom Floyd-Rivest selection algorithm: sort ids and coords so that [left..k-1] items are
/// smaller than k-th item (on either x or y axis)
#[inline]
fn select(
    ids: &mut Indices,
    coords: &mut [f64],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(ids, coords, k, new_left, new_right, axis);
        }

        let t = coords[2 * k + axis];
        let mut i = left;
        let mut j = right;

        swap_item(ids, coords, left, k);
        if coords[2 * right + axis] > t {
            swap_item(ids, coords, left, right);
        }

        while i < j {
            swap_item(ids, coords, i, j);
            i += 1;
            j -= 1;
            while coords[2 * i + axis] < t {
                i += 1;
            }
            while coords[2 * j + axis] > t {
                j -= 1;
            }
        }

        if coords[2 * left + axis] == t {
            swap_item(ids, coords, left, j);
        } else {
            j += 1;
            swap_item(ids, coords, j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            // j == 0 only when left == 0, in which case the loop is finished
            match j.checked_sub(1) {
                Some(r) => right = r,
                None => break,
            }
        }
    }
}

#[inline]
fn swap_item(ids: &mut Indices, coords: &mut [f64], i: usize, j: usize) {
    ids.swap(i, j);
    coords.swap(2 * i, 2 * j);
    coords.swap(2 * i + 1, 2 * j + 1);
}
