//! Block sequence container.
//!
//! `BlockArray<T>` stores a sequence as an ordered list of fixed-capacity
//! blocks. Each block records the index of its first element, so any global
//! index resolves to `(block, local index)` with a binary search over block
//! offsets. Inserts and removes only shift elements inside one or two blocks
//! and then walk the block list once to re-index.
//!
//! The same container backs the characters of a [`Line`](crate::text::Line)
//! and the lines of a [`Document`](crate::text::Document). Elements carry a
//! [`Weighted`] value and the container keeps cumulative weights per block,
//! which is how the document finds the line containing a flat character
//! index without walking every line.
//!
//! # Invariants
//!
//! After every public method returns:
//! - no block is empty and no block holds more than `block_size` elements
//! - `blocks[i].offset == blocks[i - 1].offset + blocks[i - 1].len()`
//! - `len()` equals the sum of block lengths
//! - `blocks[i].weight_offset` is the sum of weights of all earlier elements
//!
//! [`BlockArray::check_consistency`] verifies all of them.
//!
//! Indices outside the valid range are programmer errors: the plain methods
//! panic, the `try_*` methods return [`OutOfRange`].

mod block;

pub use block::{Block, Weighted};

use std::ops::Index;

use crate::error::OutOfRange;

/// Segmented array of `T` built from fixed-capacity blocks.
#[derive(Debug, Clone)]
pub struct BlockArray<T> {
    block_size: usize,
    blocks: Vec<Block<T>>,
    len: usize,
    total_weight: usize,
}

impl<T: Weighted> BlockArray<T> {
    /// Create an empty array whose blocks hold at most `block_size` elements.
    ///
    /// # Panics
    ///
    /// Panics if `block_size < 2`; a block must be splittable in two halves.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size >= 2, "block_size must be at least 2");
        Self {
            block_size,
            blocks: Vec::new(),
            len: 0,
            total_weight: 0,
        }
    }

    /// Create an array holding `values` in order.
    pub fn from_vec(block_size: usize, values: Vec<T>) -> Self {
        let mut array = Self::new(block_size);
        array.insert_range(0, values);
        array
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn blocks_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    pub fn block(&self, block_index: usize) -> &Block<T> {
        &self.blocks[block_index]
    }

    /// Sum of the weights of every element
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }

    /// Store a wrapped-row count on a block; dropped automatically on the
    /// block's next mutation.
    pub fn set_block_wrapped_rows(&mut self, block_index: usize, width: usize, rows: usize) {
        self.blocks[block_index].set_wrapped_rows(width, rows);
    }

    /// Index of the block containing element `index`, or `None` when
    /// `index >= len()`.
    pub fn block_index(&self, index: usize) -> Option<usize> {
        if index >= self.len {
            return None;
        }
        Some(self.blocks.partition_point(|b| b.offset <= index) - 1)
    }

    /// Resolve `index < len` to `(block index, index inside block)`.
    fn locate(&self, index: usize) -> (usize, usize) {
        let bi = self.blocks.partition_point(|b| b.offset <= index) - 1;
        (bi, index - self.blocks[bi].offset)
    }

    // =========================================================================
    // Element access
    // =========================================================================

    pub fn try_value(&self, index: usize) -> Result<&T, OutOfRange> {
        if index >= self.len {
            return Err(OutOfRange::index(index, self.len));
        }
        let (bi, j) = self.locate(index);
        Ok(&self.blocks[bi].values[j])
    }

    /// Element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[track_caller]
    pub fn value(&self, index: usize) -> &T {
        match self.try_value(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.blocks.first().and_then(|b| b.values.first())
    }

    pub fn last(&self) -> Option<&T> {
        self.blocks.last().and_then(|b| b.values.last())
    }

    /// Replace the element at `index`.
    #[track_caller]
    pub fn set(&mut self, index: usize, value: T) {
        self.modify(index, |slot| *slot = value);
    }

    /// Mutate the element at `index` in place and re-index weights.
    ///
    /// This is the only way to get a mutable element reference, so a weight
    /// change (a line growing or shrinking) can never leave the cumulative
    /// weights stale.
    #[track_caller]
    pub fn modify<R>(&mut self, index: usize, f: impl FnOnce(&mut T) -> R) -> R {
        if index >= self.len {
            panic!("{}", OutOfRange::index(index, self.len));
        }
        let (bi, j) = self.locate(index);
        let block = &mut self.blocks[bi];
        let result = f(&mut block.values[j]);
        block.touch();
        self.reindex(bi);
        result
    }

    /// Mutate block `block_index` without re-indexing.
    ///
    /// The closure must leave every weight unchanged (style tags, wrap
    /// caches). Only the block's cached row count is dropped.
    pub fn modify_block_in_place<R>(
        &mut self,
        block_index: usize,
        f: impl FnOnce(&mut [T]) -> R,
    ) -> R {
        let block = &mut self.blocks[block_index];
        let result = f(&mut block.values);
        block.forget_wrapped_rows();
        debug_assert_eq!(
            block.weight,
            block.values.iter().map(Weighted::weight).sum::<usize>(),
            "in-place mutation changed a weight"
        );
        result
    }

    /// Call `f(index, element)` for every element of `[index, index + count)`,
    /// block by block, without re-indexing. Same contract as
    /// [`modify_block_in_place`](Self::modify_block_in_place).
    #[track_caller]
    pub fn modify_range_in_place(
        &mut self,
        index: usize,
        count: usize,
        mut f: impl FnMut(usize, &mut T),
    ) {
        if index.checked_add(count).map_or(true, |end| end > self.len) {
            panic!("{}", OutOfRange::range(index, count, self.len));
        }
        if count == 0 {
            return;
        }
        let (mut bi, mut j) = self.locate(index);
        let mut next = index;
        let end = index + count;
        while next < end {
            let take = (end - next).min(self.blocks[bi].values.len() - j);
            self.modify_block_in_place(bi, |values| {
                for value in &mut values[j..j + take] {
                    f(next, value);
                    next += 1;
                }
            });
            bi += 1;
            j = 0;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flat_map(|b| b.values.iter())
    }

    /// Iterate from element `index` to the end (empty when `index >= len`).
    pub fn iter_from(&self, index: usize) -> impl Iterator<Item = &T> + '_ {
        let (first_block, skip) = if index >= self.len {
            (self.blocks.len(), 0)
        } else {
            self.locate(index)
        };
        self.blocks[first_block..]
            .iter()
            .enumerate()
            .flat_map(move |(k, b)| b.values[if k == 0 { skip } else { 0 }..].iter())
    }

    // =========================================================================
    // Weight lookups
    // =========================================================================

    /// Sum of the weights of elements `[0, index)`, `index <= len()`.
    #[track_caller]
    pub fn weight_before(&self, index: usize) -> usize {
        if index > self.len {
            panic!("{}", OutOfRange::insert(index, self.len));
        }
        if index == self.len {
            return self.total_weight;
        }
        let (bi, j) = self.locate(index);
        let block = &self.blocks[bi];
        block.weight_offset + block.values[..j].iter().map(Weighted::weight).sum::<usize>()
    }

    /// Find the element whose weight span contains `weight`.
    ///
    /// Returns `(element index, weight before the element)`, or `None` when
    /// `weight >= total_weight()`. Zero-weight elements are never returned.
    pub fn locate_weight(&self, weight: usize) -> Option<(usize, usize)> {
        if weight >= self.total_weight {
            return None;
        }
        let bi = self
            .blocks
            .partition_point(|b| b.weight_offset + b.weight <= weight);
        let block = self.blocks.get(bi)?;
        let mut acc = block.weight_offset;
        for (k, value) in block.values.iter().enumerate() {
            let w = value.weight();
            if weight < acc + w {
                return Some((block.offset + k, acc));
            }
            acc += w;
        }
        None
    }

    // =========================================================================
    // Structural changes
    // =========================================================================

    /// Append to the end.
    pub fn push(&mut self, value: T) {
        let block_size = self.block_size;
        match self.blocks.last_mut() {
            Some(last) if last.values.len() < block_size => {
                last.values.push(value);
                last.touch();
            }
            _ => {
                let mut block = Block::with_capacity(block_size);
                block.values.push(value);
                self.blocks.push(block);
            }
        }
        self.reindex(self.blocks.len() - 1);
    }

    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), OutOfRange> {
        if index > self.len {
            return Err(OutOfRange::insert(index, self.len));
        }
        if index == self.len {
            self.push(value);
            return Ok(());
        }
        let cap = self.block_size;
        let (bi, j) = self.locate(index);

        if j == 0 && bi > 0 && self.blocks[bi - 1].values.len() < cap {
            let left = &mut self.blocks[bi - 1];
            left.values.push(value);
            left.touch();
            self.reindex(bi - 1);
            return Ok(());
        }

        if self.blocks[bi].values.len() < cap {
            let block = &mut self.blocks[bi];
            block.values.insert(j, value);
            block.touch();
            self.reindex(bi);
            return Ok(());
        }

        // Full block: spill one element right if the neighbour has room,
        // otherwise split the block in two halves.
        let has_room_right = self
            .blocks
            .get(bi + 1)
            .is_some_and(|right| right.values.len() < cap);
        if has_room_right {
            let spilled = self.blocks[bi].values.split_off(cap - 1);
            let right = &mut self.blocks[bi + 1];
            right.values.splice(0..0, spilled);
            right.touch();
            let block = &mut self.blocks[bi];
            block.values.insert(j, value);
            block.touch();
        } else {
            let half = cap / 2;
            let tail = self.blocks[bi].values.split_off(half);
            let mut right = Block::from_vec(tail, cap);
            if j <= half {
                self.blocks[bi].values.insert(j, value);
            } else {
                right.values.insert(j - half, value);
            }
            self.blocks[bi].touch();
            self.blocks.insert(bi + 1, right);
            tracing::trace!(block = bi, blocks = self.blocks.len(), "split full block");
        }
        self.reindex(bi);
        Ok(())
    }

    /// Insert `value` before element `index` (`index == len()` appends).
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) {
        if let Err(e) = self.try_insert(index, value) {
            panic!("{e}");
        }
    }

    pub fn try_insert_range(&mut self, index: usize, values: Vec<T>) -> Result<(), OutOfRange> {
        if index > self.len {
            return Err(OutOfRange::insert(index, self.len));
        }
        if values.is_empty() {
            return Ok(());
        }
        let cap = self.block_size;
        let count = values.len();
        if self.blocks.is_empty() {
            self.blocks.push(Block::with_capacity(cap));
        }

        let (mut bi, mut j) = if index == self.len {
            let last = self.blocks.len() - 1;
            (last, self.blocks[last].values.len())
        } else {
            self.locate(index)
        };
        if j == 0 && bi > 0 && cap - self.blocks[bi - 1].values.len() >= count {
            bi -= 1;
            j = self.blocks[bi].values.len();
        }

        if cap - self.blocks[bi].values.len() >= count {
            let target = &mut self.blocks[bi];
            target.values.splice(j..j, values);
            target.touch();
            self.reindex(bi);
            return Ok(());
        }

        // Fill the target block, then chop the remainder (new values followed
        // by the displaced tail of the target) into full blocks.
        let tail = self.blocks[bi].values.split_off(j);
        let mut rest = values.into_iter().chain(tail);
        let target = &mut self.blocks[bi];
        let room = cap - target.values.len();
        target.values.extend(rest.by_ref().take(room));
        target.touch();

        let mut fresh: Vec<Block<T>> = Vec::new();
        loop {
            let chunk: Vec<T> = rest.by_ref().take(cap).collect();
            if chunk.is_empty() {
                break;
            }
            fresh.push(Block::from_vec(chunk, cap));
        }

        // The last chunk is the only partial one: absorb it into the right
        // neighbour when it fits, otherwise top it up to half capacity from
        // its (full) predecessor.
        if let Some(last_len) = fresh.last().map(Block::len) {
            let right_room = self
                .blocks
                .get(bi + 1)
                .map_or(0, |right| cap - right.values.len());
            if last_len < cap && right_room >= last_len {
                if let Some(last) = fresh.pop() {
                    let right = &mut self.blocks[bi + 1];
                    right.values.splice(0..0, last.values);
                    right.touch();
                }
            } else if last_len < cap / 2 {
                let need = cap / 2 - last_len;
                let n = fresh.len();
                if n >= 2 {
                    let (head, tail) = fresh.split_at_mut(n - 1);
                    move_tail(&mut head[n - 2].values, &mut tail[0].values, need);
                } else {
                    move_tail(&mut self.blocks[bi].values, &mut fresh[0].values, need);
                }
            }
        }

        tracing::trace!(
            block = bi,
            new_blocks = fresh.len(),
            inserted = count,
            "bulk insert"
        );
        self.blocks.splice(bi + 1..bi + 1, fresh);
        self.reindex(bi);
        Ok(())
    }

    /// Insert all `values` before element `index`.
    #[track_caller]
    pub fn insert_range(&mut self, index: usize, values: Vec<T>) {
        if let Err(e) = self.try_insert_range(index, values) {
            panic!("{e}");
        }
    }

    pub fn try_remove_at(&mut self, index: usize) -> Result<T, OutOfRange> {
        if index >= self.len {
            return Err(OutOfRange::index(index, self.len));
        }
        let (bi, j) = self.locate(index);
        let block = &mut self.blocks[bi];
        let value = block.values.remove(j);
        block.touch();
        let first = self.merge_around(bi);
        self.reindex(first);
        Ok(value)
    }

    /// Remove and return the element at `index`.
    #[track_caller]
    pub fn remove_at(&mut self, index: usize) -> T {
        match self.try_remove_at(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_remove_range(&mut self, index: usize, count: usize) -> Result<Vec<T>, OutOfRange> {
        if index > self.len || count > self.len - index {
            return Err(OutOfRange::range(index, count, self.len));
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        let cap = self.block_size;
        let (sb, sj) = self.locate(index);
        let (eb, ej) = self.locate(index + count - 1);
        let ej = ej + 1;

        let mut removed: Vec<T>;
        if sb == eb {
            let block = &mut self.blocks[sb];
            removed = block.values.drain(sj..ej).collect();
            block.touch();
        } else {
            removed = Vec::with_capacity(count);
            removed.extend(self.blocks[sb].values.drain(sj..));
            self.blocks[sb].touch();
            for interior in self.blocks.drain(sb + 1..eb) {
                removed.extend(interior.values);
            }
            let end = sb + 1;
            removed.extend(self.blocks[end].values.drain(..ej));
            self.blocks[end].touch();

            let end_len = self.blocks[end].values.len();
            if end_len == 0 {
                self.blocks.remove(end);
            } else if cap - self.blocks[sb].values.len() >= end_len {
                let end_block = self.blocks.remove(end);
                self.blocks[sb].values.extend(end_block.values);
            }
        }

        let first = self.merge_around(sb);
        self.reindex(first);
        tracing::trace!(index, count, blocks = self.blocks.len(), "range removed");
        Ok(removed)
    }

    /// Remove `count` elements starting at `index` and return them in order.
    #[track_caller]
    pub fn remove_range(&mut self, index: usize, count: usize) -> Vec<T> {
        match self.try_remove_range(index, count) {
            Ok(values) => values,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
        self.total_weight = 0;
    }

    /// Drop the block at `bi` if it became empty, or merge it with a neighbour
    /// that can hold both. Returns the first block index needing re-indexing.
    fn merge_around(&mut self, bi: usize) -> usize {
        if bi >= self.blocks.len() {
            return bi;
        }
        let cap = self.block_size;
        let count = self.blocks[bi].values.len();
        if count == 0 {
            self.blocks.remove(bi);
            return bi;
        }
        if bi > 0 && cap - self.blocks[bi - 1].values.len() >= count {
            let merged = self.blocks.remove(bi);
            let left = &mut self.blocks[bi - 1];
            left.values.extend(merged.values);
            left.touch();
            return bi - 1;
        }
        let right_fits = self
            .blocks
            .get(bi + 1)
            .is_some_and(|right| cap - count >= right.values.len());
        if right_fits {
            let right = self.blocks.remove(bi + 1);
            let block = &mut self.blocks[bi];
            block.values.extend(right.values);
            block.touch();
        }
        bi
    }

    /// Recompute offsets, weights and `len` from block `start` onward.
    fn reindex(&mut self, start: usize) {
        let mut start = start.min(self.blocks.len());
        while start > 0 && !self.blocks[start - 1].valid {
            start -= 1;
        }
        let (mut offset, mut weight_offset) = match start.checked_sub(1) {
            Some(prev) => {
                let prev = &self.blocks[prev];
                (prev.offset + prev.values.len(), prev.weight_offset + prev.weight)
            }
            None => (0, 0),
        };
        for block in &mut self.blocks[start..] {
            if !block.valid {
                block.weight = block.values.iter().map(Weighted::weight).sum();
                block.valid = true;
            }
            block.offset = offset;
            block.weight_offset = weight_offset;
            offset += block.values.len();
            weight_offset += block.weight;
        }
        self.len = offset;
        self.total_weight = weight_offset;
    }

    /// Verify every structural invariant, describing the first violation.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut offset = 0;
        let mut weight_offset = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            if block.values.is_empty() {
                return Err(format!("block {i} is empty"));
            }
            if block.values.len() > self.block_size {
                return Err(format!(
                    "block {i} holds {} values, capacity is {}",
                    block.values.len(),
                    self.block_size
                ));
            }
            if block.offset != offset {
                return Err(format!(
                    "block {i} offset is {}, expected {offset}",
                    block.offset
                ));
            }
            if block.weight_offset != weight_offset {
                return Err(format!(
                    "block {i} weight offset is {}, expected {weight_offset}",
                    block.weight_offset
                ));
            }
            let weight: usize = block.values.iter().map(Weighted::weight).sum();
            if !block.valid || block.weight != weight {
                return Err(format!(
                    "block {i} weight is {}, expected {weight}",
                    block.weight
                ));
            }
            offset += block.values.len();
            weight_offset += weight;
        }
        if offset != self.len {
            return Err(format!("len is {}, blocks hold {offset}", self.len));
        }
        if weight_offset != self.total_weight {
            return Err(format!(
                "total weight is {}, blocks hold {weight_offset}",
                self.total_weight
            ));
        }
        Ok(())
    }
}

impl<T: Weighted + Clone> BlockArray<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T: Weighted> Index<usize> for BlockArray<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.value(index)
    }
}

/// Move the last `n` values of `from` to the front of `to`.
fn move_tail<T>(from: &mut Vec<T>, to: &mut Vec<T>, n: usize) {
    let start = from.len().saturating_sub(n);
    let moved: Vec<T> = from.drain(start..).collect();
    to.splice(0..0, moved);
}
