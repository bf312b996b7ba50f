//! Restartable subset and combination generators.
//!
//! The order these iterators yield items in is part of the search contract:
//! it is the tie-break order when two windows score the same.
//!
//! - [`Combinations`] yields `k`-element index sets of `0..n` in lexicographic
//!   order (`[0,1]`, `[0,2]`, `[1,2]` for `n = 3, k = 2`). The chained variant
//!   only yields sets where each index may follow the previous one.
//! - [`SubsetsBySize`] yields non-empty subsets of `0..n`, largest size
//!   first, each size in lexicographic order.

/// Lexicographic `k`-combinations of `0..n`, optionally constrained.
#[derive(Debug, Clone)]
pub struct Combinations {
    /// `next[i]` is the smallest index allowed right after `i`.
    next: Vec<usize>,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// All `k`-combinations of `0..n`.
    pub fn new(n: usize, k: usize) -> Self {
        Self::chains((1..=n).collect(), k)
    }

    /// `k`-combinations `i0 < i1 < ...` of `0..next.len()` with
    /// `i(j+1) >= next[i(j)]`, in lexicographic order.
    ///
    /// `next` must be non-decreasing with `next[i] > i`; then the greedy
    /// completion of a prefix is its smallest one, and a prefix whose greedy
    /// completion runs out of indices has no completion at all.
    pub fn chains(next: Vec<usize>, k: usize) -> Self {
        let mut combinations = Self {
            next,
            indices: vec![0; k],
            done: false,
        };
        combinations.done = k > 0 && (combinations.n() == 0 || !combinations.fill(0));
        combinations
    }

    fn n(&self) -> usize {
        self.next.len()
    }

    /// Greedily complete `indices[pos + 1..]`. Returns `false` if it runs out.
    fn fill(&mut self, pos: usize) -> bool {
        for i in pos + 1..self.indices.len() {
            let candidate = self.next[self.indices[i - 1]];
            if candidate >= self.n() {
                return false;
            }
            self.indices[i] = candidate;
        }
        true
    }

    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            let bumped = self.indices[pos] + 1;
            if bumped >= self.n() {
                continue;
            }
            self.indices[pos] = bumped;
            if self.fill(pos) {
                return;
            }
        }
        self.done = true;
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        if current.is_empty() {
            // The single empty combination.
            self.done = true;
        } else {
            self.advance();
        }
        Some(current)
    }
}

/// Subsets of `0..n` with sizes from `n` down to `min_size`.
#[derive(Debug, Clone)]
pub struct SubsetsBySize {
    n: usize,
    min_size: usize,
    size: usize,
    current: Combinations,
}

impl SubsetsBySize {
    /// Every non-empty subset.
    pub fn new(n: usize) -> Self {
        Self::with_min_size(n, 1)
    }

    /// Only the full set `0..n`.
    pub fn full(n: usize) -> Self {
        Self::with_min_size(n, n)
    }

    pub fn with_min_size(n: usize, min_size: usize) -> Self {
        let min_size = min_size.max(1);
        Self {
            n,
            min_size,
            size: n,
            current: Combinations::new(n, n),
        }
    }
}

impl Iterator for SubsetsBySize {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.size < self.min_size {
                return None;
            }
            if let Some(subset) = self.current.next() {
                return Some(subset);
            }
            self.size -= 1;
            self.current = Combinations::new(self.n, self.size);
        }
    }
}
