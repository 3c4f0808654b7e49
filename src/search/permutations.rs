/// Every ordering of `0..n`, in lexicographic order.
///
/// Yields a single empty ordering for `n == 0`.
#[derive(Debug, Clone)]
pub struct Permutations {
    indices: Vec<usize>,
    started: bool,
    finished: bool,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
            started: false,
            finished: false,
        }
    }

    fn advance(&mut self) -> bool {
        let len = self.indices.len();
        if len < 2 {
            return false;
        }

        let mut pivot = len - 1;
        while pivot > 0 && self.indices[pivot - 1] >= self.indices[pivot] {
            pivot -= 1;
        }
        if pivot == 0 {
            return false;
        }

        let mut successor = len - 1;
        while self.indices[successor] <= self.indices[pivot - 1] {
            successor -= 1;
        }
        self.indices.swap(pivot - 1, successor);
        self.indices[pivot..].reverse();
        true
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
        } else if !self.advance() {
            self.finished = true;
            return None;
        }

        Some(self.indices.clone())
    }
}

/// `n!`, saturating at `u64::MAX`.
pub fn permutation_count(n: usize) -> u64 {
    (2..=n as u64).fold(1u64, |acc, k| acc.saturating_mul(k))
}
