//! Binary max-heap of variables ordered by activity, with position tracking so that
//! a bumped variable can be moved up in place.

use super::Var;

const ABSENT: usize = usize::MAX;

#[derive(Debug, Clone, Default)]
pub(super) struct VarHeap {
    heap: Vec<Var>,
    /// Position of each variable in `heap`, [`ABSENT`] if it is not there.
    indices: Vec<usize>,
}

impl VarHeap {
    pub(super) fn grow_to(&mut self, vars: usize) {
        if self.indices.len() < vars {
            self.indices.resize(vars, ABSENT);
        }
    }

    pub(super) fn contains(&self, v: Var) -> bool {
        self.indices
            .get(v as usize)
            .is_some_and(|&i| i != ABSENT)
    }

    pub(super) fn insert(&mut self, v: Var, activity: &[f64]) {
        if self.contains(v) {
            return;
        }
        self.grow_to(v as usize + 1);
        self.indices[v as usize] = self.heap.len();
        self.heap.push(v);
        self.sift_up(self.heap.len() - 1, activity);
    }

    /// To be called after the activity of `v` increased.
    pub(super) fn increase(&mut self, v: Var, activity: &[f64]) {
        if self.contains(v) {
            self.sift_up(self.indices[v as usize], activity);
        }
    }

    /// Removes and returns the most active variable.
    pub(super) fn pop(&mut self, activity: &[f64]) -> Option<Var> {
        let top = *self.heap.first()?;
        let last = self.heap.pop()?;
        self.indices[top as usize] = ABSENT;
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.indices[last as usize] = 0;
            self.sift_down(0, activity);
        }
        Some(top)
    }

    fn sift_up(&mut self, mut i: usize, activity: &[f64]) {
        let v = self.heap[i];
        while i > 0 {
            let parent = (i - 1) / 2;
            if activity[self.heap[parent] as usize] >= activity[v as usize] {
                break;
            }
            self.heap[i] = self.heap[parent];
            self.indices[self.heap[i] as usize] = i;
            i = parent;
        }
        self.heap[i] = v;
        self.indices[v as usize] = i;
    }

    fn sift_down(&mut self, mut i: usize, activity: &[f64]) {
        let v = self.heap[i];
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && activity[self.heap[right] as usize] > activity[self.heap[left] as usize]
            {
                right
            } else {
                left
            };
            if activity[self.heap[child] as usize] <= activity[v as usize] {
                break;
            }
            self.heap[i] = self.heap[child];
            self.indices[self.heap[i] as usize] = i;
            i = child;
        }
        self.heap[i] = v;
        self.indices[v as usize] = i;
    }
}
