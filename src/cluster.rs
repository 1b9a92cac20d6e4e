//! Cluster tracker: union-find over node ids with per-cluster type counts
//! and an incrementally maintained total score.
//!
//! A cluster scores `sum_t C(c_t, 2) - sum_{t<u} c_t * c_u` over its type
//! counts. Links are same-type-only, so the mixed penalty term is zero in any
//! reachable state; it is kept because the tracker is also the planning
//! comparator and the formula is the one the replay judge scores with.

/// Score of a single cluster from its per-type node counts.
pub fn cluster_score(counts: &[i32]) -> i64 {
    let mut score = 0i64;
    for i in 0..counts.len() {
        let a = counts[i] as i64;
        score += a * (a - 1) / 2;
        for j in i + 1..counts.len() {
            score -= a * counts[j] as i64;
        }
    }
    score
}

#[derive(Clone, Debug)]
pub struct ClusterSet {
    /// Parent id, or negated cluster size at roots.
    par: Vec<i32>,
    /// Per-type node counts, valid at roots. Index 0 is unused (types are 1-based).
    counts: Vec<Vec<i32>>,
    /// Cluster score, valid at roots.
    score: Vec<i64>,
    total: i64,
}

impl ClusterSet {
    /// One singleton cluster per node. `types[i]` is node `i`'s type in `1..=k`.
    pub fn new(types: &[u8], k: usize) -> Self {
        let counts = types
            .iter()
            .map(|&t| {
                let mut c = vec![0; k + 1];
                c[t as usize] = 1;
                c
            })
            .collect();
        Self {
            par: vec![-1; types.len()],
            counts,
            score: vec![0; types.len()],
            total: 0,
        }
    }

    /// Root without path compression, for `&self` queries.
    fn root(&self, mut a: usize) -> usize {
        while self.par[a] >= 0 {
            a = self.par[a] as usize;
        }
        a
    }

    /// Root with path compression.
    pub fn find(&mut self, a: usize) -> usize {
        if self.par[a] < 0 {
            a
        } else {
            let r = self.find(self.par[a] as usize);
            self.par[a] = r as i32;
            r
        }
    }

    pub fn same(&self, a: usize, b: usize) -> bool {
        self.root(a) == self.root(b)
    }

    pub fn size(&self, a: usize) -> usize {
        (-self.par[self.root(a)]) as usize
    }

    pub fn score_of(&self, a: usize) -> i64 {
        self.score[self.root(a)]
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Score delta of merging the clusters of `a` and `b`, without mutating.
    /// Zero when they are already the same cluster.
    pub fn merge_gain(&self, a: usize, b: usize) -> i64 {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return 0;
        }
        let mut combined = self.counts[ra].clone();
        for (c, &d) in combined.iter_mut().zip(&self.counts[rb]) {
            *c += d;
        }
        cluster_score(&combined) - self.score[ra] - self.score[rb]
    }

    /// Unions the clusters of `a` and `b`. Returns `false` if already joined.
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        // Union by size: keep the larger cluster as root.
        if self.par[ra] > self.par[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.par[ra] += self.par[rb];
        self.par[rb] = ra as i32;
        let drained = std::mem::take(&mut self.counts[rb]);
        for (c, d) in self.counts[ra].iter_mut().zip(drained) {
            *c += d;
        }
        let merged = cluster_score(&self.counts[ra]);
        self.total += merged - self.score[ra] - self.score[rb];
        self.score[ra] = merged;
        self.score[rb] = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_score_formula() {
        assert_eq!(cluster_score(&[0, 1]), 0);
        assert_eq!(cluster_score(&[0, 2]), 1);
        assert_eq!(cluster_score(&[0, 5]), 10);
        assert_eq!(cluster_score(&[0, 1, 1]), -1);
        assert_eq!(cluster_score(&[0, 3, 2]), 3 + 1 - 6);
    }

    #[test]
    fn test_merge_and_total() {
        let mut cs = ClusterSet::new(&[1, 1, 1, 2, 2], 2);
        assert_eq!(cs.total(), 0);
        assert!(cs.merge(0, 1));
        assert_eq!(cs.total(), 1);
        assert!(cs.merge(1, 2));
        assert_eq!(cs.total(), 3);
        assert!(!cs.merge(0, 2));
        assert_eq!(cs.size(1), 3);
        assert_eq!(cs.score_of(2), 3);
        assert!(cs.merge(3, 4));
        assert_eq!(cs.total(), 4);
    }

    #[test]
    fn test_merge_gain_is_pure() {
        let mut cs = ClusterSet::new(&[1, 1, 2], 2);
        cs.merge(0, 1);
        let before = cs.total();
        // Already joined: zero.
        assert_eq!(cs.merge_gain(0, 1), 0);
        // A mixed merge trades the pair bonus against the penalty.
        assert_eq!(cs.merge_gain(1, 2), cluster_score(&[0, 2, 1]) - 1);
        assert_eq!(cs.total(), before);
        assert!(!cs.same(1, 2));
    }

    #[test]
    fn test_gain_matches_merge() {
        let mut cs = ClusterSet::new(&[1, 1, 1, 1], 1);
        cs.merge(0, 1);
        cs.merge(2, 3);
        let gain = cs.merge_gain(0, 2);
        let before = cs.total();
        cs.merge(0, 2);
        assert_eq!(cs.total(), before + gain);
        assert_eq!(cs.total(), 6);
    }
}
