//! Counting the instances and leaf combinations of a taxonomy.
//!
//! Taxonomies with thousands of leaves have more instances than fit into any fixed-size integer,
//! so every count is an arbitrary-precision [`BigUint`].
//!
//! The number of ways to take between `lower` and `upper` of the children of a node is the sum of
//! the elementary symmetric polynomials `e_k(c_1, ..., c_n)` for `k` in `lower..=upper`, where
//! `c_i` is the instance count of child `i`. Only `Bounded` nodes need the polynomials. The other
//! kinds have closed forms: `All` is the product of the child counts, `Exclusive` their sum,
//! `Optional` the product of `1 + c_i` and `Any` the same product minus one.
use std::collections::{BTreeSet, HashMap, HashSet};

use num_bigint::BigUint;
use num_traits::{One, Zero};
use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::node::NodeKind;
use crate::tsc::Tsc;

/// Elementary symmetric polynomials `e_0..=e_limit` of the given values.
fn elementary_symmetric(values: &[BigUint], limit: usize) -> Vec<BigUint> {
    let mut e = vec![BigUint::zero(); limit + 1];
    e[0] = BigUint::one();

    for value in values {
        for k in (1..=limit).rev() {
            let term = &e[k - 1] * value;
            e[k] += term;
        }
    }

    e
}

/// Label sets of a subtree that can co-occur in a valid instance, as used for taxonomies whose
/// leaf labels are not unique.
type LabelSets<'a> = HashSet<BTreeSet<&'a str>>;

impl<C> Tsc<C> {
    /// Number of distinct valid instances of the taxonomy.
    pub fn instance_count(&self) -> BigUint {
        self.node_instance_count(self.root())
    }

    fn node_instance_count(&self, index: NodeIndex) -> BigUint {
        let counts = self
            .children(index)
            .into_iter()
            .map(|(_, child)| self.node_instance_count(child));

        match self.node(index).kind() {
            NodeKind::Leaf | NodeKind::All => counts.product(),
            NodeKind::Exclusive => counts.sum(),
            NodeKind::Optional => counts.map(|count| count + 1u32).product(),
            NodeKind::Any => counts.map(|count| count + 1u32).product::<BigUint>() - 1u32,
            NodeKind::Bounded { lower, upper } => {
                let counts: Vec<BigUint> = counts.collect();
                let upper = upper.min(counts.len());

                if lower > upper {
                    return BigUint::zero();
                }

                elementary_symmetric(&counts, upper)[lower..=upper].iter().sum()
            }
        }
    }

    /// Number of distinct unordered sets of `n` leaf labels that occur together in at least one
    /// valid instance.
    ///
    /// Leaf labels that appear more than once in the taxonomy are counted once per set.
    pub fn count_all_possible_n_way_predicate_combinations(&self, n: usize) -> BigUint {
        let labels = self.leaf_labels();
        let unique: HashSet<&str> = labels.iter().copied().collect();

        let count = if unique.len() == labels.len() {
            self.combinations(self.root(), n)[n].clone()
        } else {
            debug!(tsc = %self.identifier(), "Counting leaf combinations by label because of duplicate leaf labels");
            BigUint::from(self.label_sets(self.root(), n).iter().filter(|set| set.len() == n).count())
        };

        debug!(tsc = %self.identifier(), n, %count, "Counted leaf combinations");
        count
    }

    /// Number of leaf sets of each size `0..=n` that occur together in a valid instance of the
    /// subtree rooted at `index`. Index 0 is one if the subtree has any valid instance.
    fn combinations(&self, index: NodeIndex, n: usize) -> Vec<BigUint> {
        let mut result = vec![BigUint::zero(); n + 1];

        if self.node(index).kind() == NodeKind::Leaf {
            result[0] = BigUint::one();

            if n >= 1 {
                result[1] = BigUint::one();
            }

            return result;
        }

        let (lower, upper) = self.bounds(index);
        let children: Vec<Vec<BigUint>> = self
            .children(index)
            .into_iter()
            .map(|(_, child)| self.combinations(child, n))
            .collect();

        let realizable = children.iter().filter(|child| !child[0].is_zero()).count();

        if lower > upper.min(realizable) {
            return result;
        }

        // sets[j][k]: leaf sets of size k drawn from exactly j children
        let max_children = upper.min(children.len());
        let mut sets = vec![vec![BigUint::zero(); n + 1]; max_children + 1];
        sets[0][0] = BigUint::one();

        for child in &children {
            for j in (0..max_children).rev() {
                for k in (0..=n).rev() {
                    if sets[j][k].is_zero() {
                        continue;
                    }

                    for size in 1..=(n - k) {
                        if child[size].is_zero() {
                            continue;
                        }

                        let term = &sets[j][k] * &child[size];
                        sets[j + 1][k + size] += term;
                    }
                }
            }
        }

        for per_children in &sets {
            for (k, count) in per_children.iter().enumerate() {
                result[k] += count;
            }
        }

        // The empty set is only realized once, by the subtree itself
        result[0] = BigUint::one();
        result
    }

    fn label_sets(&self, index: NodeIndex, n: usize) -> LabelSets<'_> {
        let node = self.node(index);

        if node.kind() == NodeKind::Leaf {
            let mut sets = HashSet::from([BTreeSet::new()]);

            if n >= 1 {
                sets.insert(BTreeSet::from([node.label()]));
            }

            return sets;
        }

        let (lower, upper) = self.bounds(index);
        let children: Vec<LabelSets<'_>> = self
            .children(index)
            .into_iter()
            .map(|(_, child)| self.label_sets(child, n))
            .collect();

        let realizable = children.iter().filter(|child| child.contains(&BTreeSet::new())).count();

        if lower > upper.min(realizable) {
            return HashSet::new();
        }

        // Sets keyed by the number of children contributing a non-empty set
        let mut states: HashMap<usize, LabelSets<'_>> = HashMap::from([(0, HashSet::from([BTreeSet::new()]))]);

        for child in &children {
            let mut next = states.clone();

            for (&used, sets) in &states {
                if used + 1 > upper {
                    continue;
                }

                for set in sets {
                    for contribution in child.iter().filter(|contribution| !contribution.is_empty()) {
                        let union: BTreeSet<&str> = set.union(contribution).copied().collect();

                        if union.len() <= n {
                            next.entry(used + 1).or_default().insert(union);
                        }
                    }
                }
            }

            states = next;
        }

        states.into_values().flatten().collect()
    }
}
