//! Fan-out of independent per-bond calculations. Uses rayon when the
//! `parallel` feature is enabled and the batch is above the configured
//! threshold; otherwise maps sequentially. Output order always follows input.

use crate::config::SolverConfig;

#[cfg_attr(not(feature = "parallel"), allow(unused_variables))]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &SolverConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved_on_both_paths() {
        let items: Vec<u32> = (0..200).collect();
        let sequential = SolverConfig {
            parallel_threshold: usize::MAX,
            ..SolverConfig::default()
        };
        let eager = SolverConfig {
            parallel_threshold: 0,
            ..SolverConfig::default()
        };

        let a = maybe_parallel_map(&items, &sequential, |x| x * 2);
        let b = maybe_parallel_map(&items, &eager, |x| x * 2);
        assert_eq!(a, b);
        assert_eq!(a[199], 398);
    }
}
