//! The rendezvous-hash pick algorithm: given per-processor weights and an
//! input `(hash, clock)` pair, choose the routed subset of processor
//! indices.

use crate::config::{Mode, Processor};

const MAGIC: u32 = 0x9e3779b9;

/// The boost-style 32-bit rendezvous combine.
fn combine32(a: u32, b: u32) -> u32 {
    a ^ (b
        .wrapping_add(MAGIC)
        .wrapping_add(a << 6)
        .wrapping_add(a >> 2))
}

/// Pick the routed processor indices for `(hash, clock)`.
///
/// Processor 0 is privileged: it is never clock-filtered and is always
/// present in the result, regardless of how its rank compares to the other
/// processors' — only processors `1..N` genuinely compete for the
/// remaining `K - 1` slots by descending rank (ties broken by ascending
/// index), after clock-bound filtering.
pub fn pick(processors: &[Processor], weights: &[u32], mode: Mode, hash: u32, clock: u64) -> Vec<usize> {
    let k = mode.cardinality();
    let rank = |i: usize| combine32(hash, weights[i]);

    let mut rest: Vec<(usize, u32)> = (1..processors.len())
        .filter(|&i| {
            let p = &processors[i];
            !(p.min_clock > 0 && clock < p.min_clock) && !(p.max_clock > 0 && clock > p.max_clock)
        })
        .map(|i| (i, rank(i)))
        .collect();
    rest.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    rest.truncate(k.saturating_sub(1));

    let mut top = Vec::with_capacity(k);
    top.push((0usize, rank(0)));
    top.extend(rest);
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    match mode {
        Mode::BroadcastTo(_) => top.into_iter().map(|(i, _)| i).collect(),
        Mode::ChooseFrom(_) => {
            let idx = (clock as usize) % top.len();
            vec![top[idx].0]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::weights::derive_weights;

    fn unbounded(n: usize) -> Vec<Processor> {
        (0..n)
            .map(|_| Processor { min_clock: 0, max_clock: 0 })
            .collect()
    }

    #[test]
    fn test_scenario_e_broadcast_always_includes_privileged() {
        let processors = unbounded(3);
        let weights = derive_weights(3);
        for hash in [0u32, 1, 12345, u32::MAX] {
            for clock in [0u64, 7, u64::MAX] {
                let picked = pick(&processors, &weights, Mode::BroadcastTo(2), hash, clock);
                assert_eq!(picked.len(), 2);
                assert!(picked.contains(&0));
            }
        }
    }

    #[test]
    fn test_scenario_f_clock_bounded() {
        let processors = vec![
            Processor { min_clock: 0, max_clock: 0 },
            Processor { min_clock: 100, max_clock: 200 },
        ];
        let weights = derive_weights(2);
        let hash = 0xdead_beef;

        assert_eq!(pick(&processors, &weights, Mode::BroadcastTo(2), hash, 50), vec![0]);
        assert_eq!(pick(&processors, &weights, Mode::BroadcastTo(2), hash, 250), vec![0]);

        let mut picked = pick(&processors, &weights, Mode::BroadcastTo(2), hash, 150);
        picked.sort();
        assert_eq!(picked, vec![0, 1]);
    }

    #[test]
    fn test_broadcast_cardinality_is_min_of_k_and_eligible() {
        let processors = vec![
            Processor { min_clock: 0, max_clock: 0 },
            Processor { min_clock: 100, max_clock: 200 },
            Processor { min_clock: 0, max_clock: 0 },
        ];
        let weights = derive_weights(3);
        // clock=50 excludes processor 1, leaving {0, 2}; K=5 exceeds eligible count.
        let picked = pick(&processors, &weights, Mode::BroadcastTo(5), 42, 50);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_choose_from_returns_one_element() {
        let processors = unbounded(4);
        let weights = derive_weights(4);
        let picked = pick(&processors, &weights, Mode::ChooseFrom(3), 999, 17);
        assert_eq!(picked.len(), 1);
    }
}

#[cfg(test)]
mod quickcheck_test {
    use super::*;
    use crate::weights::derive_weights;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn privileged_processor_always_present(n: usize, hash: u32, clock: u64, k: usize) -> bool {
        let n = 1 + (n % 8);
        let k = 1 + (k % n);
        let processors: Vec<Processor> = (0..n)
            .map(|_| Processor { min_clock: 0, max_clock: 0 })
            .collect();
        let weights = derive_weights(n);
        pick(&processors, &weights, Mode::BroadcastTo(k), hash, clock).contains(&0)
    }
}
