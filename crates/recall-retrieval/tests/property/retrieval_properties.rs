use proptest::prelude::*;
use recall_retrieval::search::{fuse, WeightedRanking};

fn ranking(origin: &str, ids: &[String]) -> WeightedRanking {
    let hits = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), 1.0 - i as f64 / 100.0))
        .collect();
    WeightedRanking::from_ordered(origin, 1.0, hits)
}

fn distinct_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(0u32..200, 1..max)
        .prop_map(|set| set.into_iter().map(|n| format!("doc{n}")).collect())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn shared_top_hit_beats_single_top_hit(
        a in distinct_ids(12),
        b in distinct_ids(12),
        k in 1u32..200,
    ) {
        // Place a shared id first in both lists and a lone id first in a third.
        let shared = "shared".to_string();
        let lone = "lone".to_string();
        let mut first: Vec<String> = vec![shared.clone()];
        first.extend(a);
        let mut second: Vec<String> = vec![shared.clone()];
        second.extend(b);
        let third = vec![lone.clone()];

        let fused = fuse(
            &[ranking("x", &first), ranking("y", &second), ranking("z", &third)],
            k,
        );
        let pos = |id: &str| fused.iter().position(|r| r.id == id).unwrap();
        prop_assert!(pos(&shared) < pos(&lone));
        prop_assert_eq!(pos(&shared), 0);
    }

    #[test]
    fn single_origin_scores_fall_with_rank(ids in distinct_ids(30), k in 0u32..100) {
        let fused = fuse(&[ranking("only", &ids)], k);
        let order: Vec<&str> = fused.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<&str> = ids.iter().map(String::as_str).collect();
        prop_assert_eq!(order, expected);
        for pair in fused.windows(2) {
            prop_assert!(pair[0].fused_score >= pair[1].fused_score);
        }
    }

    #[test]
    fn empty_origin_leaves_the_other_order(ids in distinct_ids(30)) {
        let fused = fuse(&[ranking("empty", &[]), ranking("full", &ids)], 60);
        let order: Vec<&str> = fused.iter().map(|r| r.id.as_str()).collect();
        let expected: Vec<&str> = ids.iter().map(String::as_str).collect();
        prop_assert_eq!(order, expected);
        prop_assert!(fused.iter().all(|r| !r.per_origin.contains_key("empty")));
    }

    #[test]
    fn fused_scores_are_bounded(a in distinct_ids(20), b in distinct_ids(20), k in 0u32..100) {
        let fused = fuse(&[ranking("x", &a), ranking("y", &b)], k);
        let max = 2.0 / (k as f64 + 1.0);
        for r in &fused {
            prop_assert!(r.fused_score > 0.0 && r.fused_score <= max + 1e-12);
        }
    }
}
