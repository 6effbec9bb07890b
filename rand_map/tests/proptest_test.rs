use proptest::prelude::*;
use rand_map::RandMap;
use std::collections::HashMap;

// Model operations against a std HashMap. The source picks `pick % len`, so
// the chosen key is whatever sits at that position of the key list.
proptest! {
    #[test]
    fn prop_rand_map_matches_model(
        picks in proptest::collection::vec(0usize..1000, 1..64),
        ops in proptest::collection::vec((0u8..=4u8, 0u8..20u8, any::<u16>()), 1..200),
    ) {
        let mut next_pick = picks.into_iter().cycle();
        let map = RandMap::new(move |len: usize| next_pick.next().unwrap_or(0) % len);
        let mut model: HashMap<u8, u16> = HashMap::new();

        for (op, key, value) in ops {
            match op {
                0 | 1 => {
                    prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                2 => {
                    prop_assert_eq!(map.pop(&key), model.remove(&key));
                }
                3 => {
                    let before = map.keys();
                    match map.random() {
                        Some((k, v)) => {
                            prop_assert!(before.contains(&k));
                            prop_assert_eq!(model.get(&k), Some(&v));
                        }
                        None => {
                            prop_assert!(model.is_empty());
                        }
                    }
                }
                4 => {
                    match map.pop_random() {
                        Some((k, v)) => {
                            prop_assert_eq!(model.remove(&k), Some(v));
                        }
                        None => {
                            prop_assert!(model.is_empty());
                        }
                    }
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(map.len(), model.len());
            prop_assert!(map.is_consistent());
        }

        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(*value));
        }
    }

    #[test]
    fn prop_swap_remove_keeps_other_positions(len in 1usize..50, position in 0usize..50) {
        let position = position % len;
        let map = RandMap::from_iter_with_source((0..len).map(|i| (i, i)), move |_: usize| position);
        let before = map.keys();
        let popped = map.pop_random();
        prop_assert_eq!(popped, Some((before[position], before[position])));

        let after = map.keys();
        let mut expected = before.clone();
        expected.swap_remove(position);
        prop_assert_eq!(after, expected);
    }
}
