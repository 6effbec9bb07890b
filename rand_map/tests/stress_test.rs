use rand_map::{RandMap, SmallRngSource, ThreadRngSource};
use std::sync::Arc;
use std::thread;

#[test]
#[cfg_attr(miri, ignore)]
fn test_disjoint_keys_interleaved_ops() {
    let map = Arc::new(RandMap::new(SmallRngSource::from_seed(0)));

    let mut handles = vec![];
    for t in 0..8 {
        let m = map.clone();
        handles.push(thread::spawn(move || {
            for i in 0..2000 {
                let key = t * 2000 + i;
                m.insert(key, key * 2);
                let _ = m.random();
                if i % 2 == 0 {
                    assert_eq!(m.pop(&key), Some(key * 2));
                }
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(map.len(), 8 * 1000);
    assert_eq!(map.keys().len(), map.len());
    assert!(map.is_consistent());
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_concurrent_pop_random_takes_each_entry_once() {
    let map = Arc::new(RandMap::from_iter_with_source(
        (0..10_000).map(|i| (i, i)),
        ThreadRngSource,
    ));

    let mut handles = vec![];
    for _ in 0..4 {
        let m = map.clone();
        handles.push(thread::spawn(move || {
            let mut taken = Vec::new();
            while let Some((key, value)) = m.pop_random() {
                assert_eq!(key, value);
                taken.push(key);
            }
            taken
        }));
    }

    let mut all: Vec<i32> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort();
    assert_eq!(all, (0..10_000).collect::<Vec<_>>());
    assert!(map.is_empty());
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_heavy_contention_same_keys() {
    let map = Arc::new(RandMap::new(SmallRngSource::from_seed(11)));

    let mut handles = vec![];
    for t in 0..8 {
        let m = map.clone();
        handles.push(thread::spawn(move || {
            for i in 0..5000 {
                let key = i % 16;
                match (t + i) % 4 {
                    0 => {
                        m.insert(key, t);
                    }
                    1 => {
                        m.pop(&key);
                    }
                    2 => {
                        m.pop_random();
                    }
                    _ => {
                        let _ = m.random();
                    }
                }
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert!(map.len() <= 16);
    assert_eq!(map.keys().len(), map.len());
    assert!(map.is_consistent());
}
