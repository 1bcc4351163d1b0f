use rand::Rng;
use splay_memo::memo::{fibonacci, Memo};
use splay_memo::splay_tree::SplayMap;
use std::collections::BTreeMap;

const NUM_OF_OPERATIONS: usize = 100_000;
const KEY_RANGE: u32 = 5_000;
const NUM_OF_SORTED_KEYS: usize = 2_000;

#[test]
fn int_test_splay_map() {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = SplayMap::new();
    let mut expected = BTreeMap::new();

    for _ in 0..NUM_OF_OPERATIONS {
        let key = rng.gen_range(0, KEY_RANGE);

        if rng.gen::<bool>() {
            let val = rng.gen::<u32>();
            assert_eq!(map.insert(key, val), expected.insert(key, val));
        } else {
            let actual = map.find(&key).cloned();
            assert_eq!(actual, expected.get(&key).cloned());
            if actual.is_some() {
                assert_eq!(map.root().map(|(key, _)| *key), Some(key));
            }
        }
    }

    assert_eq!(map.len(), expected.len());
    assert_eq!(
        map.iter().collect::<Vec<(&u32, &u32)>>(),
        expected.iter().collect::<Vec<(&u32, &u32)>>(),
    );
    assert_eq!(map.min(), expected.keys().next());
    assert_eq!(map.max(), expected.keys().next_back());
}

#[test]
fn int_test_splay_map_sorted_insert() {
    let mut map = SplayMap::new();
    for key in 0..NUM_OF_SORTED_KEYS {
        map.insert(key, key);
    }
    assert_eq!(map.height(), NUM_OF_SORTED_KEYS);

    // Finding the keys in order costs linear time overall, even on a degenerate chain.
    for key in 0..NUM_OF_SORTED_KEYS {
        assert_eq!(map.find(&key), Some(&key));
    }
    assert_eq!(map.root(), Some((&(NUM_OF_SORTED_KEYS - 1), &(NUM_OF_SORTED_KEYS - 1))));
    assert_eq!(map.iter().count(), NUM_OF_SORTED_KEYS);
    assert!(map.iter().map(|(key, _)| *key).eq(0..NUM_OF_SORTED_KEYS));
}

#[test]
fn int_test_fibonacci_memo() {
    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
    let mut memo = Memo::new();

    let mut expected = vec![0u128, 1];
    for index in 2..=186 {
        let value = expected[index - 1] + expected[index - 2];
        expected.push(value);
    }

    for _ in 0..1_000 {
        let n = rng.gen_range(0, 187);
        assert_eq!(fibonacci(n as u64, &mut memo), Ok(expected[n]));
    }
    assert!(memo.stats().entries <= 187);
    assert!(memo.stats().hits > 0);
}
