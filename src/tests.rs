//! Crate-level tests exercised against every shipped [`CVecConfig`], mirroring
//! the teacher's `paste`-generated per-config test matrix (`src/tests.rs`)
//! but parameterized over context-pool ceiling / codec choice instead of
//! bucket growth rate.

use super::*;
use crate::config::{DefaultConfig, EagerConfig, MemoryTightConfig, NullCodecConfig};
use alloc::vec::Vec;

macro_rules! create_test_for_configs {
    ( $test_fn:ident ) => {
        paste::item! {
            #[test]
            fn [<$test_fn _default_config_small>]() {
                $test_fn::<DefaultConfig>(small_test_values())
            }

            #[test]
            fn [<$test_fn _default_config_big>]() {
                $test_fn::<DefaultConfig>(big_test_values())
            }

            #[test]
            fn [<$test_fn _eager_config_small>]() {
                $test_fn::<EagerConfig>(small_test_values())
            }

            #[test]
            fn [<$test_fn _eager_config_big>]() {
                $test_fn::<EagerConfig>(big_test_values())
            }

            #[test]
            fn [<$test_fn _memory_tight_config_small>]() {
                $test_fn::<MemoryTightConfig>(small_test_values())
            }

            #[test]
            fn [<$test_fn _memory_tight_config_big>]() {
                $test_fn::<MemoryTightConfig>(big_test_values())
            }

            #[test]
            fn [<$test_fn _null_codec_config_small>]() {
                $test_fn::<NullCodecConfig>(small_test_values())
            }

            #[test]
            fn [<$test_fn _null_codec_config_big>]() {
                $test_fn::<NullCodecConfig>(big_test_values())
            }
        }
    };
}

fn small_test_values() -> Vec<i64> {
    alloc::vec![5, 42, 1337, -1, 0, 7, 66, 12, 1, 2, 3, 1]
}

fn big_test_values() -> Vec<i64> {
    let mut vec = Vec::new();
    let mut rng = rand::thread_rng();
    use rand::Rng as _;
    for _ in 0..5_000 {
        vec.push(rng.gen());
    }
    vec
}

fn new_is_empty<C: CVecConfig>(_test_values: Vec<i64>) {
    let v = <CVec<i64, C>>::new();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
}
create_test_for_configs!(new_is_empty);

fn push_grows_len<C: CVecConfig>(test_values: Vec<i64>) {
    let mut v = <CVec<i64, C>>::new();
    let expected_len = test_values.len();
    for (i, value) in test_values.into_iter().enumerate() {
        assert_eq!(v.len(), i);
        v.push_back(value).unwrap();
    }
    assert_eq!(v.len(), expected_len);
}
create_test_for_configs!(push_grows_len);

fn at_round_trips_pushed_values<C: CVecConfig>(test_values: Vec<i64>) {
    let mut v = <CVec<i64, C>>::new();
    for &value in &test_values {
        v.push_back(value).unwrap();
    }
    for (i, &expected) in test_values.iter().enumerate() {
        assert_eq!(v.at(i).unwrap(), expected);
    }
}
create_test_for_configs!(at_round_trips_pushed_values);

fn set_overwrites_in_place<C: CVecConfig>(test_values: Vec<i64>) {
    if test_values.is_empty() {
        return;
    }
    let mut v = <CVec<i64, C>>::new();
    for &value in &test_values {
        v.push_back(value).unwrap();
    }
    for i in 0..v.len() {
        v.set(i, -(i as i64)).unwrap();
    }
    for i in 0..v.len() {
        assert_eq!(v.at(i).unwrap(), -(i as i64));
    }
}
create_test_for_configs!(set_overwrites_in_place);

fn pop_back_is_lifo<C: CVecConfig>(test_values: Vec<i64>) {
    let mut v = <CVec<i64, C>>::new();
    for &value in &test_values {
        v.push_back(value).unwrap();
    }
    for &expected in test_values.iter().rev() {
        assert_eq!(v.pop_back().unwrap(), Some(expected));
    }
    assert_eq!(v.pop_back().unwrap(), None);
}
create_test_for_configs!(pop_back_is_lifo);

fn iter_matches_sequential_push_order<C: CVecConfig>(test_values: Vec<i64>) {
    let mut v = <CVec<i64, C>>::new();
    for &value in &test_values {
        v.push_back(value).unwrap();
    }
    let collected: Vec<i64> = v.iter().collect();
    assert_eq!(collected, test_values);
}
create_test_for_configs!(iter_matches_sequential_push_order);

fn serialize_deserialize_preserves_contents<C: CVecConfig>(test_values: Vec<i64>) {
    let mut v = <CVec<i64, C>>::new();
    for &value in &test_values {
        v.push_back(value).unwrap();
    }
    let mut bytes = Vec::new();
    v.serialize(&mut bytes).unwrap();
    let mut restored = <CVec<i64, C>>::deserialize(&bytes).unwrap();
    assert_eq!(restored.len(), v.len());
    for (i, &expected) in test_values.iter().enumerate() {
        assert_eq!(restored.at(i).unwrap(), expected);
    }
}
create_test_for_configs!(serialize_deserialize_preserves_contents);

fn sort_orders_ascending<C: CVecConfig>(test_values: Vec<i64>) {
    if test_values.is_empty() {
        return;
    }
    let mut v = <CVec<i64, C>>::new();
    for &value in &test_values {
        v.push_back(value).unwrap();
    }
    v.sort().unwrap();
    let mut prev = v.at(0).unwrap();
    for i in 1..v.len() {
        let cur = v.at(i).unwrap();
        assert!(prev <= cur);
        prev = cur;
    }
}
create_test_for_configs!(sort_orders_ascending);
