// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt::{Debug, Display};
use core::hash::Hash;
use std::collections::hash_map::DefaultHasher;

#[allow(dead_code)]
pub fn check_derives<T>()
where
    T: Clone
        + Copy
        + Debug
        + Default
        + Display
        + Eq
        + PartialEq
        + Hash
        + Ord
        + PartialOrd,
{
    let a = T::default();

    // PartialEq
    assert_eq!(a, a);

    // Clone / Copy
    assert_eq!(a, a.clone());
    let c: T = a;
    assert_eq!(a, c);

    // PartialOrd
    assert!(a >= a);

    // Debug/Display
    assert!(!format!("{a:?}").is_empty());
    format!("{a}");

    // Hash
    let mut hasher = DefaultHasher::new();
    a.hash(&mut hasher);
}
