use std::mem;

use crate::{AvlTree, AvlTreeMap, AvlTreeMultiset, AvlTreeSet, EmptyContainerAccess};

const N: i32 = 1_000;
const LARGE_N: i32 = 1_000_000;

/// Value ordered and compared by key alone; the payload tells instances of
/// the same key apart.
#[derive(Debug, Clone, Copy)]
struct Tagged {
    key: i32,
    seq: u32,
}

impl Tagged {
    fn new(key: i32, seq: u32) -> Self {
        Self { key, seq }
    }
}

impl PartialEq for Tagged {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Tagged {}

impl PartialOrd for Tagged {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tagged {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

fn collect<T: Ord + Copy>(tree: &AvlTree<T>) -> Vec<T> {
    tree.iter().copied().collect()
}

#[test]
fn test_new() {
    let tree_i32 = AvlTree::<i32>::new();
    assert!(tree_i32.is_empty());
    assert_eq!(tree_i32.len(), 0);
    assert_eq!(tree_i32.height(), 0);
    assert!(!tree_i32.is_unique());
    assert!(tree_i32.cursor_front() == tree_i32.cursor_end());
    tree_i32.check_consistency();

    let tree_string = AvlTree::<String>::new();
    assert!(tree_string.is_empty());
    tree_string.check_consistency();

    let set = AvlTreeSet::<i8>::new();
    assert!(set.is_empty());
    set.check_consistency();

    let multiset = AvlTreeMultiset::<u64>::new();
    assert!(multiset.is_empty());
    multiset.check_consistency();

    let map = AvlTreeMap::<String, String>::new();
    assert!(map.is_empty());
    map.check_consistency();
}

#[test]
fn test_rebalance() {
    {
        // 10  ->   20
        //   \     /  \
        //   20   10  30
        //     \
        //     30
        let mut tree = AvlTree::new();
        tree.insert(10);
        tree.insert(20);
        tree.insert(30);
        tree.check_consistency();
        assert_eq!(tree.height(), 2);
        assert_eq!(collect(&tree), vec![10, 20, 30]);
    }
    {
        //     3 ->   2
        //    /      / \
        //   2      1   3
        //  /
        // 1
        let mut tree = AvlTree::new();
        tree.insert(3);
        tree.insert(2);
        tree.insert(1);
        tree.check_consistency();
        assert_eq!(tree.height(), 2);
    }
    {
        //   3  ->   2
        //  /       / \
        // 1       1   3
        //  \
        //   2
        let mut tree = AvlTree::new();
        tree.insert(3);
        tree.insert(1);
        tree.insert(2);
        tree.check_consistency();
        assert_eq!(tree.height(), 2);
    }
    {
        // 1   ->  2
        //  \     / \
        //   3   1   3
        //  /
        // 2
        let mut tree = AvlTree::new();
        tree.insert(1);
        tree.insert(3);
        tree.insert(2);
        tree.check_consistency();
        assert_eq!(tree.height(), 2);
    }
    {
        //   3   ->   3  ->   2
        //  / \      /       / \
        // 1   4    1       1   3
        //  \        \
        //   2        2
        let mut tree = AvlTree::new();
        tree.insert(3);
        tree.insert(1);
        tree.insert(4);
        tree.insert(2);
        tree.check_consistency();
        assert_eq!(tree.height(), 3);
        tree.remove(&4);
        tree.check_consistency();
        assert_eq!(tree.height(), 2);
    }
    {
        //   1     -> 1     ->    2
        //  / \        \         / \
        // 0   2        2       1   3
        //      \        \
        //       3        3
        let mut tree = AvlTree::new();
        tree.insert(1);
        tree.insert(0);
        tree.insert(2);
        tree.insert(3);
        tree.check_consistency();
        assert_eq!(tree.height(), 3);
        tree.remove(&0);
        tree.check_consistency();
        assert_eq!(tree.height(), 2);
    }
}

#[test]
fn test_insert_unique() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();
    values.sort_unstable();
    values.dedup();

    let mut tree = AvlTree::new();
    tree.set_unique();
    assert!(tree.is_unique());
    for value in &values {
        let (cursor, inserted) = tree.insert(*value);
        assert!(inserted);
        assert_eq!(cursor.value(), Some(value));
        tree.check_consistency();
    }
    assert_eq!(tree.len(), values.len());

    for value in &values {
        let (cursor, inserted) = tree.insert(*value);
        assert!(!inserted);
        assert_eq!(cursor.value(), Some(value));
    }
    assert_eq!(tree.len(), values.len());
}

#[test]
fn test_insert_sorted_range() {
    let mut tree = AvlTree::new();
    tree.set_unique();
    for value in 0..N {
        assert!(tree.insert(value).1);
        tree.check_consistency();
    }
    assert_eq!(tree.len(), N as usize);
    assert!(tree.height() > 0);
    assert!(tree.height() < N as usize / 2);
    assert!(tree.get(&-42).is_none());
}

#[test]
fn test_insert_shuffled_range() {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    let mut values: Vec<i32> = (0..N).collect();
    let mut rng = StdRng::seed_from_u64(0);
    values.shuffle(&mut rng);

    let mut tree = AvlTree::new();
    tree.set_unique();
    for value in &values {
        assert!(tree.insert(*value).1);
        tree.check_consistency();
    }
    assert_eq!(tree.len(), values.len());

    for value in &values {
        assert!(!tree.insert(*value).1);
    }
    assert_eq!(tree.len(), values.len());
}

#[test]
fn test_insert_scenario() {
    let mut tree = AvlTree::new();
    tree.set_unique();
    for value in [5, 3, 8, 1, 4, 7, 9] {
        assert!(tree.insert(value).1);
        tree.check_consistency();
    }
    assert_eq!(collect(&tree), vec![1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn test_duplicates() {
    let mut tree = AvlTree::new();
    tree.insert(5);
    tree.insert(5);
    tree.insert(5);
    tree.check_consistency();
    assert_eq!(tree.count(&5), 3);
    assert_eq!(tree.len(), 3);

    assert!(tree.remove(&5));
    tree.check_consistency();
    assert_eq!(tree.count(&5), 2);
    assert_eq!(tree.len(), 2);

    // Every insert of an equal value adds a node in non-unique mode
    let (_, inserted) = tree.insert(5);
    assert!(inserted);
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_duplicate_order_is_stable() {
    let mut tree = AvlTree::new();
    let arrivals = [3, 1, 3, 2, 3, 1, 2, 3, 1, 2];
    for (seq, key) in arrivals.into_iter().enumerate() {
        tree.insert(Tagged::new(key, seq as u32));
        tree.check_consistency();
    }

    // Within one key the payloads must appear in arrival order
    let visited: Vec<Tagged> = tree.iter().copied().collect();
    for window in visited.windows(2) {
        assert!(window[0].key <= window[1].key);
        if window[0].key == window[1].key {
            assert!(window[0].seq < window[1].seq);
        }
    }

    // Removal takes the oldest instance of the key
    assert_eq!(tree.get(&Tagged::new(3, 999)).map(|t| t.seq), Some(0));
    assert!(tree.remove(&Tagged::new(3, 999)));
    tree.check_consistency();
    assert_eq!(tree.get(&Tagged::new(3, 999)).map(|t| t.seq), Some(2));
    assert_eq!(tree.count(&Tagged::new(3, 999)), 3);
}

#[test]
fn test_remove() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();
    values.sort_unstable();
    values.dedup();

    let mut tree = AvlTree::new();
    tree.set_unique();
    for value in &values {
        tree.insert(*value);
    }

    values.shuffle(&mut rng);
    for value in &values {
        assert!(tree.contains(value));
        assert!(tree.remove(value));
        assert!(!tree.contains(value));
        tree.check_consistency();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
}

#[test]
fn test_remove_absent() {
    let mut tree = AvlTree::new();
    for value in [5, 3, 8] {
        tree.insert(value);
    }
    let before = collect(&tree);

    assert!(!tree.remove(&42));
    tree.check_consistency();
    assert_eq!(tree.len(), 3);
    assert_eq!(collect(&tree), before);
}

#[test]
fn test_remove_two_child_root() {
    let mut tree = AvlTree::new();
    tree.set_unique();
    for value in [5, 3, 8, 1, 4, 7, 9] {
        tree.insert(value);
    }

    assert!(tree.remove(&5));
    tree.check_consistency();
    assert_eq!(collect(&tree), vec![1, 3, 4, 7, 8, 9]);
}

#[test]
fn test_find_and_count() {
    let mut tree = AvlTree::new();
    for value in [4, 2, 6, 2, 4, 4] {
        tree.insert(value);
    }
    tree.check_consistency();

    assert_eq!(tree.find(&4).value(), Some(&4));
    assert_eq!(tree.count(&4), 3);
    assert_eq!(tree.count(&2), 2);
    assert_eq!(tree.count(&6), 1);
    assert_eq!(tree.count(&42), 0);
    assert!(tree.contains(&2));
    assert!(!tree.contains(&3));
    assert!(tree.find(&3) == tree.cursor_end());
    assert!(tree.find(&3).value().is_none());
}

#[test]
fn test_cursor() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen_range(0..N / 2)).collect();

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }
    values.sort_unstable();

    // Forward walk visits every value in sorted order and ends past the end
    let mut cursor = tree.cursor_front();
    let mut visited = Vec::new();
    while let Some(&value) = cursor.value() {
        visited.push(value);
        cursor.move_next();
    }
    assert_eq!(visited, values);
    assert!(cursor == tree.cursor_end());

    // Stepping next past the end stays put
    cursor.move_next();
    assert!(cursor.value().is_none());

    // Stepping back from the end recovers the maximum
    cursor.move_prev();
    assert_eq!(cursor.value(), values.last());

    // Backward walk from the end sentinel
    let mut cursor = tree.cursor_end();
    let mut reversed = Vec::new();
    for _ in 0..tree.len() {
        cursor.move_prev();
        reversed.push(*cursor.value().unwrap());
    }
    reversed.reverse();
    assert_eq!(reversed, values);
    assert!(cursor == tree.cursor_front());

    // Stepping back at the first element stays put
    cursor.move_prev();
    assert!(cursor == tree.cursor_front());
}

#[test]
fn test_cursor_empty() {
    let tree = AvlTree::<i32>::new();
    assert!(tree.cursor_front() == tree.cursor_end());
    assert!(tree.cursor_front().value().is_none());

    let mut cursor = tree.cursor_end();
    cursor.move_prev();
    assert!(cursor.value().is_none());
    cursor.move_next();
    assert!(cursor.value().is_none());
}

#[test]
fn test_min_max() {
    let mut tree = AvlTree::new();
    assert_eq!(tree.min(), Err(EmptyContainerAccess));
    assert_eq!(tree.max(), Err(EmptyContainerAccess));
    assert!(format!("{}", EmptyContainerAccess).contains("empty"));

    for value in [5, 3, 8, 1, 9] {
        tree.insert(value);
    }
    assert_eq!(tree.min(), Ok(&1));
    assert_eq!(tree.max(), Ok(&9));
}

#[test]
fn test_iter() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen_range(0..N)).collect();

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }
    values.sort_unstable();

    assert_eq!(tree.iter().len(), values.len());
    assert_eq!(collect(&tree), values);

    let backwards: Vec<i32> = tree.iter().rev().copied().collect();
    let mut expected = values.clone();
    expected.reverse();
    assert_eq!(backwards, expected);

    // Meeting in the middle yields each value exactly once
    let mut iter = tree.iter();
    let mut front_back = Vec::new();
    loop {
        match iter.next() {
            None => break,
            Some(&value) => front_back.push(value),
        }
        match iter.next_back() {
            None => break,
            Some(&value) => front_back.push(value),
        }
    }
    front_back.sort_unstable();
    assert_eq!(front_back, values);

    let owned: Vec<i32> = tree.into_iter().collect();
    assert_eq!(owned, values);
}

#[test]
fn test_clear() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (0..N).map(|_| rng.gen()).collect();

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }
    assert!(!tree.is_empty());

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert!(tree.cursor_front() == tree.cursor_end());

    // The cleared tree keeps working
    for value in &values {
        tree.insert(*value);
    }
    assert_eq!(tree.len(), values.len());
    tree.check_consistency();
}

#[test]
fn test_clone() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (0..N).map(|_| rng.gen_range(0..N / 4)).collect();

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }

    let cloned = tree.clone();
    cloned.check_consistency();
    assert_eq!(cloned.len(), tree.len());
    assert_eq!(collect(&cloned), collect(&tree));
    assert_eq!(cloned.is_unique(), tree.is_unique());

    // Mutating one side never shows through on the other
    let before = collect(&cloned);
    tree.remove(values.first().unwrap());
    tree.insert(-1);
    tree.check_consistency();
    assert_eq!(collect(&cloned), before);

    drop(tree);
    assert_eq!(collect(&cloned), before);
}

#[test]
fn test_move() {
    let mut tree = AvlTree::new();
    tree.set_unique();
    for value in [5, 3, 8] {
        tree.insert(value);
    }

    let moved = mem::take(&mut tree);
    assert_eq!(collect(&moved), vec![3, 5, 8]);
    assert!(moved.is_unique());
    moved.check_consistency();

    // The moved-from tree is a valid empty tree in the default mode
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert!(!tree.is_unique());
    assert!(tree.cursor_front() == tree.cursor_end());
    tree.insert(1);
    tree.check_consistency();
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_set_unique_not_retroactive() {
    let mut tree = AvlTree::new();
    tree.insert(5);
    tree.insert(5);
    assert_eq!(tree.len(), 2);

    // Existing duplicates survive the mode switch, future ones are rejected
    tree.set_unique();
    assert!(!tree.insert(5).1);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.count(&5), 2);
    tree.check_consistency();
}

#[test]
fn test_max_size() {
    let tree = AvlTree::<i32>::new();
    assert!(tree.max_size() > 0);
    assert!(tree.max_size() < usize::MAX);

    // Bigger values leave room for fewer nodes
    let tree_wide = AvlTree::<[u64; 8]>::new();
    assert!(tree_wide.max_size() < tree.max_size());
}

#[test]
fn test_set() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..N).map(|_| rng.gen_range(0..N)).collect();

    let mut set = AvlTreeSet::new();
    for value in &values {
        set.insert(*value);
    }
    set.check_consistency();

    values.sort_unstable();
    values.dedup();
    assert_eq!(set.len(), values.len());
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), values);
    assert_eq!(set.first(), Ok(values.first().unwrap()));
    assert_eq!(set.last(), Ok(values.last().unwrap()));

    for value in &values {
        assert_eq!(set.get(value), Some(value));
        assert!(!set.insert(*value));
    }
    assert_eq!(set.len(), values.len());

    values.shuffle(&mut rng);
    for value in &values {
        assert!(set.remove(value));
        assert!(!set.contains(value));
    }
    set.check_consistency();
    assert!(set.is_empty());
    assert_eq!(set.first(), Err(EmptyContainerAccess));
    assert_eq!(set.last(), Err(EmptyContainerAccess));
}

#[test]
fn test_set_append() {
    let mut lhs: AvlTreeSet<i32> = [1, 2, 3].into_iter().collect();
    let mut rhs: AvlTreeSet<i32> = [3, 4, 5].into_iter().collect();

    lhs.append(&mut rhs);
    lhs.check_consistency();
    assert_eq!(lhs.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert!(rhs.is_empty());

    // The emptied set still rejects duplicates
    assert!(rhs.insert(7));
    assert!(!rhs.insert(7));
    assert_eq!(rhs.len(), 1);
}

#[test]
fn test_set_clone_stays_unique() {
    let set: AvlTreeSet<i32> = [1, 2, 3].into_iter().collect();
    let mut cloned = set.clone();
    assert!(!cloned.insert(2));
    assert_eq!(cloned.len(), 3);
    assert_eq!(format!("{:?}", cloned), "{1, 2, 3}");
}

#[test]
fn test_multiset() {
    let mut multiset = AvlTreeMultiset::new();
    for value in [5, 3, 5, 8, 5, 3] {
        multiset.insert(value);
    }
    multiset.check_consistency();

    assert_eq!(multiset.len(), 6);
    assert_eq!(multiset.count(&5), 3);
    assert_eq!(multiset.count(&3), 2);
    assert_eq!(multiset.count(&8), 1);
    assert_eq!(multiset.count(&42), 0);
    assert_eq!(
        multiset.iter().copied().collect::<Vec<_>>(),
        vec![3, 3, 5, 5, 5, 8]
    );
    assert_eq!(multiset.first(), Ok(&3));
    assert_eq!(multiset.last(), Ok(&8));

    assert!(multiset.remove(&5));
    multiset.check_consistency();
    assert_eq!(multiset.count(&5), 2);
    assert_eq!(multiset.len(), 5);

    assert_eq!(multiset.remove_all(&3), 2);
    multiset.check_consistency();
    assert!(!multiset.contains(&3));
    assert_eq!(multiset.len(), 3);

    assert!(!multiset.remove(&42));
    assert_eq!(multiset.len(), 3);
}

#[test]
fn test_multiset_append() {
    let mut lhs: AvlTreeMultiset<i32> = [1, 2, 2].into_iter().collect();
    let mut rhs: AvlTreeMultiset<i32> = [2, 3].into_iter().collect();

    lhs.append(&mut rhs);
    lhs.check_consistency();
    assert_eq!(lhs.iter().copied().collect::<Vec<_>>(), vec![1, 2, 2, 2, 3]);
    assert!(rhs.is_empty());
}

#[test]
fn test_map() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut keys: Vec<i32> = (0..N).map(|_| rng.gen()).collect();
    keys.sort_unstable();
    keys.dedup();

    let mut map = AvlTreeMap::new();
    assert!(map.get(&42).is_none());
    for key in &keys {
        assert!(map.insert(*key, key.wrapping_add(1)));
    }
    map.check_consistency();
    assert_eq!(map.len(), keys.len());

    for key in &keys {
        assert_eq!(map.get(key), Some(&key.wrapping_add(1)));
        assert_eq!(map.get_key_value(key), Some((key, &key.wrapping_add(1))));
        assert!(!map.insert(*key, 0));
        assert_eq!(map.get(key), Some(&key.wrapping_add(1)));
    }
    assert_eq!(map.len(), keys.len());

    // Iteration is sorted by key
    let mut key_iter = keys.iter();
    for (&key, &value) in &map {
        let expected = key_iter.next().unwrap();
        assert_eq!(key, *expected);
        assert_eq!(value, expected.wrapping_add(1));
    }
    assert!(key_iter.next().is_none());

    keys.shuffle(&mut rng);
    for key in &keys {
        assert!(map.contains_key(key));
        assert!(map.remove(key));
        assert!(!map.contains_key(key));
        map.check_consistency();
    }
    assert!(map.is_empty());
}

#[test]
fn test_map_get_mut() {
    let mut map = AvlTreeMap::new();
    map.insert("a", 1);
    map.insert("b", 2);

    if let Some(value) = map.get_mut(&"a") {
        *value += 10;
    }
    assert_eq!(map.get(&"a"), Some(&11));
    assert!(map.get_mut(&"c").is_none());
    map.check_consistency();
}

#[test]
fn test_map_insert_or_assign() {
    let mut map = AvlTreeMap::new();
    assert!(map.insert_or_assign(1, "one"));
    assert!(map.insert_or_assign(2, "two"));
    assert!(!map.insert_or_assign(1, "uno"));
    map.check_consistency();

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), Some(&"uno"));
    assert_eq!(map.get(&2), Some(&"two"));
}

#[test]
fn test_map_extremes() {
    let mut map = AvlTreeMap::new();
    assert_eq!(map.first_key_value(), Err(EmptyContainerAccess));
    assert_eq!(map.last_key_value(), Err(EmptyContainerAccess));

    map.insert(2, "two");
    map.insert(1, "one");
    map.insert(3, "three");
    assert_eq!(map.first_key_value(), Ok((&1, &"one")));
    assert_eq!(map.last_key_value(), Ok((&3, &"three")));
}

#[test]
fn test_map_into_iter() {
    let map: AvlTreeMap<i32, &str> =
        [(2, "two"), (1, "one"), (3, "three")].into_iter().collect();
    assert_eq!(format!("{:?}", map), r#"{1: "one", 2: "two", 3: "three"}"#);

    let pairs: Vec<(i32, &str)> = map.into_iter().collect();
    assert_eq!(pairs, vec![(1, "one"), (2, "two"), (3, "three")]);
}

#[test]
fn test_map_clone() {
    let map: AvlTreeMap<i32, String> = (0..100).map(|k| (k, k.to_string())).collect();
    let mut cloned = map.clone();
    cloned.check_consistency();

    cloned.remove(&0);
    cloned.insert_or_assign(1, String::from("changed"));
    assert_eq!(map.get(&0), Some(&String::from("0")));
    assert_eq!(map.get(&1), Some(&String::from("1")));
    assert_eq!(cloned.get(&1), Some(&String::from("changed")));
}

#[test]
#[ignore]
fn test_large() {
    use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut values: Vec<i32> = (0..LARGE_N).map(|_| rng.gen_range(0..LARGE_N)).collect();

    let mut tree = AvlTree::new();
    for value in &values {
        tree.insert(*value);
    }
    tree.check_consistency();
    assert_eq!(tree.len(), values.len());

    values.shuffle(&mut rng);
    values.truncate(values.len() / 2);
    for value in &values {
        tree.remove(value);
    }
    tree.check_consistency();
}
