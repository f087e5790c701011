use super::*;

fn by_value() -> List<i32> {
    List::with_comparator(|a: &i32, b: &i32| a.cmp(b))
}

#[test]
fn empty_list_reads_fail_with_empty_list() {
    let mut list = by_value();
    assert_eq!(list.first(), Err(Error::EmptyList));
    assert_eq!(list.last(), Err(Error::EmptyList));
    assert_eq!(list.next(), Err(Error::EmptyList));
    assert_eq!(list.current(), Err(Error::EmptyList));
    assert_eq!(list.remove(&1), Err(Error::EmptyList));
}

#[test]
fn cursor_follows_reads_and_stays_on_boundary_failure() {
    let mut list = by_value();
    list.append(1).unwrap();
    list.append(2).unwrap();
    list.append(3).unwrap();
    assert_eq!(list.current(), Ok(&3));

    assert_eq!(list.first(), Ok(&1));
    assert_eq!(list.prev(), Err(Error::NoPrev));
    assert_eq!(list.current(), Ok(&1));
    assert_eq!(list.next(), Ok(&2));
    assert_eq!(list.next(), Ok(&3));
    assert_eq!(list.next(), Err(Error::NoNext));
    assert_eq!(list.current(), Ok(&3));
    assert_eq!(list.prev(), Ok(&2));
}

#[test]
fn prepend_and_append_move_cursor_to_new_node() {
    let mut list = by_value();
    list.append(2).unwrap();
    list.prepend(1).unwrap();
    assert_eq!(list.current(), Ok(&1));
    list.append(3).unwrap();
    assert_eq!(list.current(), Ok(&3));
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn ordered_insert_is_stable_after_last_equal() {
    let mut list: List<(i32, char)> = List::with_comparator(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
    for item in [(2, 'a'), (1, 'b'), (2, 'c'), (3, 'd'), (2, 'e'), (0, 'f')] {
        list.insert(item).unwrap();
    }
    let order: Vec<char> = list.iter().map(|(_, c)| *c).collect();
    assert_eq!(order, vec!['f', 'b', 'a', 'c', 'e', 'd']);
    assert_eq!(list.current(), Ok(&(0, 'f')));
}

#[test]
fn remove_repositions_cursor_to_successor_or_head() {
    let mut list = by_value();
    for v in [1, 2, 3] {
        list.append(v).unwrap();
    }
    assert_eq!(list.remove(&2), Ok(2));
    assert_eq!(list.current(), Ok(&3));

    // removing the tail wraps the cursor to the head
    assert_eq!(list.remove(&3), Ok(3));
    assert_eq!(list.current(), Ok(&1));

    assert_eq!(list.remove(&9), Err(Error::NotFound));
    assert_eq!(list.current(), Ok(&1));

    assert_eq!(list.remove(&1), Ok(1));
    assert!(list.is_empty());
    assert_eq!(list.current(), Err(Error::EmptyList));
}

#[test]
fn retrieve_compares_by_comparator_and_moves_cursor() {
    let mut list: List<(i32, &'static str)> =
        List::with_comparator(|a: &(i32, &'static str), b: &(i32, &'static str)| a.0.cmp(&b.0));
    list.append((1, "one")).unwrap();
    list.append((2, "two")).unwrap();
    list.first().unwrap();
    assert_eq!(list.retrieve(&(2, "")), Ok(&(2, "two")));
    assert_eq!(list.current(), Ok(&(2, "two")));
    list.retrieve_mut(&(1, "")).unwrap().1 = "uno";
    assert_eq!(list.retrieve_indexed(0), Ok(&(1, "uno")));
    assert!(matches!(list.retrieve_indexed(2), Err(Error::IllegalIndex { index: 2, len: 2 })));
}

#[test]
fn iterate_visits_all_without_moving_cursor() {
    let mut list = by_value();
    for v in [5, 6, 7] {
        list.append(v).unwrap();
    }
    list.first().unwrap();
    let mut sum = 0;
    list.iterate(&mut sum, |v, acc| *acc += *v);
    assert_eq!(sum, 18);
    assert_eq!(list.current(), Ok(&5));
    assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![7, 6, 5]);
}

#[test]
fn default_order_is_identity() {
    let mut list: List<usize> = List::new();
    list.insert(30).unwrap();
    list.insert(10).unwrap();
    list.insert(20).unwrap();
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    assert_eq!(list.remove(&20), Ok(20));
    assert_eq!(list.len(), 2);
}

#[test]
fn default_order_does_not_confuse_pairs_with_equal_identity() {
    let mut list: List<(usize, usize)> = List::new();
    list.append((1, 0)).unwrap();
    assert_eq!(list.remove(&(0, 1 << 17)), Err(Error::NotFound));
    assert_eq!(list.retrieve(&(1, 0)), Ok(&(1, 0)));
    list.insert((0, 1 << 17)).unwrap();
    assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![(0, 1 << 17), (1, 0)]);
    assert_eq!(list.remove(&(0, 1 << 17)), Ok((0, 1 << 17)));
}

#[test]
fn clear_resets_cursor() {
    let mut list = by_value();
    list.append(1).unwrap();
    list.clear();
    assert!(list.is_empty());
    assert_eq!(list.first(), Err(Error::EmptyList));
    list.append(4).unwrap();
    assert_eq!(list.first(), Ok(&4));
}
