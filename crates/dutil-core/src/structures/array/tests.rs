use super::*;
use crate::types::Error;
use std::sync::Arc;

#[test]
fn insert_shifts_tail_right() {
    let mut a = DynArray::try_from_slice(&[1, 2, 5]).unwrap();
    a.insert_elements(2, &[3, 4]).unwrap();
    assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5]);
    a.prepend_element(0).unwrap();
    a.append_elements(&[6, 7]).unwrap();
    assert_eq!(a.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn insert_past_end_is_illegal_index() {
    let mut a = DynArray::try_from_slice(&[1, 2]).unwrap();
    assert_eq!(
        a.insert_element(3, 9),
        Err(Error::IllegalIndex { index: 3, len: 2 })
    );
    assert_eq!(a.as_slice(), &[1, 2]);
    // inserting at len is an append
    a.insert_element(2, 3).unwrap();
    assert_eq!(a.as_slice(), &[1, 2, 3]);
}

#[test]
fn remove_index_preserves_order_fast_does_not() {
    let mut a = DynArray::try_from_slice(&[10, 20, 30, 40]).unwrap();
    assert_eq!(a.remove_index(1).unwrap(), 20);
    assert_eq!(a.as_slice(), &[10, 30, 40]);

    let mut b = DynArray::try_from_slice(&[10, 20, 30, 40]).unwrap();
    assert_eq!(b.remove_index_fast(0).unwrap(), 10);
    assert_eq!(b.as_slice(), &[40, 20, 30]);

    assert!(matches!(b.remove_index(3), Err(Error::IllegalIndex { index: 3, len: 3 })));
}

#[test]
fn set_size_grows_with_defaults_and_truncates() {
    let mut a: DynArray<u32> = DynArray::with_size(2).unwrap();
    a.set(1, 7).unwrap();
    a.set_size(4).unwrap();
    assert_eq!(a.as_slice(), &[0, 7, 0, 0]);
    a.set_size(1).unwrap();
    assert_eq!(a.as_slice(), &[0]);
    // capacity survives shrinking
    assert!(a.capacity() >= 4);
    a.clear();
    assert!(a.is_empty());
}

#[test]
fn oversized_growth_fails_without_change() {
    let mut a = DynArray::try_from_slice(&[1u64, 2]).unwrap();
    assert!(matches!(a.set_size(usize::MAX), Err(Error::IllegalSize(_))));
    assert!(matches!(a.set_size(usize::MAX / 8 - 1), Err(_)));
    assert_eq!(a.as_slice(), &[1, 2]);
}

#[test]
fn get_and_set_check_bounds() {
    let mut a = DynArray::try_from_slice(&["x"]).unwrap();
    assert_eq!(*a.get(0).unwrap(), "x");
    assert!(a.get(1).is_err());
    assert!(a.set(1, "y").is_err());
    *a.get_mut(0).unwrap() = "z";
    assert_eq!(a.try_clone().unwrap().as_slice(), &["z"]);
}

#[test]
fn ptr_array_uses_identity_not_value() {
    let x = Arc::new(1);
    let y = Arc::new(1);
    let mut p = PtrArray::new();
    p.append_element(Arc::clone(&x)).unwrap();
    assert_eq!(p.check_presence(&x), Some(0));
    assert_eq!(p.check_presence(&y), None);
    assert_eq!(p.remove_element(&y), Err(Error::NotFound));
    assert!(Arc::ptr_eq(&p.remove_element(&x).unwrap(), &x));
    assert!(p.is_empty());
}

#[test]
fn ptr_array_growth_creates_empty_slots() {
    let mut p: PtrArray<usize> = PtrArray::new();
    p.append_element(5).unwrap();
    p.set_size(3).unwrap();
    assert_eq!(p.iter().collect::<Vec<_>>(), vec![Some(&5), None, None]);
    p.set(2, Some(9)).unwrap();
    assert_eq!(p.check_presence(&9), Some(2));
    assert_eq!(p.present().copied().collect::<Vec<_>>(), vec![5, 9]);
}

#[test]
fn merge_is_union_by_identity() {
    let a = {
        let mut a = PtrArray::new();
        a.append_elements(&[1usize, 2, 2, 3]).unwrap();
        a
    };
    let b = {
        let mut b = PtrArray::new();
        b.append_elements(&[3usize, 4, 1]).unwrap();
        b
    };
    let m = PtrArray::merge(&a, &b).unwrap();
    assert_eq!(m.present().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[test]
fn multiply_is_row_major_cartesian_product() {
    let mut a = PtrArray::new();
    a.append_elements(&[1usize, 2]).unwrap();
    let mut b = PtrArray::new();
    b.append_elements(&[10usize, 20, 30]).unwrap();
    let product = PtrArray::multiply(&a, &b).unwrap();
    assert_eq!(product.len(), 6);
    assert_eq!(
        product.present().copied().collect::<Vec<_>>(),
        vec![(1, 10), (1, 20), (1, 30), (2, 10), (2, 20), (2, 30)]
    );
}

#[test]
fn multiply_concat_expands_combinations() {
    let inner = |vals: &[usize]| {
        let mut p = PtrArray::new();
        p.append_elements(vals).unwrap();
        p
    };
    let mut a = PtrArray::new();
    a.append_element(inner(&[1])).unwrap();
    a.append_element(inner(&[2])).unwrap();
    let mut b = PtrArray::new();
    b.append_element(inner(&[3, 4])).unwrap();

    let out = PtrArray::multiply_concat(&a, &b).unwrap();
    let flat: Vec<Vec<usize>> = out
        .present()
        .map(|p| p.present().copied().collect())
        .collect();
    assert_eq!(flat, vec![vec![1, 3, 4], vec![2, 3, 4]]);
}

#[test]
fn destroy_contained_hands_over_every_reference() {
    let mut p = PtrArray::new();
    p.append_elements(&[Arc::new(1), Arc::new(2)]).unwrap();
    p.set_size(3).unwrap();
    let mut destroyed = Vec::new();
    p.destroy_contained(|v| destroyed.push(*v));
    assert_eq!(destroyed, vec![1, 2]);
    assert!(p.is_empty());
}

#[test]
fn fast_element_removal_swaps_last() {
    let mut p = PtrArray::new();
    p.append_elements(&[1usize, 2, 3, 4]).unwrap();
    assert_eq!(p.remove_element_fast(&1).unwrap(), 1);
    assert_eq!(p.present().copied().collect::<Vec<_>>(), vec![4, 2, 3]);
}
