use ndview::{broadcast, broadcast_all, broadcast_shape, ErrorKind, Shape};

#[test]
fn broadcast_column_and_row() {
    let a = Shape::new(vec![3, 1]);
    let b = Shape::new(vec![1, 4]);
    let (a2, b2) = broadcast(&a, &b).unwrap();
    assert_eq!(a2.dim(), &[3, 4]);
    assert_eq!(b2.dim(), &[3, 4]);
    assert_eq!(a2.strides(), &[1, 0]);
    assert_eq!(b2.strides(), &[0, 1]);
    assert_eq!(a2.offset(), a.offset());
    assert_eq!(b2.offset(), b.offset());

    let ba = a2.broadcast_info().unwrap();
    assert!(!ba.is_stretched(0));
    assert!(ba.is_stretched(1));
    assert_eq!(b2.broadcast_info().unwrap().stretched_axes().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn broadcast_keeps_slice_offsets() {
    let base = Shape::new(vec![4, 5]);
    let col = base.slice("1:4, 2:3").unwrap();
    assert_eq!(col.offset(), 7);
    let row = base.slice("3:4, :").unwrap();
    let (c, r) = broadcast(&col, &row).unwrap();
    assert_eq!(c.dim(), &[3, 5]);
    assert_eq!(c.offset(), 7);
    assert_eq!(r.offset(), 15);
    assert_eq!(c.get_offset(&[2, 4]).unwrap(), 17);
    assert_eq!(r.get_offset(&[2, 4]).unwrap(), 19);
}

#[test]
fn broadcast_flags() {
    let a = Shape::new(vec![3, 1]).broadcast_to(&[2, 3, 4]).unwrap();
    assert_eq!(a.strides(), &[0, 1, 0]);
    assert!(a.is_broadcasted());
    assert!(!a.is_contiguous());
    assert!(!a.is_writeable());
    assert!(!a.is_scalar_broadcast());
    assert_eq!(a.original_size(), 3);

    let s = Shape::scalar().broadcast_to(&[2, 2]).unwrap();
    assert!(s.is_scalar_broadcast());
    assert_eq!(s.offsets().collect::<Vec<_>>(), vec![0, 0, 0, 0]);
    assert_eq!(s.coordinates_from_offset(0).unwrap(), vec![0, 0]);
}

#[test]
fn incompatible_shapes() {
    let a = Shape::new(vec![2, 3]);
    let b = Shape::new(vec![3, 3]);
    let err = broadcast(&a, &b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleShape);
    assert!(err.is_shape_mismatch());
    assert!(Shape::new(vec![3]).broadcast_to(&[3, 4]).is_err());
}

#[test]
fn broadcast_many() {
    let out = broadcast_shape(&[&[8, 1, 6, 1], &[7, 1, 5], &[1]]).unwrap();
    assert_eq!(out, vec![8, 7, 6, 5]);
    assert_eq!(broadcast_shape(&[]).unwrap(), Vec::<usize>::new());

    let a = Shape::new(vec![5]);
    let b = Shape::new(vec![2, 1]);
    let c = Shape::scalar();
    let all = broadcast_all(&[&a, &b, &c]).unwrap();
    for s in &all {
        assert_eq!(s.dim(), &[2, 5]);
    }
    assert_eq!(all[0].strides(), &[0, 1]);
    assert_eq!(all[1].strides(), &[1, 0]);
    assert_eq!(all[2].strides(), &[0, 0]);
}

#[test]
fn slicing_a_broadcast_shape() {
    let a = Shape::new(vec![1, 4]).broadcast_to(&[3, 4]).unwrap();
    let s = a.slice("1:, ::2").unwrap();
    assert_eq!(s.dim(), &[2, 2]);
    assert_eq!(s.strides(), &[0, 2]);
    assert!(s.is_broadcasted());
    let one = a.slice("1").unwrap();
    assert!(!one.is_broadcasted());
    assert!(!one.is_writeable());
    assert!(!one.is_sliced());
    assert_eq!(one.offsets().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[test]
fn zero_length_axes() {
    let out = broadcast_shape(&[&[0, 3], &[1, 3]]).unwrap();
    assert_eq!(out, vec![0, 3]);
    let s = Shape::new(vec![1, 3]).broadcast_to(&[0, 3]).unwrap();
    assert!(s.is_empty());
    assert_eq!(s.offsets().count(), 0);
}
