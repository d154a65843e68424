use itertools::Itertools;
use quickcheck::{quickcheck, TestResult};

use ndview::{compose_slice_defs, ErrorKind, Shape, Slice, SliceDef, SliceElem};

/// Every coordinate of `shape` in logical order.
fn coordinates(shape: &Shape) -> Vec<Vec<usize>> {
    shape
        .dim()
        .iter()
        .map(|&d| 0..d)
        .multi_cartesian_product()
        .collect()
}

fn formula(shape: &Shape, index: &[usize]) -> isize {
    shape.offset() as isize
        + index
            .iter()
            .zip(shape.strides())
            .map(|(&i, &s)| i as isize * s)
            .sum::<isize>()
}

fn arbitrary_dims(dims: &[u8]) -> Vec<usize> {
    dims.iter().take(4).map(|&d| (d % 5) as usize + 1).collect()
}

fn arbitrary_slice((a, b, c): (i8, i8, i8)) -> Slice {
    let bound = |x: i8| if x % 7 == 0 { None } else { Some((x % 12) as isize) };
    let step = match c % 4 {
        0 => 1,
        s => s as isize,
    };
    Slice::new(bound(a), bound(b), step)
}

fn arbitrary_slices(parts: &[(i8, i8, i8)], ndim: usize) -> Vec<Slice> {
    (0..ndim)
        .map(|i| parts.get(i).copied().map_or(Slice::ALL, arbitrary_slice))
        .collect()
}

fn as_elems(slices: &[Slice]) -> Vec<SliceElem> {
    slices.iter().map(|&s| SliceElem::Slice(s)).collect()
}

fn normalize(slices: &[Slice], shape: &Shape) -> Vec<SliceDef> {
    slices
        .iter()
        .zip(shape.dim())
        .map(|(s, &len)| s.normalize(len).unwrap())
        .collect()
}

#[test]
fn scalar_from_indexing() {
    let a = Shape::new(vec![3, 3]);
    let s = a.slice("2,2").unwrap();
    assert!(s.is_scalar());
    assert_eq!(s.size(), 1);
    assert_eq!(s.offset(), 8);
    assert_eq!(s.get_offset(&[]).unwrap(), 8);
    assert!(s.is_contiguous());
}

#[test]
fn step_slice_is_strided_view() {
    let a = Shape::vector(10);
    let s = a.slice("::2").unwrap();
    assert_eq!(s.dim(), &[5]);
    assert_eq!(s.strides(), &[2]);
    assert!(!s.is_contiguous());
    assert!(s.is_sliced());
    assert_eq!(s.offsets().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);
    let vi = s.view_info().unwrap();
    assert_eq!(vi.base(), &a);
    assert_eq!(vi.slices().unwrap(), &[SliceDef::new(0, 2, 5)]);
}

#[test]
fn row_slice_collapses() {
    let a = Shape::new(vec![3, 4]);
    let s = a.slice("1:3").unwrap();
    assert_eq!(s.dim(), &[2, 4]);
    assert_eq!(s.strides(), &[4, 1]);
    assert_eq!(s.offset(), 4);
    assert!(s.is_contiguous());
    assert!(s.view_info().is_none());
    assert!(s.is_sliced());
    assert_eq!(s.base(), &s);
    assert_eq!(s.root(), &a);
}

#[test]
fn contiguity_cases() {
    let a = Shape::new(vec![4, 5, 6]);
    let contiguous = ["1:3", "2", "1:2, 3:5", "1, 2:4", "2:3, 1, ...", "2, 0:1, 3"];
    for text in contiguous {
        assert!(a.slice(text).unwrap().is_contiguous(), "{}", text);
    }
    let strided = [":, 1:3", "::2", ":, :, 0", "::-1", "1:3, 1:3", ":, 0"];
    for text in strided {
        assert!(!a.slice(text).unwrap().is_contiguous(), "{}", text);
    }
}

#[test]
fn count_one_after_step_is_contiguous() {
    let a = Shape::vector(10);
    let s = a.slice("::3").unwrap().slice("1:2").unwrap();
    assert_eq!(s.dim(), &[1]);
    assert_eq!(s.offset(), 3);
    assert!(s.is_contiguous());
    assert!(s.view_info().is_none());
}

#[test]
fn empty_slices() {
    let a = Shape::new(vec![4, 5]);
    let e = a.slice("3:1").unwrap();
    assert_eq!(e.dim(), &[0, 5]);
    assert!(e.is_empty());
    assert!(e.is_contiguous());
    assert_eq!(e.offsets().count(), 0);
    assert!(e.coordinates_from_offset(0).is_err());

    let z = Shape::new(vec![3, 0]);
    assert_eq!(z.strides(), &[1, 1]);
    assert!(z.slice("1:").unwrap().is_empty());
}

#[test]
fn new_axis_drops_slice_record() {
    let a = Shape::new(vec![4, 6]);
    let v = a.slice("::2, np.newaxis, 1").unwrap();
    assert_eq!(v.dim(), &[2, 1]);
    assert_eq!(v.offset(), 1);
    assert_eq!(v.get_offset(&[1, 0]).unwrap(), 13);
    let v = a.slice("::2, np.newaxis").unwrap();
    assert_eq!(v.dim(), &[2, 1, 6]);
    assert!(v.view_info().unwrap().slices().is_none());
}

#[test]
fn nested_slices_compose_from_the_root() {
    let a = Shape::new(vec![10, 10]);
    let v = a.slice("1:9, ::-1").unwrap();
    let w = v.slice("::2, 2:7").unwrap();
    let vi = w.view_info().unwrap();
    assert_eq!(vi.base(), &a);
    let defs = vi.slices().unwrap();
    assert_eq!(defs, &[SliceDef::new(1, 2, 4), SliceDef::new(7, -1, 5)]);
    let direct = a.slice_defs(defs).unwrap();
    assert_eq!(direct.offsets().collect::<Vec<_>>(), w.offsets().collect::<Vec<_>>());
}

#[test]
fn slice_defs_validation() {
    let a = Shape::new(vec![3, 4]);
    let err = a.slice_defs(&[SliceDef::all(3)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dimension);
    let err = a
        .slice_defs(&[SliceDef::new(1, 1, 3), SliceDef::all(4)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexOutOfBounds);
}

#[test]
fn offsets_and_errors() {
    let a = Shape::new(vec![2, 3, 4]);
    assert_eq!(a.get_offset(&[1, 2, 3]).unwrap(), 23);
    assert_eq!(a.get_offset(&[0, 0]).unwrap_err().kind(), ErrorKind::Dimension);
    assert_eq!(
        a.get_offset(&[0, 3, 0]).unwrap_err().kind(),
        ErrorKind::IndexOutOfBounds
    );
    assert_eq!(a.get_offset_signed(&[-1, -1, -1]).unwrap(), 23);
    assert_eq!(a.unravel_index(23).unwrap(), vec![1, 2, 3]);
    assert!(a.unravel_index(24).is_err());
}

#[test]
fn transform_offset_follows_logical_order() {
    let a = Shape::new(vec![4, 4]).slice("1:3, ::-2").unwrap();
    let by_index: Vec<usize> = (0..a.size()).map(|i| a.transform_offset(i).unwrap()).collect();
    assert_eq!(by_index, a.offsets().collect::<Vec<_>>());
    assert_eq!(by_index, vec![7, 5, 11, 9]);
}

#[test]
fn coordinates_with_negative_strides() {
    let a = Shape::new(vec![3, 4]).slice("::-1, 3:0:-2").unwrap();
    assert_eq!(a.dim(), &[3, 2]);
    for index in coordinates(&a) {
        let offset = a.get_offset(&index).unwrap();
        assert_eq!(a.coordinates_from_offset(offset).unwrap(), index);
    }
    // offset 0 is column 0, which the view skips
    assert_eq!(
        a.coordinates_from_offset(0).unwrap_err().kind(),
        ErrorKind::IndexOutOfBounds
    );
}

#[test]
fn fortran_order_strides() {
    let a = Shape::with_order(vec![2, 3], ndview::Order::F);
    assert_eq!(a.strides(), &[1, 2]);
    assert!(!a.is_contiguous());
    assert_eq!(a.get_offset(&[1, 2]).unwrap(), 5);
    assert_eq!(a.clean().strides(), &[3, 1]);
}

quickcheck! {
    fn offset_formula_parity(dims: Vec<u8>, a: Vec<(i8, i8, i8)>, b: Vec<(i8, i8, i8)>) -> TestResult {
        let root = Shape::new(arbitrary_dims(&dims));
        if root.ndim() == 0 {
            return TestResult::discard();
        }
        let first = root.slice_with(&as_elems(&arbitrary_slices(&a, root.ndim()))).unwrap();
        let second = first.slice_with(&as_elems(&arbitrary_slices(&b, first.ndim()))).unwrap();
        let expanded = second.expand_dimension(-1).unwrap();
        for shape in [&first, &second, &expanded] {
            let offsets: Vec<usize> = shape.offsets().collect();
            for (k, index) in coordinates(shape).iter().enumerate() {
                let offset = shape.get_offset(index).unwrap();
                if offset as isize != formula(shape, index) || offsets[k] != offset {
                    return TestResult::failed();
                }
                if shape.transform_offset(k).unwrap() != offset {
                    return TestResult::failed();
                }
            }
        }
        TestResult::passed()
    }

    fn coordinates_round_trip(dims: Vec<u8>, a: Vec<(i8, i8, i8)>, b: Vec<(i8, i8, i8)>) -> TestResult {
        let root = Shape::new(arbitrary_dims(&dims));
        if root.ndim() == 0 {
            return TestResult::discard();
        }
        let first = root.slice_with(&as_elems(&arbitrary_slices(&a, root.ndim()))).unwrap();
        let shape = first.slice_with(&as_elems(&arbitrary_slices(&b, first.ndim()))).unwrap();
        for index in coordinates(&shape) {
            let offset = shape.get_offset(&index).unwrap();
            match shape.coordinates_from_offset(offset) {
                Ok(ref back) if *back == index => {}
                _ => return TestResult::failed(),
            }
        }
        TestResult::passed()
    }

    fn slicing_is_associative(dims: Vec<u8>, a: Vec<(i8, i8, i8)>, b: Vec<(i8, i8, i8)>) -> TestResult {
        let root = Shape::new(arbitrary_dims(&dims));
        let sa = arbitrary_slices(&a, root.ndim());
        let first = root.slice_with(&as_elems(&sa)).unwrap();
        let sb = arbitrary_slices(&b, first.ndim());
        let second = first.slice_with(&as_elems(&sb)).unwrap();

        let composed = compose_slice_defs(&normalize(&sa, &root), &normalize(&sb, &first)).unwrap();
        let direct = root.slice_defs(&composed).unwrap();
        if direct.dim() != second.dim() || direct.offset() != second.offset() {
            return TestResult::failed();
        }
        if second.root() != &root || second.root().offset() != 0 {
            return TestResult::failed();
        }
        if let Some(vi) = second.view_info() {
            if vi.base() != &root || vi.slices() != Some(&composed[..]) {
                return TestResult::failed();
            }
        }
        TestResult::from_bool(direct.offsets().eq(second.offsets()))
    }

    fn contiguous_means_dense(dims: Vec<u8>, a: Vec<(i8, i8, i8)>) -> bool {
        let root = Shape::new(arbitrary_dims(&dims));
        let shape = root.slice_with(&as_elems(&arbitrary_slices(&a, root.ndim()))).unwrap();
        let offsets: Vec<usize> = shape.offsets().collect();
        let dense = offsets.windows(2).all(|w| w[1] == w[0] + 1);
        // a dense walk over more than one element is exactly the contiguous case
        if offsets.len() > 1 {
            dense == shape.is_contiguous()
        } else {
            shape.is_contiguous()
        }
    }
}
