use argus_base::{Tensor, TensorError};

#[test]
fn test_new_valid_shape() {
    let t = Tensor::new(vec![2, 3, 3], vec![0u8; 18]).unwrap();
    assert_eq!(t.shape, vec![2, 3, 3]);
    assert_eq!(t.ndim(), 3);
    assert_eq!(t.len(), 18);
    assert!(!t.is_empty());
}

#[test]
fn test_new_rejects_length_mismatch() {
    let err = Tensor::new(vec![2, 2, 3], vec![0u8; 11]).unwrap_err();
    assert_eq!(
        err,
        TensorError::ShapeMismatch {
            expected: 12,
            got: 11
        }
    );
}

#[test]
fn test_new_rejects_shape_overflow() {
    let err = Tensor::new(vec![usize::MAX, 2], vec![0u8; 4]).unwrap_err();
    assert_eq!(err, TensorError::ShapeOverflow);
}

#[test]
fn test_zeros() {
    let t = Tensor::<u8>::zeros(vec![4, 5, 3]).unwrap();
    assert_eq!(t.len(), 60);
    assert!(t.data.iter().all(|&v| v == 0));
}

#[test]
fn test_zero_dimension_is_empty() {
    let t = Tensor::new(vec![0, 10, 3], Vec::<u8>::new()).unwrap();
    assert!(t.is_empty());
    assert_eq!(t.len(), 0);
}
