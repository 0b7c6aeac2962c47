use super::*;
use ndarray::Array2;

#[test]
fn test_valid_audio() {
    let y = vec![0.0, 0.5, -0.5, 0.0];
    assert!(valid_audio(&y).is_ok());

    let empty: Vec<f32> = vec![];
    assert!(matches!(valid_audio(&empty), Err(crate::Error::EmptyAudio)));

    let nan = vec![0.0, f32::NAN];
    assert!(matches!(valid_audio(&nan), Err(crate::Error::NonFiniteAudio)));

    let inf = vec![f32::INFINITY, 0.0];
    assert!(matches!(valid_audio(&inf), Err(crate::Error::NonFiniteAudio)));
}

#[test]
fn test_fix_length() {
    assert_eq!(fix_length(&[1, 2, 3], 3, 0), vec![1, 2, 3]);
    assert_eq!(fix_length(&[1, 2, 3], 1, 0), vec![1]);
    assert_eq!(fix_length(&[1, 2], 4, 9), vec![1, 2, 9, 9]);
    assert!(fix_length::<f32>(&[], 0, 0.0).is_empty());
}

#[test]
fn test_fix_length_in_place() {
    let mut v = vec![1.0f32, 2.0, 3.0];
    fix_length_in_place(&mut v, 5, 0.0);
    assert_eq!(v, vec![1.0, 2.0, 3.0, 0.0, 0.0]);
    fix_length_in_place(&mut v, 2, 0.0);
    assert_eq!(v, vec![1.0, 2.0]);
}

#[test]
fn test_frame_count() {
    assert_eq!(frame_count(100, 10, 10), 10);
    assert_eq!(frame_count(100, 20, 5), 17);
    assert_eq!(frame_count(5, 10, 1), 0);
    assert_eq!(frame_count(10, 10, 0), 0);
}

#[test]
fn test_ensure_same_shape() {
    let a = Array2::<f32>::zeros((3, 4));
    let b = Array2::<f32>::zeros((3, 4));
    let c = Array2::<f32>::zeros((4, 3));
    assert!(ensure_same_shape(&a, &b).is_ok());

    match ensure_same_shape(&a, &c) {
        Err(crate::Error::ShapeMismatch { expected, got }) => {
            assert_eq!(expected, "[3, 4]");
            assert_eq!(got, "[4, 3]");
        }
        other => panic!("expected shape mismatch, got {other:?}"),
    }
}

#[test]
fn test_ensure_finite() {
    let mut a = Array2::<f32>::ones((2, 2));
    assert!(ensure_finite(&a, "test", 0).is_ok());

    a[(1, 0)] = f32::NAN;
    match ensure_finite(&a, "test", 7) {
        Err(crate::Error::NumericInstability { stage, iteration }) => {
            assert_eq!(stage, "test");
            assert_eq!(iteration, 7);
        }
        other => panic!("expected numeric instability, got {other:?}"),
    }
}

#[test]
fn test_ensure_non_negative() {
    let mut a = Array2::<f32>::zeros((2, 3));
    assert!(ensure_non_negative(&a, "power").is_ok());

    a[(0, 2)] = -1e-3;
    assert!(matches!(
        ensure_non_negative(&a, "power"),
        Err(crate::Error::NegativePower { stage: "power" })
    ));
}
