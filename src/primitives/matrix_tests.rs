pub(crate) use super::*;

#[test]
fn test_from_vec() {
    let m = Matrix::from_vec(2, 3, vec![1.5_f32, 2.5, 3.5, 4.5, 5.5, 6.5]).expect("2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.5).abs() < 1e-6);
    assert!((m.get(1, 2) - 6.5).abs() < 1e-6);
}

#[test]
fn test_from_vec_length_error() {
    assert!(Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0]).is_err());
    assert!(Matrix::from_vec(3, 2, vec![1.0_f32]).is_err());
}

#[test]
fn test_new_is_empty() {
    let m = Matrix::<f32>::new();
    assert_eq!(m.shape(), (0, 0));
    assert!(m.is_empty());
}

#[test]
fn test_zeros() {
    let m = Matrix::<f32>::zeros(3, 2);
    assert_eq!(m.shape(), (3, 2));
    assert!(m.as_slice().iter().all(|&x| x == 0.0));
}

#[test]
fn test_ones_filled() {
    let m = Matrix::<i32>::ones(2, 2);
    assert_eq!(m.as_slice(), &[1, 1, 1, 1]);
    let f = Matrix::filled(2, 2, 7.0_f32);
    assert!(f.as_slice().iter().all(|&x| (x - 7.0).abs() < 1e-6));
}

#[test]
fn test_eye() {
    let m = Matrix::<f32>::eye(3);
    for r in 0..3 {
        for c in 0..3 {
            let expected = if r == c { 1.0 } else { 0.0 };
            assert!((m.get(r, c) - expected).abs() < 1e-6);
        }
    }
}

#[test]
fn test_from_row_from_col() {
    let r = Matrix::from_row(&[1.0_f32, 2.0, 3.0]);
    assert_eq!(r.shape(), (1, 3));
    let c = Matrix::from_col(&[1.0_f32, 2.0, 3.0]);
    assert_eq!(c.shape(), (3, 1));
    assert!((c.get(2, 0) - 3.0).abs() < 1e-6);
}

#[test]
fn test_get_set() {
    let mut m = Matrix::<f32>::zeros(2, 2);
    m.set(0, 1, 5.0);
    assert!((m.get(0, 1) - 5.0).abs() < 1e-6);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_get_column_out_of_bounds_panics() {
    let m = Matrix::<f32>::zeros(2, 3);
    let _ = m.get(0, 3);
}

#[test]
fn test_get_at_set_at() {
    let mut m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    assert_eq!(m.get_at(2), 3);
    m.set_at(2, 9);
    assert_eq!(m.get(1, 0), 9);
}

#[test]
fn test_row() {
    let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let row = m.row(1);
    assert_eq!(row.as_slice(), &[4, 5, 6]);
}

#[test]
fn test_column() {
    let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let col = m.column(1);
    assert_eq!(col.as_slice(), &[2, 5]);
}

#[test]
fn test_set_data() {
    let mut m = Matrix::<i32>::zeros(1, 1);
    m.set_data(&[1, 2, 3, 4, 5, 6], 2, 3).expect("6 = 2*3");
    assert_eq!(m.shape(), (2, 3));
    assert_eq!(m.get(1, 0), 4);
    assert!(m.set_data(&[1, 2], 2, 3).is_err());
}

#[test]
fn test_set_shallow_data_adopts_buffer() {
    let buffer = vec![1.0_f32, 2.0, 3.0, 4.0];
    let mut m = Matrix::<f32>::new();
    m.set_shallow_data(buffer, 2, 2).expect("4 = 2*2");
    assert_eq!(m.shape(), (2, 2));
    assert!((m.get(1, 1) - 4.0).abs() < 1e-6);
}

#[test]
fn test_set_shallow_data_length_error() {
    let mut m = Matrix::<f32>::new();
    assert!(m.set_shallow_data(vec![1.0, 2.0, 3.0], 2, 2).is_err());
}

#[test]
fn test_get_row() {
    let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let row = m.get_row(1).expect("row 1 exists");
    assert_eq!(row.shape(), (1, 3));
    assert_eq!(row.as_slice(), &[4, 5, 6]);
    assert!(m.get_row(2).is_err());
}

#[test]
fn test_set_row_overwrites() {
    let mut m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let row = Matrix::from_row(&[7, 8, 9]);
    m.set_row(&row, 0).expect("row 0 exists");
    assert_eq!(m.as_slice(), &[7, 8, 9, 4, 5, 6]);
    assert_eq!(m.shape(), (2, 3));
}

#[test]
fn test_set_row_appends() {
    let mut m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let row = Matrix::from_row(&[7, 8, 9]);
    m.set_row(&row, 2).expect("row index == n_rows appends");
    assert_eq!(m.shape(), (3, 3));
    assert_eq!(m.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn test_set_row_into_empty_adopts_shape() {
    let mut m = Matrix::<i32>::new();
    let row = Matrix::from_row(&[1, 2, 3]);
    m.set_row(&row, 0).expect("empty matrix adopts the shape");
    assert_eq!(m.shape(), (1, 3));
}

#[test]
fn test_set_row_errors() {
    let mut m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let narrow = Matrix::from_row(&[7, 8]);
    assert!(m.set_row(&narrow, 0).is_err());
    let row = Matrix::from_row(&[7, 8, 9]);
    // Gap past the end is rejected.
    assert!(m.set_row(&row, 3).is_err());
}

#[test]
fn test_get_row_set_row_round_trip() {
    let m = Matrix::from_vec(3, 2, vec![1, 2, 3, 4, 5, 6]).expect("3*2=6 elements");
    let mut rebuilt = Matrix::<i32>::new();
    for r in 0..m.n_rows() {
        let row = m.get_row(r).expect("row exists");
        rebuilt.set_row(&row, r).expect("append in order");
    }
    assert_eq!(rebuilt, m);
}

#[test]
fn test_extend() {
    let mut m = Matrix::from_vec(1, 2, vec![1, 2]).expect("1*2=2 elements");
    let tail = Matrix::from_vec(2, 2, vec![3, 4, 5, 6]).expect("2*2=4 elements");
    m.extend(&tail).expect("column counts match");
    assert_eq!(m.shape(), (3, 2));
    assert_eq!(m.as_slice(), &[1, 2, 3, 4, 5, 6]);

    let wide = Matrix::from_vec(1, 3, vec![7, 8, 9]).expect("1*3=3 elements");
    assert!(m.extend(&wide).is_err());
}

#[test]
fn test_extend_into_empty() {
    let mut m = Matrix::<i32>::new();
    let tail = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    m.extend(&tail).expect("empty matrix adopts the shape");
    assert_eq!(m.shape(), (2, 2));
}

#[test]
fn test_swap() {
    let mut m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    m.swap(0, 0, 1, 1).expect("both positions in bounds");
    assert_eq!(m.as_slice(), &[4, 2, 3, 1]);
    assert!(m.swap(0, 0, 2, 0).is_err());
}

#[test]
fn test_swap_row() {
    let mut m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    m.swap_row(0, 1).expect("both rows in bounds");
    assert_eq!(m.as_slice(), &[4, 5, 6, 1, 2, 3]);
    assert!(m.swap_row(0, 2).is_err());
}

#[test]
fn test_swap_col() {
    let mut m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    m.swap_col(0, 2).expect("both columns in bounds");
    assert_eq!(m.as_slice(), &[3, 2, 1, 6, 5, 4]);
    assert!(m.swap_col(0, 3).is_err());
}

#[test]
fn test_add_in_place() {
    let mut a = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 3.0, 4.0]).expect("2*2=4 elements");
    let b = Matrix::from_vec(2, 2, vec![10.0_f32, 20.0, 30.0, 40.0]).expect("2*2=4 elements");
    a.add(&b).expect("same shape");
    assert!((a.get(0, 0) - 11.0).abs() < 1e-6);
    assert!((a.get(1, 1) - 44.0).abs() < 1e-6);
}

#[test]
fn test_add_shape_error_leaves_self_unmodified() {
    let mut a = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 3.0, 4.0]).expect("2*2=4 elements");
    let b = Matrix::<f32>::zeros(2, 3);
    let before = a.clone();
    assert!(a.add(&b).is_err());
    assert_eq!(a, before);
}

#[test]
fn test_add_into() {
    let a = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    let b = Matrix::from_vec(2, 2, vec![5, 6, 7, 8]).expect("2*2=4 elements");
    let mut out = Matrix::new();
    a.add_into(&b, &mut out).expect("same shape");
    assert_eq!(out.as_slice(), &[6, 8, 10, 12]);
    // Operands untouched.
    assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
    assert_eq!(b.as_slice(), &[5, 6, 7, 8]);
}

#[test]
fn test_add_then_sub_round_trips() {
    let mut a = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 3.0, 4.0]).expect("2*2=4 elements");
    let b = Matrix::from_vec(2, 2, vec![0.5_f32, 1.5, 2.5, 3.5]).expect("2*2=4 elements");
    let original = a.clone();
    a.add(&b).expect("same shape");
    a.sub(&b).expect("same shape");
    for (x, y) in a.as_slice().iter().zip(original.as_slice().iter()) {
        assert!((x - y).abs() < 1e-6);
    }
}

#[test]
fn test_sub_into() {
    let a = Matrix::from_vec(2, 2, vec![5, 6, 7, 8]).expect("2*2=4 elements");
    let b = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    let mut out = Matrix::new();
    a.sub_into(&b, &mut out).expect("same shape");
    assert_eq!(out.as_slice(), &[4, 4, 4, 4]);
}

#[test]
fn test_matmul_in_place() {
    let mut a = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("2*3=6 elements");
    let b = Matrix::from_vec(3, 2, vec![7.0_f32, 8.0, 9.0, 10.0, 11.0, 12.0])
        .expect("3*2=6 elements");
    a.matmul(&b).expect("inner dimensions match");
    assert_eq!(a.shape(), (2, 2));
    // Row 0: 1*7 + 2*9 + 3*11 = 58, 1*8 + 2*10 + 3*12 = 64
    assert!((a.get(0, 0) - 58.0).abs() < 1e-6);
    assert!((a.get(0, 1) - 64.0).abs() < 1e-6);
    // Row 1: 4*7 + 5*9 + 6*11 = 139, 4*8 + 5*10 + 6*12 = 154
    assert!((a.get(1, 0) - 139.0).abs() < 1e-6);
    assert!((a.get(1, 1) - 154.0).abs() < 1e-6);
}

#[test]
fn test_matmul_into() {
    let a = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("2*3=6 elements");
    let b = Matrix::from_vec(3, 2, vec![7.0_f32, 8.0, 9.0, 10.0, 11.0, 12.0])
        .expect("3*2=6 elements");
    let mut out = Matrix::new();
    a.matmul_into(&b, &mut out).expect("inner dimensions match");
    assert_eq!(out.shape(), (2, 2));
    assert!((out.get(0, 0) - 58.0).abs() < 1e-6);
    assert!((out.get(1, 1) - 154.0).abs() < 1e-6);
    // Operands untouched.
    assert_eq!(a.shape(), (2, 3));
    assert_eq!(b.shape(), (3, 2));
}

#[test]
fn test_matmul_dimension_error_leaves_operands_unmodified() {
    let mut a = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("2*3=6 elements");
    let b = Matrix::<f32>::zeros(2, 2);
    let a_before = a.clone();
    let b_before = b.clone();
    assert!(a.matmul(&b).is_err());
    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
}

#[test]
fn test_matvec() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("2*3=6 elements");
    let v = Vector::from_slice(&[1.0_f32, 0.0, 1.0]);
    let out = m.matvec(&v).expect("cols match vector length");
    // 1 + 3 = 4, 4 + 6 = 10
    assert!((out[0] - 4.0).abs() < 1e-6);
    assert!((out[1] - 10.0).abs() < 1e-6);
    let short = Vector::from_slice(&[1.0_f32]);
    assert!(m.matvec(&short).is_err());
}

#[test]
fn test_mul_scalar() {
    let mut m = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 3.0, 4.0]).expect("2*2=4 elements");
    m.mul_scalar(2.5);
    assert!((m.get(0, 0) - 2.5).abs() < 1e-6);
    assert!((m.get(1, 1) - 10.0).abs() < 1e-6);
}

#[test]
fn test_mul_scalar_into() {
    let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    let mut out = Matrix::new();
    m.mul_scalar_into(3, &mut out);
    assert_eq!(out.as_slice(), &[3, 6, 9, 12]);
    assert_eq!(m.as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn test_transpose_in_place() {
    let mut m = Matrix::from_vec(2, 3, vec![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("2*3=6 elements");
    m.transpose();
    assert_eq!(m.shape(), (3, 2));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-6);
    assert!((m.get(0, 1) - 4.0).abs() < 1e-6);
    assert!((m.get(2, 1) - 6.0).abs() < 1e-6);
}

#[test]
fn test_transpose_into() {
    let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let mut out = Matrix::new();
    m.transpose_into(&mut out);
    assert_eq!(out.shape(), (3, 2));
    assert_eq!(out.as_slice(), &[1, 4, 2, 5, 3, 6]);
    assert_eq!(m.shape(), (2, 3));
}

#[test]
fn test_double_transpose_identity() {
    let original = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).expect("2*3=6 elements");
    let mut m = original.clone();
    m.transpose();
    m.transpose();
    assert_eq!(m, original);
}

#[test]
fn test_det_eye() {
    let mut m = Matrix::<f32>::eye(4);
    assert!((m.det().expect("square matrix") - 1.0).abs() < 1e-6);
}

#[test]
fn test_det_2x2() {
    let mut m = Matrix::from_vec(2, 2, vec![3.0_f32, 8.0, 4.0, 6.0]).expect("2*2=4 elements");
    // 3*6 - 8*4 = -14
    assert!((m.det().expect("square matrix") + 14.0).abs() < 1e-6);
}

#[test]
fn test_det_3x3_integer_exact() {
    let mut m = Matrix::from_vec(3, 3, vec![6, 1, 1, 4, -2, 5, 2, 8, 7]).expect("3*3=9 elements");
    // 6*(-14-40) - 1*(28-10) + 1*(32+4) = -324 + -18 + 36 = -306
    assert_eq!(m.det().expect("square matrix"), -306);
}

#[test]
fn test_det_zero_row_is_zero() {
    let mut m = Matrix::from_vec(3, 3, vec![1.0_f32, 2.0, 3.0, 0.0, 0.0, 0.0, 7.0, 8.0, 9.0])
        .expect("3*3=9 elements");
    assert!(m.det().expect("square matrix").abs() < 1e-6);
}

#[test]
fn test_det_not_square() {
    let mut m = Matrix::<f32>::zeros(2, 3);
    assert!(m.det().is_err());
}

#[test]
fn test_det_cache_invalidated_on_mutation() {
    let mut m = Matrix::from_vec(2, 2, vec![1.0_f32, 0.0, 0.0, 1.0]).expect("2*2=4 elements");
    assert!((m.det().expect("square matrix") - 1.0).abs() < 1e-6);
    // Cached value is reused.
    assert!((m.det().expect("square matrix") - 1.0).abs() < 1e-6);
    m.set(0, 0, 2.0);
    assert!((m.det().expect("square matrix") - 2.0).abs() < 1e-6);
}

#[test]
fn test_eq_ignores_det_cache() {
    let mut a = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 3.0, 4.0]).expect("2*2=4 elements");
    let b = a.clone();
    let _ = a.det().expect("square matrix");
    assert_eq!(a, b);
}

#[test]
fn test_inverse_2x2() {
    let mut m = Matrix::from_vec(2, 2, vec![4.0_f32, 7.0, 2.0, 6.0]).expect("2*2=4 elements");
    let mut inv = Matrix::<f32>::new();
    m.inverse(&mut inv).expect("det = 10, invertible");
    // inv = 1/10 * [6 -7; -2 4]
    assert!((inv.get(0, 0) - 0.6).abs() < 1e-5);
    assert!((inv.get(0, 1) + 0.7).abs() < 1e-5);
    assert!((inv.get(1, 0) + 0.2).abs() < 1e-5);
    assert!((inv.get(1, 1) - 0.4).abs() < 1e-5);
}

#[test]
fn test_inverse_times_original_is_identity() {
    let mut m = Matrix::from_vec(3, 3, vec![2.0_f32, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 1.0])
        .expect("3*3=9 elements");
    let mut inv = Matrix::<f32>::new();
    m.inverse(&mut inv).expect("non-singular");
    let mut product = Matrix::new();
    inv.matmul_into(&m, &mut product).expect("3x3 * 3x3");
    let eye = Matrix::<f32>::eye(3);
    for (x, y) in product.as_slice().iter().zip(eye.as_slice().iter()) {
        assert!((x - y).abs() < 1e-4);
    }
}

#[test]
fn test_inverse_integer_source() {
    let mut m = Matrix::from_vec(2, 2, vec![2, 0, 0, 4]).expect("2*2=4 elements");
    let mut inv = Matrix::<f32>::new();
    m.inverse(&mut inv).expect("det = 8, invertible");
    assert!((inv.get(0, 0) - 0.5).abs() < 1e-6);
    assert!((inv.get(1, 1) - 0.25).abs() < 1e-6);
}

#[test]
fn test_inverse_singular() {
    let mut m = Matrix::from_vec(2, 2, vec![1.0_f32, 2.0, 2.0, 4.0]).expect("2*2=4 elements");
    let mut inv = Matrix::<f32>::new();
    let err = m.inverse(&mut inv);
    assert!(matches!(err, Err(MatrizError::SingularMatrix { .. })));
}

#[test]
fn test_inverse_not_square() {
    let mut m = Matrix::<f32>::zeros(2, 3);
    let mut inv = Matrix::<f32>::new();
    assert!(matches!(
        m.inverse(&mut inv),
        Err(MatrizError::NotSquare { .. })
    ));
}

#[test]
fn test_inverse_leaves_source_data_unchanged() {
    let mut m = Matrix::from_vec(2, 2, vec![4.0_f32, 7.0, 2.0, 6.0]).expect("2*2=4 elements");
    let mut inv = Matrix::<f32>::new();
    m.inverse(&mut inv).expect("invertible");
    assert_eq!(m.as_slice(), &[4.0, 7.0, 2.0, 6.0]);
}

#[test]
fn test_display() {
    let m = Matrix::from_vec(2, 2, vec![1, 22, 333, 4]).expect("2*2=4 elements");
    let rendered = format!("{m}");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains('1'));
    assert!(lines[1].contains("333"));
}
