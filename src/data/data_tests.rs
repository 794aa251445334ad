pub(crate) use super::*;

fn toy_labeled() -> LabeledMatrix<i32> {
    // Weather-ish toy set: two feature columns, binary label.
    let matrix = Matrix::from_vec(4, 2, vec![1, 0, 1, 1, 0, 1, 0, 0]).expect("4*2=8 elements");
    let labels = Vector::from_vec(vec![1, 1, 0, 0]);
    LabeledMatrix::new(matrix, labels).expect("4 labels for 4 rows")
}

#[test]
fn test_counting_map_insert_count() {
    let mut map = CountingMap::new();
    map.insert(3);
    map.insert(3);
    map.insert(5);
    assert_eq!(map.count(3), 2);
    assert_eq!(map.count(5), 1);
    assert_eq!(map.count(9), 0);
    assert_eq!(map.len(), 2);
    assert_eq!(map.total(), 3);
}

#[test]
fn test_counting_map_max() {
    let mut map = CountingMap::new();
    map.insert(2.0_f32);
    map.insert(2.0);
    map.insert(7.0);
    let (value, count) = map.max().expect("map is non-empty");
    assert!((value - 2.0).abs() < 1e-6);
    assert_eq!(count, 2);
}

#[test]
fn test_counting_map_max_empty_is_none() {
    let mut map = CountingMap::<i32>::new();
    assert_eq!(map.max(), None);
}

#[test]
fn test_counting_map_max_tie_smallest_value() {
    let mut map = CountingMap::new();
    map.insert(9);
    map.insert(4);
    map.insert(9);
    map.insert(4);
    assert_eq!(map.max(), Some((4, 2)));
}

#[test]
fn test_counting_map_max_cache_invalidated_by_insert() {
    let mut map = CountingMap::new();
    map.insert(1);
    assert_eq!(map.max(), Some((1, 1)));
    map.insert(2);
    map.insert(2);
    assert_eq!(map.max(), Some((2, 2)));
}

#[test]
fn test_counting_map_iter_ascending() {
    let mut map = CountingMap::new();
    map.insert(5);
    map.insert(1);
    map.insert(3);
    let values: Vec<i32> = map.iter().map(|(v, _)| v).collect();
    assert_eq!(values, vec![1, 3, 5]);
}

#[test]
fn test_labeled_matrix_new_checks_label_count() {
    let matrix = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    let labels = Vector::from_vec(vec![1]);
    assert!(LabeledMatrix::new(matrix, labels).is_err());
}

#[test]
fn test_labeled_matrix_default_feature_names() {
    let labeled = toy_labeled();
    assert_eq!(labeled.feature_names(), &[0, 1]);
    assert_eq!(labeled.feature_name(1), 1);
}

#[test]
fn test_with_feature_names() {
    let matrix = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    let labels = Vector::from_vec(vec![0, 1]);
    let labeled = LabeledMatrix::with_feature_names(matrix, labels, vec![10, 20])
        .expect("2 names for 2 columns");
    assert_eq!(labeled.feature_name(0), 10);

    let matrix = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).expect("2*2=4 elements");
    let labels = Vector::from_vec(vec![0, 1]);
    assert!(LabeledMatrix::with_feature_names(matrix, labels, vec![10]).is_err());
}

#[test]
fn test_shannon_entropy_single_label_is_zero() {
    let matrix = Matrix::from_vec(3, 1, vec![1, 2, 3]).expect("3*1=3 elements");
    let labels = Vector::from_vec(vec![7, 7, 7]);
    let mut labeled = LabeledMatrix::new(matrix, labels).expect("3 labels for 3 rows");
    assert!(labeled.shannon_entropy().abs() < 1e-6);
}

#[test]
fn test_shannon_entropy_uniform_binary_is_one() {
    let mut labeled = toy_labeled();
    // Two labels, two of each: entropy = log2(2) = 1.
    assert!((labeled.shannon_entropy() - 1.0).abs() < 1e-6);
}

#[test]
fn test_shannon_entropy_uniform_four_way() {
    let matrix = Matrix::from_vec(4, 1, vec![0, 0, 0, 0]).expect("4*1=4 elements");
    let labels = Vector::from_vec(vec![0, 1, 2, 3]);
    let mut labeled = LabeledMatrix::new(matrix, labels).expect("4 labels for 4 rows");
    assert!((labeled.shannon_entropy() - 2.0).abs() < 1e-6);
}

#[test]
fn test_shannon_entropy_skewed() {
    let matrix = Matrix::<f32>::zeros(4, 1);
    let labels = Vector::from_vec(vec![1.0_f32, 1.0, 1.0, 0.0]);
    let mut labeled = LabeledMatrix::new(matrix, labels).expect("4 labels for 4 rows");
    // -(3/4)log2(3/4) - (1/4)log2(1/4) = 0.8112781
    assert!((labeled.shannon_entropy() - 0.811_278_1).abs() < 1e-5);
}

#[test]
fn test_label_counts() {
    let mut labeled = toy_labeled();
    let counts = labeled.label_counts();
    assert_eq!(counts.count(0), 2);
    assert_eq!(counts.count(1), 2);
}

#[test]
fn test_feature_counts() {
    let mut labeled = toy_labeled();
    // Column 0 holds [1, 1, 0, 0].
    let counts = labeled.feature_counts(0).expect("column 0 exists");
    assert_eq!(counts.count(0), 2);
    assert_eq!(counts.count(1), 2);
    assert!(labeled.feature_counts(2).is_err());
}

#[test]
fn test_set_data_clears_caches() {
    let mut labeled = toy_labeled();
    assert!((labeled.shannon_entropy() - 1.0).abs() < 1e-6);
    labeled
        .set_data(&[0, 0, 0], &[5, 5, 5], 3, 1)
        .expect("3 elements, 3 labels");
    // Single label now, so the entropy must have been recomputed.
    assert!(labeled.shannon_entropy().abs() < 1e-6);
    assert_eq!(labeled.label_counts().count(5), 3);
}

#[test]
fn test_set_shallow_data_checks_labels() {
    let mut labeled = toy_labeled();
    assert!(labeled.set_shallow_data(vec![1, 2], vec![1], 2, 1).is_err());
}

#[test]
fn test_split_equality_drops_column() {
    let labeled = toy_labeled();
    let mut out = LabeledMatrix::default();
    labeled.split(0, 1, &mut out).expect("column 0 exists");
    // Rows 0 and 1 have feature 0 == 1.
    assert_eq!(out.n_rows(), 2);
    assert_eq!(out.n_cols(), 1);
    assert_eq!(out.matrix().as_slice(), &[0, 1]);
    assert_eq!(out.labels().as_slice(), &[1, 1]);
    assert_eq!(out.feature_names(), &[1]);
}

#[test]
fn test_split_no_matches_is_empty() {
    let labeled = toy_labeled();
    let mut out = LabeledMatrix::default();
    labeled.split(0, 9, &mut out).expect("column 0 exists");
    assert_eq!(out.n_rows(), 0);
    assert_eq!(out.n_cols(), 1);
}

#[test]
fn test_split_out_of_bounds_column() {
    let labeled = toy_labeled();
    let mut out = LabeledMatrix::default();
    assert!(labeled.split(5, 1, &mut out).is_err());
}

#[test]
fn test_split_output_entropy_fresh() {
    let labeled = toy_labeled();
    let mut out = LabeledMatrix::default();
    labeled.split(0, 1, &mut out).expect("column 0 exists");
    // Both surviving labels are 1: pure set, entropy 0.
    assert!(out.shannon_entropy().abs() < 1e-6);
}

#[test]
fn test_split_preserves_feature_names_through_chain() {
    let matrix =
        Matrix::from_vec(3, 3, vec![1, 4, 7, 1, 5, 8, 2, 4, 9]).expect("3*3=9 elements");
    let labels = Vector::from_vec(vec![0, 1, 0]);
    let labeled = LabeledMatrix::new(matrix, labels).expect("3 labels for 3 rows");
    let mut first = LabeledMatrix::default();
    labeled.split(0, 1, &mut first).expect("column 0 exists");
    assert_eq!(first.feature_names(), &[1, 2]);
    let mut second = LabeledMatrix::default();
    // Positional column 0 of `first` carries original feature name 1.
    first.split(0, 4, &mut second).expect("column 0 exists");
    assert_eq!(second.feature_names(), &[2]);
    assert_eq!(second.n_rows(), 1);
    assert_eq!(second.matrix().as_slice(), &[7]);
}

#[test]
fn test_display_shows_labels() {
    let labeled = toy_labeled();
    let rendered = format!("{labeled}");
    assert!(rendered.contains('|'));
    assert_eq!(rendered.lines().count(), 4);
}
