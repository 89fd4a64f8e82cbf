/// Runtime value in kindle.
///
/// The language has exactly one type: a signed 64-bit integer. Comparisons
/// produce `0` or `1`, and conditions treat `0` as false.
pub type Value = i64;
