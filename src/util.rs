use std::fmt::Debug;

pub fn collect_array<const N: usize, T: Debug>(iter: impl IntoIterator<Item = T>) -> [T; N] {
    iter.into_iter()
        .collect::<Vec<_>>()
        .try_into()
        .expect("array length")
}
