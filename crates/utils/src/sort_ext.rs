/// Extension trait for sorting nearly-sorted slices in-place
pub trait SortExt<T> {
    /// Stable insertion sort
    ///
    /// Event buffers are kept in weak time order, so insertion sort beats the
    /// general-purpose sorts on the nearly-sorted ranges they hand it, and
    /// being stable it never swaps equal-time events around.
    fn insertion_sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering;
}

impl<T> SortExt<T> for [T] {
    fn insertion_sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        for i in 1..self.len() {
            let target = {
                let (sorted, rest) = self.split_at(i);
                let probe = &rest[0];
                sorted.partition_point(|x| compare(x, probe) != std::cmp::Ordering::Greater)
            };
            self[target..=i].rotate_right(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_nearly_sorted_data() {
        let mut values = vec![1.0, 2.0, 1.5, 3.0, 2.5, 4.0];
        values.insertion_sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(values, vec![1.0, 1.5, 2.0, 2.5, 3.0, 4.0]);
    }

    #[test]
    fn stable_on_equal_keys() {
        let mut values = vec![(1.0, 'a'), (0.5, 'b'), (1.0, 'c'), (1.0, 'd')];
        values.insertion_sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        assert_eq!(
            values.iter().map(|v| v.1).collect::<Vec<_>>(),
            vec!['b', 'a', 'c', 'd']
        );
    }
}
