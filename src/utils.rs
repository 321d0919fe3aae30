use std::cmp::Ordering;

/// Removes repeated items from runs of adjacent equal items, keeping the first of each run and
/// the order of everything else. Items are equal when `comparison` returns
/// [Ordering::Equal], or by `PartialEq` when no comparison is given.
///
/// ```
/// use rlang_core::utils::remove_duplicates;
///
/// let mut list = vec![1, 1, 2, 3, 3, 3, 1];
/// remove_duplicates(&mut list, None::<fn(&i32, &i32) -> std::cmp::Ordering>);
/// assert_eq!(list, vec![1, 2, 3, 1]);
/// ```
pub fn remove_duplicates<T, F>(list: &mut Vec<T>, comparison: Option<F>)
where
    T: PartialEq,
    F: Fn(&T, &T) -> Ordering,
{
    match comparison {
        Some(compare) => list.dedup_by(|current, kept| compare(kept, current) == Ordering::Equal),
        None => list.dedup(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_keeps_first_of_run() {
        let mut list = vec![(1, 'a'), (1, 'b'), (2, 'c'), (2, 'd'), (1, 'e')];
        remove_duplicates(&mut list, Some(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0)));
        assert_eq!(list, vec![(1, 'a'), (2, 'c'), (1, 'e')]);
    }

    #[test]
    fn test_empty_and_single() {
        let mut empty: Vec<i32> = vec![];
        remove_duplicates(&mut empty, None::<fn(&i32, &i32) -> Ordering>);
        assert!(empty.is_empty());

        let mut single = vec![7];
        remove_duplicates(&mut single, Some(|a: &i32, b: &i32| a.cmp(b)));
        assert_eq!(single, vec![7]);
    }
}
