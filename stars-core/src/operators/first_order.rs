/// Requires `predicate` to hold for at least one element of the collection.
///
/// Always false for an empty collection.
///
/// ```rust
/// use stars_core::operators::exists;
///
/// assert!(exists([1, 2, 3], |value| value > 2));
/// assert!(!exists(Vec::<u32>::new(), |_| true));
/// ```
pub fn exists<I, F>(collection: I, predicate: F) -> bool
where
    I: IntoIterator,
    F: FnMut(I::Item) -> bool,
{
    collection.into_iter().any(predicate)
}

/// Requires `predicate` to hold for every element of the collection.
///
/// Always true for an empty collection.
pub fn forall<I, F>(collection: I, predicate: F) -> bool
where
    I: IntoIterator,
    F: FnMut(I::Item) -> bool,
{
    collection.into_iter().all(predicate)
}

/// Apply `body` to `value`, which allows naming an intermediate result inside of a formula.
///
/// The value is commonly an optional lookup, in which case the body decides what an absent value
/// means:
///
/// ```rust
/// use stars_core::operators::bind;
///
/// let speeds = [12.0, 18.0];
/// assert!(bind(speeds.get(1), |speed| speed.is_some_and(|s| *s > 15.0)));
/// assert!(!bind(speeds.get(5), |speed| speed.is_some_and(|s| *s > 15.0)));
/// ```
pub fn bind<V, R, F>(value: V, body: F) -> R
where
    F: FnOnce(V) -> R,
{
    body(value)
}
