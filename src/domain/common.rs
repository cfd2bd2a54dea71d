/// Exposes the balance contribution of an entry.
pub trait Amounted {
    /// Positive for money in, negative for money out.
    fn signed_amount(&self) -> f64;
}

/// Sums the signed amounts of any sequence of entries.
pub fn balance_of<'a, T, I>(entries: I) -> f64
where
    T: Amounted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    entries.into_iter().map(Amounted::signed_amount).sum()
}
