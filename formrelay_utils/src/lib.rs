mod macros;

pub trait Apply {
    /// Applies the function `f` only if `value` is `Some(...)` and provides the
    /// contained value to `f`.
    ///
    /// #### Example
    /// ```rust
    /// # use formrelay_utils::Apply;
    /// fn header_or_default(name: String, value: Option<&str>) -> String {
    ///     name.apply_map(value, |slf, value| format!("{slf}: {value}"))
    /// }
    /// assert_eq!(header_or_default("Reply-To".into(), None), "Reply-To");
    /// assert_eq!(
    ///     header_or_default("Reply-To".into(), Some("jo@example.com")),
    ///     "Reply-To: jo@example.com"
    /// );
    /// ```
    fn apply_map<U>(self, value: Option<U>, f: impl FnOnce(Self, U) -> Self) -> Self
    where
        Self: Sized,
    {
        if let Some(value) = value {
            f(self, value)
        } else {
            self
        }
    }
}

impl<T> Apply for T {}
