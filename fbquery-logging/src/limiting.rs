use std::fmt::{self, Debug, Display};

/// Truncates the formatted value to a maximum number of characters.
/// Compiled statements can be arbitrarily large so they are logged through this.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MaxLogLength<'a, T: ?Sized> {
    limit: Option<usize>,
    val: &'a T,
}

impl<'a, T: ?Sized> MaxLogLength<'a, T> {
    pub fn new(limit: Option<usize>, val: &'a T) -> Self {
        Self { limit, val }
    }

    fn write_limited(&self, f: &mut fmt::Formatter<'_>, fmt: String) -> fmt::Result {
        match self.limit {
            Some(limit) if fmt.chars().count() > limit => {
                let end = fmt.char_indices().nth(limit).map(|(i, _)| i).unwrap_or(fmt.len());
                write!(f, "{}...", &fmt[..end])
            }
            _ => write!(f, "{}", fmt),
        }
    }
}

impl<'a, T: Debug + ?Sized> Debug for MaxLogLength<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_limited(f, format!("{:?}", self.val))
    }
}

impl<'a, T: Display + ?Sized> Display for MaxLogLength<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_limited(f, self.val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_log_length_within_bounds() {
        let sql = "SELECT 1 FROM RDB$DATABASE";
        let fmt = format!("{}", MaxLogLength::new(Some(50), sql));

        assert_eq!(fmt, "SELECT 1 FROM RDB$DATABASE");
    }

    #[test]
    fn test_max_log_length_no_limit() {
        let val = vec![1, 2, 3, 4, 5];
        let fmt = format!("{:?}", MaxLogLength::new(None, &val));

        assert_eq!(fmt, "[1, 2, 3, 4, 5]");
    }

    #[test]
    fn test_max_log_length_truncated() {
        let val = vec![1, 2, 3, 4, 5];
        let fmt = format!("{:?}", MaxLogLength::new(Some(5), &val));

        assert_eq!(fmt, "[1, 2...");
    }

    #[test]
    fn test_max_log_length_truncates_on_char_boundary() {
        let sql = "SELECT 'żółw'";
        let fmt = format!("{}", MaxLogLength::new(Some(10), sql));

        assert_eq!(fmt, "SELECT 'żó...");
    }
}
