//! Row-level filters applied to a source's data lines before parsing.
//!
//! Some annotation sources carry table headers or dump commentary around the
//! data rows. A [`RowWindow`] says which data rows to keep.

/// Which data rows of a source to keep, applied after comment and blank
/// lines are removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowWindow {
    /// Keep every data row.
    #[default]
    All,
    /// Keep only the last `n` data rows.
    KeepLast(usize),
    /// Drop the first `n` data rows.
    DropFirst(usize),
}

impl RowWindow {
    pub fn apply<T>(&self, mut rows: Vec<T>) -> Vec<T> {
        match *self {
            RowWindow::All => rows,
            RowWindow::KeepLast(n) => {
                let skip = rows.len().saturating_sub(n);
                rows.split_off(skip)
            }
            RowWindow::DropFirst(n) => {
                let n = n.min(rows.len());
                rows.split_off(n)
            }
        }
    }
}

impl std::fmt::Display for RowWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowWindow::All => write!(f, "all rows"),
            RowWindow::KeepLast(n) => write!(f, "last {} rows", n),
            RowWindow::DropFirst(n) => write!(f, "all but the first {} rows", n),
        }
    }
}
