//! Two-dimensional array carrier. `Vec<T>` already covers one-dimensional
//! PostgreSQL arrays directly; a second dimension needs its own type because
//! `Vec<Vec<T>>` would overlap with the blanket one-dimensional array impl
//! (its element type `Vec<T>` already satisfies that impl's own bound).

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Array2<T> {
    pub rows: Vec<Vec<T>>,
}

impl<T> Array2<T> {
    pub fn new(rows: Vec<Vec<T>>) -> Self {
        Array2 { rows }
    }
}
