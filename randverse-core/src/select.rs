use rand::Rng;
use tracing::trace;

use crate::catalog::Book;
use crate::error::{Result, VerseError};

/// A line picked from a pool: the book and the 1-based line within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub book: &'a Book,
    pub offset: usize,
}

/// Line count across `pool`, saturating at `usize::MAX`.
pub fn total_lines(pool: &[Book]) -> usize {
    pool.iter()
        .fold(0usize, |total, book| total.saturating_add(book.line_count))
}

pub fn checked_total_lines(pool: &[Book]) -> Option<usize> {
    pool.iter()
        .try_fold(0usize, |total, book| total.checked_add(book.line_count))
}

/// Draws one line uniformly over every line of `pool`, so longer books are
/// proportionally more likely.
pub fn select<'a, R>(pool: &'a [Book], rng: &mut R) -> Result<Selection<'a>>
where
    R: Rng + ?Sized,
{
    let total = checked_total_lines(pool).ok_or(VerseError::LineCountOverflow)?;
    if total == 0 {
        return Err(VerseError::EmptyPool);
    }
    let choice = rng.gen_range(1..=total);
    trace!(choice, total, "drew global line index");
    locate(pool, choice).ok_or(VerseError::EmptyPool)
}

/// Maps a 1-based global line index over `pool` to its book and local
/// offset. Returns `None` when `choice` is zero or past the last line.
pub fn locate(pool: &[Book], choice: usize) -> Option<Selection<'_>> {
    if choice == 0 {
        return None;
    }
    let mut cum = 0usize;
    for book in pool {
        match cum.checked_add(book.line_count) {
            Some(end) if choice > end => cum = end,
            _ => {
                return Some(Selection {
                    book,
                    offset: choice - cum,
                })
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CategorySpec};
    use crate::error::ErrorKind;
    use crate::messages::Messages;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(counts: &[usize]) -> Vec<Book> {
        counts
            .iter()
            .enumerate()
            .map(|(idx, count)| Book::new((idx as u32 + 1) * 10, format!("Book {idx}"), *count))
            .collect()
    }

    #[test]
    fn locate_walks_prefix_sums() {
        let books = pool(&[3, 0, 2]);
        let picks: Vec<_> = (1..=5)
            .map(|choice| {
                let sel = locate(&books, choice).unwrap();
                (sel.book.id, sel.offset)
            })
            .collect();
        assert_eq!(picks, vec![(10, 1), (10, 2), (10, 3), (30, 1), (30, 2)]);
        assert!(locate(&books, 0).is_none());
        assert!(locate(&books, 6).is_none());
    }

    #[test]
    fn empty_pools_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            select(&[], &mut rng).unwrap_err().kind(),
            ErrorKind::EmptyPool
        );
        let zeros = pool(&[0, 0]);
        assert_eq!(
            select(&zeros, &mut rng).unwrap_err().kind(),
            ErrorKind::EmptyPool
        );
    }

    #[test]
    fn oversized_line_counts_are_rejected() {
        let books = vec![Book::new(10, "A", usize::MAX), Book::new(20, "B", 2)];
        let mut rng = StdRng::seed_from_u64(5);
        let err = select(&books, &mut rng).unwrap_err();
        assert!(matches!(err, VerseError::LineCountOverflow));
        assert_eq!(total_lines(&books), usize::MAX);
        assert_eq!(checked_total_lines(&books), None);

        let sel = locate(&books, usize::MAX).unwrap();
        assert_eq!((sel.book.id, sel.offset), (10, usize::MAX));
    }

    #[test]
    fn zero_length_books_are_never_selected() {
        let books = pool(&[0, 4, 0]);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let sel = select(&books, &mut rng).unwrap();
            assert_eq!(sel.book.id, 20);
            assert!((1..=4).contains(&sel.offset));
        }
    }

    #[test]
    fn selection_is_uniform_over_lines() {
        let books = pool(&[3, 1]);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let draws = 40_000;
        let mut hits = [0usize; 4];
        for _ in 0..draws {
            let sel = select(&books, &mut rng).unwrap();
            let global = if sel.book.id == 10 {
                sel.offset
            } else {
                3 + sel.offset
            };
            hits[global - 1] += 1;
        }
        let expected = draws as f64 / 4.0;
        for count in hits {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.05, "line hit {count} times, expected ~{expected}");
        }
    }

    #[test]
    fn selections_stay_inside_category() {
        let books = vec![
            Book::new(10, "Genesis", 1533),
            Book::new(20, "Exodus", 1213),
            Book::new(470, "Matthew", 1071),
        ];
        let specs = [
            CategorySpec::new("pentateuch", 10, 50),
            CategorySpec::new("empty", 999, 999),
        ];
        let catalog = Catalog::new(books, &specs, Messages::default());
        let mut rng = StdRng::seed_from_u64(3);

        let pentateuch = catalog.pool(Some("pentateuch")).unwrap();
        for _ in 0..1_000 {
            let sel = select(pentateuch, &mut rng).unwrap();
            assert!(sel.book.name == "Genesis" || sel.book.name == "Exodus");
            assert!(sel.offset >= 1 && sel.offset <= sel.book.line_count);
        }

        let empty = catalog.pool(Some("empty")).unwrap();
        assert_eq!(
            select(empty, &mut rng).unwrap_err().kind(),
            ErrorKind::EmptyPool
        );
    }
}
