//! Evaluate a binary function over all pairs drawn from a sequence.
//!
//! The builders here produce an `n × n` array with `M[i, j] = f(items[i],
//! items[j])`. Passing `symmetric = true` asserts that `f(a, b) == f(b, a)` for
//! every pair: only the upper triangle (diagonal included) is evaluated and
//! mirrored into the lower one, roughly halving the number of calls. The
//! assertion is not checked; a non-symmetric `f` silently produces a wrong
//! lower triangle.
//!
//! ```
//! use transit::pairwise::pairwise_array_from_func;
//!
//! let x = [0.0, 1.0, 3.0];
//! let dist = pairwise_array_from_func(&x, |a: &f64, b: &f64| (a - b).abs(), true);
//! assert_eq!(dist[[0, 2]], 3.0);
//! assert_eq!(dist[[2, 0]], 3.0);
//! ```

use std::convert::Infallible;
use ndarray as nd;
use rayon::prelude::*;

// core sequential builder over indices; `on_row` is called after each row is
// complete with (rows done, total rows)
pub(crate) fn build_indexed<F, G, E>(
    n: usize,
    mut f: F,
    symmetric: bool,
    mut on_row: G,
) -> Result<nd::Array2<f64>, E>
where
    F: FnMut(usize, usize) -> Result<f64, E>,
    G: FnMut(usize, usize),
{
    let mut out: nd::Array2<f64> = nd::Array2::zeros((n, n));
    for i in 0..n {
        let start = if symmetric { i } else { 0 };
        for j in start..n {
            let val = f(i, j)?;
            out[[i, j]] = val;
            if symmetric && i != j { out[[j, i]] = val; }
        }
        on_row(i + 1, n);
    }
    Ok(out)
}

// core parallel builder over indices
pub(crate) fn par_build_indexed<F, E>(n: usize, f: F, symmetric: bool)
    -> Result<nd::Array2<f64>, E>
where
    F: Fn(usize, usize) -> Result<f64, E> + Sync,
    E: Send,
{
    let pairs: Vec<(usize, usize)>
        = (0..n)
        .flat_map(|i| {
            let start = if symmetric { i } else { 0 };
            (start..n).map(move |j| (i, j))
        })
        .collect();
    let vals: Vec<f64>
        = pairs.par_iter()
        .map(|&(i, j)| f(i, j))
        .collect::<Result<_, E>>()?;
    let mut out: nd::Array2<f64> = nd::Array2::zeros((n, n));
    for (&(i, j), val) in pairs.iter().zip(vals) {
        out[[i, j]] = val;
        if symmetric { out[[j, i]] = val; }
    }
    Ok(out)
}

/// Build the matrix `M[i, j] = f(items[i], items[j])`.
///
/// See the [module-level documentation][self] for the meaning of `symmetric`.
pub fn pairwise_array_from_func<T, F>(items: &[T], mut f: F, symmetric: bool)
    -> nd::Array2<f64>
where F: FnMut(&T, &T) -> f64
{
    let res: Result<_, Infallible>
        = build_indexed(
            items.len(),
            |i, j| Ok(f(&items[i], &items[j])),
            symmetric,
            |_, _| { },
        );
    match res {
        Ok(out) => out,
        Err(never) => match never { },
    }
}

/// Like [`pairwise_array_from_func`], but for a fallible `f`. Stops at and
/// returns the first error, scanning rows in order.
pub fn try_pairwise_array_from_func<T, F, E>(
    items: &[T],
    mut f: F,
    symmetric: bool,
) -> Result<nd::Array2<f64>, E>
where F: FnMut(&T, &T) -> Result<f64, E>
{
    build_indexed(
        items.len(),
        |i, j| f(&items[i], &items[j]),
        symmetric,
        |_, _| { },
    )
}

/// Like [`try_pairwise_array_from_func`], but evaluating entries in parallel
/// on the global [`rayon`] thread pool.
///
/// Results are identical to the sequential builder; if more than one entry
/// fails, which error is returned is unspecified.
pub fn par_try_pairwise_array_from_func<T, F, E>(
    items: &[T],
    f: F,
    symmetric: bool,
) -> Result<nd::Array2<f64>, E>
where
    T: Sync,
    F: Fn(&T, &T) -> Result<f64, E> + Sync,
    E: Send,
{
    par_build_indexed(items.len(), |i, j| f(&items[i], &items[j]), symmetric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn sym(a: &f64, b: &f64) -> f64 { (a * b).sin() + (a + b).cos() }

    #[test]
    fn symmetric_path_matches_full_path() {
        let items: Vec<f64> = (0..9).map(|k| 0.37 * k as f64 - 1.0).collect();
        let full = pairwise_array_from_func(&items, sym, false);
        let half = pairwise_array_from_func(&items, sym, true);
        assert_eq!(full, half);
    }

    #[test]
    fn symmetric_path_halves_calls() {
        let items = [1.0, 2.0, 3.0, 4.0];
        let calls = Cell::new(0);
        let count = |a: &f64, b: &f64| { calls.set(calls.get() + 1); a + b };
        pairwise_array_from_func(&items, count, true);
        assert_eq!(calls.get(), 10);
        calls.set(0);
        pairwise_array_from_func(&items, count, false);
        assert_eq!(calls.get(), 16);
    }

    #[test]
    fn non_symmetric_entries() {
        let items = [1.0, 2.0];
        let m = pairwise_array_from_func(&items, |a: &f64, b: &f64| a - b, false);
        assert_eq!(m, nd::array![[0.0, -1.0], [1.0, 0.0]]);
        // unchecked contract: the lower triangle mirrors the upper one
        let m = pairwise_array_from_func(&items, |a: &f64, b: &f64| a - b, true);
        assert_eq!(m, nd::array![[0.0, -1.0], [-1.0, 0.0]]);
    }

    #[test]
    fn fallible_and_parallel() {
        let items: Vec<f64> = (0..7).map(|k| k as f64).collect();
        let ok = |a: &f64, b: &f64| -> Result<f64, String> { Ok(sym(a, b)) };
        let seq = try_pairwise_array_from_func(&items, ok, true).unwrap();
        let par = par_try_pairwise_array_from_func(&items, ok, true).unwrap();
        assert_eq!(seq, par);
        let par_full = par_try_pairwise_array_from_func(&items, ok, false).unwrap();
        assert_eq!(seq, par_full);

        let fail = |a: &f64, b: &f64| -> Result<f64, String> {
            if *a == 3.0 && *b == 4.0 { Err("boom".into()) } else { Ok(a * b) }
        };
        assert_eq!(
            try_pairwise_array_from_func(&items, fail, true),
            Err("boom".to_string()),
        );
        assert!(par_try_pairwise_array_from_func(&items, fail, true).is_err());
    }

    #[test]
    fn empty_input() {
        let items: [f64; 0] = [];
        assert_eq!(pairwise_array_from_func(&items, sym, true).dim(), (0, 0));
    }
}
