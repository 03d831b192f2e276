//! Variadic arithmetic functions. Multi-argument calls fold pairwise left to
//! right; a few functions use a distinct formula for a single argument.

fn fold(pack: &[f64], f: impl Fn(f64, f64) -> f64) -> f64 {
    match pack.split_first() {
        Some((first, rest)) => rest.iter().fold(*first, |acc, x| f(acc, *x)),
        None => f64::NAN,
    }
}

fn single_or_fold(pack: &[f64], single: impl Fn(f64) -> f64, f: impl Fn(f64, f64) -> f64) -> f64 {
    match pack {
        [x] => single(*x),
        _ => fold(pack, f),
    }
}

pub fn add(pack: &[f64]) -> f64 {
    pack.iter().sum()
}

pub fn subtract(pack: &[f64]) -> f64 {
    fold(pack, |a, b| a - b)
}

pub fn multiply(pack: &[f64]) -> f64 {
    fold(pack, |a, b| a * b)
}

pub fn divide(pack: &[f64]) -> f64 {
    fold(pack, |a, b| a / b)
}

pub fn modulo(pack: &[f64]) -> f64 {
    fold(pack, super::floored_rem)
}

/// `FDIV(a)` is `floor(a)`.
pub fn floor_divide(pack: &[f64]) -> f64 {
    single_or_fold(pack, f64::floor, |a, b| (a / b).floor())
}

pub fn min(pack: &[f64]) -> f64 {
    fold(pack, f64::min)
}

pub fn max(pack: &[f64]) -> f64 {
    fold(pack, f64::max)
}

/// `ROOT(a)` is the square root, `ROOT(a, b)` the b-th root.
pub fn root(pack: &[f64]) -> f64 {
    single_or_fold(pack, f64::sqrt, |a, b| a.powf(1.0 / b))
}

/// `POW(a)` squares.
pub fn power(pack: &[f64]) -> f64 {
    single_or_fold(pack, |a| a * a, f64::powf)
}

/// `LOG(a)` is base 10, `LOG(a, b)` is base b.
pub fn log(pack: &[f64]) -> f64 {
    single_or_fold(pack, f64::log10, |a, b| a.ln() / b.ln())
}

pub fn ln(pack: &[f64]) -> f64 {
    pack.first().map_or(f64::NAN, |x| x.ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_folds() {
        assert_eq!(add(&[2.0, 3.0, 4.0, 5.0]), 14.0);
        assert_eq!(subtract(&[2.0, 3.0, 4.0, 5.0]), -10.0);
        assert_eq!(multiply(&[2.0, 3.0, 4.0, 5.0]), 120.0);
        assert_eq!(divide(&[5.0, 4.0, 2.0]), 0.625);
        assert_eq!(modulo(&[120.0, 111.0, 5.0]), 4.0);
        assert_eq!(floor_divide(&[20.0, 3.0, 5.0]), 1.0);
        assert_eq!(min(&[2.0, 3.0, 4.0, 5.0]), 2.0);
        assert_eq!(max(&[2.0, 3.0, 4.0, 5.0]), 5.0);
        assert_eq!(power(&[2.0, 3.0, 4.0]), 4096.0);
        assert!(approx(root(&[15625.0, 3.0, 2.0]), 5.0));
        assert!(approx(log(&[25.0, 5.0]), 2.0));
    }

    #[test]
    fn test_single_argument_forms() {
        assert_eq!(add(&[2.0]), 2.0);
        assert_eq!(subtract(&[2.0]), 2.0);
        assert_eq!(multiply(&[2.0]), 2.0);
        assert_eq!(divide(&[5.0]), 5.0);
        assert_eq!(modulo(&[2.0]), 2.0);
        assert_eq!(floor_divide(&[2.4]), 2.0);
        assert_eq!(power(&[3.0]), 9.0);
        assert_eq!(root(&[16.0]), 4.0);
        assert!(approx(log(&[1000.0]), 3.0));
        assert!(approx(ln(&[std::f64::consts::E]), 1.0));
    }
}
