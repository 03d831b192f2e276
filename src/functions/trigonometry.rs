use crate::options::EvalOptions;

/// Arguments are degrees unless the `rad` option is set.
fn angle(pack: &[f64], options: &EvalOptions) -> f64 {
    let value = pack.first().copied().unwrap_or(f64::NAN);
    if options.flag("rad") {
        value
    } else {
        value.to_radians()
    }
}

pub fn sin(pack: &[f64], options: &EvalOptions) -> f64 {
    angle(pack, options).sin()
}

pub fn cos(pack: &[f64], options: &EvalOptions) -> f64 {
    angle(pack, options).cos()
}

pub fn tan(pack: &[f64], options: &EvalOptions) -> f64 {
    angle(pack, options).tan()
}
