pub mod arithmetic;
pub mod trigonometry;

use crate::options::EvalOptions;
use crate::tokens::Arity;

/// Named functions callable as `NAME(arg, ...)`. Names match case-insensitively.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FunctionOp {
    Modulo,
    FloorDivide,
    Min,
    Max,
    Root,
    Power,
    Log,
    Add,
    Subtract,
    Multiply,
    Divide,
    Sin,
    Cos,
    Tan,
    Ln,
}

impl FunctionOp {
    pub const ALL: [FunctionOp; 15] = [
        FunctionOp::Modulo,
        FunctionOp::FloorDivide,
        FunctionOp::Min,
        FunctionOp::Max,
        FunctionOp::Root,
        FunctionOp::Power,
        FunctionOp::Log,
        FunctionOp::Add,
        FunctionOp::Subtract,
        FunctionOp::Multiply,
        FunctionOp::Divide,
        FunctionOp::Sin,
        FunctionOp::Cos,
        FunctionOp::Tan,
        FunctionOp::Ln,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FunctionOp::Modulo => "MOD",
            FunctionOp::FloorDivide => "FDIV",
            FunctionOp::Min => "MIN",
            FunctionOp::Max => "MAX",
            FunctionOp::Root => "ROOT",
            FunctionOp::Power => "POW",
            FunctionOp::Log => "LOG",
            FunctionOp::Add => "ADD",
            FunctionOp::Subtract => "SUB",
            FunctionOp::Multiply => "MUL",
            FunctionOp::Divide => "DIV",
            FunctionOp::Sin => "SIN",
            FunctionOp::Cos => "COS",
            FunctionOp::Tan => "TAN",
            FunctionOp::Ln => "LN",
        }
    }

    /// Names are plain words, so the name doubles as the pattern.
    pub fn pattern(self) -> &'static str {
        self.name()
    }

    pub fn arity(self) -> Arity {
        match self {
            FunctionOp::Sin | FunctionOp::Cos | FunctionOp::Tan | FunctionOp::Ln => {
                Arity::exactly(1)
            }
            _ => Arity::at_least(1),
        }
    }

    /// Computes the function over an already arity-checked pack.
    pub fn apply(self, pack: &[f64], options: &EvalOptions) -> f64 {
        match self {
            FunctionOp::Modulo => arithmetic::modulo(pack),
            FunctionOp::FloorDivide => arithmetic::floor_divide(pack),
            FunctionOp::Min => arithmetic::min(pack),
            FunctionOp::Max => arithmetic::max(pack),
            FunctionOp::Root => arithmetic::root(pack),
            FunctionOp::Power => arithmetic::power(pack),
            FunctionOp::Log => arithmetic::log(pack),
            FunctionOp::Add => arithmetic::add(pack),
            FunctionOp::Subtract => arithmetic::subtract(pack),
            FunctionOp::Multiply => arithmetic::multiply(pack),
            FunctionOp::Divide => arithmetic::divide(pack),
            FunctionOp::Ln => arithmetic::ln(pack),
            FunctionOp::Sin => trigonometry::sin(pack, options),
            FunctionOp::Cos => trigonometry::cos(pack, options),
            FunctionOp::Tan => trigonometry::tan(pack, options),
        }
    }
}

/// Remainder with the sign of the divisor (floored division).
pub fn floored_rem(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Gamma function. Exact for positive integers, Lanczos elsewhere.
/// Poles (zero and negative integers) yield NaN.
pub fn gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x == x.floor() {
        if x <= 0.0 {
            return f64::NAN;
        }
        if x > 171.0 {
            return f64::INFINITY;
        }
        return (1..x as u64).fold(1.0, |acc, n| acc * n as f64);
    }
    if x < 0.5 {
        // Reflection formula.
        let pi = std::f64::consts::PI;
        return pi / ((pi * x).sin() * gamma(1.0 - x));
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, c)| {
            acc + c / (x + i as f64 + 1.0)
        });
    (2.0 * std::f64::consts::PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * series
}
