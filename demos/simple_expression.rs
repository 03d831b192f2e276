use log::debug;
use rulecalc::{Calculator, EvalOptions};

fn main() {
    pretty_env_logger::init();

    let mut calculator = Calculator::with_defaults().expect("default grammar compiles");
    let options = EvalOptions::new();

    for expression in ["2 + 3 * 4", "(2 - (-5/2) * 4)^2", "max(1, 3!, root(16))", "sin(30)"] {
        match calculator.evaluate(expression, true, &options) {
            Ok(result) => println!("{} = {}", expression, result),
            Err(err) => println!("{}: {}", expression, err),
        }
    }

    let radians = EvalOptions::new().with("rad", true);
    let result = calculator.evaluate("sin(pi / 2)", true, &radians);
    println!("sin(pi / 2) in radians = {:?}", result);

    if let Err(err) = calculator.evaluate("sin(7, 6)", true, &options) {
        println!("sin(7, 6): {}", err);
    }

    debug!("history: {:?}", calculator.history());
    for entry in calculator.history() {
        println!("{} -> {}", entry.expression, entry.result);
    }
}
